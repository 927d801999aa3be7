//! Streaming frame reader
//!
//! TCP gives no delivery boundaries: one read may return half a frame,
//! exactly one, or several. `FrameReader` accumulates bytes until the
//! buffer holds a whole frame, hands that frame out, and keeps whatever
//! follows it for the next call.
//!
//! ```text
//!   AwaitingHeader ──(18 bytes buffered)──▶ AwaitingBody
//!         ▲                                     │
//!         │                         (key + data buffered)
//!         │                                     ▼
//!         └────────────(frame split off)──── FrameReady
//! ```

use std::io::{self, Read};

use bytes::{Bytes, BytesMut};

use crate::config::{Config, DEFAULT_MAX_FRAME_SIZE, DEFAULT_READ_CHUNK_SIZE};
use crate::error::{CacheError, Result};
use super::codec::{body_lengths, HEADER_SIZE};

/// Where the reader is in assembling the next frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Fewer than `HEADER_SIZE` bytes buffered
    AwaitingHeader,

    /// Header buffered, body still incomplete
    AwaitingBody { frame_len: usize },

    /// A complete frame is buffered and will be returned without reading
    FrameReady { frame_len: usize },
}

/// Per-connection frame accumulator
pub struct FrameReader<R> {
    /// Underlying byte source
    source: R,

    /// Bytes received but not yet handed out
    buffer: BytesMut,

    /// Scratch space for a single read
    chunk: Vec<u8>,

    /// Largest frame we're willing to buffer
    max_frame_size: usize,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader with default limits
    pub fn new(source: R) -> Self {
        Self::with_limits(source, DEFAULT_MAX_FRAME_SIZE, DEFAULT_READ_CHUNK_SIZE)
    }

    /// Create a reader with limits taken from the server config
    pub fn from_config(source: R, config: &Config) -> Self {
        Self::with_limits(source, config.max_frame_size, config.read_chunk_size)
    }

    /// Create a reader with an explicit frame limit and read chunk size
    ///
    /// A zero chunk size is bumped to one byte.
    pub fn with_limits(source: R, max_frame_size: usize, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            source,
            buffer: BytesMut::with_capacity(chunk_size),
            chunk: vec![0u8; chunk_size],
            max_frame_size,
        }
    }

    /// Read exactly one complete frame
    ///
    /// Blocks until enough bytes have arrived. End-of-stream before any byte
    /// of a new frame is `ConnectionClosed`; end-of-stream mid-frame is an
    /// `UnexpectedEof` I/O error.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            match self.state()? {
                ReaderState::FrameReady { frame_len } => {
                    let frame = self.buffer.split_to(frame_len).freeze();
                    tracing::trace!(
                        "Framed {} bytes, {} left buffered",
                        frame_len,
                        self.buffer.len()
                    );
                    return Ok(frame);
                }
                ReaderState::AwaitingHeader | ReaderState::AwaitingBody { .. } => self.fill()?,
            }
        }
    }

    /// Inspect the buffered bytes
    ///
    /// Fails with `FrameTooLarge` as soon as a buffered header declares a
    /// frame above the limit, before any of its body is read.
    pub fn state(&self) -> Result<ReaderState> {
        if self.buffer.len() < HEADER_SIZE {
            return Ok(ReaderState::AwaitingHeader);
        }

        let (key_len, data_len) = body_lengths(&self.buffer);
        let frame_len = HEADER_SIZE + key_len + data_len;
        if frame_len > self.max_frame_size {
            return Err(CacheError::FrameTooLarge {
                size: frame_len,
                max: self.max_frame_size,
            });
        }

        if self.buffer.len() < frame_len {
            Ok(ReaderState::AwaitingBody { frame_len })
        } else {
            Ok(ReaderState::FrameReady { frame_len })
        }
    }

    /// Number of bytes received but not yet returned
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Iterate over frames until the peer closes the stream
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames {
            reader: self,
            done: false,
        }
    }

    /// Get a reference to the underlying source
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Pull one chunk from the source into the buffer
    fn fill(&mut self) -> Result<()> {
        let n = loop {
            match self.source.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };

        if n == 0 {
            if self.buffer.is_empty() {
                return Err(CacheError::ConnectionClosed);
            }
            return Err(CacheError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended with {} bytes of a partial frame", self.buffer.len()),
            )));
        }

        self.buffer.extend_from_slice(&self.chunk[..n]);
        Ok(())
    }
}

/// Lazy sequence of frames from one connection
///
/// Ends cleanly on `ConnectionClosed`; any other error is yielded once and
/// then the sequence ends.
pub struct Frames<'a, R> {
    reader: &'a mut FrameReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Frames<'_, R> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(CacheError::ConnectionClosed) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
