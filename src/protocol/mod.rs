//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Request Format (V1 - Fixed Header Binary)
//! ```text
//! ┌─────────┬─────────┬──────────────┬──────────┬──────────┬──────────┐
//! │ Ver (1) │ Cmd (1) │ Expires (8)  │ KeyLen(2)│DataLen(2)│ Rsvd (4) │
//! └─────────┴─────────┴──────────────┴──────────┴──────────┴──────────┘
//! ┌─────────────────────┬─────────────────────────────────────────────┐
//! │   Key (KeyLen)      │              Data (DataLen)                 │
//! └─────────────────────┴─────────────────────────────────────────────┘
//! ```
//!
//! All integers are big-endian. `Expires` is an absolute unix timestamp in
//! seconds, so retransmission delay can't stretch a TTL.
//!
//! ### Commands
//! - 0x01: GET  - key only, no data, expiry ignored
//! - 0x02: SET  - key + non-empty data, expiry strictly in the future
//!
//! ### Response Format
//! One human-readable line per request, terminated by `\n`.

mod command;
mod codec;
mod reader;
mod response;

pub use command::{Command, CommandType};
pub use codec::{decode_command, encode_command, encode_frame, HEADER_SIZE, MAX_FIELD_LEN, VERSION};
pub use reader::{FrameReader, Frames, ReaderState};
pub use response::{write_response, Response};
