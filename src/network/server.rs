//! TCP Server
//!
//! Accepts connections and runs each one on its own thread.

use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cache::Store;
use crate::config::Config;
use crate::error::Result;
use crate::protocol::Response;
use super::Connection;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for handcache
pub struct Server {
    config: Config,
    store: Arc<Store>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

/// Cloneable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the accept loop to stop
    ///
    /// Connections already being served run to completion.
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

/// Decrements the live-connection count when a worker exits
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Server {
    /// Validate the config and bind the listen address
    pub fn bind(config: Config, store: Arc<Store>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr()?);

        while !self.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::Interrupted
                            | io::ErrorKind::ConnectionAborted
                            | io::ErrorKind::ConnectionReset
                    ) =>
                {
                    tracing::debug!("Transient accept error: {}", e);
                }
                Err(e) => {
                    tracing::error!("Accept failed: {}", e);
                    return Err(e.into());
                }
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    /// Hand an accepted stream to a dedicated worker thread
    fn dispatch(&self, mut stream: TcpStream, peer: SocketAddr) {
        // Some platforms hand out accepted sockets in the listener's mode
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping {}: couldn't switch to blocking mode: {}", peer, e);
            return;
        }

        if self.active.load(Ordering::Acquire) >= self.config.max_connections {
            tracing::warn!(
                "Refusing {}: {} connections already active",
                peer,
                self.config.max_connections
            );
            let refusal = Response::Refused("too many connections".to_string());
            let _ = writeln!(stream, "{}", refusal);
            return;
        }

        self.active.fetch_add(1, Ordering::AcqRel);
        let guard = ActiveGuard(Arc::clone(&self.active));
        let store = Arc::clone(&self.store);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name(format!("handcache-conn-{}", peer))
            .spawn(move || {
                let _guard = guard;
                let mut connection = match Connection::from_tcp(stream, store, &config) {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::warn!("Failed to set up connection from {}: {}", peer, e);
                        return;
                    }
                };
                if let Err(e) = connection.handle() {
                    tracing::debug!("Connection from {} closed with error: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn worker for {}: {}", peer, e);
        }
    }
}
