//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread polling a non-blocking listener
//! - One worker thread per connection
//! - Commands dispatched straight to the shared `Store`

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
