//! Byte-stream provider seam.
//!
//! The transport adapter does not implement named-pipe I/O itself; it
//! consumes a [`Provider`] that can dial a named endpoint and bind a
//! listening endpoint. The default [`platform::PlatformProvider`] maps
//! endpoints to Unix domain sockets or Windows named pipes; tests and
//! embedders may supply their own.

pub mod platform;

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// A connected bidirectional byte stream.
///
/// Blanket-implemented for anything the tokio I/O traits cover, so
/// provider implementations can return sockets, pipes, or in-memory
/// duplex streams.
pub trait Conn: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin + ?Sized> Conn for T {}

impl std::fmt::Debug for dyn Conn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Conn")
    }
}

/// Parameters applied when binding a listening endpoint.
#[derive(Debug, Clone)]
pub struct BindConfig {
    /// Requested input buffer size in bytes.
    pub input_buffer_size: i32,
    /// Requested output buffer size in bytes.
    pub output_buffer_size: i32,
    /// Platform access-control description; empty means platform default.
    pub security_descriptor: String,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            input_buffer_size: 4096,
            output_buffer_size: 4096,
            security_descriptor: String::new(),
        }
    }
}

/// Opens byte streams to and from named endpoints.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Connect to the endpoint named `path`.
    async fn dial(&self, path: &str) -> io::Result<Box<dyn Conn>>;

    /// Bind a listening endpoint at `path` with the given parameters.
    async fn listen(&self, path: &str, config: &BindConfig) -> io::Result<Box<dyn Acceptor>>;
}

/// A bound listening endpoint.
#[async_trait]
pub trait Acceptor: Send + Sync {
    /// Wait for one inbound connection.
    ///
    /// Must be safe to call repeatedly and concurrently with `close`;
    /// a close while an accept is blocked wakes the accept with an error.
    async fn accept(&self) -> io::Result<Box<dyn Conn>>;

    /// Release the endpoint. Idempotent.
    fn close(&self);
}

impl std::fmt::Debug for dyn Acceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Acceptor")
    }
}
