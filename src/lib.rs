//! # pipelink
//!
//! Named-pipe transport adapter for message-oriented socket libraries.
//!
//! A message socket speaks some exchange pattern (request/reply,
//! pub/sub, ...) over whatever transports its library registers. This
//! crate supplies the `ipc://` transport: it adapts OS-level byte-stream
//! pipes — Unix domain sockets, Windows named pipes — to a generic
//! dialer/listener/pipe contract with typed option negotiation.
//!
//! ## Architecture
//!
//! - [`tran`]: the generic contract — [`Transport`](tran::Transport)
//!   factories, [`Dialer`](tran::Dialer)/[`Listener`](tran::Listener)
//!   endpoints, the [`Pipe`](tran::Pipe) handed to the socket core, and an
//!   explicit [`TransportRegistry`](tran::TransportRegistry).
//! - [`ipc`]: the named-pipe implementation of that contract.
//! - [`stream`]: the byte-stream provider seam the adapter sits on.
//! - [`options`]/[`addr`]/[`error`]: option store, address parsing, and
//!   the shared error vocabulary.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pipelink::ipc::IpcTransport;
//! use pipelink::tran::TransportRegistry;
//!
//! let mut registry = TransportRegistry::new();
//! registry.register(Arc::new(IpcTransport::new()));
//!
//! let listener = registry.new_listener("ipc:///tmp/svc.sock", &socket)?;
//! listener.listen().await?;
//! tokio::spawn(async move {
//!     loop {
//!         match listener.accept().await {
//!             Ok(pipe) => { /* hand off to the socket core */ }
//!             Err(e) => break,
//!         }
//!     }
//! });
//! ```

pub mod addr;
pub mod error;
pub mod ipc;
pub mod options;
pub mod stream;
pub mod tran;

pub use error::{Result, TransportError};
pub use options::OptionValue;
pub use tran::{Pipe, ProtocolInfo, Socket, TransportRegistry};
