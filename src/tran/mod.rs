//! Generic transport contract.
//!
//! A transport is addressed by a scheme tag (`ipc://...`) and produces
//! dialers and listeners bound to a particular message socket. Dialers and
//! listeners hand every established connection back to the socket core as
//! a [`Pipe`]. The factories do no I/O; connections are only opened by
//! `dial()` and `listen()`/`accept()`.

mod pipe;
mod registry;

pub use pipe::Pipe;
pub use registry::TransportRegistry;

use async_trait::async_trait;

use crate::error::Result;
use crate::options::OptionValue;

/// Read-only option echoing the local endpoint path.
pub const OPT_LOCAL_ADDR: &str = "local-address";

/// Read-only option echoing the remote endpoint path.
pub const OPT_REMOTE_ADDR: &str = "remote-address";

/// Maximum message size the socket core should accept on a pipe, in
/// bytes. Zero means no limit is enforced by the transport.
pub const OPT_MAX_RECV_SIZE: &str = "max-receive-size";

/// Protocol metadata identifying the message-exchange pattern of the
/// owning socket (e.g. request/reply). Carried on every pipe so the
/// socket core can validate peer compatibility at connection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolInfo {
    /// Numeric identifier of the local protocol.
    pub self_id: u16,
    /// Numeric identifier of the expected peer protocol.
    pub peer_id: u16,
    /// Human-readable name of the local protocol.
    pub self_name: &'static str,
    /// Human-readable name of the expected peer protocol.
    pub peer_name: &'static str,
}

/// Narrow view onto the owning message socket.
pub trait Socket: Send + Sync {
    /// Protocol metadata of the socket.
    fn info(&self) -> ProtocolInfo;
}

/// Initiates outbound connections to one configured endpoint.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Open a connection to the configured endpoint.
    ///
    /// Each call attempts a fresh connection; failures propagate
    /// unmodified and are never retried here.
    async fn dial(&self) -> Result<Pipe>;

    /// Set a dialer option.
    fn set_option(&self, name: &str, value: OptionValue) -> Result<()>;

    /// Get a dialer option or its documented default.
    fn get_option(&self, name: &str) -> Result<OptionValue>;
}

impl std::fmt::Debug for dyn Dialer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Dialer")
    }
}

/// Accepts inbound connections on one configured endpoint.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Bind the listening endpoint.
    ///
    /// A bind failure is fatal to this listener; callers discard the
    /// instance rather than retrying it.
    async fn listen(&self) -> Result<()>;

    /// Wait for one inbound connection and wrap it.
    ///
    /// Callers run this in a dedicated accept loop; the listener does not
    /// loop internally. Closing the listener wakes a blocked accept.
    async fn accept(&self) -> Result<Pipe>;

    /// Release the listening endpoint. Idempotent, valid in any state.
    fn close(&self) -> Result<()>;

    /// Fully-qualified `scheme://path` address, for display and logging.
    fn address(&self) -> String;

    /// Set a listener option.
    fn set_option(&self, name: &str, value: OptionValue) -> Result<()>;

    /// Get a listener option or its documented default.
    fn get_option(&self, name: &str) -> Result<OptionValue>;
}

impl std::fmt::Debug for dyn Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Listener")
    }
}

/// Factory producing dialers and listeners for one address scheme.
pub trait Transport: Send + Sync {
    /// Scheme tag this transport serves, e.g. `"ipc"`.
    fn scheme(&self) -> &'static str;

    /// Build a dialer for `addr`, owned by `socket`. No I/O happens here.
    fn new_dialer(&self, addr: &str, socket: &dyn Socket) -> Result<Box<dyn Dialer>>;

    /// Build a listener for `addr`, owned by `socket`. No I/O happens here.
    fn new_listener(&self, addr: &str, socket: &dyn Socket) -> Result<Box<dyn Listener>>;
}
