//! IPC transport over OS-level named byte-stream pipes.
//!
//! Addresses look like `ipc://<path>`, where the path names a platform
//! endpoint (a Unix domain socket path, a Windows named pipe name). The
//! transport adapts those endpoints to the generic contract in
//! [`crate::tran`]: the registrar builds dialers and listeners seeded with
//! the documented option defaults, and every established connection comes
//! back to the socket core as a [`Pipe`](crate::tran::Pipe).
//!
//! # Example
//!
//! ```ignore
//! use pipelink::ipc::IpcTransport;
//! use pipelink::tran::Transport;
//!
//! let tran = IpcTransport::new();
//! let listener = tran.new_listener("ipc:///tmp/svc.sock", &socket)?;
//! listener.listen().await?;
//! loop {
//!     let pipe = listener.accept().await?;
//!     // hand the pipe to the socket core
//! }
//! ```

mod dialer;
mod listener;

pub use dialer::Dialer;
pub use listener::Listener;

use std::sync::Arc;

use crate::addr::strip_scheme;
use crate::error::Result;
use crate::options::{OptionDef, OptionDefault, OptionKind, OptionStore, OptionValue};
use crate::stream::{platform::PlatformProvider, Provider};
use crate::tran::{self, Socket, Transport, OPT_LOCAL_ADDR, OPT_MAX_RECV_SIZE, OPT_REMOTE_ADDR};

/// Scheme tag served by this transport.
pub const SCHEME: &str = "ipc";

/// Access-control description applied to the listening endpoint, in the
/// platform's ACL syntax. Listener only; must be set before `listen()`.
/// Empty means the platform default.
pub const OPT_SECURITY_DESCRIPTOR: &str = "security-descriptor";

/// Input buffer size of the listening endpoint in bytes (`i32`).
/// Listener only; must be set before `listen()`.
pub const OPT_INPUT_BUFFER_SIZE: &str = "input-buffer-size";

/// Output buffer size of the listening endpoint in bytes (`i32`).
/// Listener only; must be set before `listen()`.
pub const OPT_OUTPUT_BUFFER_SIZE: &str = "output-buffer-size";

/// Default input/output buffer size in bytes.
pub const DEFAULT_BUFFER_SIZE: i32 = 4096;

/// Recognized dialer keys. All read-only: the addresses echo the dial
/// path and the receive limit keeps its default.
static DIALER_OPTS: &[OptionDef] = &[
    OptionDef {
        name: OPT_LOCAL_ADDR,
        kind: OptionKind::Str,
        writable: false,
        default: OptionDefault::Str(""),
    },
    OptionDef {
        name: OPT_REMOTE_ADDR,
        kind: OptionKind::Str,
        writable: false,
        default: OptionDefault::Str(""),
    },
    OptionDef {
        name: OPT_MAX_RECV_SIZE,
        kind: OptionKind::I64,
        writable: false,
        default: OptionDefault::I64(0),
    },
];

/// Recognized listener keys.
static LISTENER_OPTS: &[OptionDef] = &[
    OptionDef {
        name: OPT_SECURITY_DESCRIPTOR,
        kind: OptionKind::Str,
        writable: true,
        default: OptionDefault::Str(""),
    },
    OptionDef {
        name: OPT_INPUT_BUFFER_SIZE,
        kind: OptionKind::I32,
        writable: true,
        default: OptionDefault::I32(DEFAULT_BUFFER_SIZE),
    },
    OptionDef {
        name: OPT_OUTPUT_BUFFER_SIZE,
        kind: OptionKind::I32,
        writable: true,
        default: OptionDefault::I32(DEFAULT_BUFFER_SIZE),
    },
    OptionDef {
        name: OPT_MAX_RECV_SIZE,
        kind: OptionKind::I64,
        writable: true,
        default: OptionDefault::I64(0),
    },
    OptionDef {
        name: OPT_LOCAL_ADDR,
        kind: OptionKind::Str,
        writable: false,
        default: OptionDefault::Str(""),
    },
    OptionDef {
        name: OPT_REMOTE_ADDR,
        kind: OptionKind::Str,
        writable: false,
        default: OptionDefault::Str(""),
    },
];

/// Keys that configure the bind itself and are frozen once `listen()`
/// has been called.
static PRE_LISTEN_OPTS: &[&str] = &[
    OPT_SECURITY_DESCRIPTOR,
    OPT_INPUT_BUFFER_SIZE,
    OPT_OUTPUT_BUFFER_SIZE,
];

/// The IPC transport registrar.
///
/// Uses the platform byte-stream provider unless one is injected with
/// [`IpcTransport::with_provider`].
pub struct IpcTransport {
    provider: Arc<dyn Provider>,
}

impl IpcTransport {
    /// Create the transport with the platform provider.
    pub fn new() -> Self {
        Self::with_provider(Arc::new(PlatformProvider::new()))
    }

    /// Create the transport with a custom byte-stream provider.
    pub fn with_provider(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }
}

impl Default for IpcTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for IpcTransport {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn new_dialer(&self, addr: &str, socket: &dyn Socket) -> Result<Box<dyn tran::Dialer>> {
        let path = strip_scheme(SCHEME, addr)?;

        let mut opts = OptionStore::new(DIALER_OPTS);
        opts.seed(OPT_LOCAL_ADDR, OptionValue::Str(path.to_string()));
        opts.seed(OPT_REMOTE_ADDR, OptionValue::Str(path.to_string()));

        Ok(Box::new(Dialer::new(
            path.to_string(),
            socket.info(),
            self.provider.clone(),
            opts,
        )))
    }

    fn new_listener(&self, addr: &str, socket: &dyn Socket) -> Result<Box<dyn tran::Listener>> {
        let path = strip_scheme(SCHEME, addr)?;

        let mut opts = OptionStore::new(LISTENER_OPTS);
        opts.seed(OPT_LOCAL_ADDR, OptionValue::Str(path.to_string()));
        opts.seed(OPT_REMOTE_ADDR, OptionValue::Str(path.to_string()));

        Ok(Box::new(Listener::new(
            path.to_string(),
            socket.info(),
            self.provider.clone(),
            opts,
        )))
    }
}
