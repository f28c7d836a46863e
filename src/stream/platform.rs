//! Platform byte-stream provider.
//!
//! - Unix: Unix Domain Sockets
//! - Windows: Named Pipes
//!
//! Endpoint paths are opaque names. On Unix they are filesystem paths; on
//! Windows they are pipe names placed under `\\.\pipe\`.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{Acceptor, BindConfig, Conn, Provider};

/// Byte-stream provider backed by the platform's native IPC primitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformProvider;

impl PlatformProvider {
    /// Create a provider instance.
    pub fn new() -> Self {
        Self
    }
}

fn empty_path_err() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "empty endpoint path")
}

fn closed_err() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "listening endpoint closed")
}

#[async_trait]
impl Provider for PlatformProvider {
    async fn dial(&self, path: &str) -> io::Result<Box<dyn Conn>> {
        if path.is_empty() {
            return Err(empty_path_err());
        }
        imp::dial(path).await
    }

    async fn listen(&self, path: &str, config: &BindConfig) -> io::Result<Box<dyn Acceptor>> {
        if path.is_empty() {
            return Err(empty_path_err());
        }
        let acceptor = imp::listen(path, config).await?;
        tracing::debug!(path, "bound listening endpoint");
        Ok(acceptor)
    }
}

// ============================================================================
// Unix Implementation
// ============================================================================

#[cfg(unix)]
mod imp {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use tokio::net::{UnixListener, UnixStream};

    use super::*;

    pub(super) async fn dial(path: &str) -> io::Result<Box<dyn Conn>> {
        let stream = UnixStream::connect(path).await?;
        tracing::debug!(path, "dialed endpoint");
        Ok(Box::new(stream))
    }

    pub(super) async fn listen(path: &str, config: &BindConfig) -> io::Result<Box<dyn Acceptor>> {
        // A stale socket file from a dead process would make bind fail
        // with AddrInUse even though nobody is listening.
        if Path::new(path).exists() {
            fs::remove_file(path)?;
        }

        let listener = UnixListener::bind(path)?;

        // Buffer size hints are kernel-managed for Unix sockets; only the
        // access-control setting translates, as a file mode on the socket.
        if !config.security_descriptor.is_empty() {
            let mode = parse_mode(&config.security_descriptor).map_err(|e| {
                let _ = fs::remove_file(path);
                e
            })?;
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| {
                let _ = fs::remove_file(path);
                e
            })?;
        }

        Ok(Box::new(UnixAcceptor {
            listener,
            path: path.to_string(),
            closed: AtomicBool::new(false),
            notify: Notify::new(),
        }))
    }

    /// Parse an access-control description as an octal permission mode,
    /// e.g. `"0600"` or `"600"`.
    fn parse_mode(descriptor: &str) -> io::Result<u32> {
        u32::from_str_radix(descriptor, 8).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("malformed security descriptor: {descriptor:?}"),
            )
        })
    }

    /// Unix Domain Socket acceptor.
    struct UnixAcceptor {
        listener: UnixListener,
        path: String,
        closed: AtomicBool,
        notify: Notify,
    }

    #[async_trait]
    impl Acceptor for UnixAcceptor {
        async fn accept(&self) -> io::Result<Box<dyn Conn>> {
            // Register for the close notification before re-checking the
            // flag, so a concurrent close cannot slip between the check
            // and the select below.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.closed.load(Ordering::Acquire) {
                return Err(closed_err());
            }

            tokio::select! {
                res = self.listener.accept() => {
                    let (stream, _addr) = res?;
                    Ok(Box::new(stream) as Box<dyn Conn>)
                }
                _ = notified => Err(closed_err()),
            }
        }

        fn close(&self) {
            if !self.closed.swap(true, Ordering::AcqRel) {
                self.notify.notify_waiters();
                let _ = fs::remove_file(&self.path);
                tracing::debug!(path = %self.path, "closed listening endpoint");
            }
        }
    }

    impl Drop for UnixAcceptor {
        fn drop(&mut self) {
            self.close();
        }
    }
}

// ============================================================================
// Windows Implementation
// ============================================================================

#[cfg(windows)]
mod imp {
    use std::sync::Mutex;

    use tokio::net::windows::named_pipe::{ClientOptions, NamedPipeServer, ServerOptions};

    use super::*;

    /// Pipe names live in the named-pipe filesystem root.
    fn pipe_name(path: &str) -> String {
        format!(r"\\.\pipe\{path}")
    }

    pub(super) async fn dial(path: &str) -> io::Result<Box<dyn Conn>> {
        let client = ClientOptions::new().open(pipe_name(path))?;
        tracing::debug!(path, "dialed endpoint");
        Ok(Box::new(client))
    }

    pub(super) async fn listen(path: &str, config: &BindConfig) -> io::Result<Box<dyn Acceptor>> {
        if !config.security_descriptor.is_empty() {
            // tokio's named-pipe builder has no SDDL hook.
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "security descriptors are not supported by this provider",
            ));
        }

        let in_buf = config.input_buffer_size.max(0) as u32;
        let out_buf = config.output_buffer_size.max(0) as u32;
        let name = pipe_name(path);

        // Creating the first instance claims the name, so a second
        // listener on the same path fails here rather than at accept.
        let first = ServerOptions::new()
            .first_pipe_instance(true)
            .in_buffer_size(in_buf)
            .out_buffer_size(out_buf)
            .create(&name)?;

        Ok(Box::new(NamedPipeAcceptor {
            name,
            in_buf,
            out_buf,
            next: Mutex::new(Some(first)),
            closed: AtomicBool::new(false),
            notify: Notify::new(),
        }))
    }

    /// Windows Named Pipe acceptor.
    ///
    /// Named pipes have no listen queue; each accepted connection consumes
    /// a server instance, so a fresh instance is created per accept.
    struct NamedPipeAcceptor {
        name: String,
        in_buf: u32,
        out_buf: u32,
        next: Mutex<Option<NamedPipeServer>>,
        closed: AtomicBool,
        notify: Notify,
    }

    impl NamedPipeAcceptor {
        fn take_or_create(&self) -> io::Result<NamedPipeServer> {
            if let Some(server) = self
                .next
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .take()
            {
                return Ok(server);
            }
            ServerOptions::new()
                .first_pipe_instance(false)
                .in_buffer_size(self.in_buf)
                .out_buffer_size(self.out_buf)
                .create(&self.name)
        }
    }

    #[async_trait]
    impl Acceptor for NamedPipeAcceptor {
        async fn accept(&self) -> io::Result<Box<dyn Conn>> {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.closed.load(Ordering::Acquire) {
                return Err(closed_err());
            }

            let server = self.take_or_create()?;
            tokio::select! {
                res = server.connect() => {
                    res?;
                    Ok(Box::new(server) as Box<dyn Conn>)
                }
                _ = notified => Err(closed_err()),
            }
        }

        fn close(&self) {
            if !self.closed.swap(true, Ordering::AcqRel) {
                self.notify.notify_waiters();
                self.next
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .take();
                tracing::debug!(name = %self.name, "closed listening endpoint");
            }
        }
    }

    impl Drop for NamedPipeAcceptor {
        fn drop(&mut self) {
            self.close();
        }
    }
}
