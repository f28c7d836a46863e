//! Transport pipe: one established connection handed to the socket core.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::{ProtocolInfo, OPT_LOCAL_ADDR, OPT_MAX_RECV_SIZE, OPT_REMOTE_ADDR};
use crate::options::OptionStore;
use crate::stream::Conn;

/// One established bidirectional byte stream plus the metadata the
/// message-socket core needs to run a protocol over it.
///
/// A pipe is constructed by a dialer or listener and owned exclusively by
/// the socket core afterwards; nothing in this crate mutates it once
/// built. The raw stream is reachable through the forwarded
/// [`AsyncRead`]/[`AsyncWrite`] impls or by [`Pipe::into_inner`].
pub struct Pipe {
    conn: Box<dyn Conn>,
    proto: ProtocolInfo,
    max_recv_size: i64,
    local_addr: String,
    remote_addr: String,
}

impl Pipe {
    /// Wrap an established stream with protocol metadata and a snapshot
    /// of the owning endpoint's options.
    ///
    /// The snapshot is taken here, so listeners that change inheritable
    /// options between accepts hand out pipes reflecting the store as it
    /// was at accept time.
    pub fn wrap(conn: Box<dyn Conn>, proto: ProtocolInfo, opts: &OptionStore) -> Self {
        Self {
            conn,
            proto,
            max_recv_size: opts.get_i64(OPT_MAX_RECV_SIZE).unwrap_or(0),
            local_addr: opts.get_str(OPT_LOCAL_ADDR).unwrap_or_default(),
            remote_addr: opts.get_str(OPT_REMOTE_ADDR).unwrap_or_default(),
        }
    }

    /// Protocol metadata of the socket that owns this pipe.
    pub fn proto(&self) -> &ProtocolInfo {
        &self.proto
    }

    /// Receive size limit inherited from the endpoint, zero = unlimited.
    pub fn max_recv_size(&self) -> i64 {
        self.max_recv_size
    }

    /// Local endpoint path.
    pub fn local_addr(&self) -> &str {
        &self.local_addr
    }

    /// Remote endpoint path.
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// Consume the pipe, returning the raw byte stream.
    pub fn into_inner(self) -> Box<dyn Conn> {
        self.conn
    }
}

impl std::fmt::Debug for Pipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipe")
            .field("proto", &self.proto)
            .field("max_recv_size", &self.max_recv_size)
            .field("local_addr", &self.local_addr)
            .field("remote_addr", &self.remote_addr)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for Pipe {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.conn).poll_read(cx, buf)
    }
}

impl AsyncWrite for Pipe {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.conn).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.conn).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.conn).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::options::{OptionDef, OptionDefault, OptionKind, OptionValue};

    static DEFS: &[OptionDef] = &[
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

    fn test_proto() -> ProtocolInfo {
        ProtocolInfo {
            self_id: 0x30,
            peer_id: 0x31,
            self_name: "req",
            peer_name: "rep",
        }
    }

    #[test]
    fn test_wrap_snapshots_options() {
        let (a, _b) = duplex(64);
        let mut opts = OptionStore::new(DEFS);
        opts.set(OPT_MAX_RECV_SIZE, OptionValue::I64(2048)).unwrap();
        opts.seed(OPT_LOCAL_ADDR, OptionValue::Str("here".into()));
        opts.seed(OPT_REMOTE_ADDR, OptionValue::Str("there".into()));

        let pipe = Pipe::wrap(Box::new(a), test_proto(), &opts);

        assert_eq!(pipe.max_recv_size(), 2048);
        assert_eq!(pipe.local_addr(), "here");
        assert_eq!(pipe.remote_addr(), "there");
        assert_eq!(pipe.proto(), &test_proto());

        // A later store change must not affect the already-built pipe.
        opts.set(OPT_MAX_RECV_SIZE, OptionValue::I64(1)).unwrap();
        assert_eq!(pipe.max_recv_size(), 2048);
    }

    #[tokio::test]
    async fn test_pipe_forwards_io() {
        let (a, mut b) = duplex(64);
        let opts = OptionStore::new(DEFS);
        let mut pipe = Pipe::wrap(Box::new(a), test_proto(), &opts);

        pipe.write_all(b"ping").await.unwrap();
        pipe.flush().await.unwrap();

        let mut buf = [0u8; 4];
        b.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");

        b.write_all(b"pong").await.unwrap();
        pipe.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"pong");
    }
}
