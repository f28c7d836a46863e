//! Outbound side of the IPC transport.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::Result;
use crate::options::{OptionStore, OptionValue};
use crate::stream::Provider;
use crate::tran::{self, Pipe, ProtocolInfo};

/// Dials one named endpoint on behalf of a message socket.
///
/// Built by the registrar; every [`dial`](tran::Dialer::dial) call
/// attempts a fresh connection to the same path.
pub struct Dialer {
    path: String,
    proto: ProtocolInfo,
    provider: Arc<dyn Provider>,
    opts: RwLock<OptionStore>,
}

impl Dialer {
    pub(super) fn new(
        path: String,
        proto: ProtocolInfo,
        provider: Arc<dyn Provider>,
        opts: OptionStore,
    ) -> Self {
        Self {
            path,
            proto,
            provider,
            opts: RwLock::new(opts),
        }
    }
}

#[async_trait]
impl tran::Dialer for Dialer {
    async fn dial(&self) -> Result<Pipe> {
        let conn = self.provider.dial(&self.path).await?;
        tracing::debug!(path = %self.path, "dialed pipe endpoint");

        let opts = self
            .opts
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(Pipe::wrap(conn, self.proto.clone(), &opts))
    }

    fn set_option(&self, name: &str, value: OptionValue) -> Result<()> {
        // No writable dialer keys exist; the store reports BadOption for
        // both unrecognized and read-only names.
        self.opts
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .set(name, value)
    }

    fn get_option(&self, name: &str) -> Result<OptionValue> {
        self.opts
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::ipc::IpcTransport;
    use crate::tran::{Dialer as _, Socket, Transport, OPT_MAX_RECV_SIZE, OPT_REMOTE_ADDR};

    struct PairSocket;

    impl Socket for PairSocket {
        fn info(&self) -> ProtocolInfo {
            ProtocolInfo {
                self_id: 0x10,
                peer_id: 0x10,
                self_name: "pair",
                peer_name: "pair",
            }
        }
    }

    fn test_dialer(addr: &str) -> Box<dyn tran::Dialer> {
        IpcTransport::new().new_dialer(addr, &PairSocket).unwrap()
    }

    #[test]
    fn test_set_option_always_bad_option() {
        let dialer = test_dialer("ipc://somewhere");

        for (name, value) in [
            (OPT_MAX_RECV_SIZE, OptionValue::I64(10)),
            (OPT_REMOTE_ADDR, OptionValue::Str("x".into())),
            ("no-such-key", OptionValue::I32(1)),
        ] {
            let err = dialer.set_option(name, value).unwrap_err();
            assert!(matches!(err, TransportError::BadOption), "key {name}");
        }
    }

    #[test]
    fn test_get_unknown_option_fails() {
        let dialer = test_dialer("ipc://somewhere");
        let err = dialer.get_option("input-buffer-size").unwrap_err();
        assert!(matches!(err, TransportError::BadOption));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dial_absent_peer_propagates_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.sock");
        let dialer = test_dialer(&format!("ipc://{}", path.display()));

        let err = dialer.dial().await.unwrap_err();
        match err {
            TransportError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
