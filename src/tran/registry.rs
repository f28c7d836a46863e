//! Explicit transport registry.
//!
//! Maps scheme tags to transports. The registry is a plain object owned by
//! the socket-library context and populated at startup; there is no
//! process-global registration.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pipelink::ipc::IpcTransport;
//! use pipelink::tran::TransportRegistry;
//!
//! let mut registry = TransportRegistry::new();
//! registry.register(Arc::new(IpcTransport::new()));
//! assert!(registry.get("ipc").is_some());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::{Dialer, Listener, Socket, Transport};
use crate::addr::split_scheme;
use crate::error::{Result, TransportError};

/// Registry of transports keyed by scheme.
#[derive(Default)]
pub struct TransportRegistry {
    by_scheme: HashMap<&'static str, Arc<dyn Transport>>,
}

impl TransportRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transport under its scheme, replacing any previous
    /// transport with the same scheme.
    pub fn register(&mut self, transport: Arc<dyn Transport>) {
        self.by_scheme.insert(transport.scheme(), transport);
    }

    /// Look up the transport for a scheme tag.
    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn Transport>> {
        self.by_scheme.get(scheme)
    }

    fn for_addr(&self, addr: &str) -> Result<&Arc<dyn Transport>> {
        let (scheme, _path) = split_scheme(addr)?;
        self.get(scheme).ok_or(TransportError::BadAddress)
    }

    /// Build a dialer for a fully-qualified address.
    pub fn new_dialer(&self, addr: &str, socket: &dyn Socket) -> Result<Box<dyn Dialer>> {
        self.for_addr(addr)?.new_dialer(addr, socket)
    }

    /// Build a listener for a fully-qualified address.
    pub fn new_listener(&self, addr: &str, socket: &dyn Socket) -> Result<Box<dyn Listener>> {
        self.for_addr(addr)?.new_listener(addr, socket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::IpcTransport;
    use crate::tran::ProtocolInfo;

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

    fn registry_with_ipc() -> TransportRegistry {
        let mut registry = TransportRegistry::new();
        registry.register(Arc::new(IpcTransport::new()));
        registry
    }

    #[test]
    fn test_register_and_get() {
        let registry = registry_with_ipc();
        assert!(registry.get("ipc").is_some());
        assert!(registry.get("tcp").is_none());
    }

    #[test]
    fn test_new_dialer_by_scheme() {
        let registry = registry_with_ipc();
        let dialer = registry.new_dialer("ipc://some/pipe", &PairSocket);
        assert!(dialer.is_ok());
    }

    #[test]
    fn test_new_listener_by_scheme() {
        let registry = registry_with_ipc();
        let listener = registry.new_listener("ipc://some/pipe", &PairSocket).unwrap();
        assert_eq!(listener.address(), "ipc://some/pipe");
    }

    #[test]
    fn test_unknown_scheme_is_bad_address() {
        let registry = registry_with_ipc();
        let err = registry.new_dialer("tcp://1.2.3.4:80", &PairSocket).unwrap_err();
        assert!(matches!(err, TransportError::BadAddress));
    }

    #[test]
    fn test_malformed_address_is_bad_address() {
        let registry = registry_with_ipc();
        let err = registry.new_listener("not-an-address", &PairSocket).unwrap_err();
        assert!(matches!(err, TransportError::BadAddress));
    }
}
