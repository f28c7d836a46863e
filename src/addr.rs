//! Address string parsing.
//!
//! Transport addresses have the form `<scheme>://<path>`. The path is an
//! opaque endpoint name interpreted by the byte-stream provider; nothing in
//! this crate parses it further.

use crate::error::{Result, TransportError};

/// Separator between the scheme tag and the endpoint path.
pub const SCHEME_SEP: &str = "://";

/// Strip `scheme://` from `addr`, returning the endpoint path.
///
/// Fails with [`TransportError::BadAddress`] when the prefix does not
/// match. An empty remainder is legal at this level; providers reject
/// empty paths when I/O actually happens.
///
/// # Example
///
/// ```
/// use pipelink::addr::strip_scheme;
///
/// assert_eq!(strip_scheme("ipc", "ipc://feeds/market").unwrap(), "feeds/market");
/// assert!(strip_scheme("ipc", "tcp://feeds/market").is_err());
/// ```
pub fn strip_scheme<'a>(scheme: &str, addr: &'a str) -> Result<&'a str> {
    addr.strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix(SCHEME_SEP))
        .ok_or(TransportError::BadAddress)
}

/// Split an address into `(scheme, path)` for registry lookup.
pub fn split_scheme(addr: &str) -> Result<(&str, &str)> {
    let sep = addr.find(SCHEME_SEP).ok_or(TransportError::BadAddress)?;
    if sep == 0 {
        return Err(TransportError::BadAddress);
    }
    Ok((&addr[..sep], &addr[sep + SCHEME_SEP.len()..]))
}

/// Format the fully-qualified address string for display and lookup.
pub fn full_addr(scheme: &str, path: &str) -> String {
    format!("{scheme}{SCHEME_SEP}{path}")
}
