//! Typed option store for dialers and listeners.
//!
//! Every dialer/listener instance owns an [`OptionStore`] built from a
//! static table of recognized keys. Each table entry fixes the key name,
//! its expected value type, whether callers may write it, and its
//! documented default.
//!
//! # Example
//!
//! ```
//! use pipelink::options::{OptionDef, OptionDefault, OptionKind, OptionStore, OptionValue};
//!
//! static DEFS: &[OptionDef] = &[OptionDef {
//!     name: "max-receive-size",
//!     kind: OptionKind::I64,
//!     writable: true,
//!     default: OptionDefault::I64(0),
//! }];
//!
//! let mut store = OptionStore::new(DEFS);
//! assert_eq!(store.get("max-receive-size").unwrap(), OptionValue::I64(0));
//! store.set("max-receive-size", OptionValue::I64(1 << 20)).unwrap();
//! ```

use std::collections::HashMap;

use crate::error::{Result, TransportError};

/// A dynamically-typed option value.
///
/// One variant per value type appearing in the recognized-key tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// String value (addresses, security descriptors).
    Str(String),
    /// 32-bit signed integer (buffer sizes).
    I32(i32),
    /// 64-bit signed integer (receive size limits).
    I64(i64),
}

impl OptionValue {
    /// The kind tag of this value.
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Str(_) => OptionKind::Str,
            OptionValue::I32(_) => OptionKind::I32,
            OptionValue::I64(_) => OptionKind::I64,
        }
    }

    /// Borrow the string payload, if this is a `Str` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extract the `i32` payload, if this is an `I32` value.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            OptionValue::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract the `i64` payload, if this is an `I64` value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::I64(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::I32(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::I64(v)
    }
}

/// Expected type of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Expects [`OptionValue::Str`].
    Str,
    /// Expects [`OptionValue::I32`].
    I32,
    /// Expects [`OptionValue::I64`].
    I64,
}

/// Static default for a recognized key.
#[derive(Debug, Clone, Copy)]
pub enum OptionDefault {
    /// Default string value.
    Str(&'static str),
    /// Default `i32` value.
    I32(i32),
    /// Default `i64` value.
    I64(i64),
}

impl OptionDefault {
    fn to_value(self) -> OptionValue {
        match self {
            OptionDefault::Str(s) => OptionValue::Str(s.to_string()),
            OptionDefault::I32(v) => OptionValue::I32(v),
            OptionDefault::I64(v) => OptionValue::I64(v),
        }
    }
}

/// One entry in a recognized-key table.
#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    /// Option key name.
    pub name: &'static str,
    /// Expected value type, enforced on every write.
    pub kind: OptionKind,
    /// Whether callers may write this key through `set`.
    pub writable: bool,
    /// Value returned by `get` when the key was never set.
    pub default: OptionDefault,
}

/// Mapping from recognized option names to values.
///
/// Lookups outside the recognized set fail with
/// [`TransportError::BadOption`]; writes with a mismatched value type fail
/// with [`TransportError::BadValue`] and leave the previous value intact.
/// The store itself does no locking; owners that allow concurrent option
/// access wrap it in an `RwLock`.
#[derive(Debug, Clone)]
pub struct OptionStore {
    defs: &'static [OptionDef],
    values: HashMap<&'static str, OptionValue>,
}

impl OptionStore {
    /// Create a store recognizing exactly the keys in `defs`.
    pub fn new(defs: &'static [OptionDef]) -> Self {
        Self {
            defs,
            values: HashMap::new(),
        }
    }

    fn def(&self, name: &str) -> Option<&'static OptionDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// Get the value for `name`, falling back to its documented default.
    pub fn get(&self, name: &str) -> Result<OptionValue> {
        let def = self.def(name).ok_or(TransportError::BadOption)?;
        match self.values.get(def.name) {
            Some(v) => Ok(v.clone()),
            None => Ok(def.default.to_value()),
        }
    }

    /// Set `name` to `value`, validating the key and value type.
    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<()> {
        let def = self.def(name).ok_or(TransportError::BadOption)?;
        if !def.writable {
            // Read-only keys behave like unrecognized ones on write.
            return Err(TransportError::BadOption);
        }
        if value.kind() != def.kind {
            return Err(TransportError::BadValue);
        }
        self.values.insert(def.name, value);
        Ok(())
    }

    /// Store an initial value, bypassing the `writable` flag.
    ///
    /// Used at construction time to echo addresses into read-only keys.
    pub(crate) fn seed(&mut self, name: &'static str, value: OptionValue) {
        debug_assert!(
            self.def(name).map(|d| d.kind) == Some(value.kind()),
            "seed with unrecognized key or wrong kind: {name}"
        );
        self.values.insert(name, value);
    }

    /// Typed accessor for a string-kind key.
    pub fn get_str(&self, name: &str) -> Result<String> {
        match self.get(name)? {
            OptionValue::Str(s) => Ok(s),
            _ => Err(TransportError::BadValue),
        }
    }

    /// Typed accessor for an `i32`-kind key.
    pub fn get_i32(&self, name: &str) -> Result<i32> {
        self.get(name)?.as_i32().ok_or(TransportError::BadValue)
    }

    /// Typed accessor for an `i64`-kind key.
    pub fn get_i64(&self, name: &str) -> Result<i64> {
        self.get(name)?.as_i64().ok_or(TransportError::BadValue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static DEFS: &[OptionDef] = &[
        OptionDef {
            name: "buffer-size",
            kind: OptionKind::I32,
            writable: true,
            default: OptionDefault::I32(4096),
        },
        OptionDef {
            name: "max-receive-size",
            kind: OptionKind::I64,
            writable: true,
            default: OptionDefault::I64(0),
        },
        OptionDef {
            name: "descriptor",
            kind: OptionKind::Str,
            writable: true,
            default: OptionDefault::Str(""),
        },
        OptionDef {
            name: "local-address",
            kind: OptionKind::Str,
            writable: false,
            default: OptionDefault::Str(""),
        },
    ];

    #[test]
    fn test_get_unset_returns_default() {
        let store = OptionStore::new(DEFS);
        assert_eq!(store.get("buffer-size").unwrap(), OptionValue::I32(4096));
        assert_eq!(store.get("max-receive-size").unwrap(), OptionValue::I64(0));
        assert_eq!(
            store.get("descriptor").unwrap(),
            OptionValue::Str(String::new())
        );
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut store = OptionStore::new(DEFS);

        store.set("buffer-size", OptionValue::I32(8192)).unwrap();
        assert_eq!(store.get("buffer-size").unwrap(), OptionValue::I32(8192));

        store
            .set("max-receive-size", OptionValue::I64(1 << 30))
            .unwrap();
        assert_eq!(
            store.get("max-receive-size").unwrap(),
            OptionValue::I64(1 << 30)
        );

        store.set("descriptor", "D:P(A;;GA;;;WD)".into()).unwrap();
        assert_eq!(
            store.get("descriptor").unwrap(),
            OptionValue::Str("D:P(A;;GA;;;WD)".to_string())
        );
    }

    #[test]
    fn test_set_unrecognized_is_bad_option() {
        let mut store = OptionStore::new(DEFS);
        let err = store.set("no-such-key", OptionValue::I32(1)).unwrap_err();
        assert!(matches!(err, TransportError::BadOption));
    }

    #[test]
    fn test_get_unrecognized_is_bad_option() {
        let store = OptionStore::new(DEFS);
        let err = store.get("no-such-key").unwrap_err();
        assert!(matches!(err, TransportError::BadOption));
    }

    #[test]
    fn test_set_wrong_kind_is_bad_value() {
        let mut store = OptionStore::new(DEFS);
        let err = store
            .set("buffer-size", OptionValue::Str("big".into()))
            .unwrap_err();
        assert!(matches!(err, TransportError::BadValue));

        // i64 is not accepted where i32 is expected.
        let err = store.set("buffer-size", OptionValue::I64(4096)).unwrap_err();
        assert!(matches!(err, TransportError::BadValue));
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let mut store = OptionStore::new(DEFS);
        store.set("buffer-size", OptionValue::I32(1024)).unwrap();

        let err = store
            .set("buffer-size", OptionValue::Str("oops".into()))
            .unwrap_err();
        assert!(matches!(err, TransportError::BadValue));
        assert_eq!(store.get("buffer-size").unwrap(), OptionValue::I32(1024));
    }

    #[test]
    fn test_set_read_only_is_bad_option() {
        let mut store = OptionStore::new(DEFS);
        let err = store
            .set("local-address", OptionValue::Str("elsewhere".into()))
            .unwrap_err();
        assert!(matches!(err, TransportError::BadOption));
    }

    #[test]
    fn test_seed_visible_through_get() {
        let mut store = OptionStore::new(DEFS);
        store.seed("local-address", OptionValue::Str("pipe-a".into()));
        assert_eq!(
            store.get("local-address").unwrap(),
            OptionValue::Str("pipe-a".to_string())
        );
    }

    #[test]
    fn test_typed_accessors() {
        let mut store = OptionStore::new(DEFS);
        store.set("buffer-size", OptionValue::I32(512)).unwrap();

        assert_eq!(store.get_i32("buffer-size").unwrap(), 512);
        assert_eq!(store.get_i64("max-receive-size").unwrap(), 0);
        assert_eq!(store.get_str("descriptor").unwrap(), "");
        assert!(matches!(
            store.get_i32("descriptor").unwrap_err(),
            TransportError::BadValue
        ));
    }

    #[test]
    fn test_option_value_from_impls() {
        assert_eq!(OptionValue::from(42i32), OptionValue::I32(42));
        assert_eq!(OptionValue::from(42i64), OptionValue::I64(42));
        assert_eq!(OptionValue::from("x"), OptionValue::Str("x".into()));
    }
}
