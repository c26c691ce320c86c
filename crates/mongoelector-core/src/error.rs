//! Store-level errors.

use thiserror::Error;

/// Errors surfaced by [`DocumentStore`] implementations.
///
/// Precondition failures (`exists`, `mismatch`, `absent`) are ordinary
/// outcomes, not errors; only genuine faults reach this type.
///
/// [`DocumentStore`]: crate::DocumentStore
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The driver or network layer failed; the operation may or may not have
    /// reached the store.
    #[error("store transport failure: {reason}")]
    Transport {
        /// Human-readable description from the underlying driver.
        reason: String,
    },

    /// A document read from the store could not be decoded into the expected
    /// shape, or a document could not be encoded for writing.
    #[error("document codec failure: {reason}")]
    Codec {
        /// Human-readable description of the malformed field or value.
        reason: String,
    },
}

impl StoreError {
    /// Shorthand for a transport failure.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport { reason: reason.into() }
    }

    /// Shorthand for a codec failure.
    pub fn codec(reason: impl Into<String>) -> Self {
        Self::Codec { reason: reason.into() }
    }

    /// True when the failure was in the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_display() {
        let err = StoreError::transport("connection reset");
        assert_eq!(err.to_string(), "store transport failure: connection reset");
        assert!(err.is_transport());
    }

    #[test]
    fn codec_display() {
        let err = StoreError::codec("ts_expire is not a date");
        assert_eq!(err.to_string(), "document codec failure: ts_expire is not a date");
        assert!(!err.is_transport());
    }
}
