//! Volume metadata error types.
//!
//! All errors in the `libvolmeta` crate are represented by the
//! [`VolumeMetaError`] enum. Benign absence is never an error here: lookups
//! that may legitimately find nothing return `Ok(None)` instead, and only the
//! queries that require an object to exist turn absence into
//! [`VolumeMetaError::ClaimNotFound`] or [`VolumeMetaError::VolumeNotFound`].
//!
//! Errors are [`Serialize`]/[`Deserialize`] so callers can hand them to
//! another process as JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for volume metadata queries.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum VolumeMetaError {
    /// The claim `namespace/name` does not exist.
    #[error("persistent volume claim {0} not found")]
    ClaimNotFound(String),

    /// The cluster-scoped volume does not exist.
    #[error("persistent volume {0} not found")]
    VolumeNotFound(String),

    /// The snapshot store itself failed to answer.
    #[error("store lookup failed: {0}")]
    Store(String),

    /// The cluster API call failed for a reason other than NotFound.
    #[error("api request failed: {0}")]
    Api(String),

    /// The cluster API call did not complete before the configured deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// What was being fetched, e.g. `get claim ns/name`.
        operation: String,
        /// The deadline that elapsed.
        after: Duration,
    },

    /// A store returned an object of the wrong kind for the key.
    #[error("object at {key} is a {found}, expected a {expected}")]
    TypeMismatch {
        /// Store key that was looked up.
        key: String,
        /// Kind the caller asked for.
        expected: String,
        /// Kind actually found.
        found: String,
    },

    /// A store key could not be split into namespace and name.
    #[error("invalid store key: {0}")]
    InvalidKey(String),

    /// An untyped object could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl VolumeMetaError {
    /// Create a [`VolumeMetaError::Store`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn store<E: std::fmt::Display>(e: E) -> Self {
        Self::Store(e.to_string())
    }

    /// Create a [`VolumeMetaError::Api`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn api<E: std::fmt::Display>(e: E) -> Self {
        Self::Api(e.to_string())
    }

    /// Create a [`VolumeMetaError::Decode`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn decode<E: std::fmt::Display>(e: E) -> Self {
        Self::Decode(e.to_string())
    }

    /// `true` for the two NotFound variants.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ClaimNotFound(_) | Self::VolumeNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = VolumeMetaError::ClaimNotFound("ns/c3".into());
        assert_eq!(err.to_string(), "persistent volume claim ns/c3 not found");

        let err = VolumeMetaError::TypeMismatch {
            key: "ns/c1".into(),
            expected: "PersistentVolumeClaim".into(),
            found: "ConfigMap".into(),
        };
        assert_eq!(
            err.to_string(),
            "object at ns/c1 is a ConfigMap, expected a PersistentVolumeClaim"
        );
    }

    #[test]
    fn error_serde_roundtrip() {
        for err in [
            VolumeMetaError::TypeMismatch {
                key: "ns/c1".into(),
                expected: "PersistentVolumeClaim".into(),
                found: "ConfigMap".into(),
            },
            VolumeMetaError::Timeout {
                operation: "get volume v1".into(),
                after: Duration::from_secs(30),
            },
            VolumeMetaError::VolumeNotFound("v1".into()),
        ] {
            let json = serde_json::to_string(&err).expect("serialize");
            let de: VolumeMetaError = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(de, err);
        }
    }

    #[test]
    fn not_found_classification() {
        assert!(VolumeMetaError::VolumeNotFound("v1".into()).is_not_found());
        assert!(!VolumeMetaError::store("etcd down").is_not_found());
        assert!(
            !VolumeMetaError::Timeout {
                operation: "get claim ns/c1".into(),
                after: Duration::from_secs(1),
            }
            .is_not_found()
        );
    }
}
