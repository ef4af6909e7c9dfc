//! Core types: store keys, cached objects, volume modes, and query results.
//!
//! Claim and volume records themselves are the `k8s-openapi` core/v1 types;
//! nothing here redefines their schema.

use std::fmt;
use std::sync::Arc;

use k8s_openapi::Resource;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use serde_json::Value;

use crate::error::VolumeMetaError;

/// Access mode that allows read-write mounts from many nodes at once.
pub const READ_WRITE_MANY: &str = "ReadWriteMany";

/// Claim phase once the claim has been matched to a volume.
pub const CLAIM_BOUND: &str = "Bound";

const VOLUME_MODE_BLOCK: &str = "Block";
const VOLUME_MODE_FILESYSTEM: &str = "Filesystem";

// ---------------------------------------------------------------------------
// Store keys
// ---------------------------------------------------------------------------

/// Store key for a claim: always `namespace/name`, even when `namespace` is
/// empty, so a claim key can never collide with a cluster-scoped volume key.
pub fn claim_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

/// Store key for a cluster-scoped volume: its bare name.
pub fn volume_key(name: &str) -> String {
    name.to_owned()
}

/// Store key for an object of any other kind, derived from its metadata:
/// `namespace/name` when namespaced, the bare name otherwise.
pub fn object_key(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        volume_key(name)
    } else {
        claim_key(namespace, name)
    }
}

/// Split a store key back into `(namespace, name)`.
///
/// A bare name yields `None` for the namespace; `/name` yields an empty
/// namespace. Keys with an empty name or more than one `/` are rejected.
pub fn split_key(key: &str) -> Result<(Option<&str>, &str), VolumeMetaError> {
    match key.split_once('/') {
        None if !key.is_empty() => Ok((None, key)),
        Some((ns, name)) if !name.is_empty() && !name.contains('/') => Ok((Some(ns), name)),
        _ => Err(VolumeMetaError::InvalidKey(key.to_owned())),
    }
}

// ---------------------------------------------------------------------------
// Cached objects
// ---------------------------------------------------------------------------

/// An object as handed back by a snapshot store.
///
/// Untyped stores may hold anything, so lookups must check which variant they
/// got before trusting the record.
#[derive(Debug, Clone)]
pub enum CachedObject {
    /// A `PersistentVolumeClaim`.
    Claim(Arc<PersistentVolumeClaim>),
    /// A `PersistentVolume`.
    Volume(Arc<PersistentVolume>),
    /// Any other kind of object; only its kind is retained.
    Unknown {
        /// The object's `kind`, empty if it had none.
        kind: String,
    },
}

impl CachedObject {
    /// Decode an untyped JSON object, dispatching on its `kind` field.
    ///
    /// Objects of other kinds are not an error; they become
    /// [`CachedObject::Unknown`].
    pub fn from_json(value: Value) -> Result<Self, VolumeMetaError> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        if kind == PersistentVolumeClaim::KIND {
            let claim: PersistentVolumeClaim =
                serde_json::from_value(value).map_err(VolumeMetaError::decode)?;
            Ok(Self::Claim(Arc::new(claim)))
        } else if kind == PersistentVolume::KIND {
            let volume: PersistentVolume =
                serde_json::from_value(value).map_err(VolumeMetaError::decode)?;
            Ok(Self::Volume(Arc::new(volume)))
        } else {
            Ok(Self::Unknown { kind })
        }
    }

    /// Kubernetes kind of the held object.
    pub fn kind(&self) -> &str {
        match self {
            Self::Claim(_) => PersistentVolumeClaim::KIND,
            Self::Volume(_) => PersistentVolume::KIND,
            Self::Unknown { kind } if kind.is_empty() => "object without kind",
            Self::Unknown { kind } => kind.as_str(),
        }
    }
}

impl From<PersistentVolumeClaim> for CachedObject {
    fn from(claim: PersistentVolumeClaim) -> Self {
        Self::Claim(Arc::new(claim))
    }
}

impl From<PersistentVolume> for CachedObject {
    fn from(volume: PersistentVolume) -> Self {
        Self::Volume(Arc::new(volume))
    }
}

/// Record kinds that can be stored in and extracted from a [`CachedObject`].
pub trait CachedKind: Resource + Sized {
    /// Wrap a shared record into the tagged union.
    fn into_cached(obj: Arc<Self>) -> CachedObject;

    /// Extract the record if the object is of this kind.
    fn from_cached(obj: CachedObject) -> Option<Arc<Self>>;

    /// Extract the record, failing with [`VolumeMetaError::TypeMismatch`]
    /// when the store held something else under `key`.
    fn expect_cached(key: &str, obj: CachedObject) -> Result<Arc<Self>, VolumeMetaError> {
        let found = obj.kind().to_owned();
        Self::from_cached(obj).ok_or_else(|| VolumeMetaError::TypeMismatch {
            key: key.to_owned(),
            expected: Self::KIND.to_owned(),
            found,
        })
    }
}

impl CachedKind for PersistentVolumeClaim {
    fn into_cached(obj: Arc<Self>) -> CachedObject {
        CachedObject::Claim(obj)
    }

    fn from_cached(obj: CachedObject) -> Option<Arc<Self>> {
        match obj {
            CachedObject::Claim(claim) => Some(claim),
            _ => None,
        }
    }
}

impl CachedKind for PersistentVolume {
    fn into_cached(obj: Arc<Self>) -> CachedObject {
        CachedObject::Volume(obj)
    }

    fn from_cached(obj: CachedObject) -> Option<Arc<Self>> {
        match obj {
            CachedObject::Volume(volume) => Some(volume),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Volume mode
// ---------------------------------------------------------------------------

/// The claim-level volume mode.
///
/// `Unspecified` is kept distinct from `Filesystem`: an unset mode on the
/// claim leaves the binding decision to the volume, so only an explicit
/// `Block` counts as block for the boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeMode {
    /// `volumeMode: Block`.
    Block,
    /// `volumeMode: Filesystem`.
    Filesystem,
    /// Field absent or holding a value this crate does not recognise.
    Unspecified,
}

impl VolumeMode {
    /// Classify the raw `spec.volumeMode` string.
    pub fn from_field(mode: Option<&str>) -> Self {
        match mode {
            Some(VOLUME_MODE_BLOCK) => Self::Block,
            Some(VOLUME_MODE_FILESYSTEM) => Self::Filesystem,
            _ => Self::Unspecified,
        }
    }

    /// Collapse to the public yes/no answer.
    pub fn is_block(self) -> bool {
        self == Self::Block
    }
}

impl fmt::Display for VolumeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => f.write_str(VOLUME_MODE_BLOCK),
            Self::Filesystem => f.write_str(VOLUME_MODE_FILESYSTEM),
            Self::Unspecified => f.write_str("Unspecified"),
        }
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// A located claim together with its block-mode answer.
#[derive(Debug, Clone)]
pub struct BlockClaim {
    /// The claim as seen by the store or API.
    pub claim: Arc<PersistentVolumeClaim>,
    /// `true` only for an explicit `volumeMode: Block`.
    pub is_block: bool,
}

/// A located claim together with its shared-access answer.
#[derive(Debug, Clone)]
pub struct SharedClaim {
    /// The claim as seen by the store or API.
    pub claim: Arc<PersistentVolumeClaim>,
    /// `true` when the claim requests `ReadWriteMany`.
    pub is_shared: bool,
}
