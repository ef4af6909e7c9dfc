//! Keyed snapshot stores.
//!
//! An [`ObjectStore`] answers point-in-time lookups by string key, the way an
//! informer cache does. Two implementations are provided:
//!
//! * [`SnapshotStore`]: an in-memory map that can hold objects of any kind,
//!   filled by the caller (or from raw JSON).
//! * [`reflector::Store<K>`]: the typed cache maintained by a `kube-runtime`
//!   reflector. It only ever yields its own kind.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::runtime::reflector::{self, ObjectRef};
use serde_json::Value;
use tracing::debug;

use crate::error::VolumeMetaError;
use crate::types::{CachedKind, CachedObject, claim_key, object_key, split_key, volume_key};

/// Read-only keyed lookup over a local snapshot.
///
/// Claims are keyed `namespace/name` (see [`claim_key`]) and cluster-scoped
/// volumes by their bare name (see [`volume_key`]). `Ok(None)` means the key
/// is not present; an `Err` means the store could not answer at all.
pub trait ObjectStore: Send + Sync {
    /// Look up the object stored under `key`.
    fn get_by_key(&self, key: &str) -> Result<Option<CachedObject>, VolumeMetaError>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    fn get_by_key(&self, key: &str) -> Result<Option<CachedObject>, VolumeMetaError> {
        (**self).get_by_key(key)
    }
}

/// Look up `key` and require the result to be a `K`.
///
/// Absence is `Ok(None)`; an object of another kind is
/// [`VolumeMetaError::TypeMismatch`].
pub fn get_typed<K, S>(store: &S, key: &str) -> Result<Option<Arc<K>>, VolumeMetaError>
where
    K: CachedKind,
    S: ObjectStore + ?Sized,
{
    match store.get_by_key(key)? {
        Some(obj) => K::expect_cached(key, obj).map(Some),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// In-memory snapshot
// ---------------------------------------------------------------------------

/// In-memory snapshot store holding objects of any kind.
///
/// Backed by a [`DashMap`], so concurrent readers and the writer feeding it
/// never block each other on unrelated keys.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    objects: DashMap<String, CachedObject>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `obj` under an explicit key, returning whatever it replaced.
    pub fn insert(
        &self,
        key: impl Into<String>,
        obj: impl Into<CachedObject>,
    ) -> Option<CachedObject> {
        self.objects.insert(key.into(), obj.into())
    }

    /// Store a claim under its `namespace/name` key.
    pub fn insert_claim(&self, claim: PersistentVolumeClaim) -> Result<String, VolumeMetaError> {
        let (namespace, name) = meta_names(&claim.metadata)?;
        let key = claim_key(namespace, name);
        self.objects.insert(key.clone(), claim.into());
        Ok(key)
    }

    /// Store a volume under its bare name.
    pub fn insert_volume(&self, volume: PersistentVolume) -> Result<String, VolumeMetaError> {
        let (_, name) = meta_names(&volume.metadata)?;
        let key = volume_key(name);
        self.objects.insert(key.clone(), volume.into());
        Ok(key)
    }

    /// Decode a raw JSON object and store it under the key derived from its
    /// kind and metadata. Objects of unrecognised kinds are kept as
    /// [`CachedObject::Unknown`].
    pub fn insert_json(&self, value: Value) -> Result<String, VolumeMetaError> {
        let metadata = value.get("metadata");
        let field = |name: &str| {
            metadata
                .and_then(|m| m.get(name))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        let (namespace, name) = (field("namespace"), field("name"));
        if name.is_empty() {
            return Err(VolumeMetaError::InvalidKey(
                "object has no metadata.name".to_owned(),
            ));
        }

        let obj = CachedObject::from_json(value)?;
        let key = match obj {
            CachedObject::Claim(_) => claim_key(&namespace, &name),
            CachedObject::Volume(_) => volume_key(&name),
            CachedObject::Unknown { .. } => object_key(&namespace, &name),
        };
        debug!(%key, kind = obj.kind(), "snapshot object stored");
        self.objects.insert(key.clone(), obj);
        Ok(key)
    }

    /// Drop the object under `key`.
    pub fn remove(&self, key: &str) -> Option<CachedObject> {
        self.objects.remove(key).map(|(_, obj)| obj)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for SnapshotStore {
    fn get_by_key(&self, key: &str) -> Result<Option<CachedObject>, VolumeMetaError> {
        Ok(self.objects.get(key).map(|entry| entry.value().clone()))
    }
}

fn meta_names(meta: &ObjectMeta) -> Result<(&str, &str), VolumeMetaError> {
    let name = meta
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| VolumeMetaError::InvalidKey("object has no metadata.name".to_owned()))?;
    Ok((meta.namespace.as_deref().unwrap_or_default(), name))
}

// ---------------------------------------------------------------------------
// kube-runtime reflector stores
// ---------------------------------------------------------------------------

impl<K> ObjectStore for reflector::Store<K>
where
    K: CachedKind + kube::Resource + Clone + Send + Sync + 'static,
    K::DynamicType: Default + Eq + Hash + Clone + Send + Sync,
{
    fn get_by_key(&self, key: &str) -> Result<Option<CachedObject>, VolumeMetaError> {
        let (namespace, name) = split_key(key)?;
        let mut obj_ref = ObjectRef::<K>::new(name);
        if let Some(ns) = namespace {
            obj_ref = obj_ref.within(ns);
        }
        Ok(self.get(&obj_ref).map(K::into_cached))
    }
}
