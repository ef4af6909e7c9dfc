//! Host-path resolution as an explicit staged pipeline.
//!
//! Each stage yields a [`Step`]: carry a value on to the next stage, stop
//! with an empty answer, or stop with an error. The stages are:
//!
//! 1. [`locate_claim`]: claim must exist and be a claim.
//! 2. [`bound_volume`]: claim must be `Bound` to a named volume, else empty.
//! 3. [`locate_volume`]: volume must exist and be a volume.
//! 4. [`host_path`]: volume must be host-path backed, else empty.

use std::future::Future;
use std::sync::Arc;

use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use tracing::debug;

use crate::error::VolumeMetaError;
use crate::predicate;
use crate::store::{ObjectStore, get_typed};
use crate::types::{claim_key, volume_key};

/// Outcome of a single pipeline stage.
#[derive(Debug)]
pub enum Step<T> {
    /// Hand `T` to the next stage.
    Continue(T),
    /// Stop; the answer is empty.
    Empty,
    /// Stop with an error.
    Fail(VolumeMetaError),
}

impl<T> Step<T> {
    /// Lift a lookup result where absence is a hard failure.
    pub fn required(
        found: Result<Option<T>, VolumeMetaError>,
        missing: impl FnOnce() -> VolumeMetaError,
    ) -> Self {
        match found {
            Ok(Some(value)) => Self::Continue(value),
            Ok(None) => Self::Fail(missing()),
            Err(e) => Self::Fail(e),
        }
    }

    /// Run the next stage if this one continued.
    pub fn and_then<U>(self, next: impl FnOnce(T) -> Step<U>) -> Step<U> {
        match self {
            Self::Continue(value) => next(value),
            Self::Empty => Step::Empty,
            Self::Fail(e) => Step::Fail(e),
        }
    }

    /// Async counterpart of [`Step::and_then`].
    pub async fn and_then_async<U, F, Fut>(self, next: F) -> Step<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Step<U>>,
    {
        match self {
            Self::Continue(value) => next(value).await,
            Self::Empty => Step::Empty,
            Self::Fail(e) => Step::Fail(e),
        }
    }

    /// Collapse into the public result shape.
    pub fn into_result(self) -> Result<Option<T>, VolumeMetaError> {
        match self {
            Self::Continue(value) => Ok(Some(value)),
            Self::Empty => Ok(None),
            Self::Fail(e) => Err(e),
        }
    }
}

/// Stage 1: the claim must be present in `store` under `namespace/name`.
pub fn locate_claim<S: ObjectStore + ?Sized>(
    store: &S,
    namespace: &str,
    name: &str,
) -> Step<Arc<PersistentVolumeClaim>> {
    let key = claim_key(namespace, name);
    let found = get_typed::<PersistentVolumeClaim, _>(store, &key);
    Step::required(found, || VolumeMetaError::ClaimNotFound(key))
}

/// Stage 2: continue with the bound volume name, or stop empty while the
/// claim is unbound or pending.
pub fn bound_volume(claim: &PersistentVolumeClaim) -> Step<String> {
    match predicate::bound_volume_name(claim) {
        Some(name) => Step::Continue(name.to_owned()),
        None => {
            debug!("claim not bound to a volume yet");
            Step::Empty
        }
    }
}

/// Stage 3: the bound volume must be present in `store` under its name.
pub fn locate_volume<S: ObjectStore + ?Sized>(
    store: &S,
    name: &str,
) -> Step<Arc<PersistentVolume>> {
    let found = get_typed::<PersistentVolume, _>(store, &volume_key(name));
    Step::required(found, || VolumeMetaError::VolumeNotFound(name.to_owned()))
}

/// Stage 4: the node path for host-path volumes, empty for anything else.
pub fn host_path(volume: &PersistentVolume) -> Step<String> {
    match predicate::host_path(volume) {
        Some(path) => Step::Continue(path.to_owned()),
        None => {
            debug!("volume is not host-path backed");
            Step::Empty
        }
    }
}
