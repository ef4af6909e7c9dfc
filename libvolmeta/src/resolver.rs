//! Public volume metadata queries.
//!
//! Every query locates a claim, checks its kind and derives an answer. The
//! store variants read a local snapshot; the client variants go to the API
//! server under the configured deadline. Both give the same answers for the
//! same cluster state.
//!
//! How absence is treated differs per query:
//!
//! | Query | Claim missing | Volume missing |
//! |---|---|---|
//! | [`pvc_block_from_store`] / [`pvc_block_from_client`] | `Ok(None)` | n/a |
//! | [`shared_pvc_from_store`] / [`shared_pvc_from_client`] | `ClaimNotFound` | n/a |
//! | [`pvc_host_path_from_store`] / [`pvc_host_path_from_client`] | `ClaimNotFound` | `VolumeNotFound` |
//!
//! An object of the wrong kind in a store is always
//! [`VolumeMetaError::TypeMismatch`].

use std::sync::Arc;

use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use tracing::{debug, instrument, warn};

use crate::client::{ClusterClient, fetch_claim, fetch_volume};
use crate::error::VolumeMetaError;
use crate::pipeline::{self, Step};
use crate::predicate::{is_pvc_block, is_pvc_shared};
use crate::store::{ObjectStore, get_typed};
use crate::types::{BlockClaim, SharedClaim, claim_key};

fn warn_on_mismatch(err: &VolumeMetaError) {
    if let VolumeMetaError::TypeMismatch {
        key,
        expected,
        found,
    } = err
    {
        warn!(%key, %expected, %found, "store returned an object of the wrong kind");
    }
}

/// Look up a claim in the snapshot store and report whether it is block mode.
///
/// Returns `Ok(None)` when the store has no entry for `namespace/claim_name`.
#[instrument(skip(store))]
pub fn pvc_block_from_store<S: ObjectStore + ?Sized>(
    store: &S,
    namespace: &str,
    claim_name: &str,
) -> Result<Option<BlockClaim>, VolumeMetaError> {
    let key = claim_key(namespace, claim_name);
    let found =
        get_typed::<PersistentVolumeClaim, _>(store, &key).inspect_err(warn_on_mismatch)?;
    let Some(claim) = found else {
        debug!(%key, "claim not in store");
        return Ok(None);
    };
    Ok(Some(BlockClaim {
        is_block: is_pvc_block(&claim),
        claim,
    }))
}

/// Fetch a claim from the API server and report whether it is block mode.
///
/// NotFound is `Ok(None)`; any other failure is returned unchanged.
#[instrument(skip(client))]
pub async fn pvc_block_from_client<C: ClusterClient + ?Sized>(
    client: &C,
    namespace: &str,
    claim_name: &str,
) -> Result<Option<BlockClaim>, VolumeMetaError> {
    let Some(claim) = fetch_claim(client, namespace, claim_name).await? else {
        debug!("claim not found on api server");
        return Ok(None);
    };
    let claim = Arc::new(claim);
    Ok(Some(BlockClaim {
        is_block: is_pvc_block(&claim),
        claim,
    }))
}

/// Look up a claim in the snapshot store and report whether it allows
/// `ReadWriteMany`.
///
/// A missing claim is [`VolumeMetaError::ClaimNotFound`].
#[instrument(skip(store))]
pub fn shared_pvc_from_store<S: ObjectStore + ?Sized>(
    store: &S,
    namespace: &str,
    claim_name: &str,
) -> Result<SharedClaim, VolumeMetaError> {
    let key = claim_key(namespace, claim_name);
    let claim = get_typed::<PersistentVolumeClaim, _>(store, &key)
        .inspect_err(warn_on_mismatch)?
        .ok_or(VolumeMetaError::ClaimNotFound(key))?;
    Ok(SharedClaim {
        is_shared: is_pvc_shared(&claim),
        claim,
    })
}

/// Fetch a claim from the API server and report whether it allows
/// `ReadWriteMany`.
///
/// Unlike [`pvc_block_from_client`], NotFound is an error here
/// ([`VolumeMetaError::ClaimNotFound`]).
#[instrument(skip(client))]
pub async fn shared_pvc_from_client<C: ClusterClient + ?Sized>(
    client: &C,
    namespace: &str,
    claim_name: &str,
) -> Result<SharedClaim, VolumeMetaError> {
    let claim = fetch_claim(client, namespace, claim_name)
        .await?
        .ok_or_else(|| VolumeMetaError::ClaimNotFound(claim_key(namespace, claim_name)))?;
    let claim = Arc::new(claim);
    Ok(SharedClaim {
        is_shared: is_pvc_shared(&claim),
        claim,
    })
}

/// Resolve the node path behind a claim whose volume is host-path backed.
///
/// Returns `Ok(None)` when the claim is not bound yet or its volume uses any
/// other source. A missing claim or bound volume is an error: by then the
/// caller expects them to exist.
#[instrument(skip(claim_store, volume_store))]
pub fn pvc_host_path_from_store<C, V>(
    claim_store: &C,
    volume_store: &V,
    namespace: &str,
    claim_name: &str,
) -> Result<Option<String>, VolumeMetaError>
where
    C: ObjectStore + ?Sized,
    V: ObjectStore + ?Sized,
{
    pipeline::locate_claim(claim_store, namespace, claim_name)
        .and_then(|claim| pipeline::bound_volume(&claim))
        .and_then(|volume_name| pipeline::locate_volume(volume_store, &volume_name))
        .and_then(|volume| pipeline::host_path(&volume))
        .into_result()
        .inspect_err(warn_on_mismatch)
}

/// API-server counterpart of [`pvc_host_path_from_store`], with the same
/// empty and failure semantics.
#[instrument(skip(client))]
pub async fn pvc_host_path_from_client<C: ClusterClient + ?Sized>(
    client: &C,
    namespace: &str,
    claim_name: &str,
) -> Result<Option<String>, VolumeMetaError> {
    // API responses are already typed, so no TypeMismatch can surface here.
    let claim = fetch_claim(client, namespace, claim_name).await;
    Step::required(claim, || {
        VolumeMetaError::ClaimNotFound(claim_key(namespace, claim_name))
    })
    .and_then(|claim| pipeline::bound_volume(&claim))
    .and_then_async(|volume_name| async move {
        let volume = fetch_volume(client, &volume_name).await;
        Step::required(volume, || VolumeMetaError::VolumeNotFound(volume_name))
    })
    .await
    .and_then(|volume| pipeline::host_path(&volume))
    .into_result()
}
