//! Live cluster API access.
//!
//! [`ClusterClient`] is the seam between the resolver and the API server. It
//! is implemented for [`kube::Client`]; tests substitute an in-memory fake.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use kube::Api;
use tracing::debug;

use crate::config::RESOLVER_CONFIG;
use crate::error::VolumeMetaError;

/// Point reads against the cluster API.
///
/// NotFound is reported as `Ok(None)` so callers can tell benign absence
/// apart from a failed request.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetch the claim `name` in `namespace`.
    async fn get_claim(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<PersistentVolumeClaim>, VolumeMetaError>;

    /// Fetch the cluster-scoped volume `name`.
    async fn get_volume(&self, name: &str) -> Result<Option<PersistentVolume>, VolumeMetaError>;
}

#[async_trait]
impl ClusterClient for kube::Client {
    async fn get_claim(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<PersistentVolumeClaim>, VolumeMetaError> {
        let api: Api<PersistentVolumeClaim> = Api::namespaced(self.clone(), namespace);
        api.get_opt(name).await.map_err(VolumeMetaError::api)
    }

    async fn get_volume(&self, name: &str) -> Result<Option<PersistentVolume>, VolumeMetaError> {
        let api: Api<PersistentVolume> = Api::all(self.clone());
        api.get_opt(name).await.map_err(VolumeMetaError::api)
    }
}

#[async_trait]
impl<C: ClusterClient + ?Sized> ClusterClient for Arc<C> {
    async fn get_claim(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<PersistentVolumeClaim>, VolumeMetaError> {
        (**self).get_claim(namespace, name).await
    }

    async fn get_volume(&self, name: &str) -> Result<Option<PersistentVolume>, VolumeMetaError> {
        (**self).get_volume(name).await
    }
}

/// Run `fut`, failing with [`VolumeMetaError::Timeout`] once `after` elapses.
///
/// Dropping the returned future cancels the request.
pub(crate) async fn with_deadline<T, F>(
    operation: impl FnOnce() -> String,
    after: Duration,
    fut: F,
) -> Result<T, VolumeMetaError>
where
    F: Future<Output = Result<T, VolumeMetaError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            let operation = operation();
            debug!(%operation, ?after, "api call deadline exceeded");
            Err(VolumeMetaError::Timeout { operation, after })
        }
    }
}

/// Fetch a claim under the configured deadline.
pub(crate) async fn fetch_claim<C: ClusterClient + ?Sized>(
    client: &C,
    namespace: &str,
    name: &str,
) -> Result<Option<PersistentVolumeClaim>, VolumeMetaError> {
    with_deadline(
        || format!("get claim {namespace}/{name}"),
        RESOLVER_CONFIG.api_timeout,
        client.get_claim(namespace, name),
    )
    .await
}

/// Fetch a volume under the configured deadline.
pub(crate) async fn fetch_volume<C: ClusterClient + ?Sized>(
    client: &C,
    name: &str,
) -> Result<Option<PersistentVolume>, VolumeMetaError> {
    with_deadline(
        || format!("get volume {name}"),
        RESOLVER_CONFIG.api_timeout,
        client.get_volume(name),
    )
    .await
}
