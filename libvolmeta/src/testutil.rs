//! Fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use k8s_openapi::api::core::v1::{
    HostPathVolumeSource, NFSVolumeSource, PersistentVolume, PersistentVolumeClaim,
    PersistentVolumeClaimSpec, PersistentVolumeClaimStatus, PersistentVolumeSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::client::ClusterClient;
use crate::error::VolumeMetaError;
use crate::store::ObjectStore;
use crate::types::{CachedObject, claim_key};

fn claim(namespace: &str, name: &str, spec: PersistentVolumeClaimSpec) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            ..Default::default()
        },
        spec: Some(spec),
        ..Default::default()
    }
}

pub(crate) fn claim_with_mode(
    namespace: &str,
    name: &str,
    mode: Option<&str>,
) -> PersistentVolumeClaim {
    claim(
        namespace,
        name,
        PersistentVolumeClaimSpec {
            volume_mode: mode.map(str::to_owned),
            ..Default::default()
        },
    )
}

pub(crate) fn claim_with_access_modes(
    namespace: &str,
    name: &str,
    modes: &[&str],
) -> PersistentVolumeClaim {
    claim(
        namespace,
        name,
        PersistentVolumeClaimSpec {
            access_modes: Some(modes.iter().map(|m| (*m).to_owned()).collect()),
            ..Default::default()
        },
    )
}

pub(crate) fn bound_claim(namespace: &str, name: &str, volume: &str) -> PersistentVolumeClaim {
    let mut claim = claim(
        namespace,
        name,
        PersistentVolumeClaimSpec {
            volume_name: Some(volume.to_owned()),
            ..Default::default()
        },
    );
    claim.status = Some(PersistentVolumeClaimStatus {
        phase: Some("Bound".to_owned()),
        ..Default::default()
    });
    claim
}

pub(crate) fn pending_claim(namespace: &str, name: &str) -> PersistentVolumeClaim {
    let mut claim = claim(namespace, name, PersistentVolumeClaimSpec::default());
    claim.status = Some(PersistentVolumeClaimStatus {
        phase: Some("Pending".to_owned()),
        ..Default::default()
    });
    claim
}

fn volume(name: &str, spec: PersistentVolumeSpec) -> PersistentVolume {
    PersistentVolume {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            ..Default::default()
        },
        spec: Some(spec),
        ..Default::default()
    }
}

pub(crate) fn host_path_volume(name: &str, path: &str) -> PersistentVolume {
    volume(
        name,
        PersistentVolumeSpec {
            host_path: Some(HostPathVolumeSource {
                path: path.to_owned(),
                type_: None,
            }),
            ..Default::default()
        },
    )
}

pub(crate) fn nfs_volume(name: &str) -> PersistentVolume {
    volume(
        name,
        PersistentVolumeSpec {
            nfs: Some(NFSVolumeSource {
                server: "nfs.example".to_owned(),
                path: "/exports/data".to_owned(),
                read_only: None,
            }),
            ..Default::default()
        },
    )
}

/// A store whose every lookup fails.
pub(crate) struct FailingStore;

impl ObjectStore for FailingStore {
    fn get_by_key(&self, _key: &str) -> Result<Option<CachedObject>, VolumeMetaError> {
        Err(VolumeMetaError::store("informer not synced"))
    }
}

/// Wraps a store and counts lookups.
pub(crate) struct CountingStore<S> {
    inner: S,
    pub(crate) lookups: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }
}

impl<S: ObjectStore> ObjectStore for CountingStore<S> {
    fn get_by_key(&self, key: &str) -> Result<Option<CachedObject>, VolumeMetaError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_key(key)
    }
}

/// In-memory stand-in for the API server.
#[derive(Default)]
pub(crate) struct FakeCluster {
    claims: DashMap<String, PersistentVolumeClaim>,
    volumes: DashMap<String, PersistentVolume>,
    failure: Option<VolumeMetaError>,
    delay: Option<Duration>,
    volume_failure: Option<VolumeMetaError>,
    volume_delay: Option<Duration>,
    pub(crate) volume_gets: AtomicUsize,
}

impl FakeCluster {
    pub(crate) fn failing(err: VolumeMetaError) -> Self {
        Self {
            failure: Some(err),
            ..Default::default()
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail only volume fetches; claim fetches still succeed.
    pub(crate) fn with_failing_volumes(mut self, err: VolumeMetaError) -> Self {
        self.volume_failure = Some(err);
        self
    }

    /// Delay only volume fetches.
    pub(crate) fn with_volume_delay(mut self, delay: Duration) -> Self {
        self.volume_delay = Some(delay);
        self
    }

    pub(crate) fn add_claim(&self, claim: PersistentVolumeClaim) {
        let key = claim_key(
            claim.metadata.namespace.as_deref().unwrap_or_default(),
            claim.metadata.name.as_deref().unwrap_or_default(),
        );
        self.claims.insert(key, claim);
    }

    pub(crate) fn add_volume(&self, volume: PersistentVolume) {
        let name = volume.metadata.name.clone().unwrap_or_default();
        self.volumes.insert(name, volume);
    }

    async fn respond<T>(
        delay: Option<Duration>,
        failure: Option<&VolumeMetaError>,
        found: Option<T>,
    ) -> Result<Option<T>, VolumeMetaError> {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(err) => Err(err.clone()),
            None => Ok(found),
        }
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn get_claim(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<PersistentVolumeClaim>, VolumeMetaError> {
        let found = self
            .claims
            .get(&claim_key(namespace, name))
            .map(|entry| entry.value().clone());
        Self::respond(self.delay, self.failure.as_ref(), found).await
    }

    async fn get_volume(&self, name: &str) -> Result<Option<PersistentVolume>, VolumeMetaError> {
        self.volume_gets.fetch_add(1, Ordering::SeqCst);
        let found = self.volumes.get(name).map(|entry| entry.value().clone());
        let delay = self.delay.or(self.volume_delay);
        let failure = self.failure.as_ref().or(self.volume_failure.as_ref());
        Self::respond(delay, failure, found).await
    }
}
