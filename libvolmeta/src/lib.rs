//! # libvolmeta, volume metadata for PersistentVolumeClaims
//!
//! `libvolmeta` answers three questions about a workload's storage claim:
//! is it block mode, does it allow shared (`ReadWriteMany`) access, and, if
//! its bound volume is a host-path volume, which node path backs it. Every
//! question can be asked against a locally synchronized snapshot (an
//! informer-style keyed store) or against the live API server, and both give
//! the same answer for the same cluster state.
//!
//! Claims and volumes are the `k8s-openapi` core/v1 types. The crate follows
//! the RK8s conventions: Tokio for the async API path, `tracing` for
//! observability, `thiserror` for structured errors.
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`types`] | Store keys, [`CachedObject`], [`VolumeMode`], query results. |
//! | [`error`] | [`VolumeMetaError`] enum covering all failure modes. |
//! | [`config`] | [`ResolverConfig`], read from the environment. |
//! | [`store`] | [`ObjectStore`] trait, [`SnapshotStore`], reflector stores. |
//! | [`client`] | [`ClusterClient`] trait, implemented for `kube::Client`. |
//! | [`predicate`] | Pure block / shared / bound / host-path derivations. |
//! | [`pipeline`] | Staged host-path resolution ([`Step`]). |
//! | [`resolver`] | The public queries. |

pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod predicate;
pub mod resolver;
pub mod store;
pub mod types;

#[cfg(test)]
mod testutil;

// Re-export the most commonly used items at crate root for convenience.
pub use client::ClusterClient;
pub use config::{RESOLVER_CONFIG, ResolverConfig};
pub use error::VolumeMetaError;
pub use pipeline::Step;
pub use predicate::{is_pvc_block, is_pvc_shared, volume_mode};
pub use resolver::*;
pub use store::{ObjectStore, SnapshotStore, get_typed};
pub use types::*;
