//! Pure derivations over already-resolved records. No I/O happens here.

use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};

use crate::types::{CLAIM_BOUND, READ_WRITE_MANY, VolumeMode};

/// Claim-level volume mode, keeping "unset" distinct from `Filesystem`.
pub fn volume_mode(claim: &PersistentVolumeClaim) -> VolumeMode {
    VolumeMode::from_field(
        claim
            .spec
            .as_ref()
            .and_then(|spec| spec.volume_mode.as_deref()),
    )
}

/// `true` if and only if the claim explicitly asks for `volumeMode: Block`.
///
/// The volume's own mode is not consulted: a claim with no mode cannot bind
/// to a block volume, so an explicit `Block` on the claim is the only
/// unambiguous signal.
pub fn is_pvc_block(claim: &PersistentVolumeClaim) -> bool {
    volume_mode(claim).is_block()
}

/// `true` when the claim's access modes include `ReadWriteMany`.
pub fn is_pvc_shared(claim: &PersistentVolumeClaim) -> bool {
    claim
        .spec
        .as_ref()
        .and_then(|spec| spec.access_modes.as_ref())
        .is_some_and(|modes| modes.iter().any(|mode| mode == READ_WRITE_MANY))
}

/// Name of the volume the claim is bound to, if it is in the `Bound` phase
/// and names one.
pub fn bound_volume_name(claim: &PersistentVolumeClaim) -> Option<&str> {
    let phase = claim.status.as_ref().and_then(|s| s.phase.as_deref());
    if phase != Some(CLAIM_BOUND) {
        return None;
    }
    claim
        .spec
        .as_ref()
        .and_then(|spec| spec.volume_name.as_deref())
        .filter(|name| !name.is_empty())
}

/// Node path of a host-path volume; `None` for every other volume source.
pub fn host_path(volume: &PersistentVolume) -> Option<&str> {
    volume
        .spec
        .as_ref()
        .and_then(|spec| spec.host_path.as_ref())
        .map(|hp| hp.path.as_str())
}
