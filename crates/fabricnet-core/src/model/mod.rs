// ── Domain model ──
//
// Strongly typed local state of a managed network. Wire documents live in
// `fabricnet_api::models`; `crate::convert` is the only place the two meet.

pub mod attachment;
pub mod network;

pub use attachment::{Attachment, LanAttachState, SwitchAttachStatus};
pub use network::{
    DEFAULT_EXTENSION_TEMPLATE, DEFAULT_TEMPLATE, DeploymentPhase, LAYER2_ONLY_VRF, Network,
    NetworkProfile,
};
