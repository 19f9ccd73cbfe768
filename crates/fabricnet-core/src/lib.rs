// fabricnet-core: Network reconciliation between declared state and a fabric controller.

pub mod config;
pub mod convert;
pub mod diff;
pub mod error;
pub mod model;
pub mod poller;
pub mod reconciler;
pub mod remote;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, DeploymentWait, ReconcileSettings, TlsVerification};
pub use error::CoreError;
pub use poller::WaitOutcome;
pub use reconciler::{NetworkReconciler, parse_import_key};
pub use remote::{FabricRemote, connect};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Attachment, DeploymentPhase, LanAttachState, Network, NetworkProfile, SwitchAttachStatus,
};
