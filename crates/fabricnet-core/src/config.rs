// ── Runtime configuration ──
//
// How to reach a controller and how patiently to wait for deployments.
// Built by the host (or by `fabricnet-config`) and handed in; core never
// reads config files.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed lab controllers).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://dcnm.example.net`).
    pub url: Url,
    /// Pre-issued API token, sent with every request.
    pub token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ControllerConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Bounded wait for controller-side deployment to settle.
///
/// Polls attachment state with exponential backoff, starting at
/// `initial_interval` and capped at `max_interval`, until the target state
/// is seen or `timeout` has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentWait {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub backoff_multiplier: f64,
    pub timeout: Duration,
}

impl Default for DeploymentWait {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(10),
            backoff_multiplier: 1.5,
            timeout: Duration::from_secs(120),
        }
    }
}

impl DeploymentWait {
    /// Delay to use after `current`.
    ///
    /// Multipliers below one (or NaN) keep the interval; an infinite or
    /// overflowing product saturates at `max_interval`.
    pub(crate) fn next_interval(&self, current: Duration) -> Duration {
        let multiplier = self.backoff_multiplier.max(1.0);
        Duration::try_from_secs_f64(current.as_secs_f64() * multiplier)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }
}

/// Tuning for the reconciler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileSettings {
    pub deployment_wait: DeploymentWait,
}
