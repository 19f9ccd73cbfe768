//! Configuration for fabricnet hosts.
//!
//! TOML profiles merged with `FABRICNET_` environment overrides, token
//! resolution, and translation to `fabricnet_core::ControllerConfig` plus
//! `ReconcileSettings`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fabricnet_core::{ControllerConfig, DeploymentWait, ReconcileSettings, TlsVerification};

/// Environment prefix; nested keys are separated by `__`
/// (`FABRICNET_DEFAULTS__TIMEOUT=60`).
pub const ENV_PREFIX: &str = "FABRICNET_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' is not defined")]
    ProfileNotFound { profile: String },

    #[error("no token for profile '{profile}': environment variable {var} is not set")]
    MissingToken { profile: String, var: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

/// Values applied to every profile unless it overrides them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub insecure: bool,

    /// First delay of the deployment wait, in milliseconds.
    #[serde(default = "default_poll_initial_ms")]
    pub deploy_poll_initial_ms: u64,

    /// Longest delay between deployment polls, in milliseconds.
    #[serde(default = "default_poll_max_ms")]
    pub deploy_poll_max_ms: u64,

    /// Overall deployment wait, in seconds.
    #[serde(default = "default_deploy_timeout_secs")]
    pub deploy_timeout_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            insecure: false,
            deploy_poll_initial_ms: default_poll_initial_ms(),
            deploy_poll_max_ms: default_poll_max_ms(),
            deploy_timeout_secs: default_deploy_timeout_secs(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_poll_initial_ms() -> u64 {
    2_000
}
fn default_poll_max_ms() -> u64 {
    10_000
}
fn default_deploy_timeout_secs() -> u64 {
    120
}

/// A named controller profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://dcnm.example.net").
    pub controller: String,

    /// API token (plaintext; prefer `token_env`).
    pub token: Option<String>,

    /// Environment variable holding the API token.
    pub token_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override the default insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override the default request timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "fabricnet", "fabricnet").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("fabricnet");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the platform config file and environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` and environment. A missing file yields the
/// defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

// ── Profile resolution ──────────────────────────────────────────────

/// Resolve the API token: `token_env` first, then the plaintext `token`.
///
/// A profile naming `token_env` without a plaintext fallback fails when the
/// variable is unset. A profile with neither gets no token.
pub fn resolve_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<SecretString>, ConfigError> {
    if let Some(ref var) = profile.token_env {
        if let Ok(value) = std::env::var(var) {
            return Ok(Some(SecretString::from(value)));
        }
        if profile.token.is_none() {
            return Err(ConfigError::MissingToken {
                profile: profile_name.into(),
                var: var.clone(),
            });
        }
    }
    Ok(profile.token.clone().map(SecretString::from))
}

/// Pick a profile (the named one, else the default) and build the runtime
/// configuration for it.
pub fn resolve_profile(
    config: &Config,
    name: Option<&str>,
) -> Result<(ControllerConfig, ReconcileSettings), ConfigError> {
    let name = name
        .or(config.default_profile.as_deref())
        .unwrap_or("default");
    let profile = config
        .profiles
        .get(name)
        .ok_or_else(|| ConfigError::ProfileNotFound {
            profile: name.into(),
        })?;
    let defaults = &config.defaults;

    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|e| invalid("controller", format!("invalid URL {}: {e}", profile.controller)))?;

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(invalid("timeout", "must be at least one second"));
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let controller = ControllerConfig {
        url,
        token: resolve_token(profile, name)?,
        tls,
        timeout: Duration::from_secs(timeout),
    };

    Ok((controller, reconcile_settings(defaults)?))
}

/// Deployment wait tuning from the global defaults.
pub fn reconcile_settings(defaults: &Defaults) -> Result<ReconcileSettings, ConfigError> {
    if defaults.deploy_poll_initial_ms == 0 {
        return Err(invalid("deploy_poll_initial_ms", "must be positive"));
    }
    if defaults.deploy_poll_max_ms < defaults.deploy_poll_initial_ms {
        return Err(invalid(
            "deploy_poll_max_ms",
            "must not be below deploy_poll_initial_ms",
        ));
    }

    Ok(ReconcileSettings {
        deployment_wait: DeploymentWait {
            initial_interval: Duration::from_millis(defaults.deploy_poll_initial_ms),
            max_interval: Duration::from_millis(defaults.deploy_poll_max_ms),
            timeout: Duration::from_secs(defaults.deploy_timeout_secs),
            ..DeploymentWait::default()
        },
    })
}
