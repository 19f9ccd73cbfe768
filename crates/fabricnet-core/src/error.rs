// ── Core error types ──
//
// Errors surfaced by the reconciler. Transport-level failures from
// `fabricnet-api` are translated into domain variants by the `From` impl;
// callers never match on HTTP details directly.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    /// Rejected before any remote call was made.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// The network object exists on the controller but attaching or
    /// detaching it failed. Local state has already been marked undeployed.
    #[error("Network {network} is {action} but not deployed yet: {reason}")]
    PartialDeployment {
        network: String,
        action: String,
        reason: String,
    },

    /// Detach during delete returned a non-success marker.
    #[error("Error while detaching network {network}: {reason}")]
    DetachFailed { network: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the controller reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fabricnet_api::Error> for CoreError {
    fn from(err: fabricnet_api::Error) -> Self {
        match err {
            fabricnet_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            fabricnet_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            fabricnet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fabricnet_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fabricnet_api::Error::NotFound { path } => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: path,
            },
            fabricnet_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            fabricnet_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
