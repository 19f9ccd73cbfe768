// Top-down REST client
//
// Wraps `reqwest::Client` with controller URL construction and status
// handling. Endpoint groups (networks, attachments, pools) are implemented
// as inherent methods in separate files to keep this module focused on
// transport mechanics.

use reqwest::StatusCode;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::{ParseError, Url};

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the fabric controller's REST API.
///
/// Every method maps HTTP 404 to [`Error::NotFound`] so callers can tell a
/// missing object apart from a transient failure.
pub struct DcnmClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DcnmClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the controller root, e.g. `https://dcnm.example.net`.
    /// A pre-issued `token` is attached to every request when given.
    pub fn new(
        base_url: Url,
        token: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(token)?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append path segments to the base URL.
    ///
    /// Each segment is percent-encoded, so a fabric or network name holding
    /// `/`, `?` or `#` stays a single segment.
    pub(crate) fn rest_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `rest/top-down/fabrics/{fabric}/{suffix...}`
    pub(crate) fn top_down_url(&self, fabric: &str, suffix: &[&str]) -> Result<Url, Error> {
        self.rest_url(
            ["rest", "top-down", "fabrics", fabric]
                .into_iter()
                .chain(suffix.iter().copied()),
        )
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let body = self.get_text(url).await?;
        decode(body)
    }

    /// Send a GET request and return the raw body.
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        check_response(resp).await
    }

    /// Send a POST request with a JSON body and return the raw response body.
    pub(crate) async fn post(&self, url: Url, body: &impl Serialize) -> Result<String, Error> {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        check_response(resp).await
    }

    /// Send a POST request without a body.
    pub(crate) async fn post_empty(&self, url: Url) -> Result<String, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).send().await.map_err(Error::Transport)?;
        check_response(resp).await
    }

    /// Send a PUT request with a JSON body.
    pub(crate) async fn put(&self, url: Url, body: &impl Serialize) -> Result<String, Error> {
        debug!("PUT {}", url);
        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        check_response(resp).await
    }

    /// Send a DELETE request.
    pub(crate) async fn delete(&self, url: Url) -> Result<String, Error> {
        debug!("DELETE {}", url);
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;
        check_response(resp).await
    }
}

/// Map the HTTP status to an error or hand back the body.
async fn check_response(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    let path = resp.url().path().to_owned();
    let body = resp.text().await.map_err(Error::Transport)?;

    match status {
        s if s.is_success() => Ok(body),
        StatusCode::NOT_FOUND => Err(Error::NotFound { path }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Authentication {
            message: error_message(&body, status),
        }),
        _ => Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body, status),
        }),
    }
}

/// Pull a human-readable message out of an error body.
///
/// The controller answers errors with `{"message": ...}` on most endpoints
/// and with plain text on a few.
fn error_message(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from));
    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => status.to_string(),
        None => body.trim().to_owned(),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(e) => Err(Error::Deserialization {
            message: e.to_string(),
            body,
        }),
    }
}
