// Attachment and deployment endpoints
//
// Per-switch attach/detach batches, attachment status records, and the
// asynchronous deploy trigger.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::client::{DcnmClient, decode};
use crate::error::Error;
use crate::models::{AttachResults, AttachmentRecord, NetworkAttachments};
use crate::wire::scalar_text;

impl DcnmClient {
    /// List the attachment record of every switch for a network.
    ///
    /// `GET /rest/top-down/fabrics/{fabric}/networks/{name}/attachments`
    pub async fn list_attachments(
        &self,
        fabric: &str,
        name: &str,
    ) -> Result<Vec<AttachmentRecord>, Error> {
        let url = self.top_down_url(fabric, &["networks", name, "attachments"])?;
        self.get_json(url).await
    }

    /// Submit an attach/detach batch.
    ///
    /// `POST /rest/top-down/fabrics/{fabric}/networks/attachments`
    ///
    /// The controller answers with one status string per switch. Non-string
    /// values are rendered as text so the caller can report them verbatim.
    pub async fn submit_attachments(
        &self,
        fabric: &str,
        batch: &[NetworkAttachments],
    ) -> Result<AttachResults, Error> {
        let url = self.top_down_url(fabric, &["networks", "attachments"])?;
        debug!(fabric, networks = batch.len(), "submitting attachment batch");
        let body = self.post(url, &batch).await?;
        let raw: BTreeMap<String, Value> = decode(body)?;
        Ok(raw
            .into_iter()
            .map(|(switch, status)| (switch, scalar_text(status).unwrap_or_default()))
            .collect())
    }

    /// Kick off deployment of a network's pending attachments.
    ///
    /// `POST /rest/top-down/fabrics/{fabric}/networks/{name}/deploy`
    ///
    /// Completion is not observable from the response; poll the attachment
    /// records instead.
    pub async fn deploy_network(&self, fabric: &str, name: &str) -> Result<(), Error> {
        let url = self.top_down_url(fabric, &["networks", name, "deploy"])?;
        debug!(fabric, network = name, "triggering deploy");
        self.post_empty(url).await?;
        Ok(())
    }
}
