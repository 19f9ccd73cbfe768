// ── Controller seam ──
//
// `FabricRemote` is everything the reconciler needs from a controller. The
// production implementation is `fabricnet_api::DcnmClient`; unit tests use
// the in-memory fake below.

use std::future::Future;

use fabricnet_api::models::{
    AttachResults, AttachmentRecord, NetworkAttachments, NetworkDocument, NetworkPayload,
};
use fabricnet_api::transport::{TlsMode, TransportConfig};
use fabricnet_api::DcnmClient;

use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;

/// Controller operations used by the reconciler.
pub trait FabricRemote: Send + Sync {
    fn get_network(
        &self,
        fabric: &str,
        name: &str,
    ) -> impl Future<Output = Result<NetworkDocument, CoreError>> + Send;

    fn allocate_segment_id(&self, fabric: &str)
    -> impl Future<Output = Result<u32, CoreError>> + Send;

    fn allocate_vlan(&self, fabric: &str) -> impl Future<Output = Result<u16, CoreError>> + Send;

    fn create_network(
        &self,
        fabric: &str,
        payload: &NetworkPayload,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn update_network(
        &self,
        fabric: &str,
        name: &str,
        payload: &NetworkPayload,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete_network(
        &self,
        fabric: &str,
        name: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn list_attachments(
        &self,
        fabric: &str,
        name: &str,
    ) -> impl Future<Output = Result<Vec<AttachmentRecord>, CoreError>> + Send;

    fn submit_attachments(
        &self,
        fabric: &str,
        batch: &[NetworkAttachments],
    ) -> impl Future<Output = Result<AttachResults, CoreError>> + Send;

    fn deploy_network(
        &self,
        fabric: &str,
        name: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Build a controller client from runtime configuration.
pub fn connect(config: &ControllerConfig) -> Result<DcnmClient, CoreError> {
    let transport = TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    };
    Ok(DcnmClient::new(
        config.url.clone(),
        config.token.as_ref(),
        &transport,
    )?)
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

/// Name the missing object instead of echoing the request path.
fn network_error(name: &str, err: fabricnet_api::Error) -> CoreError {
    if err.is_not_found() {
        CoreError::NotFound {
            entity_type: "network".into(),
            identifier: name.into(),
        }
    } else {
        err.into()
    }
}

impl FabricRemote for DcnmClient {
    async fn get_network(&self, fabric: &str, name: &str) -> Result<NetworkDocument, CoreError> {
        DcnmClient::get_network(self, fabric, name)
            .await
            .map_err(|e| network_error(name, e))
    }

    async fn allocate_segment_id(&self, fabric: &str) -> Result<u32, CoreError> {
        Ok(DcnmClient::allocate_segment_id(self, fabric).await?)
    }

    async fn allocate_vlan(&self, fabric: &str) -> Result<u16, CoreError> {
        Ok(DcnmClient::allocate_vlan(self, fabric).await?)
    }

    async fn create_network(&self, fabric: &str, payload: &NetworkPayload) -> Result<(), CoreError> {
        Ok(DcnmClient::create_network(self, fabric, payload).await?)
    }

    async fn update_network(
        &self,
        fabric: &str,
        name: &str,
        payload: &NetworkPayload,
    ) -> Result<(), CoreError> {
        DcnmClient::update_network(self, fabric, name, payload)
            .await
            .map_err(|e| network_error(name, e))
    }

    async fn delete_network(&self, fabric: &str, name: &str) -> Result<(), CoreError> {
        DcnmClient::delete_network(self, fabric, name)
            .await
            .map_err(|e| network_error(name, e))
    }

    async fn list_attachments(
        &self,
        fabric: &str,
        name: &str,
    ) -> Result<Vec<AttachmentRecord>, CoreError> {
        DcnmClient::list_attachments(self, fabric, name)
            .await
            .map_err(|e| network_error(name, e))
    }

    async fn submit_attachments(
        &self,
        fabric: &str,
        batch: &[NetworkAttachments],
    ) -> Result<AttachResults, CoreError> {
        Ok(DcnmClient::submit_attachments(self, fabric, batch).await?)
    }

    async fn deploy_network(&self, fabric: &str, name: &str) -> Result<(), CoreError> {
        DcnmClient::deploy_network(self, fabric, name)
            .await
            .map_err(|e| network_error(name, e))
    }
}
