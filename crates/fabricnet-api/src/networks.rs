// Network object and pool endpoints
//
// Network CRUD under `rest/top-down/fabrics/{fabric}/networks`, plus the two
// pool allocators consulted at creation time (segment ids and VLANs).

use tracing::debug;

use crate::client::{DcnmClient, decode};
use crate::error::Error;
use crate::models::{NetworkDocument, NetworkPayload, SegmentIdResponse};

/// Usage type requested from the VLAN resource manager.
const TOP_DOWN_NETWORK_VLAN: &str = "TOP_DOWN_NETWORK_VLAN";

impl DcnmClient {
    /// Fetch one network.
    ///
    /// `GET /rest/top-down/fabrics/{fabric}/networks/{name}`
    pub async fn get_network(&self, fabric: &str, name: &str) -> Result<NetworkDocument, Error> {
        let url = self.top_down_url(fabric, &["networks", name])?;
        self.get_json(url).await
    }

    /// Create a network.
    ///
    /// `POST /rest/top-down/fabrics/{fabric}/networks`
    pub async fn create_network(&self, fabric: &str, payload: &NetworkPayload) -> Result<(), Error> {
        let url = self.top_down_url(fabric, &["networks"])?;
        debug!(fabric, network = %payload.network_name, "creating network");
        self.post(url, payload).await?;
        Ok(())
    }

    /// Replace a network's definition.
    ///
    /// `PUT /rest/top-down/fabrics/{fabric}/networks/{name}`
    pub async fn update_network(
        &self,
        fabric: &str,
        name: &str,
        payload: &NetworkPayload,
    ) -> Result<(), Error> {
        let url = self.top_down_url(fabric, &["networks", name])?;
        debug!(fabric, network = name, "updating network");
        self.put(url, payload).await?;
        Ok(())
    }

    /// Delete a network.
    ///
    /// `DELETE /rest/top-down/fabrics/{fabric}/networks/{name}`
    pub async fn delete_network(&self, fabric: &str, name: &str) -> Result<(), Error> {
        let url = self.top_down_url(fabric, &["networks", name])?;
        debug!(fabric, network = name, "deleting network");
        self.delete(url).await?;
        Ok(())
    }

    /// Take the next segment id from the fabric's pool.
    ///
    /// `GET /rest/managed-pool/fabrics/{fabric}/segments/ids`
    pub async fn allocate_segment_id(&self, fabric: &str) -> Result<u32, Error> {
        let url = self.rest_url(["rest", "managed-pool", "fabrics", fabric, "segments", "ids"])?;
        let body = self.get_text(url).await?;
        let resp: SegmentIdResponse = decode(body.clone())?;
        resp.segment_id
            .as_deref()
            .and_then(|id| id.trim().parse().ok())
            .ok_or(Error::Deserialization {
                message: "segmentId missing or not numeric".into(),
                body,
            })
    }

    /// Take the next top-down network VLAN from the fabric's pool.
    ///
    /// `GET /rest/resource-manager/vlan/{fabric}?vlanUsageType=TOP_DOWN_NETWORK_VLAN`
    /// answers with a bare integer.
    pub async fn allocate_vlan(&self, fabric: &str) -> Result<u16, Error> {
        let mut url = self.rest_url(["rest", "resource-manager", "vlan", fabric])?;
        url.query_pairs_mut()
            .append_pair("vlanUsageType", TOP_DOWN_NETWORK_VLAN);
        let body = self.get_text(url).await?;
        let parsed = body.trim().trim_matches('"').parse::<u16>();
        match parsed {
            Ok(vlan) => Ok(vlan),
            Err(e) => Err(Error::Deserialization {
                message: format!("VLAN allocation returned a non-numeric body: {e}"),
                body,
            }),
        }
    }
}
