// Top-down API wire types
//
// Documents exchanged with `/rest/top-down`. Inbound scalar fields go through
// the lenient decoders in `wire` because the controller mixes numbers,
// strings and the "null" sentinel freely. Outbound payloads are plain
// camelCase structs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::wire;

// ── Network ──────────────────────────────────────────────────────────

/// Network object as returned by `GET .../networks/{name}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDocument {
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub fabric: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub network_name: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub network_id: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub network_template: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub network_extension_template: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub vrf: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub service_network_template: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub source: Option<String>,
    /// Embedded profile; usually a JSON-encoded string, occasionally an object.
    #[serde(default)]
    pub network_template_config: Value,
}

impl NetworkDocument {
    /// Decode the embedded profile. Returns `None` when it is absent or
    /// cannot be decoded.
    pub fn template_config(&self) -> Option<NetworkTemplateConfig> {
        let decoded = match &self.network_template_config {
            Value::String(raw) => serde_json::from_str(raw),
            Value::Object(_) => serde_json::from_value(self.network_template_config.clone()),
            _ => return None,
        };
        match decoded {
            Ok(config) => Some(config),
            Err(e) => {
                debug!(error = %e, "undecodable networkTemplateConfig");
                None
            }
        }
    }
}

/// Network profile (`networkTemplateConfig`).
///
/// Every value is carried as text: the controller stores template variables
/// as strings. Inbound, absent and "null" fields are `None`; outbound, `None`
/// fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTemplateConfig {
    #[serde(
        rename = "isLayer2Only",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_layer2_only: Option<String>,
    #[serde(
        rename = "vlanId",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub vlan_id: Option<String>,
    #[serde(
        rename = "vlanName",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub vlan_name: Option<String>,
    #[serde(
        rename = "gatewayIpAddress",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_ip_address: Option<String>,
    #[serde(
        rename = "gatewayIpV6Address",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_ipv6_address: Option<String>,
    #[serde(
        rename = "intfDescription",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub intf_description: Option<String>,
    #[serde(
        rename = "mtu",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub mtu: Option<String>,
    #[serde(
        rename = "secondaryGW1",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_gw1: Option<String>,
    #[serde(
        rename = "secondaryGW2",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_gw2: Option<String>,
    #[serde(
        rename = "suppressArp",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub suppress_arp: Option<String>,
    #[serde(
        rename = "enableIR",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_ir: Option<String>,
    #[serde(
        rename = "mcastGroup",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub mcast_group: Option<String>,
    #[serde(
        rename = "dhcpServerAddr1",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub dhcp_server_addr1: Option<String>,
    #[serde(
        rename = "dhcpServerAddr2",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub dhcp_server_addr2: Option<String>,
    #[serde(
        rename = "vrfDhcp",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub vrf_dhcp: Option<String>,
    #[serde(
        rename = "loopbackId",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub loopback_id: Option<String>,
    #[serde(
        rename = "tag",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag: Option<String>,
    #[serde(
        rename = "trmEnabled",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub trm_enabled: Option<String>,
    #[serde(
        rename = "rtBothAuto",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub rt_both_auto: Option<String>,
    #[serde(
        rename = "enableL3OnBorder",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_l3_on_border: Option<String>,
    #[serde(
        rename = "networkName",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub network_name: Option<String>,
    #[serde(
        rename = "segmentId",
        default,
        deserialize_with = "wire::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub segment_id: Option<String>,
}

/// Body for network create (`POST`) and update (`PUT`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPayload {
    pub fabric: String,
    pub network_name: String,
    pub display_name: String,
    pub network_id: String,
    pub network_template: String,
    pub network_extension_template: String,
    pub vrf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_network_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// JSON-encoded [`NetworkTemplateConfig`].
    pub network_template_config: String,
}

// ── Pools ────────────────────────────────────────────────────────────

/// Response of the segment-id pool allocator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentIdResponse {
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub segment_id: Option<String>,
}

// ── Attachments ──────────────────────────────────────────────────────

/// One switch's attachment record from `GET .../networks/{name}/attachments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRecord {
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub network_name: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub switch_serial_no: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub switch_name: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub lan_attach_state: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub is_lan_attached: bool,
    #[serde(default, deserialize_with = "wire::optional_u16")]
    pub vlan_id: Option<u16>,
    #[serde(default, deserialize_with = "wire::optional_ports")]
    pub port_names: Option<Vec<String>>,
}

/// Per-switch entry of an attach/detach request.
///
/// `switch_ports` and `detach_switch_ports` distinguish `None` (field
/// omitted) from `Some("")` (explicitly no ports): the controller overwrites
/// the port lists on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRequest {
    pub fabric: String,
    pub network_name: String,
    pub serial_number: String,
    pub deployment: bool,
    pub vlan: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_ports: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detach_switch_ports: Option<String>,
    #[serde(rename = "dot1QVlan")]
    pub dot1q_vlan: u16,
    pub untagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeform_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_values: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_values: Option<String>,
}

/// One network's attach batch; the endpoint takes an array of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAttachments {
    pub network_name: String,
    pub lan_attach_list: Vec<AttachmentRequest>,
}

/// Per-switch outcome of an attach/detach call, keyed by switch identifier.
pub type AttachResults = BTreeMap<String, String>;
