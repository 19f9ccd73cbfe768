// ── Network domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::attachment::Attachment;

/// Routing-domain value meaning "no VRF": the network is layer-2 only.
pub const LAYER2_ONLY_VRF: &str = "NA";

pub const DEFAULT_TEMPLATE: &str = "Default_Network_Universal";
pub const DEFAULT_EXTENSION_TEMPLATE: &str = "Default_Network_Extension_Universal";

/// Lifecycle of one managed network.
///
/// `Propagating` means the deploy was accepted but the controller had not
/// reported any switch as deployed when the bounded wait ran out.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DeploymentPhase {
    #[default]
    Absent,
    Created,
    AttachPending,
    Propagating,
    Deployed,
}

/// Nested profile carried inside the network as `networkTemplateConfig`.
///
/// Flags are tri-state: `None` until either declared or read back. A read
/// always leaves them `Some`, absent controller values reading as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkProfile {
    /// Derived from the VRF on every write; only ever read back, never sent as declared.
    pub layer2_only: Option<bool>,
    pub vlan_id: Option<u16>,
    pub vlan_name: Option<String>,
    pub ipv4_gateway: Option<String>,
    pub ipv6_gateway: Option<String>,
    pub description: Option<String>,
    pub mtu: Option<u32>,
    pub secondary_gw_1: Option<String>,
    pub secondary_gw_2: Option<String>,
    pub arp_suppression: Option<bool>,
    pub ingress_replication: Option<bool>,
    pub mcast_group: Option<String>,
    pub dhcp_server_1: Option<String>,
    pub dhcp_server_2: Option<String>,
    pub dhcp_vrf: Option<String>,
    pub loopback_id: Option<u32>,
    pub tag: Option<String>,
    pub trm_enabled: Option<bool>,
    pub rt_both_auto: Option<bool>,
    pub l3_on_border: Option<bool>,
}

/// A network as declared by the host and as last observed on the controller.
///
/// The same value is the input to `create`/`update` and the recorded state
/// they leave behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub fabric_name: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Segment identifier; allocated by the controller at creation.
    #[serde(default)]
    pub network_id: Option<u32>,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_extension_template")]
    pub extension_template: String,
    #[serde(default = "default_vrf")]
    pub vrf_name: String,
    #[serde(default)]
    pub service_template: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub profile: NetworkProfile,
    #[serde(default = "default_deploy")]
    pub deploy: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Recorded identity; set once the controller accepted the network.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub phase: DeploymentPhase,
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.into()
}
fn default_extension_template() -> String {
    DEFAULT_EXTENSION_TEMPLATE.into()
}
fn default_vrf() -> String {
    LAYER2_ONLY_VRF.into()
}
fn default_deploy() -> bool {
    true
}

impl Network {
    /// A network with every attribute at its declared default.
    pub fn new(fabric_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            fabric_name: fabric_name.into(),
            name: name.into(),
            display_name: None,
            network_id: None,
            template: default_template(),
            extension_template: default_extension_template(),
            vrf_name: default_vrf(),
            service_template: None,
            source: None,
            profile: NetworkProfile::default(),
            deploy: default_deploy(),
            attachments: Vec::new(),
            id: None,
            phase: DeploymentPhase::Absent,
        }
    }

    /// Name used to address the network on the controller.
    pub fn remote_name(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    pub fn is_layer2_only(&self) -> bool {
        self.vrf_name == LAYER2_ONLY_VRF
    }

    /// Record the undeployed fallback after a failed attach.
    pub(crate) fn mark_undeployed(&mut self) {
        self.deploy = false;
        self.attachments.clear();
        self.phase = if self.id.is_some() {
            DeploymentPhase::Created
        } else {
            DeploymentPhase::Absent
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn declared_defaults_fill_in() {
        let net: Network = serde_json::from_value(json!({
            "fabric_name": "fab1",
            "name": "web"
        }))
        .unwrap();
        assert_eq!(net, Network::new("fab1", "web"));
        assert!(net.deploy);
        assert!(net.is_layer2_only());
        assert_eq!(net.template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn remote_name_prefers_recorded_identity() {
        let mut net = Network::new("fab1", "web");
        assert_eq!(net.remote_name(), "web");
        net.id = Some("web-old".into());
        assert_eq!(net.remote_name(), "web-old");
    }

    #[test]
    fn phase_round_trips_as_kebab_case() {
        assert_eq!(DeploymentPhase::AttachPending.to_string(), "attach-pending");
        assert_eq!(
            "propagating".parse::<DeploymentPhase>().unwrap(),
            DeploymentPhase::Propagating
        );
    }
}
