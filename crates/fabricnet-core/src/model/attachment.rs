// ── Attachment domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Binding of a network to one switch, keyed by serial number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub serial_number: String,
    /// VLAN override; 0 inherits the network VLAN.
    #[serde(default)]
    pub vlan_id: u16,
    #[serde(default = "default_attach")]
    pub attach: bool,
    #[serde(default)]
    pub switch_ports: Vec<String>,
    #[serde(default)]
    pub dot1q_vlan: u16,
    #[serde(default)]
    pub untagged: bool,
    #[serde(default)]
    pub free_form_config: Option<String>,
    #[serde(default)]
    pub extension_values: Option<String>,
    #[serde(default)]
    pub instance_values: Option<String>,
}

fn default_attach() -> bool {
    true
}

impl Attachment {
    pub fn new(serial_number: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
            vlan_id: 0,
            attach: default_attach(),
            switch_ports: Vec::new(),
            dot1q_vlan: 0,
            untagged: false,
            free_form_config: None,
            extension_values: None,
            instance_values: None,
        }
    }

    pub fn with_ports<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.switch_ports = ports.into_iter().map(Into::into).collect();
        self
    }

    /// VLAN to send for this switch: the override, or the network VLAN.
    pub fn effective_vlan(&self, network_vlan: Option<u16>) -> u16 {
        if self.vlan_id == 0 {
            network_vlan.unwrap_or(0)
        } else {
            self.vlan_id
        }
    }
}

/// Per-switch attachment lifecycle as reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
pub enum LanAttachState {
    #[strum(serialize = "DEPLOYED")]
    Deployed,
    #[strum(serialize = "PENDING")]
    Pending,
    #[strum(serialize = "IN PROGRESS")]
    InProgress,
    #[strum(serialize = "OUT-OF-SYNC")]
    OutOfSync,
    #[strum(serialize = "FAILED")]
    Failed,
    #[strum(serialize = "NA")]
    NotApplicable,
    #[strum(default)]
    Other(String),
}

impl LanAttachState {
    /// Parse the wire value; never fails, unknown values are kept verbatim.
    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| Self::Other(raw.to_owned()))
    }
}

/// What the controller says about one switch of a network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchAttachStatus {
    pub attached: bool,
    /// `None` means "no port list reported": keep the local list.
    pub ports: Option<Vec<String>>,
    /// VLAN in use; 0 when the controller reports none.
    pub vlan: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_vlan_inherits_when_zero() {
        let a = Attachment::new("SW1");
        assert_eq!(a.effective_vlan(Some(2300)), 2300);
        assert_eq!(a.effective_vlan(None), 0);

        let overridden = Attachment {
            vlan_id: 2400,
            ..Attachment::new("SW1")
        };
        assert_eq!(overridden.effective_vlan(Some(2300)), 2400);
    }

    #[test]
    fn lan_attach_state_parses_known_and_unknown() {
        assert_eq!(LanAttachState::from_wire("DEPLOYED"), LanAttachState::Deployed);
        assert_eq!(
            LanAttachState::from_wire("IN PROGRESS"),
            LanAttachState::InProgress
        );
        assert_eq!(
            LanAttachState::from_wire("SOMETHING NEW"),
            LanAttachState::Other("SOMETHING NEW".into())
        );
        assert_eq!(LanAttachState::OutOfSync.to_string(), "OUT-OF-SYNC");
    }
}
