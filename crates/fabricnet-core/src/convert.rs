// ── Wire-to-domain mapping ──
//
// Bridges `fabricnet_api::models` documents and the typed `model::Network`.
// Inbound mapping parses defensively: an absent or unparseable number leaves
// the local value alone, an absent flag reads as `false`. Outbound mapping
// builds the network payload and the attach/detach batches.

use std::str::FromStr;

use fabricnet_api::models::{
    AttachResults, AttachmentRecord, AttachmentRequest, NetworkAttachments, NetworkDocument,
    NetworkPayload, NetworkTemplateConfig,
};

use crate::diff::diff_for_serial;
use crate::error::CoreError;
use crate::model::{Attachment, Network, NetworkProfile};

/// Per-switch results that count as a successful attach or detach.
pub const ATTACH_SUCCESS_MARKERS: [&str; 2] = ["SUCCESS", "SUCCESS Peer attach Reponse :  SUCCESS"];

// ── Helpers ────────────────────────────────────────────────────────

/// Boolean spellings the controller emits for template variables.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Absent or blank reads as `false`; unparseable leaves `slot` untouched.
fn apply_flag(slot: &mut Option<bool>, raw: Option<&String>) {
    match raw.map(|s| s.trim()) {
        None | Some("") => *slot = Some(false),
        Some(value) => {
            if let Some(flag) = parse_flag(value) {
                *slot = Some(flag);
            }
        }
    }
}

/// Only a present, parseable value overwrites `slot`.
fn apply_number<T: FromStr>(slot: &mut Option<T>, raw: Option<&String>) {
    if let Some(value) = raw.and_then(|s| s.trim().parse().ok()) {
        *slot = Some(value);
    }
}

/// Present values (including empty strings) overwrite `slot`.
fn apply_text(slot: &mut Option<String>, raw: Option<&String>) {
    if let Some(value) = raw {
        *slot = Some(value.clone());
    }
}

fn flag_text(flag: Option<bool>) -> Option<String> {
    Some(flag.unwrap_or(false).to_string())
}

// ── Inbound ────────────────────────────────────────────────────────

/// Overwrite every computed attribute of `network` from a controller document.
pub fn apply_network_document(network: &mut Network, doc: &NetworkDocument) {
    if let Some(fabric) = &doc.fabric {
        network.fabric_name.clone_from(fabric);
    }
    if let Some(name) = &doc.network_name {
        network.name.clone_from(name);
    }
    apply_number(&mut network.network_id, doc.network_id.as_ref());
    if let Some(template) = &doc.network_template {
        network.template.clone_from(template);
    }
    if let Some(template) = &doc.network_extension_template {
        network.extension_template.clone_from(template);
    }
    if let Some(vrf) = &doc.vrf {
        network.vrf_name.clone_from(vrf);
    }
    apply_text(&mut network.display_name, doc.display_name.as_ref());
    apply_text(&mut network.service_template, doc.service_network_template.as_ref());
    apply_text(&mut network.source, doc.source.as_ref());

    if let Some(config) = doc.template_config() {
        apply_template_config(&mut network.profile, &config);
    }
}

/// Overwrite the profile from the decoded `networkTemplateConfig`.
pub fn apply_template_config(profile: &mut NetworkProfile, cfg: &NetworkTemplateConfig) {
    apply_flag(&mut profile.layer2_only, cfg.is_layer2_only.as_ref());
    apply_number(&mut profile.vlan_id, cfg.vlan_id.as_ref());
    apply_text(&mut profile.vlan_name, cfg.vlan_name.as_ref());
    apply_text(&mut profile.ipv4_gateway, cfg.gateway_ip_address.as_ref());
    apply_text(&mut profile.ipv6_gateway, cfg.gateway_ipv6_address.as_ref());
    apply_text(&mut profile.description, cfg.intf_description.as_ref());
    apply_number(&mut profile.mtu, cfg.mtu.as_ref());
    apply_text(&mut profile.secondary_gw_1, cfg.secondary_gw1.as_ref());
    apply_text(&mut profile.secondary_gw_2, cfg.secondary_gw2.as_ref());
    apply_flag(&mut profile.arp_suppression, cfg.suppress_arp.as_ref());
    apply_flag(&mut profile.ingress_replication, cfg.enable_ir.as_ref());
    apply_text(&mut profile.mcast_group, cfg.mcast_group.as_ref());
    apply_text(&mut profile.dhcp_server_1, cfg.dhcp_server_addr1.as_ref());
    apply_text(&mut profile.dhcp_server_2, cfg.dhcp_server_addr2.as_ref());
    apply_text(&mut profile.dhcp_vrf, cfg.vrf_dhcp.as_ref());
    apply_number(&mut profile.loopback_id, cfg.loopback_id.as_ref());
    apply_text(&mut profile.tag, cfg.tag.as_ref());
    apply_flag(&mut profile.trm_enabled, cfg.trm_enabled.as_ref());
    apply_flag(&mut profile.rt_both_auto, cfg.rt_both_auto.as_ref());
    apply_flag(&mut profile.l3_on_border, cfg.enable_l3_on_border.as_ref());
}

/// Seed attachments from the controller's records for an imported network.
///
/// Only switches that are actually attached become attachments. A VLAN equal
/// to the network VLAN is recorded as 0 (inherit).
pub fn attachments_from_records(
    records: &[AttachmentRecord],
    network_vlan: Option<u16>,
) -> Vec<Attachment> {
    records
        .iter()
        .filter(|r| r.is_lan_attached)
        .filter_map(|r| {
            let serial = r.switch_serial_no.as_ref()?;
            let vlan = r.vlan_id.unwrap_or(0);
            Some(Attachment {
                vlan_id: if Some(vlan) == network_vlan { 0 } else { vlan },
                switch_ports: r.port_names.clone().unwrap_or_default(),
                ..Attachment::new(serial.clone())
            })
        })
        .collect()
}

/// First per-switch result that is not a success marker, rendered for an
/// error message.
pub fn attach_failure(results: &AttachResults) -> Option<String> {
    results
        .iter()
        .find(|(_, status)| !ATTACH_SUCCESS_MARKERS.contains(&status.as_str()))
        .map(|(switch, status)| format!("{switch}: {status}"))
}

// ── Outbound ───────────────────────────────────────────────────────

/// Build the profile sent as `networkTemplateConfig`.
///
/// The layer-2-only flag is derived from the VRF on every write.
pub fn build_template_config(
    network: &Network,
    segment_id: u32,
    vlan: Option<u16>,
) -> NetworkTemplateConfig {
    let p = &network.profile;
    NetworkTemplateConfig {
        is_layer2_only: Some(network.is_layer2_only().to_string()),
        vlan_id: vlan.map(|v| v.to_string()),
        vlan_name: p.vlan_name.clone(),
        gateway_ip_address: p.ipv4_gateway.clone(),
        gateway_ipv6_address: p.ipv6_gateway.clone(),
        intf_description: p.description.clone(),
        mtu: p.mtu.map(|v| v.to_string()),
        secondary_gw1: p.secondary_gw_1.clone(),
        secondary_gw2: p.secondary_gw_2.clone(),
        suppress_arp: flag_text(p.arp_suppression),
        enable_ir: flag_text(p.ingress_replication),
        mcast_group: p.mcast_group.clone(),
        dhcp_server_addr1: p.dhcp_server_1.clone(),
        dhcp_server_addr2: p.dhcp_server_2.clone(),
        vrf_dhcp: p.dhcp_vrf.clone(),
        loopback_id: p.loopback_id.map(|v| v.to_string()),
        tag: p.tag.clone(),
        trm_enabled: flag_text(p.trm_enabled),
        rt_both_auto: flag_text(p.rt_both_auto),
        enable_l3_on_border: flag_text(p.l3_on_border),
        network_name: Some(network.name.clone()),
        segment_id: Some(segment_id.to_string()),
    }
}

/// Build the create/update body. Display name defaults to the network name.
pub fn build_network_payload(
    network: &Network,
    segment_id: u32,
    vlan: Option<u16>,
) -> Result<NetworkPayload, CoreError> {
    let config = build_template_config(network, segment_id, vlan);
    let config = serde_json::to_string(&config)
        .map_err(|e| CoreError::Internal(format!("cannot encode network profile: {e}")))?;

    Ok(NetworkPayload {
        fabric: network.fabric_name.clone(),
        network_name: network.name.clone(),
        display_name: network
            .display_name
            .clone()
            .unwrap_or_else(|| network.name.clone()),
        network_id: segment_id.to_string(),
        network_template: network.template.clone(),
        network_extension_template: network.extension_template.clone(),
        vrf: network.vrf_name.clone(),
        service_network_template: network.service_template.clone(),
        source: network.source.clone(),
        network_template_config: config,
    })
}

/// Build the attach batch for every declared attachment.
///
/// Without `previous` each switch gets its full port list. With `previous`
/// (an update) each switch gets only the ports added and removed since then;
/// an empty string means "no change" and is always sent.
pub fn build_attach_batch(
    network: &Network,
    vlan: Option<u16>,
    previous: Option<&[Attachment]>,
) -> Vec<NetworkAttachments> {
    let lan_attach_list = network
        .attachments
        .iter()
        .map(|a| {
            let (switch_ports, detach_switch_ports) = match previous {
                None => (Some(a.switch_ports.join(",")), None),
                Some(prev) => {
                    let diff = diff_for_serial(prev, &network.attachments, &a.serial_number);
                    (Some(diff.to_add.join(",")), Some(diff.to_remove.join(",")))
                }
            };
            AttachmentRequest {
                fabric: network.fabric_name.clone(),
                network_name: network.name.clone(),
                serial_number: a.serial_number.clone(),
                deployment: a.attach,
                vlan: a.effective_vlan(vlan),
                switch_ports,
                detach_switch_ports,
                dot1q_vlan: a.dot1q_vlan,
                untagged: a.untagged,
                freeform_config: a.free_form_config.clone(),
                extension_values: a.extension_values.clone(),
                instance_values: a.instance_values.clone(),
            }
        })
        .collect();

    vec![NetworkAttachments {
        network_name: network.name.clone(),
        lan_attach_list,
    }]
}

/// Build the detach batch used before deleting a deployed network.
pub fn build_detach_batch(network: &Network) -> Vec<NetworkAttachments> {
    let name = network.remote_name().to_owned();
    let lan_attach_list = network
        .attachments
        .iter()
        .map(|a| AttachmentRequest {
            fabric: network.fabric_name.clone(),
            network_name: name.clone(),
            serial_number: a.serial_number.clone(),
            deployment: false,
            vlan: a.effective_vlan(network.profile.vlan_id),
            switch_ports: Some(String::new()),
            detach_switch_ports: Some(String::new()),
            dot1q_vlan: 0,
            untagged: false,
            freeform_config: Some(String::new()),
            extension_values: Some(String::new()),
            instance_values: Some(String::new()),
        })
        .collect();

    vec![NetworkAttachments {
        network_name: name,
        lan_attach_list,
    }]
}
