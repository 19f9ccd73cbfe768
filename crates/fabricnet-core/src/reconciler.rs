// ── Network reconciler ──
//
// Drives one network through `Absent → Created → AttachPending →
// Propagating/Deployed` on create and update, back to `Absent` on delete,
// and refreshes local state from the controller on read and import.
// Calls are strictly sequential; each operation awaits one request at a time.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::ReconcileSettings;
use crate::convert;
use crate::diff::same_ports;
use crate::error::CoreError;
use crate::model::{Attachment, DeploymentPhase, Network};
use crate::poller::{self, WaitOutcome};
use crate::remote::FabricRemote;

/// Reconciles declared networks against a controller.
pub struct NetworkReconciler<R> {
    remote: R,
    settings: ReconcileSettings,
}

impl<R: FabricRemote> NetworkReconciler<R> {
    pub fn new(remote: R, settings: ReconcileSettings) -> Self {
        Self { remote, settings }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    // ── Create ───────────────────────────────────────────────────────

    /// Create the network, attach and deploy it if requested, then refresh.
    ///
    /// If attaching fails the network still exists on the controller: local
    /// state is recorded as undeployed and [`CoreError::PartialDeployment`]
    /// is returned.
    pub async fn create(&self, network: &mut Network) -> Result<(), CoreError> {
        validate_attachments(network)?;
        let fabric = network.fabric_name.clone();
        info!(fabric = %fabric, network = %network.name, "creating network");

        let segment_id = match network.network_id {
            Some(id) => id,
            None => self.remote.allocate_segment_id(&fabric).await?,
        };
        let vlan = match network.profile.vlan_id {
            Some(vlan) => vlan,
            None => self.remote.allocate_vlan(&fabric).await?,
        };
        debug!(fabric = %fabric, network = %network.name, segment_id, vlan, "network identifiers");
        network.network_id = Some(segment_id);
        network.profile.vlan_id = Some(vlan);

        let payload = convert::build_network_payload(network, segment_id, Some(vlan))?;
        self.remote.create_network(&fabric, &payload).await?;
        network.id = Some(network.name.clone());
        network.phase = DeploymentPhase::Created;

        if network.deploy {
            self.attach(network, Some(vlan), None, "created").await?;
            self.deploy_and_wait(network).await;
        }

        self.read(network).await
    }

    // ── Update ───────────────────────────────────────────────────────

    /// Push the declared state over `prior`, the state recorded by the last
    /// create/update/read. Identifiers are reused, never allocated.
    ///
    /// Fabric, name and an assigned segment id are fixed for the lifetime of
    /// the network; changing any of them is rejected before any call.
    pub async fn update(&self, prior: &Network, network: &mut Network) -> Result<(), CoreError> {
        if prior.deploy && !network.deploy {
            return Err(CoreError::validation(
                "deploy cannot change from true to false; delete the network to undeploy it",
            ));
        }
        if network.fabric_name != prior.fabric_name || network.name != prior.name {
            return Err(CoreError::validation(format!(
                "network {}/{} cannot be renamed to {}/{}; delete and recreate it",
                prior.fabric_name, prior.name, network.fabric_name, network.name
            )));
        }
        validate_attachments(network)?;

        let fabric = prior.fabric_name.clone();
        let remote_name = prior.remote_name().to_owned();
        let segment_id = match (prior.network_id, network.network_id) {
            (Some(recorded), Some(declared)) if recorded != declared => {
                return Err(CoreError::validation(format!(
                    "segment id of network {remote_name} is {recorded} and cannot change to {declared}"
                )));
            }
            (Some(id), _) | (None, Some(id)) => id,
            (None, None) => {
                return Err(CoreError::validation(format!(
                    "network {remote_name} has no recorded segment id"
                )));
            }
        };
        let vlan = network.profile.vlan_id.or(prior.profile.vlan_id);
        info!(fabric = %fabric, network = %remote_name, "updating network");

        network.id = prior.id.clone();
        network.phase = prior.phase;
        network.network_id = Some(segment_id);
        network.profile.vlan_id = vlan;

        let payload = convert::build_network_payload(network, segment_id, vlan)?;
        self.remote
            .update_network(&fabric, &remote_name, &payload)
            .await?;

        if network.deploy {
            self.attach(network, vlan, Some(prior.attachments.as_slice()), "updated")
                .await?;
            self.deploy_and_wait(network).await;
        }

        self.read(network).await
    }

    // ── Read ─────────────────────────────────────────────────────────

    /// Refresh `network` from the controller.
    ///
    /// The network document overwrites every computed attribute. Declared
    /// attachments are reconciled against the controller's records: the
    /// attach flag always, the VLAN only where an override was declared,
    /// ports only when the sets differ.
    pub async fn read(&self, network: &mut Network) -> Result<(), CoreError> {
        let fabric = network.fabric_name.clone();
        let name = network.remote_name().to_owned();
        debug!(fabric = %fabric, network = %name, "reading network");

        let doc = self.remote.get_network(&fabric, &name).await?;
        convert::apply_network_document(network, &doc);

        let records = match self.remote.list_attachments(&fabric, &name).await {
            Ok(records) => records,
            Err(e) => {
                network.deploy = false;
                return Err(e);
            }
        };
        network.deploy = poller::any_deployed(&records);

        for attachment in &mut network.attachments {
            let status = poller::switch_attach_status(&records, &attachment.serial_number);
            attachment.attach = status.attached;
            if attachment.vlan_id != 0 {
                attachment.vlan_id = status.vlan;
            }
            if let Some(ports) = status.ports {
                if !same_ports(&ports, &attachment.switch_ports) {
                    attachment.switch_ports = ports;
                }
            }
        }

        network.phase = match (network.deploy, network.phase) {
            (true, _) => DeploymentPhase::Deployed,
            (false, phase @ (DeploymentPhase::AttachPending | DeploymentPhase::Propagating)) => {
                phase
            }
            (false, _) => DeploymentPhase::Created,
        };
        Ok(())
    }

    // ── Delete ───────────────────────────────────────────────────────

    /// Detach and undeploy (if deployed), then delete the network.
    ///
    /// The undeploy wait watches only the declared switches; a switch the
    /// network is attached to outside this declaration does not hold it up.
    ///
    /// Identity is cleared only once the delete call succeeds.
    pub async fn delete(&self, network: &mut Network) -> Result<(), CoreError> {
        let fabric = network.fabric_name.clone();
        let name = network.remote_name().to_owned();
        info!(fabric = %fabric, network = %name, "deleting network");

        if network.deploy && !network.attachments.is_empty() {
            let batch = convert::build_detach_batch(network);
            let results = self.remote.submit_attachments(&fabric, &batch).await?;
            if let Some(reason) = convert::attach_failure(&results) {
                return Err(CoreError::DetachFailed {
                    network: name,
                    reason,
                });
            }

            match self.remote.deploy_network(&fabric, &name).await {
                Ok(()) => {
                    let serials: Vec<&str> = network
                        .attachments
                        .iter()
                        .map(|a| a.serial_number.as_str())
                        .collect();
                    let outcome = poller::wait_for_undeploy(
                        &self.remote,
                        &fabric,
                        &name,
                        &serials,
                        &self.settings.deployment_wait,
                    )
                    .await;
                    if outcome == WaitOutcome::StillPropagating {
                        warn!(fabric = %fabric, network = %name, "undeploy not confirmed before delete");
                    }
                }
                Err(e) => {
                    warn!(fabric = %fabric, network = %name, error = %e, "undeploy trigger failed");
                    network.deploy = false;
                }
            }
        }

        self.remote.delete_network(&fabric, &name).await?;
        network.id = None;
        network.phase = DeploymentPhase::Absent;
        Ok(())
    }

    // ── Import ───────────────────────────────────────────────────────

    /// Adopt an existing network, addressed as `"<fabric>:<network>"`.
    pub async fn import(&self, key: &str) -> Result<Network, CoreError> {
        let (fabric, name) = parse_import_key(key)?;
        info!(fabric, network = name, "importing network");

        let doc = self.remote.get_network(fabric, name).await?;
        let mut network = Network::new(fabric, name);
        convert::apply_network_document(&mut network, &doc);
        network.id = Some(name.to_owned());

        network.deploy = poller::is_deployed(&self.remote, fabric, name).await?;
        network.attachments = match self.remote.list_attachments(fabric, name).await {
            Ok(records) => convert::attachments_from_records(&records, network.profile.vlan_id),
            Err(e) => {
                warn!(fabric, network = name, error = %e, "cannot list attachments; importing none");
                Vec::new()
            }
        };
        network.phase = if network.deploy {
            DeploymentPhase::Deployed
        } else {
            DeploymentPhase::Created
        };
        Ok(network)
    }

    // ── Steps ────────────────────────────────────────────────────────

    /// Submit the attach batch and check every per-switch result.
    async fn attach(
        &self,
        network: &mut Network,
        vlan: Option<u16>,
        previous: Option<&[Attachment]>,
        action: &str,
    ) -> Result<(), CoreError> {
        let batch = convert::build_attach_batch(network, vlan, previous);
        let failure = match self
            .remote
            .submit_attachments(&network.fabric_name, &batch)
            .await
        {
            Ok(results) => convert::attach_failure(&results),
            Err(e) => Some(e.to_string()),
        };

        if let Some(reason) = failure {
            warn!(network = %network.name, reason = %reason, "attach failed; recording network as undeployed");
            network.mark_undeployed();
            return Err(CoreError::PartialDeployment {
                network: network.name.clone(),
                action: action.into(),
                reason,
            });
        }
        network.phase = DeploymentPhase::AttachPending;
        Ok(())
    }

    /// Trigger deployment and wait a bounded time for it to show up.
    /// A rejected trigger is recorded as `deploy = false` and not waited on.
    async fn deploy_and_wait(&self, network: &mut Network) {
        let fabric = network.fabric_name.clone();
        let name = network.remote_name().to_owned();

        if let Err(e) = self.remote.deploy_network(&fabric, &name).await {
            warn!(fabric = %fabric, network = %name, error = %e, "deploy trigger failed");
            network.deploy = false;
            return;
        }

        network.phase = match poller::wait_for_deployment(
            &self.remote,
            &fabric,
            &name,
            true,
            &self.settings.deployment_wait,
        )
        .await
        {
            WaitOutcome::Settled => {
                info!(fabric = %fabric, network = %name, "network deployed");
                DeploymentPhase::Deployed
            }
            WaitOutcome::StillPropagating => DeploymentPhase::Propagating,
        };
    }
}

/// Split `"<fabric>:<network>"`; both parts must be present and non-empty.
pub fn parse_import_key(key: &str) -> Result<(&str, &str), CoreError> {
    let parts: Vec<&str> = key.split(':').collect();
    match parts.as_slice() {
        [fabric, name] if !fabric.is_empty() && !name.is_empty() => Ok((*fabric, *name)),
        _ => Err(CoreError::validation(format!(
            "import key {key:?} is not of the form <fabric>:<network>"
        ))),
    }
}

fn validate_attachments(network: &Network) -> Result<(), CoreError> {
    if network.deploy && network.attachments.is_empty() {
        return Err(CoreError::validation(
            "attachments must be configured when deploy is true",
        ));
    }
    let mut seen = HashSet::new();
    for attachment in &network.attachments {
        if !seen.insert(attachment.serial_number.as_str()) {
            return Err(CoreError::validation(format!(
                "switch {} is attached more than once",
                attachment.serial_number
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use fabricnet_api::models::{AttachmentRecord, NetworkDocument};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_test::assert_err;

    use super::*;
    use crate::config::DeploymentWait;
    use crate::remote::fake::{FakeRemote, FakeState};

    fn settings() -> ReconcileSettings {
        ReconcileSettings {
            deployment_wait: DeploymentWait {
                initial_interval: Duration::from_millis(100),
                max_interval: Duration::from_millis(200),
                backoff_multiplier: 2.0,
                timeout: Duration::from_secs(1),
            },
        }
    }

    fn document(vlan: u16) -> NetworkDocument {
        serde_json::from_value(json!({
            "fabric": "fab1",
            "networkName": "web",
            "networkId": "30001",
            "networkTemplate": "Default_Network_Universal",
            "networkExtensionTemplate": "Default_Network_Extension_Universal",
            "vrf": "NA",
            "networkTemplateConfig": json!({ "vlanId": vlan.to_string() }).to_string()
        }))
        .unwrap()
    }

    fn records(value: serde_json::Value) -> Vec<AttachmentRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn deployed_sw1(ports: &str) -> Vec<AttachmentRecord> {
        records(json!([{
            "switchSerialNo": "SW1",
            "lanAttachState": "DEPLOYED",
            "isLanAttached": true,
            "vlanId": 2300,
            "portNames": ports
        }]))
    }

    fn success(state: &mut FakeState) {
        state.attach_results.insert("SW1".into(), "SUCCESS".into());
    }

    fn declared() -> Network {
        let mut net = Network::new("fab1", "web");
        net.attachments = vec![Attachment::new("SW1").with_ports(["Eth1/1"])];
        net
    }

    #[tokio::test(start_paused = true)]
    async fn create_deploys_and_records_state() {
        let remote = FakeRemote::new(|s| {
            success(s);
            s.network = Some(document(2300));
            s.attachment_polls = vec![deployed_sw1("Eth1/1")].into();
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();

        reconciler.create(&mut net).await.unwrap();

        assert_eq!(net.id.as_deref(), Some("web"));
        assert_eq!(net.network_id, Some(30001));
        assert_eq!(net.profile.vlan_id, Some(2300));
        assert!(net.deploy);
        assert_eq!(net.phase, DeploymentPhase::Deployed);
        assert_eq!(net.attachments[0].switch_ports, vec!["Eth1/1".to_string()]);
        let calls = reconciler.remote().calls();
        assert_eq!(
            &calls[..5],
            &[
                "allocate_segment_id",
                "allocate_vlan",
                "create_network web",
                "submit_attachments",
                "deploy_network web",
            ]
        );

        let batch = reconciler.remote().with(|s| s.batches[0].clone());
        let req = &batch[0].lan_attach_list[0];
        assert_eq!(req.vlan, 2300);
        assert_eq!(req.switch_ports.as_deref(), Some("Eth1/1"));
    }

    #[tokio::test(start_paused = true)]
    async fn declared_identifiers_skip_allocation() {
        let remote = FakeRemote::new(|s| {
            success(s);
            s.network = Some(document(2500));
            s.attachment_polls = vec![deployed_sw1("Eth1/1")].into();
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();
        net.network_id = Some(31000);
        net.profile.vlan_id = Some(2500);

        reconciler.create(&mut net).await.unwrap();

        let calls = reconciler.remote().calls();
        assert!(!calls.iter().any(|c| c.starts_with("allocate")));
        let payload = reconciler.remote().with(|s| s.created[0].clone());
        assert_eq!(payload.network_id, "31000");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_marker_leaves_network_created_but_undeployed() {
        let remote = FakeRemote::new(|s| {
            s.attach_results.insert("SW1".into(), "FAILED".into());
            s.network = Some(document(2300));
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();

        let err = reconciler.create(&mut net).await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::PartialDeployment { ref action, .. } if action == "created"
        ));
        assert!(!reconciler.remote().calls().iter().any(|c| c.starts_with("deploy")));

        reconciler.read(&mut net).await.unwrap();
        assert!(!net.deploy);
        assert!(net.attachments.is_empty());
        assert_eq!(net.id.as_deref(), Some("web"));
        assert_eq!(net.phase, DeploymentPhase::Created);
    }

    #[tokio::test(start_paused = true)]
    async fn attach_call_error_is_a_partial_deployment() {
        let remote = FakeRemote::new(|s| {
            s.attach_error = true;
            s.network = Some(document(2300));
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();

        let err = reconciler.create(&mut net).await.unwrap_err();

        assert!(matches!(err, CoreError::PartialDeployment { .. }));
        assert!(!net.deploy);
        assert!(net.attachments.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deploy_trigger_failure_is_not_fatal() {
        let remote = FakeRemote::new(|s| {
            success(s);
            s.deploy_error = true;
            s.network = Some(document(2300));
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();

        reconciler.create(&mut net).await.unwrap();

        assert!(!net.deploy);
        assert_eq!(net.phase, DeploymentPhase::AttachPending);
        let calls = reconciler.remote().calls();
        assert_eq!(calls.iter().filter(|c| c.starts_with("list_attachments")).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_deploy_is_recorded_as_propagating() {
        let remote = FakeRemote::new(|s| {
            success(s);
            s.network = Some(document(2300));
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();

        reconciler.create(&mut net).await.unwrap();

        assert!(!net.deploy);
        assert_eq!(net.phase, DeploymentPhase::Propagating);
    }

    #[tokio::test]
    async fn deploy_without_attachments_is_rejected_before_any_call() {
        let reconciler = NetworkReconciler::new(FakeRemote::new(|_| {}), settings());
        let mut net = Network::new("fab1", "web");

        assert_err!(reconciler.create(&mut net).await);
        assert!(reconciler.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn duplicate_serials_are_rejected() {
        let reconciler = NetworkReconciler::new(FakeRemote::new(|_| {}), settings());
        let mut net = declared();
        net.attachments.push(Attachment::new("SW1"));

        let err = reconciler.create(&mut net).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(reconciler.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn undeploy_through_update_is_rejected_before_any_call() {
        let reconciler = NetworkReconciler::new(FakeRemote::new(|_| {}), settings());
        let mut prior = declared();
        prior.id = Some("web".into());
        prior.network_id = Some(30001);
        let mut next = prior.clone();
        next.deploy = false;

        let err = reconciler.update(&prior, &mut next).await.unwrap_err();

        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(reconciler.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn update_cannot_move_or_rename_the_network() {
        let reconciler = NetworkReconciler::new(FakeRemote::new(|_| {}), settings());
        let mut prior = declared();
        prior.id = Some("web".into());
        prior.network_id = Some(30001);

        let mut moved = prior.clone();
        moved.fabric_name = "fab2".into();
        let mut renamed = prior.clone();
        renamed.name = "web2".into();

        for mut next in [moved, renamed] {
            let err = reconciler.update(&prior, &mut next).await.unwrap_err();
            assert!(matches!(err, CoreError::ValidationFailed { .. }));
        }
        assert!(reconciler.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn update_cannot_change_assigned_segment_id() {
        let reconciler = NetworkReconciler::new(FakeRemote::new(|_| {}), settings());
        let mut prior = declared();
        prior.id = Some("web".into());
        prior.network_id = Some(30001);
        let mut next = prior.clone();
        next.network_id = Some(40000);

        let err = reconciler.update(&prior, &mut next).await.unwrap_err();

        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(reconciler.remote().calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn update_keeps_recorded_segment_id_when_none_declared() {
        let remote = FakeRemote::new(|s| {
            success(s);
            s.network = Some(document(2300));
            s.attachment_polls = vec![deployed_sw1("Eth1/1")].into();
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut prior = declared();
        prior.id = Some("web".into());
        prior.network_id = Some(30001);
        let mut next = declared();

        reconciler.update(&prior, &mut next).await.unwrap();

        let payload = reconciler.remote().with(|s| s.updated[0].clone());
        assert_eq!(payload.network_id, "30001");
    }

    #[tokio::test(start_paused = true)]
    async fn update_sends_port_diff_and_never_allocates() {
        let remote = FakeRemote::new(|s| {
            success(s);
            s.network = Some(document(2300));
            s.attachment_polls = vec![deployed_sw1("Eth1/1,Eth1/2")].into();
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut prior = declared();
        prior.id = Some("web".into());
        prior.network_id = Some(30001);
        prior.profile.vlan_id = Some(2300);
        prior.phase = DeploymentPhase::Deployed;
        let mut next = declared();
        next.attachments[0].switch_ports = vec!["Eth1/1".into(), "Eth1/2".into()];

        reconciler.update(&prior, &mut next).await.unwrap();

        let calls = reconciler.remote().calls();
        assert!(!calls.iter().any(|c| c.starts_with("allocate")));
        assert_eq!(calls[0], "update_network web");

        let payload = reconciler.remote().with(|s| s.updated[0].clone());
        assert_eq!(payload.network_id, "30001");
        let cfg: serde_json::Value = serde_json::from_str(&payload.network_template_config).unwrap();
        assert_eq!(cfg["vlanId"], json!("2300"));

        let batch = reconciler.remote().with(|s| s.batches[0].clone());
        let req = &batch[0].lan_attach_list[0];
        assert_eq!(req.switch_ports.as_deref(), Some("Eth1/2"));
        assert_eq!(req.detach_switch_ports.as_deref(), Some(""));

        assert_eq!(next.phase, DeploymentPhase::Deployed);
        assert_eq!(
            next.attachments[0].switch_ports,
            vec!["Eth1/1".to_string(), "Eth1/2".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_update_reports_updated_action() {
        let remote = FakeRemote::new(|s| {
            s.attach_results.insert("SW1".into(), "FAILED".into());
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut prior = declared();
        prior.id = Some("web".into());
        prior.network_id = Some(30001);
        let mut next = declared();

        let err = reconciler.update(&prior, &mut next).await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::PartialDeployment { ref action, .. } if action == "updated"
        ));
        assert!(!next.deploy);
        assert_eq!(next.phase, DeploymentPhase::Created);
    }

    #[tokio::test]
    async fn read_keeps_inherited_vlan_and_same_port_set() {
        let remote = FakeRemote::new(|s| {
            s.network = Some(document(2300));
            s.attachment_polls = vec![deployed_sw1("Eth1/2,Eth1/1")].into();
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();
        net.id = Some("web".into());
        net.attachments[0].switch_ports = vec!["Eth1/1".into(), "Eth1/2".into()];

        reconciler.read(&mut net).await.unwrap();

        let a = &net.attachments[0];
        assert!(a.attach);
        assert_eq!(a.vlan_id, 0);
        assert_eq!(a.switch_ports, vec!["Eth1/1".to_string(), "Eth1/2".to_string()]);
        assert_eq!(net.profile.arp_suppression, Some(false));
    }

    #[tokio::test]
    async fn read_failure_on_deploy_status_forces_undeployed() {
        let remote = FakeRemote::new(|s| {
            s.network = Some(document(2300));
            s.list_error_after = Some(0);
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();
        net.id = Some("web".into());

        assert_err!(reconciler.read(&mut net).await);
        assert!(!net.deploy);
    }

    #[tokio::test]
    async fn read_of_missing_network_is_not_found() {
        let reconciler = NetworkReconciler::new(FakeRemote::new(|_| {}), settings());
        let mut net = declared();

        let err = reconciler.read(&mut net).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_detaches_undeploys_then_deletes() {
        let remote = FakeRemote::new(|s| {
            success(s);
            s.attachment_polls = vec![deployed_sw1("Eth1/1"), Vec::new()].into();
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();
        net.id = Some("web".into());
        net.profile.vlan_id = Some(2300);

        reconciler.delete(&mut net).await.unwrap();

        assert_eq!(net.id, None);
        assert_eq!(net.phase, DeploymentPhase::Absent);
        let calls = reconciler.remote().calls();
        assert_eq!(calls.first().map(String::as_str), Some("submit_attachments"));
        assert_eq!(calls.last().map(String::as_str), Some("delete_network web"));

        let batch = reconciler.remote().with(|s| s.batches[0].clone());
        let req = &batch[0].lan_attach_list[0];
        assert!(!req.deployment);
        assert_eq!(req.vlan, 2300);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_does_not_wait_on_undeclared_switches() {
        let remote = FakeRemote::new(|s| {
            success(s);
            s.attachment_polls = vec![records(json!([
                { "switchSerialNo": "SW1", "lanAttachState": "NA", "isLanAttached": false },
                { "switchSerialNo": "SW9", "lanAttachState": "DEPLOYED", "isLanAttached": true }
            ]))]
            .into();
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();
        net.id = Some("web".into());

        let started = tokio::time::Instant::now();
        reconciler.delete(&mut net).await.unwrap();

        assert!(started.elapsed() < reconciler.settings().deployment_wait.timeout);
        let calls = reconciler.remote().calls();
        assert_eq!(
            calls.iter().filter(|c| c.starts_with("list_attachments")).count(),
            1
        );
        assert_eq!(calls.last().map(String::as_str), Some("delete_network web"));
        assert_eq!(net.phase, DeploymentPhase::Absent);
    }

    #[tokio::test]
    async fn delete_stops_on_detach_failure() {
        let remote = FakeRemote::new(|s| {
            s.attach_results.insert("SW1".into(), "FAILED".into());
        });
        let reconciler = NetworkReconciler::new(remote, settings());
        let mut net = declared();
        net.id = Some("web".into());

        let err = reconciler.delete(&mut net).await.unwrap_err();

        assert!(matches!(err, CoreError::DetachFailed { .. }));
        assert_eq!(net.id.as_deref(), Some("web"));
        assert!(!reconciler.remote().calls().iter().any(|c| c.starts_with("delete")));
    }

    #[tokio::test]
    async fn delete_of_undeployed_network_skips_detach() {
        let reconciler = NetworkReconciler::new(FakeRemote::new(|_| {}), settings());
        let mut net = Network::new("fab1", "web");
        net.deploy = false;
        net.id = Some("web".into());

        reconciler.delete(&mut net).await.unwrap();

        assert_eq!(reconciler.remote().calls(), vec!["delete_network web".to_string()]);
    }

    #[test]
    fn import_key_parsing() {
        assert_eq!(parse_import_key("fab1:web").unwrap(), ("fab1", "web"));
        for bad in ["fab1", "fab1:", ":web", "a:b:c", ""] {
            assert!(parse_import_key(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[tokio::test]
    async fn malformed_import_key_makes_no_calls() {
        let reconciler = NetworkReconciler::new(FakeRemote::new(|_| {}), settings());

        assert_err!(reconciler.import("fab1-web").await);
        assert!(reconciler.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn import_seeds_attachments_from_records() {
        let remote = FakeRemote::new(|s| {
            s.network = Some(document(2300));
            s.attachment_polls = vec![deployed_sw1("Eth1/1")].into();
        });
        let reconciler = NetworkReconciler::new(remote, settings());

        let net = reconciler.import("fab1:web").await.unwrap();

        assert_eq!(net.id.as_deref(), Some("web"));
        assert!(net.deploy);
        assert_eq!(net.phase, DeploymentPhase::Deployed);
        assert_eq!(net.attachments.len(), 1);
        assert_eq!(net.attachments[0].vlan_id, 0);
    }

    #[tokio::test]
    async fn import_without_attachment_list_imports_none() {
        let remote = FakeRemote::new(|s| {
            s.network = Some(document(2300));
            s.attachment_polls = vec![deployed_sw1("Eth1/1")].into();
            s.list_error_after = Some(1);
        });
        let reconciler = NetworkReconciler::new(remote, settings());

        let net = reconciler.import("fab1:web").await.unwrap();

        assert!(net.deploy);
        assert!(net.attachments.is_empty());
    }

    #[tokio::test]
    async fn import_fails_when_deploy_status_unavailable() {
        let remote = FakeRemote::new(|s| {
            s.network = Some(document(2300));
            s.list_error_after = Some(0);
        });
        let reconciler = NetworkReconciler::new(remote, settings());

        assert_err!(reconciler.import("fab1:web").await);
    }
}
