// ── Deployment status poller ──
//
// Deployment on the controller is asynchronous: the deploy trigger returns
// immediately and switches report `DEPLOYED` some time later. This module
// answers "is it deployed now?" and waits a bounded time for an answer.

use fabricnet_api::models::AttachmentRecord;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::config::DeploymentWait;
use crate::error::CoreError;
use crate::model::{LanAttachState, SwitchAttachStatus};
use crate::remote::FabricRemote;

/// How a bounded deployment wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The controller reported the target state.
    Settled,
    /// The wait timed out, or a poll failed, before the target state was seen.
    StillPropagating,
}

/// `true` if any switch reports the network as deployed.
pub fn any_deployed(records: &[AttachmentRecord]) -> bool {
    records.iter().any(|r| {
        r.lan_attach_state
            .as_deref()
            .is_some_and(|s| LanAttachState::from_wire(s) == LanAttachState::Deployed)
    })
}

/// Fetch attachment records and check whether any switch is deployed.
pub async fn is_deployed<R: FabricRemote>(
    remote: &R,
    fabric: &str,
    network: &str,
) -> Result<bool, CoreError> {
    let records = remote.list_attachments(fabric, network).await?;
    Ok(any_deployed(&records))
}

/// Attachment status of one switch.
///
/// Records for other serials, or a record that is not attached, give the
/// detached default.
pub fn switch_attach_status(records: &[AttachmentRecord], serial: &str) -> SwitchAttachStatus {
    records
        .iter()
        .find(|r| r.switch_serial_no.as_deref() == Some(serial) && r.is_lan_attached)
        .map(|r| SwitchAttachStatus {
            attached: true,
            ports: r.port_names.clone(),
            vlan: r.vlan_id.unwrap_or(0),
        })
        .unwrap_or_default()
}

/// `true` if any of `serials` reports the network as deployed.
pub fn deployed_on_any(records: &[AttachmentRecord], serials: &[&str]) -> bool {
    records.iter().any(|r| {
        r.switch_serial_no
            .as_deref()
            .is_some_and(|serial| serials.contains(&serial))
            && r.lan_attach_state
                .as_deref()
                .is_some_and(|s| LanAttachState::from_wire(s) == LanAttachState::Deployed)
    })
}

/// Poll until the deployed state equals `target` or the wait runs out.
///
/// Sleeps before every check, growing the interval by the configured
/// multiplier. A failed poll ends the wait early.
pub async fn wait_for_deployment<R: FabricRemote>(
    remote: &R,
    fabric: &str,
    network: &str,
    target: bool,
    wait: &DeploymentWait,
) -> WaitOutcome {
    wait_until(remote, fabric, network, wait, |records| {
        any_deployed(records) == target
    })
    .await
}

/// Poll until none of `serials` reports the network as deployed.
///
/// Switches outside `serials` are ignored.
pub async fn wait_for_undeploy<R: FabricRemote>(
    remote: &R,
    fabric: &str,
    network: &str,
    serials: &[&str],
    wait: &DeploymentWait,
) -> WaitOutcome {
    wait_until(remote, fabric, network, wait, |records| {
        !deployed_on_any(records, serials)
    })
    .await
}

async fn wait_until<R, F>(
    remote: &R,
    fabric: &str,
    network: &str,
    wait: &DeploymentWait,
    settled: F,
) -> WaitOutcome
where
    R: FabricRemote,
    F: Fn(&[AttachmentRecord]) -> bool,
{
    let deadline = Instant::now() + wait.timeout;
    let mut interval = wait.initial_interval;
    let mut polls = 0u32;

    loop {
        let now = Instant::now();
        if now >= deadline {
            warn!(
                fabric,
                network,
                polls,
                "deployment still propagating after {:?}",
                wait.timeout
            );
            return WaitOutcome::StillPropagating;
        }
        sleep(interval.min(deadline - now)).await;
        polls += 1;

        match remote.list_attachments(fabric, network).await {
            Ok(records) if settled(&records) => {
                debug!(fabric, network, polls, "deployment settled");
                return WaitOutcome::Settled;
            }
            Ok(_) => debug!(fabric, network, polls, "deployment not settled yet"),
            Err(e) => {
                warn!(fabric, network, error = %e, "deployment status poll failed");
                return WaitOutcome::StillPropagating;
            }
        }
        interval = wait.next_interval(interval);
    }
}
