// ── Attachment diff engine ──
//
// Port-list set differences per switch. The controller replaces a switch's
// port list on every attach call, so updates send only what changed.

use std::collections::HashSet;

use crate::model::Attachment;

/// Ports to attach and detach on one switch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortDiff {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
}

/// `to_add = desired − previous`, `to_remove = previous − desired`.
///
/// Results keep first-appearance order of their source list; duplicates
/// collapse.
pub fn diff_ports(desired: &[String], previous: &[String]) -> PortDiff {
    PortDiff {
        to_add: difference(desired, previous),
        to_remove: difference(previous, desired),
    }
}

/// Diff the port lists recorded for `serial` in two attachment sets.
/// A switch missing from either side counts as having no ports.
pub fn diff_for_serial(previous: &[Attachment], desired: &[Attachment], serial: &str) -> PortDiff {
    diff_ports(ports_for(desired, serial), ports_for(previous, serial))
}

/// Order-insensitive equality of two port lists.
pub fn same_ports(a: &[String], b: &[String]) -> bool {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a == b
}

fn ports_for<'a>(attachments: &'a [Attachment], serial: &str) -> &'a [String] {
    attachments
        .iter()
        .find(|a| a.serial_number == serial)
        .map(|a| a.switch_ports.as_slice())
        .unwrap_or_default()
}

fn difference(a: &[String], b: &[String]) -> Vec<String> {
    let exclude: HashSet<&str> = b.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for port in a {
        if !exclude.contains(port.as_str()) && seen.insert(port.as_str()) {
            out.push(port.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| (*p).to_string()).collect()
    }

    #[test]
    fn added_and_removed_ports() {
        let diff = diff_ports(
            &ports(&["Eth1/1", "Eth1/3"]),
            &ports(&["Eth1/1", "Eth1/2"]),
        );
        assert_eq!(diff.to_add, ports(&["Eth1/3"]));
        assert_eq!(diff.to_remove, ports(&["Eth1/2"]));
    }

    #[test]
    fn identical_lists_in_any_order_are_no_change() {
        let a = ports(&["Eth1/1", "Eth1/2"]);
        let b = ports(&["Eth1/2", "Eth1/1"]);
        assert_eq!(diff_ports(&a, &a), PortDiff::default());
        assert_eq!(diff_ports(&a, &b), PortDiff::default());
    }

    #[test]
    fn empty_previous_adds_everything() {
        let a = ports(&["Eth1/1", "Eth1/2"]);
        let diff = diff_ports(&a, &[]);
        assert_eq!(diff.to_add, a);
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        let diff = diff_ports(&ports(&["Eth1/4", "Eth1/4"]), &[]);
        assert_eq!(diff.to_add, ports(&["Eth1/4"]));
    }

    #[test]
    fn missing_previous_record_is_empty_set() {
        let previous = vec![Attachment::new("SW2").with_ports(["Eth1/9"])];
        let desired = vec![Attachment::new("SW1").with_ports(["Eth1/1"])];
        let diff = diff_for_serial(&previous, &desired, "SW1");
        assert_eq!(diff.to_add, ports(&["Eth1/1"]));
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn growing_a_switch_adds_only_the_new_port() {
        let previous = vec![Attachment::new("SW1").with_ports(["Eth1/1"])];
        let desired = vec![Attachment::new("SW1").with_ports(["Eth1/1", "Eth1/2"])];
        let diff = diff_for_serial(&previous, &desired, "SW1");
        assert_eq!(diff.to_add, ports(&["Eth1/2"]));
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn same_ports_ignores_order() {
        assert!(same_ports(&ports(&["a", "b"]), &ports(&["b", "a"])));
        assert!(!same_ports(&ports(&["a"]), &ports(&["a", "b"])));
    }
}
