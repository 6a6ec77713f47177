//! Field-by-field comparison of a source interface with its IPAM record.

use crate::adapters::netbox::NbInterface;
use crate::domain::model::{format_vids, Finding, Interface, InterfaceChange, InterfaceMode};
use std::collections::BTreeSet;

/// Where a comparison happens: reported host name and the device's site.
#[derive(Debug, Clone, Copy)]
pub struct DiffContext<'a> {
    pub host: &'a str,
    pub site_id: Option<u64>,
}

impl DiffContext<'_> {
    fn finding(
        &self,
        ipam: &NbInterface,
        title: &str,
        config_value: String,
        ipam_value: String,
        change: InterfaceChange,
    ) -> Finding {
        Finding::report(self.host, &ipam.name, title, config_value, ipam_value).with_fix(
            ipam.id,
            self.site_id,
            change,
        )
    }
}

fn show_vid(vid: Option<u16>) -> String {
    vid.map(|v| v.to_string()).unwrap_or_default()
}

pub fn compare_description(ctx: DiffContext<'_>, source: &Interface, ipam: &NbInterface) -> Option<Finding> {
    if source.description == ipam.description {
        return None;
    }
    Some(ctx.finding(
        ipam,
        "Conflicting description",
        source.description.clone(),
        ipam.description.clone(),
        InterfaceChange::description(source.description.clone()),
    ))
}

pub fn compare_enabled(ctx: DiffContext<'_>, source: &Interface, ipam: &NbInterface) -> Option<Finding> {
    let expected = source.is_enabled();
    if expected == ipam.enabled {
        return None;
    }
    Some(ctx.finding(
        ipam,
        "Conflicting enable status",
        expected.to_string(),
        ipam.enabled.to_string(),
        InterfaceChange::enabled(expected),
    ))
}

/// VLAN membership differences.
///
/// A source with no VLANs against an IPAM interface that has some yields one
/// "VLAN mismatch" that clears everything. Otherwise the untagged VLAN and the
/// tagged set are compared independently. Sources with unknown VLANs are not compared.
pub fn compare_vlans(ctx: DiffContext<'_>, source: &Interface, ipam: &NbInterface) -> Vec<Finding> {
    if source.vlans_unknown {
        return Vec::new();
    }
    let source_untagged = source.untagged_vlan();
    let source_tagged = source.tagged_vlans();
    let ipam_untagged = ipam.untagged_vid();
    let ipam_tagged = ipam.tagged_vids();

    if source_untagged.is_none() && source_tagged.is_empty() {
        if ipam_untagged.is_none() && ipam_tagged.is_empty() {
            return Vec::new();
        }
        let mut ipam_all: Vec<u16> = ipam_untagged.into_iter().collect();
        ipam_all.extend(&ipam_tagged);
        return vec![ctx.finding(
            ipam,
            "VLAN mismatch",
            String::new(),
            format_vids(&ipam_all),
            InterfaceChange {
                mode: Some(None),
                untagged_vlan: Some(None),
                tagged_vlans: Some(Vec::new()),
                ..Default::default()
            },
        )];
    }

    let mut findings = Vec::new();

    if source_untagged != ipam_untagged {
        let mode = if source_tagged.is_empty() {
            InterfaceMode::Access
        } else {
            InterfaceMode::Tagged
        };
        findings.push(ctx.finding(
            ipam,
            "Untagged VLAN mismatch",
            show_vid(source_untagged),
            show_vid(ipam_untagged),
            InterfaceChange {
                mode: Some(Some(mode)),
                untagged_vlan: Some(source_untagged),
                ..Default::default()
            },
        ));
    }

    let source_set: BTreeSet<u16> = source_tagged.iter().copied().collect();
    let ipam_set: BTreeSet<u16> = ipam_tagged.iter().copied().collect();
    if source_set != ipam_set {
        let change = if source_set.is_empty() {
            InterfaceChange {
                mode: Some(Some(InterfaceMode::Access)),
                tagged_vlans: Some(Vec::new()),
                ..Default::default()
            }
        } else {
            InterfaceChange {
                mode: Some(Some(InterfaceMode::Tagged)),
                tagged_vlans: Some(source_set.iter().copied().collect()),
                ..Default::default()
            }
        };
        findings.push(ctx.finding(
            ipam,
            "Tagged VLAN mismatch",
            format_vids(&source_tagged),
            format_vids(&ipam_tagged),
            change,
        ));
    }

    findings
}

/// Description, enable status and VLANs, in that order.
pub fn compare_interface(ctx: DiffContext<'_>, source: &Interface, ipam: &NbInterface) -> Vec<Finding> {
    let mut findings: Vec<Finding> = compare_description(ctx, source, ipam)
        .into_iter()
        .chain(compare_enabled(ctx, source, ipam))
        .collect();
    findings.extend(compare_vlans(ctx, source, ipam));
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::netbox::types::NestedVlan;
    use crate::domain::model::{InterfaceStatus, VlanTag};

    const CTX: DiffContext<'static> = DiffContext {
        host: "sw-01",
        site_id: Some(4),
    };

    fn ipam(untagged: Option<u16>, tagged: &[u16]) -> NbInterface {
        let vlan = |vid: u16| NestedVlan {
            id: 1000 + vid as u64,
            vid,
            name: format!("vlan{}", vid),
        };
        NbInterface {
            id: 42,
            name: "Gi1/0/1".to_string(),
            description: "Uplink".to_string(),
            enabled: true,
            mode: None,
            untagged_vlan: untagged.map(vlan),
            tagged_vlans: tagged.iter().copied().map(vlan).collect(),
        }
    }

    fn source(vlans: Vec<VlanTag>) -> Interface {
        Interface {
            name: "Gi1/0/1".to_string(),
            description: "Uplink".to_string(),
            vlans,
            vlans_unknown: false,
            status: InterfaceStatus::Enabled,
        }
    }

    #[test]
    fn test_identical_interfaces_have_no_findings() {
        let src = source(vec![VlanTag::Untagged(10), VlanTag::Tagged(30), VlanTag::Tagged(20)]);
        assert!(compare_interface(CTX, &src, &ipam(Some(10), &[20, 30])).is_empty());
    }

    #[test]
    fn test_description_and_status() {
        let mut src = source(vec![]);
        src.description = "To core".to_string();
        src.status = InterfaceStatus::Disabled;

        let findings = compare_interface(CTX, &src, &ipam(None, &[]));
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].title, "Conflicting description");
        assert_eq!(findings[0].config_value, "To core");
        assert_eq!(findings[0].ipam_value, "Uplink");
        assert_eq!(findings[1].title, "Conflicting enable status");

        let fix = findings[1].fix.as_ref().unwrap();
        assert_eq!(fix.interface_id, 42);
        assert_eq!(fix.site_id, Some(4));
        assert_eq!(fix.change.enabled, Some(false));
    }

    #[test]
    fn test_no_source_vlans_clears_ipam() {
        let findings = compare_vlans(CTX, &source(vec![]), &ipam(Some(10), &[20]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "VLAN mismatch");
        assert_eq!(findings[0].ipam_value, "10,20");

        let change = &findings[0].fix.as_ref().unwrap().change;
        assert_eq!(change.mode, Some(None));
        assert_eq!(change.untagged_vlan, Some(None));
        assert_eq!(change.tagged_vlans, Some(vec![]));
    }

    #[test]
    fn test_unknown_vlans_are_not_compared() {
        let mut src = source(vec![]);
        src.vlans_unknown = true;
        assert!(compare_vlans(CTX, &src, &ipam(Some(10), &[20])).is_empty());

        src.description = "Changed".to_string();
        let findings = compare_interface(CTX, &src, &ipam(None, &[10, 20]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "Conflicting description");
    }

    #[test]
    fn test_untagged_mismatch_sets_access_mode() {
        let findings = compare_vlans(CTX, &source(vec![VlanTag::Untagged(10)]), &ipam(Some(11), &[]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "Untagged VLAN mismatch");
        let change = &findings[0].fix.as_ref().unwrap().change;
        assert_eq!(change.mode, Some(Some(InterfaceMode::Access)));
        assert_eq!(change.untagged_vlan, Some(Some(10)));
    }

    #[test]
    fn test_tagged_mismatch_ignores_order() {
        let src = source(vec![VlanTag::Tagged(20), VlanTag::Tagged(10)]);
        assert!(compare_vlans(CTX, &src, &ipam(None, &[10, 20])).is_empty());

        let findings = compare_vlans(CTX, &src, &ipam(None, &[10]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "Tagged VLAN mismatch");
        assert_eq!(findings[0].config_value, "20,10");
        let change = &findings[0].fix.as_ref().unwrap().change;
        assert_eq!(change.mode, Some(Some(InterfaceMode::Tagged)));
        assert_eq!(change.tagged_vlans, Some(vec![10, 20]));
    }

    #[test]
    fn test_trunk_with_native_vlan_uses_tagged_mode() {
        let src = source(vec![VlanTag::Untagged(5), VlanTag::Tagged(20)]);
        let findings = compare_vlans(CTX, &src, &ipam(None, &[20]));
        assert_eq!(findings.len(), 1);
        let change = &findings[0].fix.as_ref().unwrap().change;
        assert_eq!(change.mode, Some(Some(InterfaceMode::Tagged)));
        assert_eq!(change.untagged_vlan, Some(Some(5)));
    }

    #[test]
    fn test_extra_ipam_tagged_vlans_are_removed() {
        let findings = compare_vlans(CTX, &source(vec![VlanTag::Untagged(10)]), &ipam(Some(10), &[20]));
        assert_eq!(findings.len(), 1);
        let change = &findings[0].fix.as_ref().unwrap().change;
        assert_eq!(change.tagged_vlans, Some(vec![]));
        assert_eq!(change.mode, Some(Some(InterfaceMode::Access)));
    }
}
