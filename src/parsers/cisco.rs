//! Cisco IOS running-config parsing.
//!
//! The configuration is read as a list of top-level statements, each with the
//! indented lines that follow it. That is all the structure the interface and
//! VLAN extraction below needs.

use crate::domain::device::{DeviceConfig, InterfaceAddress};
use crate::domain::model::{parse_vid, VlanTag};
use crate::utils::error::{ReconcileError, Result};
use regex::Regex;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::LazyLock;

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^hostname\s+(\S+)").unwrap());
static DEFAULT_GATEWAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ip default-gateway\s+(\S+)").unwrap());
static INTERFACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^interface\s+(\S+)").unwrap());
static DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+description\s+(.*)$").unwrap());
static TRUNK_ALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"switchport trunk allowed vlan\s+(.+)$").unwrap());
static ACCESS_VLAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"switchport access vlan\s+(\S+)").unwrap());
static SWITCHPORT_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"switchport mode\s+(access|trunk)").unwrap());
static IP_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ip address (\d+\.\d+\.\d+\.\d+) (\d+\.\d+\.\d+\.\d+)").unwrap()
});

/// A top-level statement and its indented children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlock {
    pub text: String,
    pub children: Vec<String>,
}

impl ConfigBlock {
    pub fn has_child(&self, exact: &str) -> bool {
        self.children.iter().any(|c| c.trim() == exact)
    }

    pub fn child_captures<'a>(&'a self, re: &'a Regex) -> impl Iterator<Item = regex::Captures<'a>> + 'a {
        self.children.iter().filter_map(move |c| re.captures(c))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    pub blocks: Vec<ConfigBlock>,
}

impl ConfigTree {
    pub fn parse(text: &str) -> Self {
        let mut blocks: Vec<ConfigBlock> = Vec::new();
        let mut open = false;

        for raw in text.lines() {
            let line = raw.trim_end();
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                continue;
            }
            let indented = trimmed.len() != line.len();

            if trimmed.starts_with('!') {
                // A bang at column 0 ends the current block.
                if !indented {
                    open = false;
                }
                continue;
            }

            if indented {
                if let (true, Some(block)) = (open, blocks.last_mut()) {
                    block.children.push(line.to_string());
                }
            } else {
                blocks.push(ConfigBlock {
                    text: line.to_string(),
                    children: Vec::new(),
                });
                open = true;
            }
        }

        Self { blocks }
    }

    pub fn find_objects<'a>(&'a self, re: &'a Regex) -> impl Iterator<Item = &'a ConfigBlock> + 'a {
        self.blocks.iter().filter(move |b| re.is_match(&b.text))
    }

    /// Every line of the configuration, top-level and indented.
    pub fn all_lines(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().flat_map(|b| {
            std::iter::once(b.text.as_str()).chain(b.children.iter().map(String::as_str))
        })
    }
}

/// Expands a VLAN list such as `1,5-7,10` into individual ids.
pub fn expand_vlans(list: &str) -> Result<Vec<u16>> {
    let mut expanded = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_vid(start)?;
                let end = parse_vid(end)?;
                if start > end {
                    return Err(ReconcileError::parse(
                        "VLAN list",
                        format!("range {} is reversed", part),
                    ));
                }
                expanded.extend(start..=end);
            }
            None => expanded.push(parse_vid(part)?),
        }
    }
    Ok(expanded)
}

pub fn parse_config_file(path: &Path) -> Result<DeviceConfig> {
    let text = std::fs::read_to_string(path)?;
    parse_device_config(&path.display().to_string(), &text)
}

pub fn parse_device_config(source_name: &str, text: &str) -> Result<DeviceConfig> {
    let tree = ConfigTree::parse(text);
    let mut device = DeviceConfig {
        source_name: source_name.to_string(),
        hostname: parse_hostname(source_name, &tree)?,
        gateway: parse_default_gateway(source_name, &tree)?,
        ..Default::default()
    };

    for block in tree.find_objects(&INTERFACE) {
        let Some(name) = INTERFACE.captures(&block.text).map(|c| c[1].to_string()) else {
            continue;
        };

        if name.contains("Vlan") {
            device.svis.push(name.clone());
        } else {
            device.regular_interfaces.push(name.clone());
        }

        let description = block
            .child_captures(&DESCRIPTION)
            .next()
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        device.descriptions.insert(name.clone(), description);

        if block.has_child("shutdown") && !block.has_child("no shutdown") {
            device.disabled_interfaces.push(name.clone());
        }

        let mode = block
            .child_captures(&SWITCHPORT_MODE)
            .last()
            .map(|c| c[1].to_string());
        if block.has_child("switchport trunk encapsulation dot1q") || mode.as_deref() == Some("trunk") {
            device.trunk_interfaces.push(name.clone());
        }
        if mode.as_deref() == Some("access") {
            device.access_interfaces.push(name.clone());
        }

        match interface_vlans(source_name, &name, block, mode.as_deref())? {
            Some(tags) if !tags.is_empty() => {
                device.vlan_mapping.insert(name, tags);
            }
            Some(_) => {}
            None => device.unsupported_vlan_interfaces.push(name),
        }
    }

    for line in tree.all_lines() {
        let Some(caps) = IP_ADDRESS.captures(line) else {
            continue;
        };
        let (Ok(address), Ok(mask)) = (caps[1].parse::<Ipv4Addr>(), caps[2].parse::<Ipv4Addr>()) else {
            tracing::warn!("{}: ignoring malformed address line '{}'", source_name, line.trim());
            continue;
        };
        match InterfaceAddress::from_mask(address, mask) {
            Some(addr) => device.ip_addresses.push(addr),
            None => tracing::warn!("{}: ignoring non-contiguous mask {} on {}", source_name, mask, address),
        }
    }

    tracing::debug!(
        "{}: {} interfaces, {} SVIs, {} VLANs",
        device.hostname,
        device.regular_interfaces.len(),
        device.svis.len(),
        device.all_vlans().len()
    );
    Ok(device)
}

fn parse_hostname(source_name: &str, tree: &ConfigTree) -> Result<String> {
    let hostnames: Vec<String> = tree
        .find_objects(&HOSTNAME)
        .filter_map(|b| HOSTNAME.captures(&b.text).map(|c| c[1].to_string()))
        .collect();
    match hostnames.as_slice() {
        [] => Err(ReconcileError::parse(
            source_name,
            "No hostname found. Aborting!",
        )),
        [hostname] => Ok(hostname.clone()),
        _ => Err(ReconcileError::parse(
            source_name,
            "Multiple hostnames found. Aborting!",
        )),
    }
}

fn parse_default_gateway(source_name: &str, tree: &ConfigTree) -> Result<Option<String>> {
    let gateways: Vec<String> = tree
        .find_objects(&DEFAULT_GATEWAY)
        .filter_map(|b| DEFAULT_GATEWAY.captures(&b.text).map(|c| c[1].to_string()))
        .collect();
    if gateways.len() > 1 {
        return Err(ReconcileError::parse(
            source_name,
            "Multiple default gateways found. Aborting!",
        ));
    }
    Ok(gateways.into_iter().next())
}

/// VLAN membership of one interface. An explicit `switchport mode` decides between the
/// access VLAN and the trunk allowed list; without one the access VLAN wins.
///
/// `None` means the trunk list uses `all` or `except` and cannot be compared.
fn interface_vlans(
    source_name: &str,
    interface: &str,
    block: &ConfigBlock,
    mode: Option<&str>,
) -> Result<Option<Vec<VlanTag>>> {
    let mut allowed: Option<Vec<u16>> = None;
    let mut unsupported = false;
    for caps in block.child_captures(&TRUNK_ALLOWED) {
        let argument = caps[1].trim();
        let (keyword, rest) = argument.split_once(' ').unwrap_or((argument, ""));
        match keyword {
            "add" => allowed.get_or_insert_with(Vec::new).extend(expand_vlans(rest)?),
            "remove" => {
                let removed = expand_vlans(rest)?;
                if let Some(list) = allowed.as_mut() {
                    list.retain(|v| !removed.contains(v));
                }
            }
            "none" => {
                allowed = Some(Vec::new());
                unsupported = false;
            }
            "all" | "except" => {
                tracing::warn!(
                    "{}: {} uses 'allowed vlan {}', which is not compared",
                    source_name,
                    interface,
                    keyword
                );
                allowed = None;
                unsupported = true;
            }
            _ => {
                allowed = Some(expand_vlans(argument)?);
                unsupported = false;
            }
        }
    }

    let access = block
        .child_captures(&ACCESS_VLAN)
        .last()
        .map(|c| parse_vid(&c[1]))
        .transpose()?;

    let tagged = || {
        if unsupported {
            return None;
        }
        let mut vids = allowed.clone().unwrap_or_default();
        vids.sort_unstable();
        vids.dedup();
        Some(vids.into_iter().map(VlanTag::Tagged).collect::<Vec<_>>())
    };

    Ok(match (mode, access) {
        (Some("trunk"), _) => tagged(),
        (Some("access"), Some(vid)) | (None, Some(vid)) => Some(vec![VlanTag::Untagged(vid)]),
        (Some("access"), None) => Some(Vec::new()),
        _ => tagged(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::InterfaceStatus;

    const SAMPLE: &str = "\
!
version 15.2
hostname KA-SW-01
!
ip default-gateway 10.10.0.1
!
interface GigabitEthernet1/0/1
 description Uplink core
 switchport trunk encapsulation dot1q
 switchport trunk allowed vlan 10,20-22
 switchport mode trunk
!
interface GigabitEthernet1/0/2
 description Operator station
 switchport access vlan 30
 switchport mode access
 no shutdown
!
interface GigabitEthernet1/0/3
 shutdown
!
interface GigabitEthernet1/0/4
 switchport trunk allowed vlan 10
 switchport trunk allowed vlan add 40-41
 switchport trunk allowed vlan remove 10
 switchport mode trunk
!
interface Vlan10
 description Management
 ip address 10.10.0.5 255.255.255.0
!
end
";

    #[test]
    fn test_config_tree_blocks() {
        let tree = ConfigTree::parse(SAMPLE);
        let intf: Vec<&ConfigBlock> = tree.find_objects(&INTERFACE).collect();
        assert_eq!(intf.len(), 5);
        assert_eq!(intf[0].children.len(), 4);
        assert!(intf[2].has_child("shutdown"));
    }

    #[test]
    fn test_expand_vlans() {
        assert_eq!(expand_vlans("1,5-7,10").unwrap(), vec![1, 5, 6, 7, 10]);
        assert_eq!(expand_vlans("5-7").unwrap(), vec![5, 6, 7]);
        assert_eq!(expand_vlans("42").unwrap(), vec![42]);
        assert!(expand_vlans("7-5").is_err());
        assert!(expand_vlans("abc").is_err());
        assert!(expand_vlans("4095").is_err());
    }

    #[test]
    fn test_parse_device_config() {
        let device = parse_device_config("ka-sw-01.cfg", SAMPLE).unwrap();

        assert_eq!(device.hostname, "KA-SW-01");
        assert_eq!(device.gateway.as_deref(), Some("10.10.0.1"));
        assert_eq!(device.svis, vec!["Vlan10"]);
        assert_eq!(device.regular_interfaces.len(), 4);
        assert_eq!(device.disabled_interfaces, vec!["GigabitEthernet1/0/3"]);
        assert_eq!(
            device.trunk_interfaces,
            vec!["GigabitEthernet1/0/1", "GigabitEthernet1/0/4"]
        );
        assert_eq!(device.access_interfaces, vec!["GigabitEthernet1/0/2"]);
        assert_eq!(device.ip_addresses.len(), 1);
        assert_eq!(device.ip_addresses[0].to_string(), "10.10.0.5/24");
        assert_eq!(device.all_vlans(), vec![10, 20, 21, 22, 30, 40, 41]);

        let interfaces = device.interfaces();
        let uplink = &interfaces[0];
        assert_eq!(uplink.description, "Uplink core");
        assert_eq!(uplink.tagged_vlans(), vec![10, 20, 21, 22]);

        let access = &interfaces[1];
        assert_eq!(access.untagged_vlan(), Some(30));
        assert_eq!(access.status, InterfaceStatus::Enabled);

        assert_eq!(interfaces[2].status, InterfaceStatus::Disabled);
        assert!(interfaces[2].vlans.is_empty());

        assert_eq!(interfaces[3].tagged_vlans(), vec![40, 41]);
    }

    #[test]
    fn test_missing_hostname_is_an_error() {
        let err = parse_device_config("x.cfg", "interface Gi1/0/1\n").unwrap_err();
        assert!(err.to_string().contains("No hostname found"));
    }

    #[test]
    fn test_multiple_hostnames_is_an_error() {
        let err = parse_device_config("x.cfg", "hostname a\nhostname b\n").unwrap_err();
        assert!(err.to_string().contains("Multiple hostnames"));
    }

    #[test]
    fn test_multiple_gateways_is_an_error() {
        let text = "hostname a\nip default-gateway 1.1.1.1\nip default-gateway 2.2.2.2\n";
        assert!(parse_device_config("x.cfg", text).is_err());
    }

    #[test]
    fn test_gateway_not_configured() {
        let device = parse_device_config("x.cfg", "hostname a\n").unwrap();
        assert!(device.gateway.is_none());
        assert!(device.summary().contains("Default Gateway: Not Configured"));
    }

    #[test]
    fn test_access_vlan_wins_without_mode() {
        let text = "hostname a\ninterface Fa0/1\n switchport trunk allowed vlan 5,6\n switchport access vlan 7\n";
        let device = parse_device_config("x.cfg", text).unwrap();
        assert_eq!(device.vlan_mapping["Fa0/1"], vec![VlanTag::Untagged(7)]);
    }

    #[test]
    fn test_allowed_vlan_none_empties_the_trunk() {
        let text = "hostname a\ninterface Gi1/0/1\n switchport trunk allowed vlan 10,20\n switchport trunk allowed vlan none\n switchport mode trunk\n";
        let device = parse_device_config("x.cfg", text).unwrap();
        let interfaces = device.interfaces();
        assert!(interfaces[0].vlans.is_empty());
        assert!(!interfaces[0].vlans_unknown);
        assert!(device.unsupported_vlan_interfaces.is_empty());
    }

    #[test]
    fn test_allowed_vlan_all_and_except_are_not_compared() {
        for argument in ["all", "except 1-5"] {
            let text = format!(
                "hostname a\ninterface Gi1/0/1\n switchport trunk allowed vlan {}\n switchport mode trunk\n",
                argument
            );
            let device = parse_device_config("x.cfg", &text).unwrap();
            assert_eq!(device.unsupported_vlan_interfaces, vec!["Gi1/0/1"]);

            let interfaces = device.interfaces();
            assert!(interfaces[0].vlans_unknown);
            assert!(interfaces[0].vlans.is_empty());
        }
    }

    #[test]
    fn test_explicit_list_after_all_is_compared_again() {
        let text = "hostname a\ninterface Gi1/0/1\n switchport trunk allowed vlan all\n switchport trunk allowed vlan 30\n switchport mode trunk\n";
        let device = parse_device_config("x.cfg", text).unwrap();
        let interfaces = device.interfaces();
        assert!(!interfaces[0].vlans_unknown);
        assert_eq!(interfaces[0].tagged_vlans(), vec![30]);
    }

    #[test]
    fn test_access_port_with_allowed_all_keeps_its_access_vlan() {
        let text = "hostname a\ninterface Gi1/0/1\n switchport trunk allowed vlan all\n switchport access vlan 7\n switchport mode access\n";
        let device = parse_device_config("x.cfg", text).unwrap();
        assert!(device.unsupported_vlan_interfaces.is_empty());
        assert_eq!(device.vlan_mapping["Gi1/0/1"], vec![VlanTag::Untagged(7)]);
    }
}
