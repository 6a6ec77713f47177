use crate::domain::model::{format_vids, Interface, InterfaceStatus, VlanTag};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// An `ip address A.B.C.D M.M.M.M` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterfaceAddress {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
}

impl InterfaceAddress {
    /// Returns `None` for non-contiguous masks.
    pub fn from_mask(address: Ipv4Addr, mask: Ipv4Addr) -> Option<Self> {
        let bits = u32::from(mask);
        let prefix_len = bits.leading_ones();
        if bits.checked_shl(prefix_len).unwrap_or(0) != 0 {
            return None;
        }
        Some(Self {
            address,
            prefix_len: prefix_len as u8,
        })
    }
}

impl fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

/// Everything extracted from one switch configuration file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceConfig {
    pub source_name: String,
    pub hostname: String,
    pub gateway: Option<String>,
    pub svis: Vec<String>,
    pub regular_interfaces: Vec<String>,
    pub disabled_interfaces: Vec<String>,
    pub descriptions: BTreeMap<String, String>,
    pub vlan_mapping: BTreeMap<String, Vec<VlanTag>>,
    /// Trunks whose allowed list uses `all` or `except`.
    pub unsupported_vlan_interfaces: Vec<String>,
    pub trunk_interfaces: Vec<String>,
    pub access_interfaces: Vec<String>,
    pub ip_addresses: Vec<InterfaceAddress>,
}

impl DeviceConfig {
    /// Sorted, de-duplicated VLAN ids used anywhere on the device.
    pub fn all_vlans(&self) -> Vec<u16> {
        let mut vids: Vec<u16> = self
            .vlan_mapping
            .values()
            .flatten()
            .map(VlanTag::vid)
            .collect();
        vids.sort_unstable();
        vids.dedup();
        vids
    }

    pub fn tagged_vlans(&self) -> Vec<u16> {
        self.collect_vids(true)
    }

    pub fn untagged_vlans(&self) -> Vec<u16> {
        self.collect_vids(false)
    }

    fn collect_vids(&self, tagged: bool) -> Vec<u16> {
        let mut vids: Vec<u16> = self
            .vlan_mapping
            .values()
            .flatten()
            .filter(|t| t.is_tagged() == tagged)
            .map(VlanTag::vid)
            .collect();
        vids.sort_unstable();
        vids.dedup();
        vids
    }

    /// One `Interface` per physical interface; SVIs are left out.
    pub fn interfaces(&self) -> Vec<Interface> {
        self.regular_interfaces
            .iter()
            .map(|name| Interface {
                name: name.clone(),
                description: self.descriptions.get(name).cloned().unwrap_or_default(),
                vlans: self.vlan_mapping.get(name).cloned().unwrap_or_default(),
                vlans_unknown: self.unsupported_vlan_interfaces.contains(name),
                status: if self.disabled_interfaces.contains(name) {
                    InterfaceStatus::Disabled
                } else {
                    InterfaceStatus::Enabled
                },
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        let mapping = self
            .vlan_mapping
            .iter()
            .map(|(intf, tags)| {
                let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
                format!("{}: [{}]", intf, tags.join(","))
            })
            .collect::<Vec<_>>()
            .join(", ");
        let addresses = self
            .ip_addresses
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        [
            format!("Hostname: {}", self.hostname),
            format!(
                "Default Gateway: {}",
                self.gateway.as_deref().unwrap_or("Not Configured")
            ),
            format!("All SVIs: {}", self.svis.join(", ")),
            format!("All Interfaces: {}", self.regular_interfaces.join(", ")),
            format!("Disabled Interfaces: {}", self.disabled_interfaces.join(", ")),
            format!("All VLANs: {}", format_vids(&self.all_vlans())),
            format!("VLAN Mapping: {}", mapping),
            format!("Tagged VLANs: {}", format_vids(&self.tagged_vlans())),
            format!("Untagged VLANs: {}", format_vids(&self.untagged_vlans())),
            format!(
                "Interfaces with Tagged VLANs: {}",
                self.trunk_interfaces.join(", ")
            ),
            format!(
                "Interfaces with Untagged VLANs: {}",
                self.access_interfaces.join(", ")
            ),
            format!("IP Addresses: {}", addresses),
        ]
        .join("\n")
    }
}
