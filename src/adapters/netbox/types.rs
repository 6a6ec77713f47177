use crate::domain::model::InterfaceMode;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- NetBox API types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedVlan {
    pub id: u64,
    pub vid: u16,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceValue {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbDevice {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site: Option<NestedRef>,
    #[serde(default)]
    pub rack: Option<NestedRef>,
    #[serde(default)]
    pub device_type: Option<NestedRef>,
}

impl NbDevice {
    pub fn site_id(&self) -> Option<u64> {
        self.site.as_ref().map(|s| s.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbDeviceType {
    pub id: u64,
    pub model: String,
    #[serde(default)]
    pub part_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbInterface {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: Option<ChoiceValue>,
    #[serde(default)]
    pub untagged_vlan: Option<NestedVlan>,
    #[serde(default)]
    pub tagged_vlans: Vec<NestedVlan>,
}

impl NbInterface {
    pub fn untagged_vid(&self) -> Option<u16> {
        self.untagged_vlan.as_ref().map(|v| v.vid)
    }

    pub fn tagged_vids(&self) -> Vec<u16> {
        self.tagged_vlans.iter().map(|v| v.vid).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbVlan {
    pub id: u64,
    pub vid: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: Option<NestedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbVlanGroup {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbSite {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub region: Option<NestedRef>,
}

/// The object an IP address is assigned to: a device interface or a VM interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignedObject {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub device: Option<NestedRef>,
    #[serde(default)]
    pub virtual_machine: Option<NestedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbIpAddress {
    pub id: u64,
    pub address: String,
    #[serde(default)]
    pub assigned_object_type: Option<String>,
    #[serde(default)]
    pub assigned_object: Option<AssignedObject>,
}

impl NbIpAddress {
    /// Address without the prefix length.
    pub fn host(&self) -> &str {
        self.address.split('/').next().unwrap_or(&self.address)
    }

    pub fn device_id(&self) -> Option<u64> {
        self.assigned_object
            .as_ref()
            .and_then(|o| o.device.as_ref())
            .map(|d| d.id)
    }

    /// Name of the device or virtual machine owning the address.
    pub fn owner_name(&self) -> Option<&str> {
        let object = self.assigned_object.as_ref()?;
        match self.assigned_object_type.as_deref() {
            Some("dcim.interface") => object.device.as_ref().map(|d| d.name.as_str()),
            Some("virtualization.vminterface") => {
                object.virtual_machine.as_ref().map(|v| v.name.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbPrefix {
    pub id: u64,
    pub prefix: String,
    #[serde(default)]
    pub vlan: Option<NestedVlan>,
}

/// An object found by [`Catalog`] lookup, with the name as IPAM spells it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedObject {
    pub id: u64,
    pub name: String,
}

/// Lists searched when a user types the name of an existing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    DeviceTypes,
    DeviceRoles,
    Sites,
}

impl Catalog {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::DeviceTypes => "/dcim/device-types/",
            Self::DeviceRoles => "/dcim/device-roles/",
            Self::Sites => "/dcim/sites/",
        }
    }

    /// Field holding the human name.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DeviceTypes => "model",
            Self::DeviceRoles | Self::Sites => "name",
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DeviceTypes => "Device Type",
            Self::DeviceRoles => "Device Role",
            Self::Sites => "Site",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VlanStatus {
    Active,
    Reserved,
    Deprecated,
}

impl VlanStatus {
    pub const ALL: [VlanStatus; 3] = [Self::Active, Self::Reserved, Self::Deprecated];
}

impl fmt::Display for VlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "Active",
            Self::Reserved => "Reserved",
            Self::Deprecated => "Deprecated",
        })
    }
}

// --- Request bodies ---

#[derive(Debug, Clone, Serialize)]
pub struct DeviceCreate {
    pub name: String,
    pub device_type: u64,
    pub role: u64,
    pub site: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VlanCreate {
    pub name: String,
    pub vid: u16,
    pub status: VlanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<u64>,
}

/// PATCH body for `/dcim/interfaces/{id}/`. Absent fields are left alone, `Some(None)` sends null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfacePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Option<InterfaceMode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub untagged_vlan: Option<Option<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagged_vlans: Option<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_serializes_clears_as_null() {
        let patch = InterfacePatch {
            mode: Some(None),
            untagged_vlan: Some(None),
            tagged_vlans: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"mode": null, "untagged_vlan": null, "tagged_vlans": []})
        );
    }

    #[test]
    fn test_patch_mode_names() {
        let patch = InterfacePatch {
            mode: Some(Some(InterfaceMode::TaggedAll)),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"mode": "tagged-all"}));
    }

    #[test]
    fn test_ip_address_owner_name() {
        let ip: NbIpAddress = serde_json::from_value(json!({
            "id": 7,
            "address": "10.1.2.3/24",
            "assigned_object_type": "virtualization.vminterface",
            "assigned_object": {"id": 3, "name": "eth0", "virtual_machine": {"id": 9, "name": "hist-01"}}
        }))
        .unwrap();
        assert_eq!(ip.host(), "10.1.2.3");
        assert_eq!(ip.owner_name(), Some("hist-01"));
        assert_eq!(ip.device_id(), None);
    }

    #[test]
    fn test_interface_accessors() {
        let intf: NbInterface = serde_json::from_value(json!({
            "id": 1,
            "name": "Gi1/0/1",
            "description": "",
            "enabled": true,
            "mode": {"value": "tagged", "label": "Tagged"},
            "untagged_vlan": {"id": 100, "vid": 10, "name": "mgmt"},
            "tagged_vlans": [{"id": 200, "vid": 20, "name": "ot"}]
        }))
        .unwrap();
        assert_eq!(intf.mode.as_ref().map(|m| m.value.as_str()), Some("tagged"));
        assert_eq!(intf.untagged_vid(), Some(10));
        assert_eq!(intf.tagged_vids(), vec![20]);
    }
}
