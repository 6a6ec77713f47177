//! HiVision CSV exports: ports, devices and QR codes.
//!
//! The exports are `;` separated with every field quoted and a few lines of
//! report preamble before the header row.

use crate::domain::model::{parse_vlan_tags, Interface, InterfaceStatus, VlanTag};
use crate::utils::error::{ReconcileError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const PORTS_PREAMBLE_LINES: usize = 2;
pub const DEVICES_PREAMBLE_LINES: usize = 3;
pub const QR_CODES_PREAMBLE_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortRecord {
    /// Management IP of the switch the port belongs to.
    #[serde(rename = "Device")]
    pub device: String,
    #[serde(rename = "Port")]
    pub port: String,
    #[serde(rename = "Port Name", default)]
    pub port_name: String,
    #[serde(rename = "Port Enabled", default)]
    pub port_enabled: String,
    #[serde(rename = "VLANs", default)]
    pub vlans: String,
}

impl PortRecord {
    pub fn is_enabled(&self) -> bool {
        self.port_enabled.eq_ignore_ascii_case("yes")
    }

    pub fn vlan_tags(&self) -> Result<Vec<VlanTag>> {
        parse_vlan_tags(&self.vlans)
    }

    /// An unreadable VLAN cell leaves the VLANs unknown; description and status still apply.
    pub fn to_interface(&self) -> Interface {
        let (vlans, vlans_unknown) = match self.vlan_tags() {
            Ok(tags) => (tags, false),
            Err(e) => {
                tracing::debug!("{} port {}: {}", self.device, self.port, e);
                (Vec::new(), true)
            }
        };
        Interface {
            name: self.port.clone(),
            description: self.port_name.trim().to_string(),
            vlans,
            vlans_unknown,
            status: if self.is_enabled() {
                InterfaceStatus::Enabled
            } else {
                InterfaceStatus::Disabled
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "IP Address")]
    pub ip_address: String,
    #[serde(rename = "System Name", default)]
    pub system_name: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(skip)]
    pub part_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QrCodeRecord {
    #[serde(rename = "IP Address")]
    pub ip_address: String,
    #[serde(rename = "Value", default)]
    pub value: String,
}

impl QrCodeRecord {
    /// The QR payload is `<prefix>+<part number>+...`.
    pub fn part_number(&self) -> Option<&str> {
        self.value.split('+').nth(1).map(str::trim)
    }
}

/// All ports of one switch, keyed by its management IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchPorts {
    pub device_ip: String,
    pub ports: Vec<PortRecord>,
}

pub fn read_export<T: DeserializeOwned>(path: &Path, preamble_lines: usize) -> Result<Vec<T>> {
    let text = std::fs::read_to_string(path)?;
    parse_export(&path.display().to_string(), &text, preamble_lines)
}

pub fn parse_export<T: DeserializeOwned>(
    source_name: &str,
    text: &str,
    preamble_lines: usize,
) -> Result<Vec<T>> {
    let body: String = text
        .lines()
        .skip(preamble_lines)
        .collect::<Vec<_>>()
        .join("\n");
    if body.trim().is_empty() {
        return Err(ReconcileError::parse(source_name, "export has no header row"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize::<T>() {
        records.push(row?);
    }
    tracing::debug!("{}: {} rows", source_name, records.len());
    Ok(records)
}

/// Groups ports per switch, keeping the order in which switches first appear.
pub fn group_ports(records: Vec<PortRecord>) -> Vec<SwitchPorts> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<SwitchPorts> = Vec::new();
    for record in records {
        match index.get(&record.device) {
            Some(&i) => groups[i].ports.push(record),
            None => {
                index.insert(record.device.clone(), groups.len());
                groups.push(SwitchPorts {
                    device_ip: record.device.clone(),
                    ports: vec![record],
                });
            }
        }
    }
    groups
}

/// Copies the part number of each QR code onto the device with the same IP.
pub fn attach_qr_codes(devices: &mut [DeviceRecord], qr_codes: &[QrCodeRecord]) {
    for qr in qr_codes {
        match devices.iter_mut().find(|d| d.ip_address == qr.ip_address) {
            Some(device) => device.part_number = qr.part_number().map(str::to_string),
            None => tracing::warn!("QR code for unknown device {}", qr.ip_address),
        }
    }
}
