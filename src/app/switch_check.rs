//! HiVision exports against IPAM: device placement and per-port settings.

use crate::adapters::netbox::NetboxClient;
use crate::core::diff::{compare_interface, DiffContext};
use crate::domain::model::Finding;
use crate::domain::ports::{Prompter, Reconciler};
use crate::parsers::hivision::{
    attach_qr_codes, group_ports, read_export, DeviceRecord, PortRecord, QrCodeRecord,
    SwitchPorts, DEVICES_PREAMBLE_LINES, PORTS_PREAMBLE_LINES, QR_CODES_PREAMBLE_LINES,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Rack and part number of every exported switch.
pub struct DeviceCheck {
    netbox: Arc<NetboxClient>,
    devices_path: PathBuf,
    qr_codes_path: PathBuf,
}

impl DeviceCheck {
    pub fn new(netbox: Arc<NetboxClient>, devices_path: PathBuf, qr_codes_path: PathBuf) -> Self {
        Self {
            netbox,
            devices_path,
            qr_codes_path,
        }
    }
}

#[async_trait]
impl Reconciler for DeviceCheck {
    type Item = DeviceRecord;

    fn name(&self) -> &str {
        "device check"
    }

    async fn extract(&self) -> Result<Vec<DeviceRecord>> {
        let mut devices: Vec<DeviceRecord> =
            read_export(&self.devices_path, DEVICES_PREAMBLE_LINES)?;
        let qr_codes: Vec<QrCodeRecord> = read_export(&self.qr_codes_path, QR_CODES_PREAMBLE_LINES)?;
        attach_qr_codes(&mut devices, &qr_codes);
        Ok(devices)
    }

    async fn compare(&self, record: &DeviceRecord) -> Result<Vec<Finding>> {
        let name = &record.system_name;
        let Some(device) = self.netbox.devices_by_name(name).await?.into_iter().next() else {
            return Ok(vec![Finding::report(name, "", "Device not found in IPAM", "", "")]);
        };

        let mut findings = Vec::new();
        match &device.rack {
            None => findings.push(Finding::report(name, "", "Un-racked", &record.location, "")),
            Some(rack) if !record.location.contains(&rack.name) => findings.push(Finding::report(
                name,
                "",
                "Rack mismatch",
                &record.location,
                &rack.name,
            )),
            Some(_) => {}
        }

        let device_type = match &device.device_type {
            Some(t) => self.netbox.device_type(t.id).await?,
            None => None,
        };
        let ipam_part = device_type.map(|t| t.part_number).unwrap_or_default();
        let export_part = record.part_number.as_deref().unwrap_or("");
        if export_part != ipam_part {
            findings.push(Finding::report(
                name,
                "",
                "Part number mismatch",
                export_part,
                ipam_part,
            ));
        }
        Ok(findings)
    }
}

/// Description, enable status and VLANs of every exported port.
pub struct PortCheck {
    netbox: Arc<NetboxClient>,
    ports_path: PathBuf,
}

impl PortCheck {
    pub fn new(netbox: Arc<NetboxClient>, ports_path: PathBuf) -> Self {
        Self { netbox, ports_path }
    }
}

#[async_trait]
impl Reconciler for PortCheck {
    type Item = SwitchPorts;

    fn name(&self) -> &str {
        "port check"
    }

    async fn extract(&self) -> Result<Vec<SwitchPorts>> {
        let records: Vec<PortRecord> = read_export(&self.ports_path, PORTS_PREAMBLE_LINES)?;
        Ok(group_ports(records))
    }

    async fn compare(&self, switch: &SwitchPorts) -> Result<Vec<Finding>> {
        let ip = &switch.device_ip;
        let addresses = self.netbox.ip_addresses(ip).await?;
        let address = match addresses.as_slice() {
            [] => return Ok(vec![Finding::report(ip, "", "IP address not found in IPAM", "", "")]),
            [address] => address,
            _ => {
                return Ok(vec![Finding::report(ip, "", "More than one IP found in IPAM", "", "")])
            }
        };
        let Some(device_id) = address.device_id() else {
            tracing::warn!("{} is not assigned to a device interface", ip);
            return Ok(vec![Finding::report(ip, "", "IP address not found in IPAM", "", "")]);
        };

        let interfaces = self.netbox.interfaces(device_id).await?;
        if interfaces.len() != switch.ports.len() {
            return Ok(vec![Finding::report(
                ip,
                "",
                "Number of interfaces does not match",
                switch.ports.len().to_string(),
                interfaces.len().to_string(),
            )]);
        }

        // VLANs on these switches are looked up across all of IPAM.
        let ctx = DiffContext {
            host: ip,
            site_id: None,
        };
        let mut findings = Vec::new();
        for ipam in &interfaces {
            let Some(port) = switch.ports.iter().find(|p| p.port == ipam.name) else {
                findings.push(Finding::report(ip, &ipam.name, "Port not found", "", ""));
                continue;
            };
            let source = port.to_interface();
            if source.vlans_unknown {
                findings.push(Finding::report(ip, &ipam.name, "Invalid VLAN list", &port.vlans, ""));
            }
            findings.extend(compare_interface(ctx, &source, ipam));
        }
        Ok(findings)
    }
}

/// Second confirmation before `-a` rewrites IPAM; only an explicit `yes` continues.
pub fn confirm_auto_update(prompter: &dyn Prompter) -> Result<bool> {
    let answer = prompter.ask("Are you sure you want to automatically update IPAM? (yes,NO)")?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
