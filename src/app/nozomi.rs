use crate::adapters::netbox::NetboxClient;
use crate::domain::model::Finding;
use crate::domain::ports::Reconciler;
use crate::parsers::nozomi::{read_nodes, NozomiNode};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Nodes seen by Nozomi whose address is missing from IPAM or owned by a differently named device.
pub struct NozomiCheck {
    netbox: Arc<NetboxClient>,
    path: PathBuf,
    show_labels: bool,
}

impl NozomiCheck {
    pub fn new(netbox: Arc<NetboxClient>, path: PathBuf, show_labels: bool) -> Self {
        Self {
            netbox,
            path,
            show_labels,
        }
    }
}

#[async_trait]
impl Reconciler for NozomiCheck {
    type Item = NozomiNode;

    fn name(&self) -> &str {
        "check-nozomi"
    }

    async fn extract(&self) -> Result<Vec<NozomiNode>> {
        read_nodes(&self.path)
    }

    async fn compare(&self, node: &NozomiNode) -> Result<Vec<Finding>> {
        if node.is_broadcast() || !node.has_ip() {
            return Ok(Vec::new());
        }

        let addresses = self.netbox.ip_addresses(&node.ip).await?;
        if addresses.is_empty() {
            let details = [&node.label, &node.mac_address, &node.mac_vendor]
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            return Ok(vec![Finding::report(&node.ip, details, "Not found in IPAM", "", "")]);
        }

        if node.label.is_empty() {
            return Ok(Vec::new());
        }
        let owners: Vec<String> = addresses
            .iter()
            .filter_map(|a| a.owner_name())
            .map(str::to_lowercase)
            .collect();
        if owners.contains(&node.label.to_lowercase()) {
            return Ok(Vec::new());
        }

        if self.show_labels {
            Ok(vec![Finding::report(
                &node.ip,
                "",
                "Label mismatch",
                &node.label,
                owners.join(","),
            )])
        } else {
            tracing::debug!("Label mismatch {}: {} not in {:?}", node.ip, node.label, owners);
            Ok(Vec::new())
        }
    }
}

/// Nodes whose VLAN differs from the VLAN of an IPAM prefix containing their address.
pub struct NozomiVlanCheck {
    netbox: Arc<NetboxClient>,
    path: PathBuf,
}

impl NozomiVlanCheck {
    pub fn new(netbox: Arc<NetboxClient>, path: PathBuf) -> Self {
        Self { netbox, path }
    }
}

#[async_trait]
impl Reconciler for NozomiVlanCheck {
    type Item = NozomiNode;

    fn name(&self) -> &str {
        "check-nozomi-vlan"
    }

    async fn extract(&self) -> Result<Vec<NozomiNode>> {
        read_nodes(&self.path)
    }

    async fn compare(&self, node: &NozomiNode) -> Result<Vec<Finding>> {
        if !node.has_ip() || node.vlan_id.trim().is_empty() {
            return Ok(Vec::new());
        }
        let Some(vid) = node.vlan() else {
            tracing::warn!("{}: vlan_id '{}' is not a number", node.ip, node.vlan_id);
            return Ok(Vec::new());
        };

        let prefixes = self.netbox.prefixes_containing(&node.ip).await?;
        Ok(prefixes
            .iter()
            .filter_map(|prefix| {
                let vlan = prefix.vlan.as_ref()?;
                (vlan.vid != vid).then(|| {
                    Finding::report(
                        &node.ip,
                        &prefix.prefix,
                        "VLAN mismatch",
                        vid.to_string(),
                        vlan.vid.to_string(),
                    )
                })
            })
            .collect())
    }
}
