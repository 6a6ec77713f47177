use crate::adapters::netbox::NetboxClient;
use crate::domain::model::Finding;
use crate::domain::ports::Reconciler;
use crate::parsers::tcc::{read_nodes, TccNode};
use crate::utils::error::{ReconcileError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// TCC network adapters whose address IPAM does not know.
pub struct TccCheck {
    netbox: Arc<NetboxClient>,
    path: PathBuf,
    known: OnceCell<HashSet<String>>,
}

impl TccCheck {
    pub fn new(netbox: Arc<NetboxClient>, path: PathBuf) -> Self {
        Self {
            netbox,
            path,
            known: OnceCell::new(),
        }
    }

    /// Every IPAM address without its prefix length, fetched on first use.
    async fn known_addresses(&self) -> Result<&HashSet<String>> {
        self.known
            .get_or_try_init(|| async {
                let addresses = self.netbox.all_ip_addresses().await?;
                tracing::info!("Fetched {} IP addresses from IPAM", addresses.len());
                Ok::<_, ReconcileError>(addresses.iter().map(|a| a.host().to_string()).collect())
            })
            .await
    }
}

#[async_trait]
impl Reconciler for TccCheck {
    type Item = TccNode;

    fn name(&self) -> &str {
        "check-tcc"
    }

    async fn extract(&self) -> Result<Vec<TccNode>> {
        let nodes = read_nodes(&self.path)?;
        self.known_addresses().await?;
        Ok(nodes)
    }

    async fn compare(&self, node: &TccNode) -> Result<Vec<Finding>> {
        let Some(ip) = node.ip_address.as_deref() else {
            tracing::warn!("Node without IPAddress_ext: {:?}", node.host);
            return Ok(Vec::new());
        };
        if self.known_addresses().await?.contains(ip) {
            return Ok(Vec::new());
        }

        let details = [&node.description, &node.tag, &node.host]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        Ok(vec![Finding::report(ip, details, "Not found in IPAM", "", "")])
    }
}
