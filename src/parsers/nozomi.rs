use crate::utils::error::Result;
use serde::Deserialize;
use std::path::Path;

/// One row of a Nozomi Guardian node export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NozomiNode {
    pub ip: String,
    pub label: String,
    pub mac_address: String,
    pub mac_vendor: String,
    pub is_broadcast: String,
    pub vlan_id: String,
}

impl NozomiNode {
    pub fn is_broadcast(&self) -> bool {
        self.is_broadcast.eq_ignore_ascii_case("true")
    }

    /// Rows with placeholder addresses such as `-` carry no usable IP.
    pub fn has_ip(&self) -> bool {
        self.ip.len() > 2
    }

    pub fn vlan(&self) -> Option<u16> {
        self.vlan_id.trim().parse().ok()
    }
}

pub fn read_nodes(path: &Path) -> Result<Vec<NozomiNode>> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect(reader)
}

pub fn parse_nodes(text: &str) -> Result<Vec<NozomiNode>> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    collect(reader)
}

fn collect<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<NozomiNode>> {
    let mut nodes = Vec::new();
    for row in reader.deserialize::<NozomiNode>() {
        nodes.push(row?);
    }
    Ok(nodes)
}
