use crate::utils::error::{ReconcileError, Result};
use serde::Deserialize;
use std::path::Path;

/// A network adapter row exported from Splunk, one JSON object per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TccNode {
    #[serde(rename = "IPAddress_ext", default)]
    pub ip_address: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Tag", default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Deserialize)]
struct TccLine {
    result: TccNode,
}

pub fn read_nodes(path: &Path) -> Result<Vec<TccNode>> {
    let text = std::fs::read_to_string(path)?;
    parse_nodes(&path.display().to_string(), &text)
}

pub fn parse_nodes(source_name: &str, text: &str) -> Result<Vec<TccNode>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<TccLine>(line)
                .map(|l| l.result)
                .map_err(|e| ReconcileError::parse(source_name, format!("line {}: {}", n + 1, e)))
        })
        .collect()
}
