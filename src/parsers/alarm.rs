//! SAS alarm/event archives: zip files whose members are JSON documents with a
//! column schema and rows of values.

use crate::utils::error::{ReconcileError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Fields whose `date time` values are turned into `dateTtime`.
pub const TIMESTAMP_FIELDS: [&str; 3] = ["TimeStamp", "TimeStampLocal", "ActiveTime"];

pub type AlarmEvent = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct AlarmDocument {
    #[serde(rename = "Schema")]
    schema: Vec<SchemaColumn>,
    #[serde(rename = "Data", default)]
    data: Vec<Vec<Value>>,
    #[serde(rename = "Sequence", default)]
    sequence: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SchemaColumn {
    #[serde(rename = "Name")]
    name: String,
}

/// Events from one archive member.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmBatch {
    pub member: String,
    pub sequence: Option<Value>,
    pub events: Vec<AlarmEvent>,
}

pub fn normalize_timestamp(value: &str) -> String {
    value.replacen(' ', "T", 1)
}

pub fn parse_document(member: &str, bytes: &[u8]) -> Result<AlarmBatch> {
    let document: AlarmDocument = serde_json::from_slice(bytes)
        .map_err(|e| ReconcileError::parse(member, e.to_string()))?;

    let mut events = Vec::with_capacity(document.data.len());
    for row in document.data {
        if row.len() != document.schema.len() {
            tracing::warn!(
                "{}: row has {} values for {} columns",
                member,
                row.len(),
                document.schema.len()
            );
        }
        let mut event: AlarmEvent = document
            .schema
            .iter()
            .map(|c| c.name.clone())
            .zip(row)
            .collect();
        for field in TIMESTAMP_FIELDS {
            if let Some(Value::String(ts)) = event.get_mut(field) {
                *ts = normalize_timestamp(ts);
            }
        }
        events.push(event);
    }

    Ok(AlarmBatch {
        member: member.to_string(),
        sequence: document.sequence,
        events,
    })
}

pub fn read_archive(path: &Path) -> Result<Vec<AlarmBatch>> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut batches = Vec::new();

    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        if member.is_dir() {
            continue;
        }
        let name = member.name().to_string();
        let mut bytes = Vec::new();
        member.read_to_end(&mut bytes)?;
        batches.push(parse_document(&name, &bytes)?);
    }
    Ok(batches)
}

/// Regular files directly inside `dir`, sorted by name.
pub fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
