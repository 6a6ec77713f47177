//! ELOP code generator logs (`*.ERR`).

use crate::utils::error::Result;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Code generator (.*?) started for <(.*?)>: (.*?)$").unwrap());
static CONFIG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Configuration name\s*=\s*(.*?)$").unwrap());
static RESOURCE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Resource name\s*=\s*(.*?)$").unwrap());
static PROGRAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Program name\s*=\s*(.*?)$").unwrap());
static CODE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Code version.*\s*=\s*(.*?)$").unwrap());
static PROGRAM_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Program version\s*=\s*(.*?)$").unwrap());
static DATA_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Data version.*\s*=\s*(.*?)$").unwrap());
static AREA_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Area version.*\s*=\s*(.*?)$").unwrap());
static RUN_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Run version.*\s*=\s*(.*?)$").unwrap());
static PROGRAM_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Program size\s*=\s*(.*?)\s*Byte").unwrap());

const INFO_DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElopProperties {
    pub info_name: String,
    pub generator_version: String,
    pub info_date: Option<NaiveDateTime>,
    pub config_name: String,
    pub resource_name: String,
    pub program_name: String,
    pub code_version: String,
    pub program_version: String,
    pub data_version: String,
    pub area_version: String,
    pub run_version: String,
    pub program_size: String,
    pub file_name: String,
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line).map(|c| c[1].trim().to_string())
}

pub fn parse_log(file_name: &str, text: &str) -> ElopProperties {
    let mut props = ElopProperties {
        file_name: file_name.to_string(),
        ..Default::default()
    };

    for line in text.lines() {
        let line = line.trim_end();
        if props.info_name.is_empty() {
            if let Some(caps) = INFO.captures(line) {
                props.generator_version = caps[1].to_string();
                props.info_name = caps[2].to_string();
                props.info_date =
                    NaiveDateTime::parse_from_str(caps[3].trim(), INFO_DATE_FORMAT).ok();
                if props.info_date.is_none() {
                    tracing::debug!("{}: unparsed generator date '{}'", file_name, &caps[3]);
                }
            }
        }

        let fields: [(&Regex, &mut String); 9] = [
            (&*CONFIG_NAME, &mut props.config_name),
            (&*RESOURCE_NAME, &mut props.resource_name),
            (&*PROGRAM_NAME, &mut props.program_name),
            (&*CODE_VERSION, &mut props.code_version),
            (&*PROGRAM_VERSION, &mut props.program_version),
            (&*DATA_VERSION, &mut props.data_version),
            (&*AREA_VERSION, &mut props.area_version),
            (&*RUN_VERSION, &mut props.run_version),
            (&*PROGRAM_SIZE, &mut props.program_size),
        ];
        for (re, slot) in fields {
            if let Some(value) = capture(re, line) {
                *slot = value;
            }
        }
    }
    props
}

pub fn read_log(path: &Path) -> Result<ElopProperties> {
    let bytes = std::fs::read(path)?;
    // Older generators write Latin-1.
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    };
    Ok(parse_log(&path.display().to_string(), &text))
}

/// Every file below `root` whose extension is `ERR`, sorted.
pub fn find_logs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("ERR") {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}
