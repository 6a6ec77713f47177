use crate::parsers::elop::{find_logs, read_log, ElopProperties};
use crate::utils::error::Result;
use std::path::Path;

/// Properties of every `.ERR` log below `root`. Unreadable logs are skipped with a warning.
pub fn collect_properties(root: &Path) -> Result<Vec<ElopProperties>> {
    let logs = find_logs(root)?;
    tracing::info!("Found {} ELOP logs under {}", logs.len(), root.display());

    let mut properties = Vec::with_capacity(logs.len());
    for path in logs {
        match read_log(&path) {
            Ok(props) => properties.push(props),
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(properties)
}
