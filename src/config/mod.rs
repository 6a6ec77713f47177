#[cfg(feature = "cli")]
pub mod cli;
pub mod file;
pub mod settings;

pub use file::FileConfig;
pub use settings::{ElasticSettings, NetboxSettings, StidSettings, DEFAULT_CONFIG_FILE};
