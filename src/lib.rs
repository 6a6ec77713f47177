pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod parsers;
pub mod utils;

pub use adapters::netbox::NetboxClient;
pub use self::core::{FixApplier, ReconcileEngine, ReportStyle};
pub use domain::model::{Finding, RunSummary, UpdatePolicy};
pub use utils::error::{ReconcileError, Result};
