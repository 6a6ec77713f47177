pub mod apply;
pub mod diff;
pub mod engine;
pub mod table;
pub mod vlans;

pub use apply::{FixApplier, ReportStyle};
pub use engine::ReconcileEngine;
