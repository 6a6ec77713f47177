use crate::domain::model::Finding;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Questions asked while reconciling. Implemented over the terminal and over a fixed script.
pub trait Prompter: Send + Sync {
    /// Yes/no question, `false` unless the answer is yes.
    fn confirm(&self, question: &str) -> Result<bool>;

    /// Free text answer.
    fn ask(&self, question: &str) -> Result<String>;

    /// Index into `options`, `None` when the user gives up.
    fn choose(&self, title: &str, options: &[String]) -> Result<Option<usize>>;
}

/// One reconciliation tool: read the source, then compare each item with IPAM.
#[async_trait]
pub trait Reconciler: Send + Sync {
    type Item: Send + Sync;

    fn name(&self) -> &str;

    async fn extract(&self) -> Result<Vec<Self::Item>>;

    async fn compare(&self, item: &Self::Item) -> Result<Vec<Finding>>;
}

/// What a bulk index request reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkOutcome {
    pub items: usize,
    pub errors: bool,
}

/// Destination for NDJSON bulk bodies.
#[async_trait]
pub trait BulkSink: Send + Sync {
    async fn send(&self, body: String) -> Result<BulkOutcome>;
}
