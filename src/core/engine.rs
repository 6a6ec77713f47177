use crate::core::apply::FixApplier;
use crate::domain::model::RunSummary;
use crate::domain::ports::Reconciler;
use crate::utils::error::Result;

/// Drives a reconciler: extract every item, then compare and apply item by item.
pub struct ReconcileEngine<R: Reconciler> {
    reconciler: R,
}

impl<R: Reconciler> ReconcileEngine<R> {
    pub fn new(reconciler: R) -> Self {
        Self { reconciler }
    }

    pub async fn run(&self, applier: &mut FixApplier) -> Result<RunSummary> {
        let name = self.reconciler.name();
        tracing::info!("Starting {}...", name);

        let items = self.reconciler.extract().await?;
        tracing::info!("Extracted {} items", items.len());

        let mut summary = RunSummary {
            items: items.len(),
            ..Default::default()
        };
        for (index, item) in items.iter().enumerate() {
            let findings = match self.reconciler.compare(item).await {
                Ok(findings) => findings,
                Err(e) => {
                    tracing::error!("{}: item {} could not be compared: {}", name, index + 1, e);
                    summary.failed += 1;
                    continue;
                }
            };
            summary.merge(applier.apply_all(&findings).await);
        }

        tracing::info!("{} finished: {}", name, summary);
        Ok(summary)
    }
}
