use clap::Parser;
use ipam_reconcile::adapters::prompt::TerminalPrompter;
use ipam_reconcile::app::NozomiCheck;
use ipam_reconcile::config::cli::{config_failure, run_failure, CommonArgs, NetboxArgs};
use ipam_reconcile::domain::model::UpdatePolicy;
use ipam_reconcile::{FixApplier, NetboxClient, ReconcileEngine, ReportStyle};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "check-nozomi")]
#[command(about = "Report Nozomi nodes missing from IPAM")]
struct Args {
    /// Nozomi nodes export (`;` separated)
    #[arg(short, long, default_value = "nodes.csv")]
    file: PathBuf,

    /// Also report nodes whose label differs from the owning device in IPAM
    #[arg(long)]
    show_labels: bool,

    #[command(flatten)]
    netbox: NetboxArgs,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.common.init();

    tracing::info!("Starting check-nozomi");
    let settings = args.netbox.settings().unwrap_or_else(|e| config_failure(e));
    let netbox = Arc::new(NetboxClient::new(&settings).unwrap_or_else(|e| run_failure(e)));

    let mut applier = FixApplier::new(
        netbox.clone(),
        Arc::new(TerminalPrompter),
        UpdatePolicy::ReportOnly,
        ReportStyle::Line,
    );
    let engine = ReconcileEngine::new(NozomiCheck::new(netbox, args.file, args.show_labels));

    match engine.run(&mut applier).await {
        Ok(summary) => println!("Nodes: {}", summary.items),
        Err(e) => run_failure(e),
    }
    Ok(())
}
