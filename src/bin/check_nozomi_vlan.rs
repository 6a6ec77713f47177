use clap::Parser;
use ipam_reconcile::adapters::prompt::TerminalPrompter;
use ipam_reconcile::app::NozomiVlanCheck;
use ipam_reconcile::config::cli::{config_failure, run_failure, CommonArgs, NetboxArgs};
use ipam_reconcile::domain::model::UpdatePolicy;
use ipam_reconcile::{FixApplier, NetboxClient, ReconcileEngine, ReportStyle};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "check-nozomi-vlan")]
#[command(about = "Compare Nozomi node VLANs with the VLANs of their IPAM prefixes")]
struct Args {
    /// Nozomi nodes export with a vlan_id column
    #[arg(short, long)]
    file: PathBuf,

    #[command(flatten)]
    netbox: NetboxArgs,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.common.init();

    tracing::info!("Starting check-nozomi-vlan");
    let settings = args.netbox.settings().unwrap_or_else(|e| config_failure(e));
    let netbox = Arc::new(NetboxClient::new(&settings).unwrap_or_else(|e| run_failure(e)));

    let mut applier = FixApplier::new(
        netbox.clone(),
        Arc::new(TerminalPrompter),
        UpdatePolicy::ReportOnly,
        ReportStyle::Line,
    );
    let engine = ReconcileEngine::new(NozomiVlanCheck::new(netbox, args.file));

    match engine.run(&mut applier).await {
        Ok(summary) => println!("Number of mismatching VLAN/IP: {}", summary.findings),
        Err(e) => run_failure(e),
    }
    Ok(())
}
