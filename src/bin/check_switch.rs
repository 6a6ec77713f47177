use clap::Parser;
use colored::Colorize;
use ipam_reconcile::adapters::prompt::TerminalPrompter;
use ipam_reconcile::app::switch_check::confirm_auto_update;
use ipam_reconcile::app::{DeviceCheck, PortCheck};
use ipam_reconcile::config::cli::{config_failure, run_failure, CommonArgs, NetboxArgs, UpdateArgs};
use ipam_reconcile::domain::model::{RunSummary, UpdatePolicy};
use ipam_reconcile::domain::ports::Prompter;
use ipam_reconcile::{FixApplier, NetboxClient, ReconcileEngine, ReportStyle};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "check-switch")]
#[command(about = "Check HiVision switch exports against IPAM")]
struct Args {
    /// Ports export
    #[arg(long)]
    ports: PathBuf,

    /// Devices export, checked together with --qrs
    #[arg(long, requires = "qrs")]
    devices: Option<PathBuf>,

    /// QR codes export
    #[arg(long, requires = "devices")]
    qrs: Option<PathBuf>,

    #[command(flatten)]
    netbox: NetboxArgs,

    #[command(flatten)]
    update: UpdateArgs,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.common.init();

    tracing::info!("Starting check-switch");
    let settings = args.netbox.settings().unwrap_or_else(|e| config_failure(e));
    let netbox = Arc::new(NetboxClient::new(&settings).unwrap_or_else(|e| run_failure(e)));
    let prompter: Arc<dyn Prompter> = Arc::new(TerminalPrompter);
    let policy = args.update.policy();

    if policy == UpdatePolicy::Auto && !confirm_auto_update(prompter.as_ref())? {
        println!("Aborted, IPAM left unchanged");
        return Ok(());
    }

    let mut applier = FixApplier::new(netbox.clone(), prompter, policy, ReportStyle::Line);
    let mut summary = RunSummary::default();

    if let (Some(devices), Some(qrs)) = (args.devices, args.qrs) {
        println!("{}", "# Check Devices".bold());
        let engine = ReconcileEngine::new(DeviceCheck::new(netbox.clone(), devices, qrs));
        match engine.run(&mut applier).await {
            Ok(s) => summary.merge(s),
            Err(e) => run_failure(e),
        }
    }

    println!("{}", "# Check ports and interfaces".bold());
    let engine = ReconcileEngine::new(PortCheck::new(netbox, args.ports));
    match engine.run(&mut applier).await {
        Ok(s) => summary.merge(s),
        Err(e) => run_failure(e),
    }

    tracing::info!("check-switch completed");
    println!("{}", summary);
    Ok(())
}
