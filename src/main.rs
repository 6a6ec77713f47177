use clap::Parser;
use ipam_reconcile::adapters::prompt::TerminalPrompter;
use ipam_reconcile::app::CiscoSync;
use ipam_reconcile::config::cli::{config_failure, run_failure, CommonArgs, NetboxArgs, UpdateArgs};
use ipam_reconcile::domain::ports::Prompter;
use ipam_reconcile::{FixApplier, NetboxClient, ReconcileEngine, ReportStyle};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cisco-to-ipam")]
#[command(about = "Reconcile Cisco running-configs with IPAM")]
struct Args {
    /// Cisco running-config file(s)
    #[arg(required = true)]
    files: Vec<PathBuf>,

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

    tracing::info!("Starting cisco-to-ipam");
    let settings = args.netbox.settings().unwrap_or_else(|e| config_failure(e));
    tracing::debug!("IPAM at {}", settings.url);

    let netbox = Arc::new(NetboxClient::new(&settings).unwrap_or_else(|e| run_failure(e)));
    let prompter: Arc<dyn Prompter> = Arc::new(TerminalPrompter);
    let policy = args.update.policy();

    let mut applier = FixApplier::new(netbox.clone(), prompter.clone(), policy, ReportStyle::Table);
    let engine = ReconcileEngine::new(CiscoSync::new(
        netbox,
        prompter,
        policy,
        args.files,
        args.common.verbose,
    ));

    match engine.run(&mut applier).await {
        Ok(summary) => {
            tracing::info!("cisco-to-ipam completed");
            println!("{}", summary);
        }
        Err(e) => run_failure(e),
    }

    Ok(())
}
