use clap::Parser;
use ipam_reconcile::adapters::stid::{of_type, StidClient};
use ipam_reconcile::config::cli::{config_failure, run_failure, CommonArgs, ConfigArgs};
use ipam_reconcile::config::StidSettings;

#[derive(Parser)]
#[command(name = "stid-tags")]
#[command(about = "Print STID tag references of one tag type")]
struct Args {
    /// Tag number to look up
    #[arg(long)]
    tag_no: String,

    /// Installation code
    #[arg(long, default_value = "KAA")]
    inst: String,

    /// Tag type to print
    #[arg(long, default_value = "NP")]
    tag_type: String,

    /// STID API base URL
    #[arg(short, long)]
    url: Option<String>,

    /// Bearer token
    #[arg(short, long)]
    token: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.common.init();

    let settings = args
        .config
        .load()
        .and_then(|file| StidSettings::resolve(args.url.clone(), args.token.clone(), &file))
        .unwrap_or_else(|e| config_failure(e));
    let client = StidClient::new(&settings).unwrap_or_else(|e| run_failure(e));

    let refs = match client.tag_refs(&args.inst, &args.tag_no).await {
        Ok(refs) => refs,
        Err(e) => run_failure(e),
    };
    let matching = of_type(&refs, &args.tag_type);
    tracing::info!("{} of {} references are {}", matching.len(), refs.len(), args.tag_type);
    for tag in matching {
        println!("{}", serde_json::to_string_pretty(tag)?);
    }
    Ok(())
}
