use clap::Parser;
use ipam_reconcile::app::elop::collect_properties;
use ipam_reconcile::config::cli::{run_failure, CommonArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "elop-props")]
#[command(about = "Extract program and version properties from ELOP .ERR logs")]
struct Args {
    /// Project directory searched recursively
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Write the JSON array to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.common.init();

    let properties = collect_properties(&args.root).unwrap_or_else(|e| run_failure(e));
    let json = serde_json::to_string_pretty(&properties)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Wrote {} entries to {}", properties.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
