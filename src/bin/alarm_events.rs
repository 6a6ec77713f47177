use clap::Parser;
use ipam_reconcile::adapters::elastic::{ElasticClient, NdjsonFile};
use ipam_reconcile::app::AlarmIndexer;
use ipam_reconcile::config::cli::{config_failure, run_failure, CommonArgs, ConfigArgs};
use ipam_reconcile::config::ElasticSettings;
use ipam_reconcile::domain::ports::BulkSink;
use ipam_reconcile::parsers::alarm::list_archives;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "alarm-events")]
#[command(about = "Bulk-index SAS alarm event archives into Elasticsearch")]
struct Args {
    /// Directory of zip archives
    #[arg(long, default_value = "archive")]
    archive_dir: PathBuf,

    /// Elasticsearch base URL
    #[arg(long)]
    url: Option<String>,

    /// Target index
    #[arg(long)]
    index: Option<String>,

    /// Events per bulk request
    #[arg(long)]
    batch_size: Option<usize>,

    /// Write the bulk bodies to --output instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// Output file for --dry-run
    #[arg(short, long, default_value = "out.json")]
    output: PathBuf,

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
        .and_then(|file| {
            ElasticSettings::resolve(args.url.clone(), args.index.clone(), args.batch_size, &file)
        })
        .unwrap_or_else(|e| config_failure(e));

    let archives = list_archives(&args.archive_dir).unwrap_or_else(|e| run_failure(e));
    tracing::info!("{} archives in {}", archives.len(), args.archive_dir.display());

    let sink: Box<dyn BulkSink> = if args.dry_run {
        tracing::info!("Dry run, writing bulk bodies to {}", args.output.display());
        Box::new(NdjsonFile::create(&args.output).unwrap_or_else(|e| run_failure(e)))
    } else {
        Box::new(ElasticClient::new(&settings).unwrap_or_else(|e| run_failure(e)))
    };

    let indexer = AlarmIndexer::new(sink.as_ref(), settings.index.clone(), settings.batch_size);
    match indexer.run(&archives).await {
        Ok(summary) => tracing::info!("alarm-events completed: {}", summary),
        Err(e) => run_failure(e),
    }
    Ok(())
}
