use clap::Parser;
use ipam_reconcile::config::cli::{config_failure, run_failure, CommonArgs, NetboxArgs};
use ipam_reconcile::NetboxClient;

#[derive(Parser)]
#[command(name = "ipam-query")]
#[command(about = "Print one IPAM list endpoint as JSON")]
struct Args {
    /// Endpoint below /api, e.g. dcim/devices
    #[arg(default_value = "dcim/devices")]
    endpoint: String,

    /// Filter as key=value, may be repeated
    #[arg(short, long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    #[command(flatten)]
    netbox: NetboxArgs,

    #[command(flatten)]
    common: CommonArgs,
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not key=value", s))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn endpoint_path(endpoint: &str) -> String {
    format!("/{}/", endpoint.trim_matches('/'))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.common.init();

    let settings = args.netbox.settings().unwrap_or_else(|e| config_failure(e));
    let netbox = NetboxClient::new(&settings).unwrap_or_else(|e| run_failure(e));

    let query: Vec<(&str, String)> = args
        .filters
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();
    let path = endpoint_path(&args.endpoint);
    tracing::info!("Querying {}{}", netbox.base_url(), path);

    match netbox.raw_list(&path, &query).await {
        Ok(data) => println!("{}", serde_json::to_string_pretty(&data)?),
        Err(e) => run_failure(e),
    }
    Ok(())
}
