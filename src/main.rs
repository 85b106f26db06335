use anyhow::Context;
use clap::Parser;
use particle_resolver::config::AppConfig;
use particle_resolver::{
    build_planner, DefinitionKind, RunningInstance, DEFAULT_ACCOUNT_PAGE_LIMIT,
};

/// Resolve a particle or feature tree from the catalog and optionally execute it
#[derive(Parser, Debug)]
#[command(name = "particle-resolver")]
#[command(about = "Resolve a particle or feature tree and execute it")]
struct Cli {
    /// Name of the root particle (or feature with --feature)
    #[arg(required_unless_present = "account")]
    name: Option<String>,

    /// Resolve a feature tree instead of a particle tree
    #[arg(long)]
    feature: bool,

    /// Owner address for address-scoped lookups
    #[arg(long)]
    address: Option<String>,

    /// Running instance edit in format id=start_point,transformation_shift (can be repeated)
    #[arg(long = "set", value_parser = parse_edit)]
    edits: Vec<(usize, RunningInstance)>,

    /// Execute the resolved tree with this many samples
    #[arg(long = "execute", value_name = "SAMPLES_COUNT")]
    samples_count: Option<String>,

    /// List the resources owned by this address instead of resolving a tree
    #[arg(long, value_name = "ADDRESS", conflicts_with_all = ["feature", "edits", "samples_count"])]
    account: Option<String>,

    /// Account listing page, starting at 0
    #[arg(long, default_value_t = 0)]
    page: usize,

    /// Account listing page size
    #[arg(long, default_value_t = DEFAULT_ACCOUNT_PAGE_LIMIT)]
    limit: usize,
}

fn parse_edit(raw: &str) -> Result<(usize, RunningInstance), String> {
    let invalid = || format!("Invalid running instance edit: {}", raw);
    let (id, pair) = raw.split_once('=').ok_or_else(invalid)?;
    let (start_point, shift) = pair.split_once(',').ok_or_else(invalid)?;

    let id = id.trim().parse().map_err(|_| format!("Invalid node id: {}", id))?;
    let start_point = start_point
        .trim()
        .parse()
        .map_err(|_| format!("Invalid start point: {}", start_point))?;
    let shift = shift
        .trim()
        .parse()
        .map_err(|_| format!("Invalid transformation shift: {}", shift))?;

    Ok((id, RunningInstance::new(start_point, shift)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging, keeping HTTP internals quiet unless RUST_LOG says otherwise
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if cli.feature {
        config.resolver.kind = DefinitionKind::Feature;
    }
    if cli.address.is_some() {
        config.resolver.address = cli.address.clone();
    }
    log::info!("Using catalog at {}", config.catalog.base_url);

    let planner = build_planner(&config)?;

    if let Some(address) = &cli.account {
        let page = planner
            .client()
            .account_resources(address, cli.limit, cli.page)
            .await
            .with_context(|| format!("Failed to list resources of {}", address))?;
        println!("{}", serde_json::to_string_pretty(&page)?);
        println!("Page {} of {}", page.page + 1, page.total_pages());
        return Ok(());
    }

    let name = cli.name.as_deref().unwrap_or_default();
    let nodes = planner
        .load(name)
        .await
        .with_context(|| format!("Failed to resolve {}", name))?;

    for (id, instance) in &cli.edits {
        planner.edit(*id, *instance)?;
    }

    let tree = serde_json::json!({
        "nodes": nodes,
        "running_instances": planner.running_instances_json()?["running_instances"],
    });
    println!("{}", serde_json::to_string_pretty(&tree)?);

    if let Some(samples_count) = &cli.samples_count {
        let outcome = planner.execute(samples_count).await?;
        println!("{}", outcome.status);
        println!("{}", outcome.body);
    }

    Ok(())
}
