use anyhow::Result;
use relnav::{Config, Navigator};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.relnav.log_level.as_str()),
    )
    .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "verify" => run_verification(&config).await?,
        other => {
            log::warn!("Unknown command '{}', running verify", other);
            run_verification(&config).await?;
        }
    }

    Ok(())
}

/// Load every partition, build the graph and report its shape
async fn run_verification(config: &Config) -> Result<()> {
    log::info!("Starting Relnav v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Data directory: {}", config.data_dir().display());
    log::info!(
        "Max degree: {}, precompute limit: {}, cache capacity: {}",
        config.graph.max_degree,
        config.graph.precompute_limit,
        config.cache.capacity
    );

    let mut navigator = Navigator::from_config(config);
    let graph = navigator.load_from_dir(config.data_dir()).await?;

    let stats = graph.stats();
    log::info!("✓ {} people loaded ({} rejected)", stats.records_accepted, stats.records_rejected);
    log::info!(
        "✓ {} parent, {} spouse, {} sibling edges",
        stats.parent_edges,
        stats.spouse_edges,
        stats.sibling_edges
    );

    if stats.references_unresolved > 0 {
        log::warn!("{} references could not be resolved", stats.references_unresolved);
    }
    if stats.ambiguous_fallbacks > 0 {
        log::warn!(
            "{} ambiguous names fell back to the first candidate",
            stats.ambiguous_fallbacks
        );
    }

    if !navigator.is_graph_ready() {
        anyhow::bail!("relationship graph failed to become ready");
    }
    log::info!("✓ Relationship graph ready ({} sources precomputed)", stats.precomputed_sources);

    Ok(())
}
