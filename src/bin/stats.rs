use relnav::{Config, Navigator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::load()?;
    let mut navigator = Navigator::from_config(&config);
    let graph = navigator.load_from_dir(config.data_dir()).await?;
    let stats = graph.stats();

    println!("\n=== Relnav Graph Statistics ===\n");
    println!("Data directory: {}\n", config.data_dir().display());

    println!("{:-<50}", "");
    println!("{:<35} {:>12}", "Metric", "Count");
    println!("{:-<50}", "");
    let rows = [
        ("People", stats.records_accepted),
        ("Rejected records", stats.records_rejected),
        ("References resolved", stats.references_resolved),
        ("References unresolved", stats.references_unresolved),
        ("Ambiguous name fallbacks", stats.ambiguous_fallbacks),
        ("Self references dropped", stats.self_references),
        ("Parent/child edges", stats.parent_edges),
        ("Spouse edges", stats.spouse_edges),
        ("Sibling edges", stats.sibling_edges),
        ("Precomputed sources", stats.precomputed_sources),
    ];
    for (label, count) in rows {
        println!("{:<35} {:>12}", label, count);
    }
    println!("{:-<50}", "");

    let collisions = graph.name_index().collisions();
    if collisions.is_empty() {
        println!("\nNo shared names.");
    } else {
        println!("\nShared Names (resolved by lineage or first match):\n");
        println!("{:<35} {:>12}", "Name", "People");
        println!("{:-<50}", "");
        for (name, count) in &collisions {
            println!("{:<35} {:>12}", name, count);
        }
        println!("{:-<50}", "");
    }

    println!("\nPath Cache:");
    println!("  Sources cached: {}", graph.path_cache().len());
    println!("  Capacity: {}", graph.path_cache().capacity());
    println!("  Max degree: {}", graph.max_degree());
    println!();

    Ok(())
}
