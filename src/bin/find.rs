use anyhow::Result;
use clap::Parser;
use relnav::config::GraphConfig;
use relnav::{Config, GraphBuilder, Navigator, PersonId, RelnavError};

#[derive(Parser, Debug)]
#[command(name = "find")]
#[command(about = "Find how two people in the family records are related")]
struct Args {
    /// Person id to start from
    a: String,

    /// Person id to reach
    b: String,

    /// Override the configured search bound
    #[arg(short, long)]
    max_degree: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn")).init();

    let args = Args::parse();
    let config = Config::load()?;

    let mut builder = GraphBuilder::from_config(&config);
    if let Some(max_degree) = args.max_degree {
        GraphConfig {
            max_degree,
            ..config.graph.clone()
        }
        .validate()?;
        builder = builder.with_max_degree(max_degree);
    }

    let mut navigator = Navigator::new(builder);
    let graph = navigator.load_from_dir(config.data_dir()).await?;

    let a = PersonId::from(args.a);
    let b = PersonId::from(args.b);
    for id in [&a, &b] {
        if !graph.contains(id) {
            return Err(RelnavError::PersonNotFound(id.to_string()).into());
        }
    }

    match navigator.find_relationship(&a, &b)? {
        Some(result) => {
            println!(
                "\n{} is the {} of {}",
                graph.display_name(&b),
                result.relationship,
                graph.display_name(&a)
            );
            println!("  Degree:  {}", result.degree);
            if !result.path.is_empty() {
                println!("  Path:    {}", graph.describe_path(&result.path));
                println!(
                    "  Reverse: {} ({})",
                    graph.describe_path(&result.reverse_path),
                    navigator.describe(&result.reverse_path)
                );
            }
            println!();
        }
        None => {
            println!(
                "\nNo relationship found between {} and {} within {} degrees.\n",
                graph.display_name(&a),
                graph.display_name(&b),
                graph.max_degree()
            );
        }
    }

    Ok(())
}
