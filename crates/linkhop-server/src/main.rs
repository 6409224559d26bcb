//! linkhop command line.
//!
//! Finds a shortest link path between two titles of an offline link graph.
//!
//! # Usage
//!
//! ```bash
//! # Graph file is a JSON object of title -> outgoing links
//! linkhop --graph links.json "House cat" "Physics"
//!
//! # With a config file and a deeper profile
//! linkhop --config linkhop.yaml --graph links.json --profile extended Cat Physics
//!
//! # Configuration through the environment
//! LINKHOP_SEARCH__QUICK__MAX_TIME_MS=500 linkhop --graph links.json Cat Physics
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use linkhop_domain::SearchProfile;
use linkhop_server::{init_logging, register_metrics, LinkhopConfig, SearchService};
use linkhop_storage::MemoryLinkGraph;

/// linkhop - shortest link paths between wiki titles
#[derive(Parser, Debug)]
#[command(name = "linkhop")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the JSON link graph
    #[arg(short, long)]
    graph: PathBuf,

    /// Budget profile: quick, full or extended
    #[arg(short, long, default_value = "quick")]
    profile: SearchProfile,

    /// Start title (raw titles and /wiki/ URLs are accepted)
    start: String,

    /// Target title
    target: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => LinkhopConfig::load(path)?,
        None => LinkhopConfig::from_env()?,
    };

    init_logging(&config.logging);
    register_metrics();

    let graph = MemoryLinkGraph::load_json_file(&args.graph)
        .await
        .with_context(|| format!("loading link graph from {}", args.graph.display()))?;
    info!(
        titles = graph.title_count(),
        links = graph.link_count(),
        "link graph loaded"
    );

    let service = SearchService::from_config(Arc::new(graph), &config);
    let outcome = service
        .search(&args.start, &args.target, args.profile)
        .await
        .context("search rejected")?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
