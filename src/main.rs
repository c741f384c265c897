//! clarifai-search: run a rank/filter query against an app from the command line
//!
//! The query document is JSON: `{"ranks": [...], "filters": [...]}`.

use anyhow::{Context, Result};
use clap::Parser;
use clarifai_search::{config, ApiClient, Search};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "clarifai-search", version, about = "Search the inputs of a Clarifai app")]
struct Args {
    /// App to search
    #[arg(long)]
    app: String,

    /// Owner of the app (defaults to CLARIFAI_USER_ID / settings)
    #[arg(long)]
    user: Option<String>,

    /// Maximum number of hits
    #[arg(long, conflicts_with = "all_pages")]
    top_k: Option<usize>,

    /// Walk every page instead of stopping at top_k
    #[arg(long)]
    all_pages: bool,

    /// "euclidean" or "cosine"
    #[arg(long)]
    metric: Option<String>,

    /// Path to a settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Query document; read from stdin when omitted
    query: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct QueryDocument {
    ranks: Vec<Value>,
    filters: Vec<Value>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let settings = match args.config {
        Some(ref path) => config::load_from(path.clone())?,
        None => config::load()?,
    };

    let user_id = args
        .user
        .clone()
        .or_else(|| settings.api.user_id.clone())
        .context("No user id given (use --user or CLARIFAI_USER_ID)")?;

    let client = ApiClient::with_settings(&settings.api)?;
    info!("Using API at {}", client.base_url());

    let mut search_settings = settings.search.clone();
    if args.all_pages {
        search_settings.top_k = None;
    }
    let mut builder = Search::builder(client, user_id, args.app.clone())
        .settings(&search_settings)
        .pagination(args.all_pages);
    if let Some(top_k) = args.top_k {
        builder = builder.top_k(top_k);
    }
    if let Some(metric) = args.metric {
        builder = builder.metric(metric);
    }
    let search = builder.build()?;

    let document = read_query(args.query.as_ref())?;
    let pages = search.query(&document.ranks, &document.filters)?;

    let mut stream = Box::pin(pages.into_stream());
    let mut total = 0usize;
    while let Some(page) = stream.next().await {
        for hit in page?.hits {
            println!("{}", serde_json::to_string(&hit)?);
            total += 1;
        }
    }

    info!("{} hits", total);
    Ok(())
}

fn read_query(path: Option<&PathBuf>) -> Result<QueryDocument> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    serde_json::from_str(&text).context("Query document must be {\"ranks\": [...], \"filters\": [...]}")
}
