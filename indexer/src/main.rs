use anyhow::Result;
use clap::{Parser, Subcommand};
use search_core::ingest::load_documents;
use search_core::{SearchEngine, SledStore};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect the inverted index database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index documents from JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Database directory
        #[arg(long, default_value = "./data/search_index.db")]
        db: String,
    },
    /// Print document and term counts
    Stats {
        #[arg(long, default_value = "./data/search_index.db")]
        db: String,
    },
    /// Run a query and print the results as JSON
    Search {
        #[arg(long, default_value = "./data/search_index.db")]
        db: String,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, db } => build_index(&input, &db),
        Commands::Stats { db } => {
            let engine = open(&db)?;
            let stats = engine.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Commands::Search { db, query, page, limit } => {
            let engine = open(&db)?;
            let res = engine.search(&query, page, limit)?;
            let out = serde_json::json!({
                "results": res.results,
                "total": res.total,
                "page": res.page,
                "limit": res.limit,
                "search_time": res.elapsed.as_secs_f64(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

fn open(db: &str) -> Result<SearchEngine<SledStore>> {
    Ok(SearchEngine::new(Arc::new(SledStore::open(db)?)))
}

fn build_index(input: &str, db: &str) -> Result<()> {
    let engine = open(db)?;
    let docs = load_documents(input)?;
    tracing::info!(input, docs = docs.len(), "loaded input documents");

    let mut indexed = 0usize;
    for doc in docs {
        let title = doc.title.clone();
        match engine.index_document(doc) {
            Ok(doc_id) => {
                indexed += 1;
                tracing::debug!(doc_id, %title, "indexed");
            }
            Err(search_core::SearchError::Validation(msg)) => {
                tracing::warn!(%title, %msg, "skipping invalid document");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let stats = engine.stats()?;
    tracing::info!(indexed, documents = stats.documents, unique_words = stats.unique_words, db, "index build complete");
    Ok(())
}
