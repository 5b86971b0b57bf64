use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use server::{build_app, open_store, seed_if_empty, SharedEngine};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// sled database directory; in-memory when omitted
    #[arg(long)]
    db: Option<PathBuf>,
    /// Documents (JSON/JSONL file or directory) indexed when the store is empty
    #[arg(long, default_value = "./data/sample_documents.json")]
    seed: PathBuf,
    /// Skip seeding
    #[arg(long, default_value_t = false)]
    no_seed: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let engine = SharedEngine::new(open_store(args.db.as_deref())?);
    if !args.no_seed {
        if args.seed.exists() {
            seed_if_empty(&engine, &args.seed)?;
        } else {
            tracing::warn!(seed = %args.seed.display(), "seed path not found, starting without sample data");
        }
    }
    let stats = engine.stats()?;
    tracing::info!(documents = stats.documents, unique_words = stats.unique_words, "index ready");

    let app: Router = build_app(engine);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
