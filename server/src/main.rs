use anyhow::Result;
use axum::Router;
use clap::Parser;
use search_core::SearchServer;
use search_server::{build_app, load_seed};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// JSONL file of documents to load at startup
    #[arg(long)]
    seed: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut search_server = SearchServer::from_stop_words_text(&args.stop_words)?;
    if let Some(seed) = &args.seed {
        let added = load_seed(std::path::Path::new(seed), &mut search_server)?;
        tracing::info!(added, seed, "seed documents loaded");
    }
    let app: Router = build_app(search_server);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
