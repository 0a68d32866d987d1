mod bootstrap;
mod config;
mod error;
mod http;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use assess_engine::eval::{evaluate, load_ground_truth};
use assess_engine::format::MAX_TOP_K;
use config::Config;
use error::AppError;
use server::RecommenderServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC and evaluation reports
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::from_env()?;
    info!(
        catalog = %config.catalog_path.display(),
        index_mode = %config.index_mode,
        candidate_pool = config.candidate_pool,
        oracle = config.oracle_enabled,
        "configuration loaded"
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("evaluate") => run_evaluation(&config, &args[1..]).await,
        Some(other) => Err(AppError::Usage(format!(
            "unknown command '{other}'; expected no arguments or 'evaluate <ground_truth.json> [k, 1..=10]'"
        ))
        .into()),
        None => serve(config).await,
    }
}

async fn run_evaluation(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let path = args
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| AppError::Usage("evaluate <ground_truth.json> [k, 1..=10]".to_string()))?;
    let k = match args.get(1) {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| AppError::Usage(format!("k must be a positive integer, got '{raw}'")))?,
        None => MAX_TOP_K,
    };

    let rows = load_ground_truth(&path)?;
    info!(rows = rows.len(), k, path = %path.display(), "ground truth loaded");
    let recommender = bootstrap::build_recommender(config).await?;
    let report = evaluate(&recommender, &rows, k).await;
    for query in &report.per_query {
        info!(query = %query.query, recall = query.recall, hits = query.hits, relevant = query.relevant, "query recall");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("starting assess-recommender");
    let recommender = Arc::new(bootstrap::build_recommender(&config).await?);

    if let Some(addr) = &config.http_addr {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "HTTP server ready");
        axum::serve(listener, http::router(recommender)).await?;
        info!("HTTP server shut down");
        return Ok(());
    }

    let server = RecommenderServer::new(recommender);
    if let Some(addr) = &config.mcp_tcp_addr {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
