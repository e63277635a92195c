use anyhow::Result;
use axum::Router;
use clap::Parser;
use sitesearch_core::persist::IndexPaths;
use sitesearch_server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Generated site directory
    #[arg(long, default_value = "./public")]
    site: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let paths = IndexPaths::new(&args.site);
    let app: Router = build_app(args.site.clone(), paths)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, site = %args.site.display(), "serving site");
    axum::serve(listener, app).await?;
    Ok(())
}
