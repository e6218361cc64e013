use crate::cli::Cli;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod routes;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    run(cli).await
}

#[instrument(skip_all)]
async fn run(cli: Cli) -> std::io::Result<()> {
    let listener = TcpListener::bind(cli.socket_addr()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, routes::app()).await
}
