use clap::Parser;
use tracing_subscriber::EnvFilter;

use schemacafe_http::Config;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = schemacafe_http::run(config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
