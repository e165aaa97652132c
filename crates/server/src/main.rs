use clap::Parser;

use persona_server::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    persona_core::config::load_dotenv();
    let cli = Cli::parse();
    let config = persona_core::Config::from_env();

    cli::dispatch(cli, config).await
}
