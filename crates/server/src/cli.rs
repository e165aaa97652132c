//! CLI argument parsing and subcommand dispatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use persona_core::Config;
use tracing::info;

use crate::startup;

#[derive(Parser, Debug)]
#[command(name = "persona", version, about = "Portfolio persona chat backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Split the profile into chunks and write the chunk file.
    Chunk {
        /// Profile JSON to read (default: DATA_DIR/PROFILE_FILE).
        #[arg(long)]
        profile: Option<PathBuf>,
    },
    /// Embed the chunk file and upsert it into the vector index.
    Load,
    /// Start the HTTP/WebSocket server (default).
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Apply command-line overrides to the environment-derived config.
fn apply_overrides(command: &Command, config: &mut Config) {
    match command {
        Command::Chunk { profile: Some(path) } => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                config.storage.data_dir = parent.to_path_buf();
            }
            if let Some(name) = path.file_name() {
                config.storage.profile_file = name.to_string_lossy().into_owned();
            }
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
        _ => {}
    }
}

pub async fn dispatch(cli: Cli, mut config: Config) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Command::Serve { host: None, port: None });
    apply_overrides(&command, &mut config);

    match command {
        Command::Chunk { .. } => {
            let count = startup::run_chunk(&config)?;
            info!(count, "chunk finished");
        }
        Command::Load => {
            let report = startup::run_load(&config).await?;
            info!(upserted = report.upserted, "load finished");
        }
        Command::Serve { .. } => startup::serve(&config).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_config() -> Config {
        Config::from_lookup("", &|_| None)
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["persona"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_overrides_bind_address() {
        let cli = Cli::try_parse_from(["persona", "serve", "--host", "127.0.0.1", "--port", "9000"]).unwrap();
        let command = cli.command.unwrap();
        let mut config = empty_config();
        apply_overrides(&command, &mut config);
        assert_eq!(config.server.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn chunk_profile_override_splits_path() {
        let cli = Cli::try_parse_from(["persona", "chunk", "--profile", "fixtures/me.json"]).unwrap();
        let mut config = empty_config();
        apply_overrides(&cli.command.unwrap(), &mut config);
        assert_eq!(config.storage.profile_path(), PathBuf::from("fixtures/me.json"));
        assert_eq!(config.storage.chunks_path(), PathBuf::from("fixtures/processed_chunks.json"));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["persona", "import"]).is_err());
    }
}
