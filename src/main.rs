use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use riposte::config::EngineConfig;
use riposte::uci::UciHandler;

fn main() -> Result<()> {
    // stdout belongs to the UCI protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::var("OPPONENT_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path))?;
            EngineConfig::from_toml_str(&text).with_context(|| format!("loading {}", path))?
        }
        Err(_) => EngineConfig::default(),
    };
    info!(depth = config.depth, tie_break = ?config.tie_break, "starting");

    let mut uci = UciHandler::new(config)?;
    uci.run()
}
