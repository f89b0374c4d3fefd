//! Keyboard interrupt counter daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   Ctrl-C / kill -INT                     Client (thin CLI, out of tree)
//!         │                                      │
//!         ▼                                      ▼
//!   ┌────────────┐                       ┌───────────────┐
//!   │ irq::Signal│  fast path            │control channel│  Unix socket
//!   │   Line     │  (atomics only)       │  (sessions)   │  JSON lines
//!   └─────┬──────┘                       └───────┬───────┘
//!         │ increment                            │ RESET / GET_COUNT / GET_TIME
//!         ▼                                      ▼ (under exclusivity token)
//!   ┌──────────────────────────────────────────────────────┐
//!   │              counter::CounterRecord                  │
//!   │          { count, last_reset } (atomics)             │
//!   └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use kic::config::{load_config, validate_config, ConfigError, KicConfig};
use kic::irq::SignalLine;
use kic::lifecycle::{self, Shutdown};
use kic::observability;

/// Count keyboard interrupts and serve the count over a control socket.
#[derive(Parser, Debug)]
#[command(name = "kicd", version, about)]
struct Cli {
    /// Config file path (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Control socket path (overrides config)
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// Validate config and print resolved settings, don't run
    #[arg(long)]
    check: bool,
}

/// Load the config file (or defaults), apply CLI overrides, validate.
fn resolve_config(cli: &Cli) -> Result<KicConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => KicConfig::default(),
    };
    if let Some(socket) = &cli.socket {
        config.control.socket_path = socket.clone();
    }
    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;

    if cli.check {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    observability::logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "kicd starting");
    tracing::debug!(?cli, "parsed CLI arguments");

    if config.observability.metrics_enabled {
        // Already validated.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        }
    }

    let service = lifecycle::start(&config, Arc::new(SignalLine::keyboard())).await?;

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    let signals = tokio::spawn(async move {
        if let Err(e) = lifecycle::signals::listen(shutdown).await {
            tracing::error!(error = %e, "Failed to install termination signal handlers");
        }
    });

    service.run(stop).await;
    signals.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_flag_overrides_default_and_keeps_cli_intact() {
        let cli = Cli::parse_from(["kicd", "--socket", "/run/kic.sock", "--check"]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.control.socket_path, PathBuf::from("/run/kic.sock"));
        assert_eq!(cli.socket.as_deref(), Some(std::path::Path::new("/run/kic.sock")));
        assert!(format!("{cli:?}").contains("/run/kic.sock"));
    }

    #[test]
    fn empty_socket_flag_fails_validation() {
        let cli = Cli::parse_from(["kicd", "--socket", ""]);
        assert!(matches!(resolve_config(&cli), Err(ConfigError::Validation(_))));
    }
}
