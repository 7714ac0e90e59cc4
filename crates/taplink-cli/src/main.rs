//! `taplink` reader agent.
//!
//! Runs the reader loop on the host: cards come from stdin, the link is the
//! host's own network stack and the indicators write to the log.

mod console;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use taplink_agent::{AgentConfig, ReaderLoop};
use taplink_hardware::mock::MockReader;
use taplink_hardware::{AnyCardReader, AnyIndicator, AnyWirelessLink, HostLink, LogIndicator};
use taplink_network::ReqwestTransport;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "taplink", version, about = "RFID reader agent")]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `taplink_agent=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("taplink stopped: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => AgentConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AgentConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;

    let transport = ReqwestTransport::new(Duration::from_millis(config.server.timeout_ms))?;
    let (reader, cards) = MockReader::with_name("console".to_string());

    let mut agent = ReaderLoop::from_config(
        &config,
        AnyCardReader::Mock(reader),
        AnyWirelessLink::Host(HostLink::new()),
        AnyIndicator::Log(LogIndicator::new("link")),
        AnyIndicator::Log(LogIndicator::new("event")),
        transport,
    );

    // Fatal: without a reader there is nothing to do.
    agent.boot().await?;

    let shutdown = CancellationToken::new();
    let _console = console::spawn_stdin(cards, shutdown.clone());

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received");
                signal.cancel();
            }
            Err(e) => error!(error = %e, "Cannot listen for interrupts"),
        }
    });

    let stats = agent.run(shutdown).await?;
    info!(
        delivered = stats.delivered,
        dropped = stats.dropped(),
        "Goodbye"
    );
    Ok(())
}
