mod config;
mod listener;
mod session;

use std::sync::Arc;

use anyhow::Context;
use slim_engine::ConverterRegistry;
use slim_fixture::FixtureRegistry;

use config::SlimConfig;

const DEFAULT_PORT: u16 = 8085;

fn print_usage() {
    eprintln!("usage: slimd [--host <addr>] [--port <port>]");
    eprintln!();
    eprintln!("Runs the SLIM protocol server FitNesse drives acceptance tests through.");
    eprintln!("Config is resolved env → $SLIM_CONFIG/config file → built-in defaults.");
}

struct Cli {
    host: Option<String>,
    port: Option<u16>,
}

fn parse_args() -> anyhow::Result<Cli> {
    let mut cli = Cli {
        host: None,
        port: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--host" => {
                let value = args.next().context("--host requires a value")?;
                cli.host = Some(value);
            }
            "--port" => {
                let value = args.next().context("--port requires a value")?;
                cli.port = Some(value.parse().context("--port must be a number")?);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("unrecognized argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
    }
    Ok(cli)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = parse_args()?;

    let mut config = SlimConfig::load().context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.network.host = host;
    }
    if let Some(port) = cli.port {
        config.network.port = port;
    }
    if config.network.port == 0 {
        config.network.port = DEFAULT_PORT;
    }

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let converters = Arc::new(ConverterRegistry::new());

    let mut registry = FixtureRegistry::new();
    if config.fixtures.load_examples {
        example_fixtures::register_all(&mut registry);
    }
    let resolver: Arc<dyn slim_engine::ClassResolver> = Arc::new(registry);

    let (_shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);

    listener::listen(
        &config.network.host,
        config.network.port,
        converters,
        resolver,
        shutdown_rx,
    )
    .await
}
