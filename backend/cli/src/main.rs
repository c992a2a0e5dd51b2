mod wiring;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use exambot_config::{validate, Config};
use exambot_gateway::{build_router, start_server, GatewayState};

#[derive(Parser)]
#[command(name = "exambot")]
#[command(about = "Telegram webhook that answers exam questions from text or photos")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Load and validate configuration from the environment, then exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration from environment")?;

    exambot_logging::init_logger(&config.server.log_level, config.server.log_dir.as_deref());

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::CheckConfig => check_config(&config),
    }

    Ok(())
}

fn check_config(config: &Config) {
    println!("{config:#?}");
    let report = validate(config);
    if report.is_clean() {
        println!("configuration OK");
        return;
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        addr = %config.server.listen_addr(),
        webhook_path = %config.server.webhook_path,
        model_uri = %config.completion.model_uri(),
        "Starting exambot"
    );
    validate(&config).log();

    let dispatcher = wiring::build_dispatcher(&config);
    let app = build_router(GatewayState::new(dispatcher), &config.server.webhook_path);

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    start_server(listener, app, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C; shutting down"),
    }
}
