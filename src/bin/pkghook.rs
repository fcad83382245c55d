//! pkghook CLI — run the webhook receiver or classify payloads offline.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pkghook::config::Config;
use pkghook::engine;
use pkghook::sink::{MemorySink, TracingSink};
use pkghook::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "pkghook", about = "Webhook receiver for registry and push events")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook receiver
    Serve {
        /// Listen address (overrides PKGHOOK_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Classify a payload and print the record it would log
    Classify {
        /// JSON payload file; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => cmd_serve(bind).await,
        Command::Classify { file } => cmd_classify(file),
    }
}

async fn cmd_serve(bind: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(bind) = bind {
        config.bind = bind;
    }

    let guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "pkghook".to_string(),
        log_level: config.log_level.clone(),
    })?;
    tracing::info!(otlp = guard.is_exporting(), "telemetry initialized");

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("shutdown requested");
    };

    pkghook::server::serve(listener, &config, Arc::new(TracingSink), shutdown).await?;
    guard.force_flush();
    Ok(())
}

fn cmd_classify(file: Option<PathBuf>) -> anyhow::Result<()> {
    let body = match file {
        Some(path) => std::fs::read(&path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let sink = MemorySink::new();
    let delivery = engine::process(&body, &sink)?;

    println!("Event:   {}", delivery.kind());
    println!("Fields:  {}", delivery.record.len());
    println!("{}", serde_json::to_string_pretty(&delivery.record)?);
    Ok(())
}
