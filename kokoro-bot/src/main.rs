//! Kokoro Bot CLI - emotional-support chatbot backend.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use clap::{Args, Parser, Subcommand};
use kokoro_bot::prelude::*;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Kokoro Bot - empathetic emotional-support chatbot backend
#[derive(Parser)]
#[command(name = "kokoro")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve(ServeArgs),

    /// Show configuration status
    Status,
}

/// Arguments for the serve command
#[derive(Args)]
struct ServeArgs {
    /// Bind host (overrides KOKORO_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides KOKORO_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "kokoro_bot={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => cmd_serve(args).await,
        Commands::Status => cmd_status(),
    }
}

/// Start the HTTP gateway.
async fn cmd_serve(args: ServeArgs) -> Result<()> {
    let mut config = BotConfig::from_env()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let store = Arc::new(SessionStore::with_config(SessionConfig {
        max_history: config.session.max_history,
    }));

    // Idle sweeping is opt-in via SESSION_IDLE_TTL_SECS.
    let sweeper = config.session.idle_ttl.map(|idle_ttl| {
        IdleSweeper::new(
            SweeperConfig {
                idle_ttl,
                interval: config.session.sweep_interval,
            },
            Arc::clone(&store),
        )
        .start()
    });

    let generator = GeminiGenerator::new(
        GeminiConfig::new(config.generator.api_key.clone())
            .with_model(config.generator.model.clone()),
    );
    let service = Arc::new(ChatService::new(Arc::clone(&store), generator));

    println!(
        "kokoro-bot gateway on {}:{} | Press Ctrl+C to stop",
        config.server.host, config.server.port
    );

    let result = kokoro_bot::gateway::serve(service, &config.server).await;

    if let Some(sweeper) = sweeper {
        sweeper.stop().await;
    }
    result
}

/// Show configuration status.
fn cmd_status() -> Result<()> {
    println!("Kokoro Bot Status\n");

    println!("Environment:");
    print_env_status("GEMINI_API_KEY");
    print_env_status("GEMINI_MODEL");
    print_env_status("KOKORO_HOST");
    print_env_status("KOKORO_PORT");
    print_env_status("ALLOWED_ORIGINS");
    print_env_status("MAX_HISTORY");
    print_env_status("SESSION_IDLE_TTL_SECS");

    println!();
    match BotConfig::from_env() {
        Ok(config) => {
            println!("Configuration: valid");
            println!("  Model:       {}", config.generator.model);
            println!(
                "  Bind:        {}:{}",
                config.server.host, config.server.port
            );
            println!("  Max history: {}", config.session.max_history);
            println!(
                "  Idle TTL:    {}",
                config
                    .session
                    .idle_ttl
                    .map_or_else(|| "disabled".to_string(), |ttl| format!("{}s", ttl.as_secs()))
            );
        }
        Err(e) => {
            println!("Configuration: invalid ({e})");
        }
    }

    Ok(())
}

/// Print environment variable status.
fn print_env_status(name: &str) {
    let status = if std::env::var(name).is_ok() {
        "set"
    } else {
        "-"
    };
    println!("  {name}: {status}");
}
