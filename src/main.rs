//! math-api server binary.
//!
//! ```text
//! math-api [--config PATH] [serve]
//! math-api [--config PATH] add-user --username NAME --password PASS
//! ```
//!
//! Without a config file every setting takes its default; `DATABASE_URL`,
//! `JWT_SECRET` and `PORT` override the file either way.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use math_api::config::{load_config, AppConfig};
use math_api::lifecycle::{self, Shutdown};
use math_api::observability::logging;
use math_api::HttpServer;

#[derive(Parser)]
#[command(name = "math-api")]
#[command(about = "Authenticated arithmetic HTTP service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "MATH_API_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Create or replace a user in the credentials database
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::AddUser { username, password } => add_user(&config, &username, &password).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("math-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        audit_backend = ?config.audit.backend,
        credentials = ?config.auth.credentials,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let state = lifecycle::build_state(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, state);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        _ = lifecycle::wait_for_signal() => {
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => {
            result??;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn add_user(
    config: &AppConfig,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = lifecycle::startup::connect_user_store(config).await?;
    users.add_user(username, password).await?;
    tracing::info!(username = %username, "User saved");
    Ok(())
}
