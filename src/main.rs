mod api;
mod app_state;
mod config;
mod core;
mod domain;
mod errors;
mod routes;

use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::app_state::build_app_state;
use crate::config::{RunPlan, Settings};
use crate::core::session::{Credentials, SessionManager};
use crate::domain::report::runner;
use crate::routes::app_router;

#[derive(Parser)]
#[command(name = "fleetstatus", version, about = "Multi-cluster pod/node status reporter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one report across the given clusters and write the artifact
    Report {
        /// Cluster names, comma-separated
        #[arg(short, long)]
        clusters: String,
        /// Namespace groups: ";" between clusters, "," within a cluster
        #[arg(short, long)]
        namespaces: String,
        /// Pod-name patterns, grouped like --namespaces
        #[arg(short, long)]
        patterns: String,
        #[arg(short = 'u', long)]
        username: String,
        #[arg(short = 'w', long, env = "FLEETSTATUS_PASSWORD", hide_env_values = true)]
        password: String,
        /// Output path for the semicolon-delimited artifact
        #[arg(short, long, default_value = "pods_status.csv")]
        output: PathBuf,
        /// Abort the run on the first failure instead of degrading to N/A
        #[arg(long)]
        strict: bool,
        /// Replay captured `top` tables from <dir>/<cluster>-{pods,nodes}.txt
        /// instead of querying the metrics API
        #[arg(long)]
        top_dir: Option<PathBuf>,
    },
    /// Serve the web front end and JSON API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();

    match cli.command {
        Command::Report {
            clusters,
            namespaces,
            patterns,
            username,
            password,
            output,
            strict,
            top_dir,
        } => {
            settings.strict = settings.strict || strict;

            // Argument validation happens before any cluster is contacted.
            let plan = match RunPlan::parse(&clusters, &namespaces, &patterns) {
                Ok(plan) => plan,
                Err(e) => {
                    error!("{}", e);
                    eprintln!("{e}");
                    exit(1);
                }
            };

            let settings = Arc::new(settings);
            let sessions = SessionManager::new(settings.clone());
            let credentials = Credentials::new(username, password);

            if let Err(e) = runner::run_to_file(
                &sessions,
                &credentials,
                &settings,
                &plan,
                top_dir.as_deref(),
                &output,
            )
            .await
            {
                error!("Run failed: {}", e);
                eprintln!("{e}");
                exit(1);
            }
        }
        Command::Serve { port } => {
            let port = port.unwrap_or(settings.port);
            let state = build_app_state(settings);
            let app = app_router().with_state(state);

            let addr = format!("0.0.0.0:{port}");
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("Cannot bind {}: {}", addr, e);
                    exit(1);
                }
            };
            info!("Listening on {}", addr);

            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
            {
                error!("Server error: {}", e);
                exit(1);
            }
        }
    }
}

fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "fleetstatus.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();
    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot install shutdown handler: {}", e);
    }
    info!("Shutting down");
}
