//! Agenda Worker - serves the scheduling core over HTTP and NATS.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use agenda_worker::api::{self, AppState};
use agenda_worker::cli::{Cli, Command};
use agenda_worker::config::Config;
use agenda_worker::handlers;
use agenda_worker::services::SchedulingService;
use agenda_worker::validation::{PlanRequestInput, ValidateAppointmentRequest};
use agenda_worker::TravelEstimator;

fn default_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,agenda_worker=debug".into()),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let scheduler = SchedulingService::new(TravelEstimator::new(config.average_speed_kmh));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, scheduler).await,
        Command::Validate { file } => {
            init_cli_logging();
            let request: ValidateAppointmentRequest = read_json(&file)?;
            let report = scheduler.check_appointment(request)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Plan { file } => {
            init_cli_logging();
            let request: PlanRequestInput = read_json(&file)?;
            let result = scheduler.plan_day(request)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

/// One-shot commands keep stdout for their JSON output.
fn init_cli_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into())),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn serve(config: Config, scheduler: SchedulingService) -> Result<()> {
    std::fs::create_dir_all(&config.logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &config.logs_dir,
        "agenda-worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(default_filter())
        .with(tracing_subscriber::fmt::layer())  // stdout
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))  // file
        .init();

    info!("Starting Agenda Worker...");
    info!(
        "Configuration loaded (average speed {} km/h)",
        config.average_speed_kmh
    );

    let state = AppState { scheduler };
    let http = api::serve(&config.http_bind_addr, state);

    let Some(nats_url) = config.nats_url.as_deref() else {
        info!("NATS_URL not set, serving HTTP only");
        return http.await;
    };

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (&config.nats_user, &config.nats_password) {
        (Some(user), Some(password)) => {
            async_nats::ConnectOptions::new()
                .user_and_password(user.clone(), password.clone())
                .connect(nats_url)
                .await?
        }
        _ => async_nats::connect(nats_url).await?,
    };
    info!("Connected to NATS at {}", nats_url);

    tokio::select! {
        result = http => {
            if let Err(e) = &result {
                error!("HTTP server error: {}", e);
            }
            result
        }
        result = handlers::start_handlers(nats_client, scheduler) => {
            if let Err(e) = &result {
                error!("Handler error: {}", e);
            }
            result
        }
    }
}
