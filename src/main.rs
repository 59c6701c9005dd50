// Telescope Targets v0.1
use std::process::ExitCode;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod errors;
mod helpers;
mod models;
mod report;
mod services;

use config::AppConfig;
use errors::AppError;
use services::astronomy::AstronomyClient;
use services::seventimer::SevenTimerClient;

async fn run() -> Result<String, AppError> {
    config::load_dotenv();
    let config = AppConfig::from_env()?;
    tracing::info!(
        "Planning for {}, {} with {:?} telescope, {}:00-{}:00",
        config.latitude,
        config.longitude,
        config.telescope_level,
        config.evening_start_hour,
        config.evening_end_hour
    );

    let weather_client = SevenTimerClient::new(&config.weather_api_url)?;
    let astronomy_client = AstronomyClient::new(
        &config.astronomy_api_url,
        &config.app_id,
        &config.app_secret,
    )?;

    let date = Utc::now().date_naive();
    let plan =
        services::planner::run_night_plan(&config, &weather_client, &astronomy_client, date).await;

    Ok(report::render_report(&config, &plan))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only the report.
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "telescope_targets=info".into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    match run().await {
        Ok(report) => {
            print!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) if e.is_configuration() => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}
