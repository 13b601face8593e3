use std::process::ExitCode;

use marquee::config::LogFormat;
use marquee::{AppState, Config, Error, Server, UpstreamClient, app, logger};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            // The logger is configured from `config`, so it is not up yet.
            eprintln!("marquee: {e}");
            return ExitCode::FAILURE;
        }
    };

    logger::init(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("marquee failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Error> {
    let upstream = config.upstream()?;
    if upstream.credential().is_none() {
        warn!("API_KEY is not set; movie endpoints will answer 500 until it is configured");
    }
    info!(
        upstream = %upstream.endpoint_url(""),
        timeout_ms = upstream.timeout().as_millis() as u64,
        json_logs = config.log_format == LogFormat::Json,
        "starting marquee",
    );

    let app = app::router(AppState::new(UpstreamClient::new(upstream)?));
    Server::bind(&config.bind)?.serve(app).await
}
