use std::{env::var, process::ExitCode, time::Duration};

use color_eyre::eyre::Result;
use dotenvy::dotenv;
use tracing::{error, level_filters::LevelFilter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{claim::FailurePolicy, collector::run, session::Session};

mod claim;
mod collector;
mod extract;
mod popup;
mod session;

const DEFAULT_BASE_URL: &str = "https://v3.g.ladypopular.com";
const DEFAULT_CLAIM_DELAY_MS: u64 = 1000;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    dotenv().ok();
    init_tracing()?;

    let base_url = var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let session_id = var("SESSION_ID")?;

    let session = Session::new(&base_url, &session_id)?;

    let policy = match var("CLAIM_MODE").as_deref() {
        Ok("strict") => FailurePolicy::AbortCategory,
        _ => FailurePolicy::Continue,
    };

    let claim_delay = var("CLAIM_DELAY_MS")
        .ok()
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(DEFAULT_CLAIM_DELAY_MS);

    match run(&session, policy, Duration::from_millis(claim_delay)).await {
        Ok(report) if report.success => Ok(ExitCode::SUCCESS),
        Ok(_) => {
            error!("run completed with failed claims");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!(error = ?e, "run aborted");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::NEW | FmtSpan::CLOSE))
        .with(ErrorLayer::default())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env()?,
        )
        .try_init()?;

    Ok(())
}
