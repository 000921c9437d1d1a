use std::{env::var, path::Path, time::Duration};

use chrono::Utc;
use color_eyre::eyre::Result;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    claim::{CategoryReport, Dispatcher, FailurePolicy},
    extract::EligibleRewards,
    popup::fetch_popup,
    session::Session,
};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub quests: CategoryReport,
    pub chests: CategoryReport,
    pub season: CategoryReport,
    pub success: bool,
}

impl RunReport {
    fn categories(&self) -> [&CategoryReport; 3] {
        [&self.quests, &self.chests, &self.season]
    }

    pub fn claimed(&self) -> usize {
        self.categories().iter().map(|c| c.claimed).sum()
    }

    pub fn failed(&self) -> usize {
        self.categories().iter().map(|c| c.failed).sum()
    }
}

/// One full collection run: one popup snapshot, three extractions, three
/// sequential claim batches. A popup fetch or decode failure aborts before
/// anything is claimed.
#[instrument(skip(session))]
pub async fn run(
    session: &Session,
    policy: FailurePolicy,
    pacing: Duration,
) -> Result<RunReport> {
    let payload = fetch_popup(session).await?;

    let rewards = EligibleRewards::extract(&payload);

    let dispatcher = Dispatcher::new(session, policy, pacing);

    let quests = dispatcher.claim_all(&rewards.quests).await;
    let chests = dispatcher.claim_all(&rewards.chests).await;
    let season = dispatcher.claim_all(&rewards.season).await;

    let success = run_succeeded(policy, [&quests, &chests, &season]);

    let report = RunReport {
        quests,
        chests,
        season,
        success,
    };

    info!(
        claimed = report.claimed(),
        failed = report.failed(),
        success = report.success,
        "run finished"
    );

    if let Ok(log_path) = var("LOG_DIR") {
        save_report(&report, Path::new(&log_path)).await?;
    }

    Ok(report)
}

fn run_succeeded(policy: FailurePolicy, categories: [&CategoryReport; 3]) -> bool {
    match policy {
        // A resilient run is complete even when single claims failed.
        FailurePolicy::Continue => true,
        FailurePolicy::AbortCategory => categories
            .iter()
            .all(|category| category.failed == 0 && !category.aborted),
    }
}

async fn save_report(report: &RunReport, log_path: &Path) -> Result<()> {
    if !tokio::fs::try_exists(log_path).await? {
        info!("Creating log directory at {:?}", log_path);
        tokio::fs::create_dir_all(log_path).await?;
    }

    let log_path = log_path.join(format!("run_{}.json", Utc::now().to_rfc3339()));

    info!("Saving run report to {:?}", log_path);
    let report_json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(log_path, report_json).await?;

    Ok(())
}
