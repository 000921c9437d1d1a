use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::{
    extract::{
        chests::ChestDescriptor, quests::QuestClaim, season::SeasonChestDescriptor,
    },
    session::Session,
};

const QUEST_CLAIM_PATH: &str = "/ajax/battlepass/quests.php";
const SEASON_CLAIM_PATH: &str = "/ajax/battlepass/chest.php";
const QUEST_CLAIM_TYPE: &str = "giveDailyQuestReward";

// Protocol constant: a task claim carries no physical chest slot, and the
// server expects -1 in that case.
const TASK_CHEST_SENTINEL: i32 = -1;

// Current-season claims always send previousSeason=0; claiming a previous
// season is a different flow and out of scope.
const CURRENT_SEASON: u8 = 0;

/// Something the dispatcher can claim: knows its endpoint and form body.
pub trait Claimable {
    fn endpoint(&self) -> &'static str;
    fn form(&self) -> Vec<(&'static str, String)>;
    fn describe(&self) -> String;
}

impl Claimable for QuestClaim {
    fn endpoint(&self) -> &'static str {
        QUEST_CLAIM_PATH
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("type", QUEST_CLAIM_TYPE.to_string()),
            ("quest_id", self.quest_id.clone()),
            ("chest_id", TASK_CHEST_SENTINEL.to_string()),
        ]
    }

    fn describe(&self) -> String {
        if self.title.is_empty() {
            format!("quest {}", self.quest_id)
        } else {
            format!("quest {} \"{}\"", self.quest_id, self.title)
        }
    }
}

impl Claimable for ChestDescriptor {
    fn endpoint(&self) -> &'static str {
        QUEST_CLAIM_PATH
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("type", QUEST_CLAIM_TYPE.to_string()),
            ("quest_id", self.quest_id.to_string()),
            ("chest_id", self.chest_id.to_string()),
        ]
    }

    fn describe(&self) -> String {
        format!("daily chest {} (quest {})", self.chest_id, self.quest_id)
    }
}

impl Claimable for SeasonChestDescriptor {
    fn endpoint(&self) -> &'static str {
        SEASON_CLAIM_PATH
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("chest_id", self.chest_id.to_string()),
            ("chest_css_class", self.chest_css_class.clone()),
            ("previousSeason", CURRENT_SEASON.to_string()),
        ]
    }

    fn describe(&self) -> String {
        format!("season chest {} ({})", self.chest_id, self.chest_css_class)
    }
}

/// What a failed claim does to the rest of its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailurePolicy {
    /// Log the failure and keep claiming.
    Continue,
    /// Stop claiming the remaining descriptors in this category.
    AbortCategory,
}

impl FailurePolicy {
    fn aborts_on_failure(self) -> bool {
        matches!(self, FailurePolicy::AbortCategory)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub descriptor: String,
    pub accepted: bool,
    pub server_status: Option<Value>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryReport {
    pub eligible: usize,
    pub claimed: usize,
    pub failed: usize,
    pub aborted: bool,
    pub outcomes: Vec<ClaimOutcome>,
}

impl CategoryReport {
    fn record(&mut self, outcome: ClaimOutcome) {
        if outcome.accepted {
            self.claimed += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}

pub struct Dispatcher<'a> {
    session: &'a Session,
    policy: FailurePolicy,
    pacing: Duration,
}

impl<'a> Dispatcher<'a> {
    pub fn new(session: &'a Session, policy: FailurePolicy, pacing: Duration) -> Self {
        Self {
            session,
            policy,
            pacing,
        }
    }

    /// Claims every descriptor in order, one fully-awaited call at a time.
    /// Claims are never issued concurrently: the server keeps per-user reward
    /// state and is not expecting parallel claims from one session.
    #[instrument(skip(self, items))]
    pub async fn claim_all<T: Claimable>(&self, items: &[T]) -> CategoryReport {
        let mut report = CategoryReport {
            eligible: items.len(),
            ..Default::default()
        };

        for (index, item) in items.iter().enumerate() {
            let outcome = self.claim_one(item).await;

            if outcome.accepted {
                info!(
                    descriptor = %outcome.descriptor,
                    server_status = ?outcome.server_status,
                    "claimed"
                );
            } else {
                warn!(
                    descriptor = %outcome.descriptor,
                    error = ?outcome.error,
                    "claim failed"
                );
            }

            let accepted = outcome.accepted;
            report.record(outcome);

            if !accepted && self.policy.aborts_on_failure() {
                report.aborted = true;
                break;
            }

            if index + 1 < items.len() {
                sleep(self.pacing).await;
            }
        }

        report
    }

    // Transport errors and non-success HTTP statuses come out the same way:
    // a rejected outcome. No retries; a re-run re-derives what is left.
    async fn claim_one<T: Claimable>(&self, item: &T) -> ClaimOutcome {
        let descriptor = item.describe();

        let response = match self.session.post_form(item.endpoint(), &item.form()).await {
            Ok(response) => response,
            Err(error) => {
                return ClaimOutcome {
                    descriptor,
                    accepted: false,
                    server_status: None,
                    error: Some(error.to_string()),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ClaimOutcome {
                descriptor,
                accepted: false,
                server_status: None,
                error: Some(format!("HTTP {status}")),
            };
        }

        // quests.php answers with JSON carrying a status field; chest.php
        // signals by HTTP status alone, so a non-JSON body is fine.
        let server_status = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|mut body| match &mut body {
                Value::Object(map) => map.remove("status"),
                _ => None,
            });

        ClaimOutcome {
            descriptor,
            accepted: true,
            server_status,
            error: None,
        }
    }
}
