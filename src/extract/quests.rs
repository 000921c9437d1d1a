use tracing::instrument;

use crate::popup::QuestRecord;

// Status codes are string digits on the wire; "4" is completed-but-unclaimed.
const CLAIMABLE_STATUS: &str = "4";

/// A quest whose reward can be claimed. Title and key preview are carried
/// for logging only; the claim protocol needs just the id.
#[derive(Debug, Clone)]
pub struct QuestClaim {
    pub quest_id: String,
    pub title: String,
    pub battlepass_keys: u32,
}

#[instrument(skip(records))]
pub fn claimable_quests(records: &[QuestRecord]) -> Vec<QuestClaim> {
    records
        .iter()
        .filter(|record| record.status == CLAIMABLE_STATUS)
        .map(|record| QuestClaim {
            quest_id: record.id.clone(),
            title: record.title.clone(),
            battlepass_keys: record
                .reward
                .as_ref()
                .map(|reward| reward.battlepass_keys)
                .unwrap_or_default(),
        })
        .collect()
}
