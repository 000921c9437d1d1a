use color_eyre::eyre::Result;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::session::Session;

const POPUP_PATH: &str = "/ajax/battlepass/quests.php";

/// One snapshot of the daily-quests popup response. The quest arrays are
/// plain JSON; `dailyChests` and `seasonProgress` are HTML fragments the
/// server renders inline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRewardPayload {
    #[serde(default, deserialize_with = "lenient_records")]
    pub quests: Vec<QuestRecord>,
    #[serde(
        default,
        rename = "dailyQuests",
        deserialize_with = "lenient_records"
    )]
    pub daily_quests: Vec<QuestRecord>,
    #[serde(default, rename = "dailyChests", deserialize_with = "lenient_markup")]
    pub daily_chests: Option<String>,
    #[serde(
        default,
        rename = "seasonProgress",
        deserialize_with = "lenient_markup"
    )]
    pub season_progress: Option<String>,
}

impl RawRewardPayload {
    /// The two popup variants put the same quest list under different keys;
    /// whichever one is populated wins.
    pub fn quest_records(&self) -> &[QuestRecord] {
        if self.daily_quests.is_empty() {
            &self.quests
        } else {
            &self.daily_quests
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestRecord {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub reward: Option<QuestReward>,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestReward {
    #[serde(default)]
    pub battlepass_keys: u32,
}

// A quest field holding something other than an array yields no records, and
// a record missing its id or status is dropped rather than failing the whole
// popup decode.
fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<QuestRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_markup<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(value.and_then(|value| match value {
        Value::String(markup) => Some(markup),
        _ => None,
    }))
}

#[instrument(skip(session))]
pub async fn fetch_popup(session: &Session) -> Result<RawRewardPayload> {
    let response = session
        .get(
            POPUP_PATH,
            &[("type", "getDailyQuestsPopup"), ("page", "players_ranking")],
        )
        .await?
        .error_for_status()?;

    let payload: RawRewardPayload = response.json().await?;

    debug!(
        quests = payload.quest_records().len(),
        has_chest_markup = payload.daily_chests.is_some(),
        has_season_markup = payload.season_progress.is_some(),
        "popup fetched"
    );

    Ok(payload)
}
