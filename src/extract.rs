use tracing::{info, instrument};

use crate::{
    extract::{
        chests::{ChestDescriptor, claimable_chests},
        quests::{QuestClaim, claimable_quests},
        season::{SeasonChestDescriptor, claimable_season_chests},
    },
    popup::RawRewardPayload,
};

pub mod chests;
pub mod quests;
pub mod season;

/// The three claimable-reward lists derived from one popup snapshot.
/// Derived once per run; never re-derived or mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct EligibleRewards {
    pub quests: Vec<QuestClaim>,
    pub chests: Vec<ChestDescriptor>,
    pub season: Vec<SeasonChestDescriptor>,
}

impl EligibleRewards {
    #[instrument(skip(payload))]
    pub fn extract(payload: &RawRewardPayload) -> Self {
        let quests = claimable_quests(payload.quest_records());

        let chests = payload
            .daily_chests
            .as_deref()
            .map(claimable_chests)
            .unwrap_or_default();

        let season = payload
            .season_progress
            .as_deref()
            .map(claimable_season_chests)
            .unwrap_or_default();

        info!(
            quests = quests.len(),
            chests = chests.len(),
            season = season.len(),
            "eligible rewards extracted"
        );

        Self {
            quests,
            chests,
            season,
        }
    }
}
