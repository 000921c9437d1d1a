use scraper::{Html, Selector};
use tracing::instrument;

/// One claimable daily-chest slot.
///
/// `chest_id` is the one-based slot id the claim endpoint expects; the markup
/// carries a zero-based `data-chest-index`, so it is always `index + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChestDescriptor {
    pub quest_id: u32,
    pub chest_id: u32,
}

#[instrument(skip(markup))]
pub fn claimable_chests(markup: &str) -> Vec<ChestDescriptor> {
    // <div class="daily-chest semi-opened" data-quest="500001" data-chest-index="0">...
    // "semi-opened" marks eligible-but-unclaimed; locked and opened chests
    // carry other state classes and must not match.
    let chest_selector = Selector::parse(".daily-chest.semi-opened").unwrap();

    let fragment = Html::parse_fragment(markup);

    fragment
        .select(&chest_selector)
        .filter_map(|element| {
            let quest_id = element.value().attr("data-quest")?.parse().ok()?;
            let index: u32 = element.value().attr("data-chest-index")?.parse().ok()?;

            Some(ChestDescriptor {
                quest_id,
                chest_id: index + 1,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_semi_opened_chests_with_one_based_slot_id() {
        let markup = r#"
            <div class="daily-chest semi-opened" data-quest="500001" data-chest-index="0"></div>
            <div class="daily-chest semi-opened" data-quest="500002" data-chest-index="1"></div>
        "#;

        let chests = claimable_chests(markup);

        assert_eq!(
            chests,
            [
                ChestDescriptor {
                    quest_id: 500001,
                    chest_id: 1
                },
                ChestDescriptor {
                    quest_id: 500002,
                    chest_id: 2
                },
            ]
        );
    }

    #[test]
    fn ignores_locked_and_opened_chests() {
        let markup = r#"
            <div class="daily-chest locked" data-quest="500001" data-chest-index="0"></div>
            <div class="daily-chest opened" data-quest="500002" data-chest-index="1"></div>
            <div class="daily-chest semi-opened" data-quest="500003" data-chest-index="2"></div>
        "#;

        let chests = claimable_chests(markup);

        assert_eq!(chests.len(), 1);
        assert_eq!(chests[0].quest_id, 500003);
        assert_eq!(chests[0].chest_id, 3);
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let markup = r#"<div data-chest-index="2" class="extra daily-chest semi-opened" data-quest="7"></div>"#;

        let chests = claimable_chests(markup);

        assert_eq!(
            chests,
            [ChestDescriptor {
                quest_id: 7,
                chest_id: 3
            }]
        );
    }

    #[test]
    fn chest_missing_an_attribute_is_skipped() {
        let markup = r#"
            <div class="daily-chest semi-opened" data-chest-index="0"></div>
            <div class="daily-chest semi-opened" data-quest="9"></div>
        "#;

        assert!(claimable_chests(markup).is_empty());
    }

    #[test]
    fn empty_markup_yields_no_chests() {
        assert!(claimable_chests("").is_empty());
    }
}
