use scraper::{Html, Selector};
use tracing::instrument;

// Levels whose right-side chest the server never hands out; claiming them
// returns an error, so they are dropped up front.
const NON_REWARDABLE_LEVELS: [u32; 2] = [25, 29];

/// One claimable season-level chest. The claim endpoint identifies the chest
/// by its numeric id plus the `cN-N` CSS variant token from the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonChestDescriptor {
    pub chest_css_class: String,
    pub chest_id: u32,
}

#[instrument(skip(markup))]
pub fn claimable_season_chests(markup: &str) -> Vec<SeasonChestDescriptor> {
    // <li class="level-reached">
    //   <span class="level">12</span>
    //   <div class="chest-left c3-1" data-chest-id="31">...</div>
    //   <div class="chest-right c3-2" data-chest-id="32">...</div>
    // </li>
    // Only right-side chests are collectible here; left ones open through a
    // different flow.
    let block_selector = Selector::parse("li.level-reached, li.last-reached").unwrap();
    let level_selector = Selector::parse("span.level").unwrap();
    let chest_selector = Selector::parse(".chest-right[data-chest-id]").unwrap();

    let fragment = Html::parse_fragment(markup);

    fragment
        .select(&block_selector)
        .filter_map(|block| {
            let level: u32 = block
                .select(&level_selector)
                .next()?
                .text()
                .collect::<String>()
                .trim()
                .parse()
                .ok()?;

            if NON_REWARDABLE_LEVELS.contains(&level) {
                return None;
            }

            let chest = block.select(&chest_selector).next()?;

            let chest_css_class = chest
                .value()
                .classes()
                .find(|class| is_variant_token(class))?
                .to_string();
            let chest_id = chest.value().attr("data-chest-id")?.parse().ok()?;

            Some(SeasonChestDescriptor {
                chest_css_class,
                chest_id,
            })
        })
        .collect()
}

// Variant tokens look like "c3-2": a 'c', digits, '-', digits.
fn is_variant_token(class: &str) -> bool {
    let Some(rest) = class.strip_prefix('c') else {
        return false;
    };

    let Some((left, right)) = rest.split_once('-') else {
        return false;
    };

    !left.is_empty()
        && !right.is_empty()
        && left.bytes().all(|b| b.is_ascii_digit())
        && right.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_block(classes: &str, level: u32, chest: &str) -> String {
        format!(
            r#"<li class="{classes}"><span class="level">{level}</span>{chest}</li>"#
        )
    }

    #[test]
    fn extracts_right_chest_from_reached_levels() {
        let markup = [
            level_block(
                "level level-reached",
                3,
                r#"<div class="chest-right c1-3" data-chest-id="13"></div>"#,
            ),
            level_block(
                "level last-reached",
                4,
                r#"<div class="chest-right c1-4" data-chest-id="14"></div>"#,
            ),
        ]
        .join("");

        let chests = claimable_season_chests(&markup);

        assert_eq!(
            chests,
            [
                SeasonChestDescriptor {
                    chest_css_class: "c1-3".to_string(),
                    chest_id: 13
                },
                SeasonChestDescriptor {
                    chest_css_class: "c1-4".to_string(),
                    chest_id: 14
                },
            ]
        );
    }

    #[test]
    fn unreached_levels_are_ignored() {
        let markup = level_block(
            "level",
            5,
            r#"<div class="chest-right c1-5" data-chest-id="15"></div>"#,
        );

        assert!(claimable_season_chests(&markup).is_empty());
    }

    #[test]
    fn levels_25_and_29_are_always_excluded() {
        let markup = [
            level_block(
                "level-reached",
                25,
                r#"<div class="chest-right c5-1" data-chest-id="51"></div>"#,
            ),
            level_block(
                "level-reached",
                29,
                r#"<div class="chest-right c5-5" data-chest-id="55"></div>"#,
            ),
            level_block(
                "level-reached",
                26,
                r#"<div class="chest-right c5-2" data-chest-id="52"></div>"#,
            ),
        ]
        .join("");

        let chests = claimable_season_chests(&markup);

        assert_eq!(chests.len(), 1);
        assert_eq!(chests[0].chest_id, 52);
    }

    #[test]
    fn left_only_chest_blocks_yield_nothing() {
        let markup = level_block(
            "level-reached",
            7,
            r#"<div class="chest-left c2-1" data-chest-id="21"></div>"#,
        );

        assert!(claimable_season_chests(&markup).is_empty());
    }

    #[test]
    fn block_without_level_label_is_skipped() {
        let markup = r#"
            <li class="level-reached">
                <div class="chest-right c2-2" data-chest-id="22"></div>
            </li>
        "#;

        assert!(claimable_season_chests(markup).is_empty());
    }

    #[test]
    fn chest_without_variant_token_is_skipped() {
        let markup = level_block(
            "level-reached",
            8,
            r#"<div class="chest-right golden" data-chest-id="23"></div>"#,
        );

        assert!(claimable_season_chests(&markup).is_empty());
    }

    #[test]
    fn variant_token_shape() {
        assert!(is_variant_token("c1-3"));
        assert!(is_variant_token("c12-34"));
        assert!(!is_variant_token("chest-right"));
        assert!(!is_variant_token("c-3"));
        assert!(!is_variant_token("c13"));
        assert!(!is_variant_token("b1-3"));
    }
}
