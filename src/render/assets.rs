use crate::config::UiConfig;
use crate::game::{Rank, Suit};

/// 点数 → 资源名，按 `Rank::ALL` 的顺序排列。
const RANK_ASSET_NAMES: [&str; 13] = [
    "ace", "2", "3", "4", "5", "6", "7", "8", "9", "10", "jack", "queen", "king",
];

/// 花色 → 资源名，按 `Suit::ALL` 的顺序排列。
const SUIT_ASSET_NAMES: [&str; 4] = ["spades", "hearts", "diamonds", "clubs"];

pub fn rank_asset_name(rank: Rank) -> &'static str {
    RANK_ASSET_NAMES[rank.ordinal()]
}

pub fn suit_asset_name(suit: Suit) -> &'static str {
    SUIT_ASSET_NAMES[suit.ordinal()]
}

/// 牌面图片路径解析。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    base: String,
    back: String,
}

impl AssetResolver {
    pub fn new(base: impl Into<String>, back_image: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        let back = format!("{base}/{}", back_image.into());
        Self { base, back }
    }

    pub fn from_config(config: &UiConfig) -> Self {
        Self::new(config.asset_base.as_str(), config.back_image.as_str())
    }

    pub fn card_image(&self, rank: Rank, suit: Suit) -> String {
        format!(
            "{}/{}_of_{}.svg",
            self.base,
            rank_asset_name(rank),
            suit_asset_name(suit)
        )
    }

    pub fn back_image(&self) -> &str {
        &self.back
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn face_paths_follow_rank_and_suit_tables() {
        let assets = AssetResolver::default();
        assert_eq!(
            assets.card_image(Rank::Three, Suit::Hearts),
            "/static/cards/3_of_hearts.svg"
        );
        assert_eq!(
            assets.card_image(Rank::Ace, Suit::Spades),
            "/static/cards/ace_of_spades.svg"
        );
        assert_eq!(
            assets.card_image(Rank::King, Suit::Clubs),
            "/static/cards/king_of_clubs.svg"
        );
        assert_eq!(assets.back_image(), "/static/cards/back-blue.svg");
    }

    #[test]
    fn every_card_has_a_distinct_face() {
        let assets = AssetResolver::new("/cards/", "back.svg");
        let paths: HashSet<String> = Suit::ALL
            .iter()
            .flat_map(|suit| Rank::ALL.iter().map(|rank| assets.card_image(*rank, *suit)))
            .collect();
        assert_eq!(paths.len(), 52);
        assert!(paths.contains("/cards/10_of_diamonds.svg"));
        assert!(paths.contains("/cards/queen_of_hearts.svg"));
    }
}
