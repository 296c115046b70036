use serde::Serialize;

use super::assets::AssetResolver;
use crate::config::UiConfig;
use crate::game::{Card, CardColor, CardId, GameState, Rank, Suit, FOUNDATION_COUNT};

/// 空基础牌堆的占位符号，按牌堆位置取值（与花色值无关）。
pub const EMPTY_FOUNDATION_GLYPHS: [char; FOUNDATION_COUNT] = ['♠', '♥', '♦', '♣'];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "face", rename_all = "snake_case")]
pub enum CardFace {
    Front {
        rank: Rank,
        suit: Suit,
        color: CardColor,
    },
    /// 背面统一渲染，不暴露点数和花色。
    Back,
}

/// 渲染后的一张牌。只有可交互的牌才带 `card_id`。
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CardView {
    #[serde(flatten)]
    pub face: CardFace,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<CardId>,
}

impl CardView {
    fn front(card: &Card, assets: &AssetResolver, interactive: bool) -> Self {
        Self {
            face: CardFace::Front {
                rank: card.rank,
                suit: card.suit,
                color: card.color(),
            },
            image: assets.card_image(card.rank, card.suit),
            card_id: interactive.then(|| card.id.clone()),
        }
    }

    fn back(assets: &AssetResolver) -> Self {
        Self {
            face: CardFace::Back,
            image: assets.back_image().to_string(),
            card_id: None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.card_id.is_some()
    }

    pub fn is_face_up(&self) -> bool {
        matches!(self.face, CardFace::Front { .. })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StackedCard {
    #[serde(flatten)]
    pub card: CardView,
    pub offset_px: i32,
    pub z_index: usize,
    pub classes: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FoundationView {
    Card { card: CardView },
    Empty { glyph: char },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WinPanel {
    pub final_score: i32,
}

/// 一次完整渲染的结果，供 DOM 层整体替换。
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BoardView {
    pub score: i32,
    pub moves: u32,
    pub deck: Option<CardView>,
    pub waste: Option<CardView>,
    pub foundations: Vec<FoundationView>,
    pub tableau: Vec<Vec<StackedCard>>,
    pub win: Option<WinPanel>,
}

impl BoardView {
    pub fn cards(&self) -> impl Iterator<Item = &CardView> {
        let foundation_cards = self.foundations.iter().filter_map(|pile| match pile {
            FoundationView::Card { card } => Some(card),
            FoundationView::Empty { .. } => None,
        });
        self.deck
            .iter()
            .chain(self.waste.iter())
            .chain(foundation_cards)
            .chain(self.tableau.iter().flatten().map(|stacked| &stacked.card))
    }

    pub fn interactive_count(&self) -> usize {
        self.cards().filter(|card| card.is_interactive()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRenderer {
    assets: AssetResolver,
    overlap_px: i32,
}

impl BoardRenderer {
    pub fn new(assets: AssetResolver, overlap_px: i32) -> Self {
        Self { assets, overlap_px }
    }

    pub fn from_config(config: &UiConfig) -> Self {
        Self::new(AssetResolver::from_config(config), config.tableau_overlap_px)
    }

    /// 从快照完整重建视图；同一快照多次渲染结果相同。
    pub fn render(&self, state: &GameState) -> BoardView {
        BoardView {
            score: state.score,
            moves: state.moves,
            deck: self.render_deck(state),
            waste: self.render_waste(state),
            foundations: (0..FOUNDATION_COUNT)
                .map(|index| self.render_foundation(state, index))
                .collect(),
            tableau: state
                .tableau
                .iter()
                .map(|column| self.render_column(column))
                .collect(),
            win: state.is_won.then_some(WinPanel {
                final_score: state.score,
            }),
        }
    }

    fn render_deck(&self, state: &GameState) -> Option<CardView> {
        (!state.deck.is_empty()).then(|| CardView::back(&self.assets))
    }

    fn render_waste(&self, state: &GameState) -> Option<CardView> {
        let top = state.waste_top()?;
        if top.face_up {
            Some(CardView::front(top, &self.assets, true))
        } else {
            Some(CardView::back(&self.assets))
        }
    }

    fn render_foundation(&self, state: &GameState, index: usize) -> FoundationView {
        match state.foundation_top(index) {
            Some(top) => FoundationView::Card {
                card: CardView::front(top, &self.assets, top.face_up),
            },
            None => FoundationView::Empty {
                glyph: EMPTY_FOUNDATION_GLYPHS[index],
            },
        }
    }

    fn render_column(&self, column: &[Card]) -> Vec<StackedCard> {
        column
            .iter()
            .enumerate()
            .map(|(position, card)| {
                let view = if card.face_up {
                    CardView::front(card, &self.assets, true)
                } else {
                    CardView::back(&self.assets)
                };
                let mut classes = format!("card {}", card.color().class_name());
                if !card.face_up {
                    classes.push_str(" face-down");
                }
                StackedCard {
                    card: view,
                    offset_px: if position == 0 { 0 } else { self.overlap_px },
                    z_index: position,
                    classes,
                }
            })
            .collect()
    }
}

impl Default for BoardRenderer {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}
