use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 基础牌堆数量（每种花色一列）。
pub const FOUNDATION_COUNT: usize = 4;
/// 桌面牌列数量。
pub const TABLEAU_COUNT: usize = 7;

/// 服务器分配的卡牌标识，在一个快照内全局唯一。
pub type CardId = String;

/// 牌面点数，序列化形式与服务器一致（"A"、"2"…"10"、"J"、"Q"、"K"）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// 在 `ALL` 中的位置（A = 0）。
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
        }
    }

    pub fn color(self) -> CardColor {
        match self {
            Suit::Hearts | Suit::Diamonds => CardColor::Red,
            Suit::Spades | Suit::Clubs => CardColor::Black,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Red,
    Black,
}

impl CardColor {
    pub fn class_name(self) -> &'static str {
        match self {
            CardColor::Red => "red",
            CardColor::Black => "black",
        }
    }
}

/// 快照中的一张卡牌。颜色由花色推导，服务器下发的 `color`、`symbol` 字段被忽略。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub rank: Rank,
    pub suit: Suit,
    #[serde(default)]
    pub face_up: bool,
}

impl Card {
    pub fn new(id: impl Into<CardId>, rank: Rank, suit: Suit, face_up: bool) -> Self {
        Self {
            id: id.into(),
            rank,
            suit,
            face_up,
        }
    }

    pub fn color(&self) -> CardColor {
        self.suit.color()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    DuplicateCardId { card_id: CardId },
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityError::DuplicateCardId { card_id } => {
                write!(f, "card id {card_id} appears more than once")
            }
        }
    }
}

/// 远端引擎下发的完整牌局快照。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub moves: u32,
    #[serde(default)]
    pub is_won: bool,
    #[serde(default)]
    pub deck: Vec<Card>,
    #[serde(default)]
    pub waste: Vec<Card>,
    pub foundations: [Vec<Card>; FOUNDATION_COUNT],
    pub tableau: [Vec<Card>; TABLEAU_COUNT],
}

impl GameState {
    pub fn waste_top(&self) -> Option<&Card> {
        self.waste.last()
    }

    pub fn foundation_top(&self, index: usize) -> Option<&Card> {
        self.foundations.get(index).and_then(|pile| pile.last())
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.deck
            .iter()
            .chain(self.waste.iter())
            .chain(self.foundations.iter().flatten())
            .chain(self.tableau.iter().flatten())
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let mut seen = HashSet::new();
        for card in self.cards() {
            if !seen.insert(card.id.as_str()) {
                return Err(IntegrityError::DuplicateCardId {
                    card_id: card.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// 返回一个固定的开局快照，方便前端调试或测试。
    pub fn sample() -> Self {
        let mut deck: Vec<Card> = Suit::ALL
            .iter()
            .flat_map(|suit| {
                Rank::ALL.iter().map(move |rank| {
                    let id = format!("{}-{}", suit.name(), rank.label());
                    Card::new(id, *rank, *suit, false)
                })
            })
            .collect();

        let mut tableau: [Vec<Card>; TABLEAU_COUNT] = Default::default();
        for (col, column) in tableau.iter_mut().enumerate() {
            for row in 0..=col {
                if let Some(mut card) = deck.pop() {
                    card.face_up = row == col;
                    column.push(card);
                }
            }
        }

        let mut waste = Vec::new();
        if let Some(mut card) = deck.pop() {
            card.face_up = true;
            waste.push(card);
        }

        Self {
            score: 0,
            moves: 1,
            is_won: false,
            deck,
            waste,
            foundations: Default::default(),
            tableau,
        }
    }
}
