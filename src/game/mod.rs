//! 牌局数据模型与快照存储。

pub mod state;
pub mod store;

pub use state::{
    Card,
    CardColor,
    CardId,
    GameState,
    IntegrityError,
    Rank,
    Suit,
    FOUNDATION_COUNT,
    TABLEAU_COUNT,
};
pub use store::{StaleResponse, StateStore, Ticket};
