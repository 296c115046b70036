//! 快照 → 视图的纯渲染。

pub mod assets;
pub mod board;

pub use assets::{rank_asset_name, suit_asset_name, AssetResolver};
pub use board::{
    BoardRenderer,
    BoardView,
    CardFace,
    CardView,
    FoundationView,
    StackedCard,
    WinPanel,
    EMPTY_FOUNDATION_GLYPHS,
};
