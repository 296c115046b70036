//! 拖放交互。

pub mod drag;

pub use drag::{resolve_card_identity, DragController, DragState, DropOutcome, DropZone, ElementTags};
