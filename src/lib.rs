pub mod client;
pub mod config;
pub mod game;
pub mod interaction;
pub mod logging;
pub mod notify;
pub mod render;
pub mod session;
pub mod utils;
pub mod web;

use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub use client::{ActionKind, ClientError, MoveRequest, RemoteClient, TargetType, Transport};
pub use config::{ConfigError, UiConfig};
pub use game::{
    Card, CardColor, CardId, GameState, IntegrityError, Rank, StateStore, Suit, Ticket,
    FOUNDATION_COUNT, TABLEAU_COUNT,
};
pub use interaction::{DragController, DragState, DropOutcome, ElementTags};
pub use notify::{Notice, NoticeKind, NotificationQueue};
pub use render::{AssetResolver, BoardRenderer, BoardView};
pub use session::{Game, Session, Update};
pub use web::SolitaireUi;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error<E: serde::Serialize + std::fmt::Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

/// 把一份快照渲染成视图（默认资源路径），不触碰 DOM。
#[wasm_bindgen(js_name = "renderBoard")]
pub fn render_board(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    to_value(&BoardRenderer::default().render(&state)).map_err(JsValue::from)
}

/// 牌面图片路径，例如 `cardImagePath("A", "spades")`。
#[wasm_bindgen(js_name = "cardImagePath")]
pub fn card_image_path(rank: &str, suit: &str) -> Result<String, JsValue> {
    let rank: Rank = from_value(JsValue::from_str(rank)).map_err(JsValue::from)?;
    let suit: Suit = from_value(JsValue::from_str(suit)).map_err(JsValue::from)?;
    Ok(AssetResolver::default().card_image(rank, suit))
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state.integrity_check().map_err(to_js_error)
}
