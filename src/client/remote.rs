use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::ClientError;
use super::transport::{ApiRequest, Transport};
use crate::game::{CardId, GameState, FOUNDATION_COUNT, TABLEAU_COUNT};
use crate::logging;

pub const GAME_STATE_PATH: &str = "/api/game-state";
pub const NEW_GAME_PATH: &str = "/api/new-game";
pub const DRAW_CARD_PATH: &str = "/api/draw-card";
pub const AUTO_MOVE_PATH: &str = "/api/auto-move";
pub const MOVE_CARD_PATH: &str = "/api/move-card";
pub const UNDO_PATH: &str = "/api/undo";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Load,
    NewGame,
    Draw,
    AutoMove,
    MoveCard,
    Undo,
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Load => "load",
            ActionKind::NewGame => "new game",
            ActionKind::Draw => "draw",
            ActionKind::AutoMove => "auto move",
            ActionKind::MoveCard => "move card",
            ActionKind::Undo => "undo",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Foundation,
    Tableau,
}

impl TargetType {
    pub fn name(self) -> &'static str {
        match self {
            TargetType::Foundation => "foundation",
            TargetType::Tableau => "tableau",
        }
    }

    pub fn max_index(self) -> u8 {
        match self {
            TargetType::Foundation => (FOUNDATION_COUNT - 1) as u8,
            TargetType::Tableau => (TABLEAU_COUNT - 1) as u8,
        }
    }
}

/// 移动请求体。来源区域不在客户端记录，由服务器根据 `card_id` 自行定位。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRequest {
    pub card_id: CardId,
    pub target_type: TargetType,
    pub target_index: u8,
}

impl MoveRequest {
    pub fn new(
        card_id: impl Into<CardId>,
        target_type: TargetType,
        target_index: u8,
    ) -> Result<Self, ClientError> {
        if target_index > target_type.max_index() {
            return Err(ClientError::TargetOutOfRange {
                target_type,
                target_index,
            });
        }
        Ok(Self {
            card_id: card_id.into(),
            target_type,
            target_index,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub accepted: bool,
    pub state: GameState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoMoveOutcome {
    pub state: GameState,
    pub moves_made: u32,
}

#[derive(Deserialize)]
struct ActionResponse {
    success: bool,
    game_state: GameState,
}

#[derive(Deserialize)]
struct AutoMoveResponse {
    game_state: GameState,
    #[serde(default)]
    moves_made: u32,
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R, ClientError> {
    serde_json::from_str(body).map_err(ClientError::decode)
}

fn checked(state: GameState) -> Result<GameState, ClientError> {
    state.integrity_check().map_err(ClientError::decode)?;
    Ok(state)
}

impl From<ActionResponse> for ActionOutcome {
    fn from(response: ActionResponse) -> Self {
        Self {
            accepted: response.success,
            state: response.game_state,
        }
    }
}

/// 远端引擎的客户端，每个操作恰好一次往返，不重试。
#[derive(Debug)]
pub struct RemoteClient<T> {
    transport: T,
}

impl<T: Transport> RemoteClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn load_state(&self) -> Result<GameState, ClientError> {
        let body = self.transport.send(ApiRequest::get(GAME_STATE_PATH)).await?;
        checked(decode(&body)?)
    }

    pub async fn new_game(&self) -> Result<GameState, ClientError> {
        let body = self.transport.send(ApiRequest::post(NEW_GAME_PATH)).await?;
        checked(decode(&body)?)
    }

    pub async fn draw(&self) -> Result<ActionOutcome, ClientError> {
        self.action(ApiRequest::post(DRAW_CARD_PATH)).await
    }

    pub async fn auto_move(&self) -> Result<AutoMoveOutcome, ClientError> {
        let body = self.transport.send(ApiRequest::post(AUTO_MOVE_PATH)).await?;
        let response: AutoMoveResponse = decode(&body)?;
        Ok(AutoMoveOutcome {
            state: checked(response.game_state)?,
            moves_made: response.moves_made,
        })
    }

    pub async fn move_card(&self, request: &MoveRequest) -> Result<ActionOutcome, ClientError> {
        if request.target_index > request.target_type.max_index() {
            return Err(ClientError::TargetOutOfRange {
                target_type: request.target_type,
                target_index: request.target_index,
            });
        }
        let payload = serde_json::to_string(request).map_err(ClientError::decode)?;
        logging::debug(&format!("API call - moveCard: {payload}"));
        let outcome = self
            .action(ApiRequest::post(MOVE_CARD_PATH).with_body(payload))
            .await?;
        logging::debug(&format!("API response - moveCard accepted: {}", outcome.accepted));
        Ok(outcome)
    }

    pub async fn undo(&self) -> Result<ActionOutcome, ClientError> {
        self.action(ApiRequest::post(UNDO_PATH)).await
    }

    async fn action(&self, request: ApiRequest) -> Result<ActionOutcome, ClientError> {
        let body = self.transport.send(request).await?;
        let response: ActionResponse = decode(&body)?;
        let mut outcome = ActionOutcome::from(response);
        outcome.state = checked(outcome.state)?;
        Ok(outcome)
    }
}
