use serde::{Deserialize, Serialize};

use crate::client::{MoveRequest, TargetType};
use crate::game::CardId;
use crate::logging;

/// 页面元素上与拖放相关的标记（`data-card-id`、`data-foundation`、`data-tableau`）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementTags {
    pub card_id: Option<String>,
    pub foundation: Option<String>,
    pub tableau: Option<String>,
}

impl ElementTags {
    pub fn card(card_id: impl Into<String>) -> Self {
        Self {
            card_id: Some(card_id.into()),
            ..Self::default()
        }
    }

    pub fn foundation(index: impl Into<String>) -> Self {
        Self {
            foundation: Some(index.into()),
            ..Self::default()
        }
    }

    pub fn tableau(index: impl Into<String>) -> Self {
        Self {
            tableau: Some(index.into()),
            ..Self::default()
        }
    }
}

/// 可放置的区域。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DropZone {
    pub target_type: TargetType,
    pub index: u8,
}

impl DropZone {
    /// 只识别 0–3 的基础牌堆和 0–6 的桌面牌列，其他标记一律不算区域。
    pub fn from_tags(tags: &ElementTags) -> Option<Self> {
        if let Some(raw) = tags.foundation.as_deref() {
            return Self::parse(TargetType::Foundation, raw);
        }
        if let Some(raw) = tags.tableau.as_deref() {
            return Self::parse(TargetType::Tableau, raw);
        }
        None
    }

    fn parse(target_type: TargetType, raw: &str) -> Option<Self> {
        let index: u8 = raw.trim().parse().ok()?;
        (index <= target_type.max_index()).then_some(Self { target_type, index })
    }
}

/// 从事件目标开始向外查找最近的带卡牌标识的元素。
/// 拖动可能起始于卡牌容器内部的图片等子元素。
pub fn resolve_card_identity<'a, I>(chain: I) -> Option<CardId>
where
    I: IntoIterator<Item = &'a ElementTags>,
{
    chain
        .into_iter()
        .find_map(|tags| tags.card_id.as_deref().filter(|id| !id.is_empty()))
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        card_id: CardId,
    },
    Resolving {
        card_id: CardId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Submit(MoveRequest),
    Ignored,
}

/// 拖放状态机。同一时间最多只有一个移动请求在途。
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self.state, DragState::Resolving { .. })
    }

    /// 开始拖动。等待移动结果期间拒绝新的拖动。
    pub fn drag_start<'a, I>(&mut self, chain: I) -> Option<CardId>
    where
        I: IntoIterator<Item = &'a ElementTags>,
    {
        if self.is_resolving() {
            logging::debug("drag refused: a move is still resolving");
            return None;
        }
        let card_id = resolve_card_identity(chain)?;
        logging::debug(&format!("Dragging card: {card_id}"));
        self.state = DragState::Dragging {
            card_id: card_id.clone(),
        };
        Some(card_id)
    }

    pub fn drop_on(&mut self, target: &ElementTags) -> DropOutcome {
        let card_id = match &self.state {
            DragState::Dragging { card_id } => card_id.clone(),
            DragState::Idle | DragState::Resolving { .. } => return DropOutcome::Ignored,
        };

        let Some(zone) = DropZone::from_tags(target) else {
            logging::debug("Invalid drop target");
            self.state = DragState::Idle;
            return DropOutcome::Ignored;
        };

        match MoveRequest::new(card_id.clone(), zone.target_type, zone.index) {
            Ok(request) => {
                logging::debug(&format!(
                    "Moving to: {} {}",
                    zone.target_type.name(),
                    zone.index
                ));
                self.state = DragState::Resolving { card_id };
                DropOutcome::Submit(request)
            }
            Err(error) => {
                logging::warn(&error.to_string());
                self.state = DragState::Idle;
                DropOutcome::Ignored
            }
        }
    }

    /// 拖动结束（浏览器在 drop 之后也会触发）。只在未放置时回到空闲。
    pub fn drag_end(&mut self) {
        if matches!(self.state, DragState::Dragging { .. }) {
            self.state = DragState::Idle;
        }
    }

    /// 移动请求已返回（无论成功与否）。
    pub fn resolved(&mut self) {
        if self.is_resolving() {
            self.state = DragState::Idle;
        }
    }
}
