use std::cell::{Ref, RefCell};

use serde::Serialize;

use crate::client::{
    ActionKind, ActionOutcome, AutoMoveOutcome, ClientError, MoveRequest, RemoteClient, Transport,
};
use crate::config::UiConfig;
use crate::game::{CardId, GameState, StateStore, Ticket};
use crate::interaction::{DragController, DropOutcome, ElementTags};
use crate::logging;
use crate::notify::{Notice, NoticeId, NoticeKind, NotificationQueue};
use crate::render::{BoardRenderer, BoardView};
use crate::utils;

pub const MOVE_ACCEPTED_MESSAGE: &str = "Move successful!";
pub const MOVE_REJECTED_MESSAGE: &str = "Invalid move!";
pub const MOVE_FAILED_MESSAGE: &str = "Error moving card!";
pub const DRAW_REJECTED_MESSAGE: &str = "No cards left to draw.";
pub const UNDO_REJECTED_MESSAGE: &str = "Nothing to undo.";
pub const MOVE_SUPERSEDED_MESSAGE: &str = "Move superseded by a newer game state.";

pub fn auto_move_message(moves_made: u32) -> String {
    if moves_made == 1 {
        "1 card moved automatically!".to_string()
    } else {
        format!("{moves_made} cards moved automatically!")
    }
}

/// 一次操作完成后需要呈现的内容：先重绘（若有），再显示提示。
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Update {
    pub view: Option<BoardView>,
    pub notices: Vec<Notice>,
}

/// 同步部分的会话状态：快照、拖放状态机、提示队列和渲染器。
#[derive(Debug)]
pub struct Session {
    store: StateStore,
    drag: DragController,
    notifications: NotificationQueue,
    renderer: BoardRenderer,
    clock: fn() -> f64,
}

impl Session {
    pub fn new(config: &UiConfig) -> Self {
        Self {
            store: StateStore::new(),
            drag: DragController::new(),
            notifications: NotificationQueue::new(config.notification_ttl_ms),
            renderer: BoardRenderer::from_config(config),
            clock: utils::now_ms,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// 每次都从当前快照重新渲染。
    pub fn render(&self) -> Option<BoardView> {
        self.store.get().map(|state| self.renderer.render(state))
    }

    pub fn issue(&mut self) -> Ticket {
        self.store.issue()
    }

    fn apply(&mut self, ticket: Ticket, state: GameState) -> bool {
        match self.store.replace(ticket, state) {
            Ok(version) => {
                logging::debug(&format!("snapshot v{version} applied (request #{})", ticket.0));
                true
            }
            Err(stale) => {
                logging::warn(&format!("dropping stale snapshot: {stale}"));
                false
            }
        }
    }

    fn notice(&mut self, message: impl Into<String>, kind: NoticeKind) -> Notice {
        let now = (self.clock)();
        self.notifications.expire(now);
        self.notifications.notify(message, kind, now)
    }

    fn report_failure(action: ActionKind, error: &ClientError) {
        logging::error(&format!("Error during {}: {error}", action.name()));
    }

    /// 加载与新开局：响应本身就是快照。
    pub fn finish_snapshot(
        &mut self,
        ticket: Ticket,
        action: ActionKind,
        result: Result<GameState, ClientError>,
    ) -> Update {
        match result {
            Ok(state) => Update {
                view: if self.apply(ticket, state) { self.render() } else { None },
                notices: Vec::new(),
            },
            Err(error) => {
                Self::report_failure(action, &error);
                Update::default()
            }
        }
    }

    pub fn finish_draw(&mut self, ticket: Ticket, result: Result<ActionOutcome, ClientError>) -> Update {
        self.finish_action(ticket, ActionKind::Draw, DRAW_REJECTED_MESSAGE, result)
    }

    pub fn finish_undo(&mut self, ticket: Ticket, result: Result<ActionOutcome, ClientError>) -> Update {
        self.finish_action(ticket, ActionKind::Undo, UNDO_REJECTED_MESSAGE, result)
    }

    fn finish_action(
        &mut self,
        ticket: Ticket,
        action: ActionKind,
        rejected_message: &str,
        result: Result<ActionOutcome, ClientError>,
    ) -> Update {
        match result {
            Ok(outcome) if outcome.accepted => Update {
                view: if self.apply(ticket, outcome.state) { self.render() } else { None },
                notices: Vec::new(),
            },
            Ok(_) => Update {
                view: None,
                notices: vec![self.notice(rejected_message, NoticeKind::Rejected)],
            },
            Err(error) => {
                Self::report_failure(action, &error);
                Update::default()
            }
        }
    }

    pub fn finish_auto_move(
        &mut self,
        ticket: Ticket,
        result: Result<AutoMoveOutcome, ClientError>,
    ) -> Update {
        match result {
            Ok(outcome) => {
                let view = if self.apply(ticket, outcome.state) { self.render() } else { None };
                let mut notices = Vec::new();
                if outcome.moves_made > 0 {
                    notices.push(self.notice(auto_move_message(outcome.moves_made), NoticeKind::Info));
                }
                Update { view, notices }
            }
            Err(error) => {
                Self::report_failure(ActionKind::AutoMove, &error);
                Update::default()
            }
        }
    }

    /// 移动请求返回后总是结束拖放会话并重绘，使交互元素全部重新绑定。
    pub fn finish_move(&mut self, ticket: Ticket, result: Result<ActionOutcome, ClientError>) -> Update {
        self.drag.resolved();
        let notice = match result {
            Ok(outcome) if outcome.accepted => {
                if self.apply(ticket, outcome.state) {
                    (MOVE_ACCEPTED_MESSAGE, NoticeKind::Success)
                } else {
                    (MOVE_SUPERSEDED_MESSAGE, NoticeKind::Info)
                }
            }
            Ok(_) => (MOVE_REJECTED_MESSAGE, NoticeKind::Rejected),
            Err(error) => {
                Self::report_failure(ActionKind::MoveCard, &error);
                (MOVE_FAILED_MESSAGE, NoticeKind::Error)
            }
        };
        let view = self.render();
        Update {
            view,
            notices: vec![self.notice(notice.0, notice.1)],
        }
    }

    pub fn drag_start(&mut self, chain: &[ElementTags]) -> Option<CardId> {
        if !self.store.is_loaded() {
            return None;
        }
        self.drag.drag_start(chain)
    }

    pub fn drop_on(&mut self, target: &ElementTags) -> DropOutcome {
        self.drag.drop_on(target)
    }

    pub fn drag_end(&mut self) {
        self.drag.drag_end();
    }

    pub fn dismiss(&mut self, id: NoticeId) {
        self.notifications.dismiss(id);
    }
}

/// 会话加远端客户端。`RefCell` 借用不会跨越 `.await`。
pub struct Game<T> {
    session: RefCell<Session>,
    client: RemoteClient<T>,
}

impl<T: Transport> Game<T> {
    pub fn new(client: RemoteClient<T>, session: Session) -> Self {
        Self {
            session: RefCell::new(session),
            client,
        }
    }

    pub fn session(&self) -> Ref<'_, Session> {
        self.session.borrow()
    }

    pub fn client(&self) -> &RemoteClient<T> {
        &self.client
    }

    fn issue(&self) -> Ticket {
        self.session.borrow_mut().issue()
    }

    pub async fn load(&self) -> Update {
        let ticket = self.issue();
        let result = self.client.load_state().await;
        self.session
            .borrow_mut()
            .finish_snapshot(ticket, ActionKind::Load, result)
    }

    pub async fn new_game(&self) -> Update {
        let ticket = self.issue();
        let result = self.client.new_game().await;
        self.session
            .borrow_mut()
            .finish_snapshot(ticket, ActionKind::NewGame, result)
    }

    pub async fn draw(&self) -> Update {
        let ticket = self.issue();
        let result = self.client.draw().await;
        self.session.borrow_mut().finish_draw(ticket, result)
    }

    pub async fn auto_move(&self) -> Update {
        let ticket = self.issue();
        let result = self.client.auto_move().await;
        self.session.borrow_mut().finish_auto_move(ticket, result)
    }

    pub async fn undo(&self) -> Update {
        let ticket = self.issue();
        let result = self.client.undo().await;
        self.session.borrow_mut().finish_undo(ticket, result)
    }

    pub async fn submit_move(&self, request: MoveRequest) -> Update {
        let ticket = self.issue();
        let result = self.client.move_card(&request).await;
        self.session.borrow_mut().finish_move(ticket, result)
    }

    pub fn drag_start(&self, chain: &[ElementTags]) -> Option<CardId> {
        self.session.borrow_mut().drag_start(chain)
    }

    pub fn drag_end(&self) {
        self.session.borrow_mut().drag_end();
    }

    pub fn drop_on(&self, target: &ElementTags) -> DropOutcome {
        self.session.borrow_mut().drop_on(target)
    }

    /// 放置并在命中区域时提交移动；未命中时返回 `None`，不发请求。
    pub async fn drop_and_submit(&self, target: &ElementTags) -> Option<Update> {
        let outcome = self.drop_on(target);
        match outcome {
            DropOutcome::Submit(request) => Some(self.submit_move(request).await),
            DropOutcome::Ignored => None,
        }
    }

    pub fn dismiss(&self, id: NoticeId) {
        self.session.borrow_mut().dismiss(id);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::client::remote::testing::{action_json, auto_move_json, state_json, ScriptedTransport};
    use crate::client::TargetType;
    use crate::interaction::DragState;
    use futures::executor::block_on;

    fn fixed_clock() -> f64 {
        10_000.0
    }

    fn game() -> Game<ScriptedTransport> {
        let session = Session::new(&UiConfig::default()).with_clock(fixed_clock);
        Game::new(RemoteClient::new(ScriptedTransport::new()), session)
    }

    fn opening() -> GameState {
        let mut state = GameState::sample();
        state.score = 25;
        state.moves = 7;
        state
    }

    fn loaded_game(state: &GameState) -> Game<ScriptedTransport> {
        let game = game();
        game.client().transport().respond(state_json(state));
        let update = block_on(game.load());
        assert!(update.view.is_some());
        game
    }

    fn start_drag(game: &Game<ScriptedTransport>, card_id: &str) {
        let chain = [ElementTags::default(), ElementTags::card(card_id)];
        assert_eq!(game.drag_start(&chain).as_deref(), Some(card_id));
    }

    #[test]
    fn accepted_move_replaces_snapshot_and_notifies() {
        let state = opening();
        let game = loaded_game(&state);
        let mut moved = state.clone();
        let top = moved.waste.pop().expect("sample has a waste card");
        let card_id = top.id.clone();
        moved.foundations[0].push(top);
        moved.score += 10;
        moved.moves += 1;
        game.client().transport().respond(action_json(true, &moved));

        start_drag(&game, &card_id);
        let update = block_on(game.drop_and_submit(&ElementTags::foundation("0"))).expect("zone drop submits");

        let view = update.view.expect("re-rendered");
        assert_eq!(view.score, 35);
        assert_eq!(update.notices.len(), 1);
        assert_eq!(update.notices[0].message, MOVE_ACCEPTED_MESSAGE);
        assert_eq!(update.notices[0].expires_at_ms, 13_000.0);
        assert_eq!(game.session().store().get(), Some(&moved));
        assert!(game.session().drag().is_idle());

        let sent = game.client().transport().sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].path, "/api/move-card");
    }

    #[test]
    fn rejected_move_keeps_score_and_moves() {
        let state = opening();
        let game = loaded_game(&state);
        let mut server_view = state.clone();
        server_view.score = 999;
        game.client().transport().respond(action_json(false, &server_view));

        start_drag(&game, "spades-A");
        let update = block_on(game.drop_and_submit(&ElementTags::tableau("3"))).expect("zone drop submits");

        let snapshot = game.session().store().get().cloned().expect("still loaded");
        assert_eq!((snapshot.score, snapshot.moves), (25, 7));
        assert_eq!(update.notices[0].message, MOVE_REJECTED_MESSAGE);
        assert_eq!(update.notices[0].kind, NoticeKind::Rejected);
        assert_eq!(update.view.map(|view| view.score), Some(25), "bindings are rebuilt");
        assert_eq!(game.session().drag().state(), &DragState::Idle);
    }

    #[test]
    fn transport_failure_keeps_snapshot_and_reports_once() {
        let state = opening();
        let game = loaded_game(&state);
        game.client()
            .transport()
            .fail(ClientError::HttpStatus { status: 500 });

        start_drag(&game, "spades-A");
        let update = block_on(game.drop_and_submit(&ElementTags::tableau("0"))).expect("zone drop submits");

        assert_eq!(game.session().store().get(), Some(&state));
        assert_eq!(update.notices.len(), 1);
        assert_eq!(update.notices[0].message, MOVE_FAILED_MESSAGE);
        assert!(game.session().drag().is_idle());
    }

    #[test]
    fn drop_over_non_zone_sends_nothing() {
        let game = loaded_game(&opening());

        start_drag(&game, "spades-A");
        let update = block_on(game.drop_and_submit(&ElementTags::default()));

        assert!(update.is_none());
        assert_eq!(game.client().transport().sent().len(), 1, "only the initial load");
        assert!(game.session().drag().is_idle());
    }

    #[test]
    fn drag_is_refused_before_first_snapshot() {
        let game = game();
        assert_eq!(game.drag_start(&[ElementTags::card("spades-A")]), None);
    }

    #[test]
    fn win_panel_hidden_by_new_game() {
        let mut won = opening();
        won.is_won = true;
        won.score = 720;
        let game = game();
        game.client().transport().respond(state_json(&won));
        let update = block_on(game.load());
        assert_eq!(
            update.view.and_then(|view| view.win).map(|panel| panel.final_score),
            Some(720)
        );

        game.client().transport().respond(state_json(&GameState::sample()));
        let update = block_on(game.new_game());
        let view = update.view.expect("new game renders");
        assert!(view.win.is_none());
    }

    #[test]
    fn stale_response_never_overwrites_newer_snapshot() {
        let state = opening();
        let mut session = Session::new(&UiConfig::default()).with_clock(fixed_clock);
        let load = session.issue();
        session.finish_snapshot(load, ActionKind::Load, Ok(state.clone()));

        assert!(session.drag_start(&[ElementTags::card("spades-A")]).is_some());
        assert!(matches!(
            session.drop_on(&ElementTags::foundation("0")),
            DropOutcome::Submit(_)
        ));
        let move_ticket = session.issue();
        let new_game_ticket = session.issue();

        let fresh = GameState::sample();
        let update = session.finish_snapshot(new_game_ticket, ActionKind::NewGame, Ok(fresh.clone()));
        assert!(update.view.is_some());
        // A render happened mid-flight, but no second drag may start.
        assert_eq!(session.drag_start(&[ElementTags::card("hearts-2")]), None);

        let mut late = state;
        late.score = 500;
        let update = session.finish_move(
            move_ticket,
            Ok(ActionOutcome {
                accepted: true,
                state: late,
            }),
        );

        assert_eq!(session.store().get(), Some(&fresh));
        assert_eq!(update.view.map(|view| view.score), Some(fresh.score));
        assert!(session.drag().is_idle());
    }

    #[test]
    fn late_accepted_move_does_not_claim_success() {
        let state = opening();
        let mut session = Session::new(&UiConfig::default()).with_clock(fixed_clock);
        let load = session.issue();
        session.finish_snapshot(load, ActionKind::Load, Ok(state.clone()));

        assert!(session.drag_start(&[ElementTags::card("spades-A")]).is_some());
        session.drop_on(&ElementTags::foundation("0"));
        let move_ticket = session.issue();
        let new_game_ticket = session.issue();

        let mut fresh = GameState::sample();
        fresh.score = 1;
        session.finish_snapshot(new_game_ticket, ActionKind::NewGame, Ok(fresh.clone()));

        let mut late = state;
        late.score = 77;
        let update = session.finish_move(
            move_ticket,
            Ok(ActionOutcome {
                accepted: true,
                state: late,
            }),
        );

        assert_eq!(session.store().get().map(|state| state.score), Some(1));
        assert_eq!(update.notices.len(), 1);
        assert_eq!(update.notices[0].message, MOVE_SUPERSEDED_MESSAGE);
        assert_eq!(update.notices[0].kind, NoticeKind::Info);
        assert_eq!(update.view.map(|view| view.score), Some(1));
    }

    #[test]
    fn auto_move_notifies_only_when_cards_moved() {
        let state = opening();
        let game = loaded_game(&state);
        game.client().transport().respond(auto_move_json(0, &state));
        let update = block_on(game.auto_move());
        assert!(update.view.is_some());
        assert!(update.notices.is_empty());

        game.client().transport().respond(auto_move_json(2, &state));
        let update = block_on(game.auto_move());
        assert_eq!(update.notices[0].message, "2 cards moved automatically!");
    }

    #[test]
    fn rejected_draw_leaves_board_untouched() {
        let state = opening();
        let game = loaded_game(&state);
        let mut other = state.clone();
        other.moves = 100;
        game.client().transport().respond(action_json(false, &other));

        let update = block_on(game.draw());

        assert!(update.view.is_none());
        assert_eq!(update.notices[0].message, DRAW_REJECTED_MESSAGE);
        assert_eq!(game.session().store().get(), Some(&state));
    }

    #[test]
    fn accepted_draw_and_undo_apply_snapshots() {
        let state = opening();
        let game = loaded_game(&state);
        let mut drawn = state.clone();
        drawn.moves += 1;
        game.client().transport().respond(action_json(true, &drawn));
        let update = block_on(game.draw());
        assert_eq!(update.view.map(|view| view.moves), Some(8));

        game.client().transport().respond(action_json(true, &state));
        let update = block_on(game.undo());
        assert_eq!(update.view.map(|view| view.moves), Some(7));
        assert!(update.notices.is_empty());
    }

    #[test]
    fn failed_load_stays_unloaded_without_notice() {
        let game = game();
        game.client().transport().fail(ClientError::Network {
            message: "offline".into(),
        });
        let update = block_on(game.load());
        assert_eq!(update, Update::default());
        assert!(!game.session().store().is_loaded());
    }

    #[test]
    fn out_of_range_request_is_reported_as_failure() {
        let game = loaded_game(&opening());
        let forged = MoveRequest {
            card_id: "spades-A".into(),
            target_type: TargetType::Foundation,
            target_index: 9,
        };
        let update = block_on(game.submit_move(forged));
        assert_eq!(update.notices[0].message, MOVE_FAILED_MESSAGE);
        assert_eq!(game.client().transport().sent().len(), 1);
    }
}
