use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::GameState;

/// 请求发出时领取的序号，单调递增。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// 响应所属的请求早于当前快照的来源请求，被丢弃。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaleResponse {
    pub ticket: Ticket,
    pub applied: Ticket,
}

impl fmt::Display for StaleResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "response for request #{} arrived after request #{} was applied",
            self.ticket.0, self.applied.0
        )
    }
}

/// 唯一持有当前快照的存储。快照只会被整体替换，不会原地修改。
#[derive(Debug, Default)]
pub struct StateStore {
    snapshot: Option<GameState>,
    version: u64,
    issued: u64,
    applied: Option<Ticket>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` 表示尚未加载。
    pub fn get(&self) -> Option<&GameState> {
        self.snapshot.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    /// 每次成功替换后加一。
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn replace(&mut self, ticket: Ticket, snapshot: GameState) -> Result<u64, StaleResponse> {
        if let Some(applied) = self.applied {
            if ticket <= applied {
                return Err(StaleResponse { ticket, applied });
            }
        }
        self.snapshot = Some(snapshot);
        self.applied = Some(ticket);
        self.version += 1;
        Ok(self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(score: i32) -> GameState {
        GameState {
            score,
            ..GameState::default()
        }
    }

    #[test]
    fn starts_unloaded() {
        let store = StateStore::new();
        assert!(store.get().is_none());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn replace_swaps_snapshot_and_bumps_version() {
        let mut store = StateStore::new();
        let ticket = store.issue();
        assert_eq!(store.replace(ticket, scored(10)), Ok(1));
        assert_eq!(store.get().map(|state| state.score), Some(10));

        let ticket = store.issue();
        assert_eq!(store.replace(ticket, scored(20)), Ok(2));
        assert_eq!(store.get().map(|state| state.score), Some(20));
    }

    #[test]
    fn older_response_does_not_overwrite_newer_snapshot() {
        let mut store = StateStore::new();
        let move_ticket = store.issue();
        let new_game_ticket = store.issue();

        store
            .replace(new_game_ticket, scored(0))
            .expect("newer response applies");
        let stale = store
            .replace(move_ticket, scored(99))
            .expect_err("older response is stale");

        assert_eq!(stale.ticket, move_ticket);
        assert_eq!(stale.applied, new_game_ticket);
        assert_eq!(store.get().map(|state| state.score), Some(0));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn responses_in_issue_order_all_apply() {
        let mut store = StateStore::new();
        let first = store.issue();
        let second = store.issue();
        assert!(store.replace(first, scored(1)).is_ok());
        assert!(store.replace(second, scored(2)).is_ok());
        assert_eq!(store.get().map(|state| state.score), Some(2));
    }
}
