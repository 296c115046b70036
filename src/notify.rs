use serde::Serialize;

pub type NoticeId = u64;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Info,
    Rejected,
    Error,
}

impl NoticeKind {
    pub fn class_name(self) -> &'static str {
        match self {
            NoticeKind::Success => "notice-success",
            NoticeKind::Info => "notice-info",
            NoticeKind::Rejected => "notice-rejected",
            NoticeKind::Error => "notice-error",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notice {
    pub id: NoticeId,
    pub message: String,
    pub kind: NoticeKind,
    pub expires_at_ms: f64,
}

/// 自动过期的提示消息。每条消息独立计时，不去重，不限数量。
#[derive(Debug)]
pub struct NotificationQueue {
    ttl_ms: u32,
    next_id: NoticeId,
    active: Vec<Notice>,
}

impl NotificationQueue {
    pub fn new(ttl_ms: u32) -> Self {
        Self {
            ttl_ms,
            next_id: 0,
            active: Vec::new(),
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NoticeKind, now_ms: f64) -> Notice {
        self.next_id += 1;
        let notice = Notice {
            id: self.next_id,
            message: message.into(),
            kind,
            expires_at_ms: now_ms + f64::from(self.ttl_ms),
        };
        self.active.push(notice.clone());
        notice
    }

    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.active.len();
        self.active.retain(|notice| notice.id != id);
        self.active.len() != before
    }

    /// 移除已过期的消息，返回被移除的数量。
    pub fn expire(&mut self, now_ms: f64) -> usize {
        let before = self.active.len();
        self.active.retain(|notice| notice.expires_at_ms > now_ms);
        before - self.active.len()
    }

    pub fn active(&self) -> &[Notice] {
        &self.active
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(3_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_expire_after_window() {
        let mut queue = NotificationQueue::default();
        let notice = queue.notify("Move successful!", NoticeKind::Success, 1_000.0);
        assert_eq!(notice.expires_at_ms, 4_000.0);

        assert_eq!(queue.expire(3_999.0), 0);
        assert_eq!(queue.active().len(), 1);
        assert_eq!(queue.expire(4_000.0), 1);
        assert!(queue.active().is_empty());
    }

    #[test]
    fn each_notice_owns_its_expiry() {
        let mut queue = NotificationQueue::new(3_000);
        queue.notify("Invalid move!", NoticeKind::Rejected, 0.0);
        queue.notify("Invalid move!", NoticeKind::Rejected, 2_000.0);
        assert_eq!(queue.active().len(), 2, "duplicates are kept");

        queue.expire(3_500.0);
        let remaining: Vec<f64> = queue.active().iter().map(|n| n.expires_at_ms).collect();
        assert_eq!(remaining, vec![5_000.0]);
    }

    #[test]
    fn dismiss_removes_only_the_named_notice() {
        let mut queue = NotificationQueue::default();
        let first = queue.notify("a", NoticeKind::Info, 0.0);
        let second = queue.notify("b", NoticeKind::Info, 0.0);
        assert!(queue.dismiss(first.id));
        assert!(!queue.dismiss(first.id));
        assert_eq!(queue.active()[0].id, second.id);
    }
}
