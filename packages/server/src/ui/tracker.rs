//! Live WebSocket connection tracking for graceful shutdown.

use tokio::sync::watch;

/// Counts upgraded connections so shutdown can wait for their cleanup.
///
/// axum's graceful shutdown only drains HTTP connections. Upgraded sockets run
/// in detached tasks, so the server waits on this counter instead.
pub struct ConnectionTracker {
    live: watch::Sender<usize>,
}

/// Held by a connection task; dropping it marks the connection finished.
pub struct ConnectionGuard {
    live: watch::Sender<usize>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        let (live, _) = watch::channel(0);
        Self { live }
    }

    pub fn track(&self) -> ConnectionGuard {
        self.live.send_modify(|n| *n += 1);
        ConnectionGuard {
            live: self.live.clone(),
        }
    }

    pub fn live(&self) -> usize {
        *self.live.borrow()
    }

    /// Resolves once every guard has been dropped.
    pub async fn wait_idle(&self) {
        let mut rx = self.live.subscribe();
        // The sender lives in self, so the channel cannot close here
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.live.send_modify(|n| *n = n.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_wait_idle_returns_immediately_without_connections() {
        // テスト項目: 接続がなければ wait_idle はすぐに完了する
        // given (前提条件):
        let tracker = ConnectionTracker::new();

        // when (操作):
        let result = tokio::time::timeout(Duration::from_millis(100), tracker.wait_idle()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(tracker.live(), 0);
    }

    #[tokio::test]
    async fn test_wait_idle_waits_for_every_guard() {
        // テスト項目: wait_idle は全てのガードが破棄されるまで完了しない
        // given (前提条件):
        let tracker = ConnectionTracker::new();
        let first = tracker.track();
        let second = tracker.track();
        assert_eq!(tracker.live(), 2);

        // when (操作):
        drop(first);
        let pending = tokio::time::timeout(Duration::from_millis(50), tracker.wait_idle()).await;
        drop(second);
        let done = tokio::time::timeout(Duration::from_millis(100), tracker.wait_idle()).await;

        // then (期待する結果):
        assert!(pending.is_err());
        assert!(done.is_ok());
        assert_eq!(tracker.live(), 0);
    }
}
