use std::sync::Arc;
use tokio::sync::watch;

/// Guards on a player's input, published by the dealer and the actor.
///
/// - `locked`: dealer is adding or removing cards
/// - `frozen`: a scoring or penalty freeze is running
/// - `terminated`: absorbing; the actor and its generator must stop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub locked: bool,
    pub frozen: bool,
    pub terminated: bool,
}

impl Status {
    /// Input may be handled.
    pub fn ready(&self) -> bool {
        !self.locked && !self.frozen && !self.terminated
    }
}

/// Shared, observable [`Status`] of one player.
/// Cloning shares the same underlying state.
#[derive(Debug, Clone)]
pub struct Gate(Arc<watch::Sender<Status>>);

impl Default for Gate {
    fn default() -> Self {
        Self(Arc::new(watch::Sender::new(Status::default())))
    }
}

impl Gate {
    pub fn status(&self) -> Status {
        *self.0.borrow()
    }
    pub fn lock(&self) {
        self.update(|s| s.locked = true);
    }
    pub fn unlock(&self) {
        self.update(|s| s.locked = false);
    }
    pub fn freeze(&self) {
        self.update(|s| s.frozen = true);
    }
    pub fn thaw(&self) {
        self.update(|s| s.frozen = false);
    }
    pub fn terminate(&self) {
        self.update(|s| s.terminated = true);
    }
    pub fn is_terminated(&self) -> bool {
        self.status().terminated
    }
    /// Waits until input may be handled. False once terminated.
    pub async fn ready(&self) -> bool {
        let mut rx = self.0.subscribe();
        rx.wait_for(|s| s.ready() || s.terminated)
            .await
            .map(|s| !s.terminated)
            .unwrap_or(false)
    }
    /// Resolves once terminated.
    pub async fn terminated(&self) {
        let mut rx = self.0.subscribe();
        let _ = rx.wait_for(|s| s.terminated).await;
    }
    fn update(&self, f: impl FnOnce(&mut Status)) {
        self.0.send_if_modified(|status| {
            let before = *status;
            f(status);
            before != *status
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    #[test]
    fn starts_ready() {
        let gate = Gate::default();
        assert!(gate.status().ready());
        assert!(!gate.is_terminated());
    }
    #[test]
    fn any_guard_blocks() {
        let gate = Gate::default();
        gate.lock();
        assert!(!gate.status().ready());
        gate.freeze();
        gate.unlock();
        assert!(!gate.status().ready());
        gate.thaw();
        assert!(gate.status().ready());
    }
    #[tokio::test]
    async fn ready_waits_for_unlock() {
        let gate = Gate::default();
        gate.lock();
        let waiter = tokio::spawn({
            let gate = gate.clone();
            async move { gate.ready().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        gate.unlock();
        assert!(waiter.await.unwrap());
    }
    #[tokio::test]
    async fn termination_releases_waiters() {
        let gate = Gate::default();
        gate.freeze();
        let ready = tokio::spawn({
            let gate = gate.clone();
            async move { gate.ready().await }
        });
        let done = tokio::spawn({
            let gate = gate.clone();
            async move { gate.terminated().await }
        });
        gate.terminate();
        assert!(!ready.await.unwrap());
        done.await.unwrap();
        assert!(gate.is_terminated());
    }
}
