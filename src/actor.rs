use super::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::channel;

/// Input handle for one seat. Humans press through it directly; robot
/// generators feed the same bounded queue.
#[derive(Debug, Clone)]
pub struct Keypad {
    id: PlayerId,
    tx: Sender<Slot>,
}

impl Keypad {
    /// A keypad and the receiving end for its actor. The queue holds at
    /// most `capacity` unhandled presses.
    pub fn new(id: PlayerId, capacity: usize) -> (Self, Receiver<Slot>) {
        let (tx, rx) = channel(capacity.max(1));
        (Self { id, tx }, rx)
    }
    pub fn id(&self) -> PlayerId {
        self.id
    }
    /// Queues a press, dropping it when the queue is full or the actor
    /// is gone. Returns whether it was queued.
    pub fn press(&self, slot: Slot) -> bool {
        match self.tx.try_send(slot) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::trace!("[keypad P{}] queue full, dropped {}", self.id, slot);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
    /// Queues a press, waiting for room. False once the actor is gone.
    async fn push(&self, slot: Slot) -> bool {
        self.tx.send(slot).await.is_ok()
    }
}

/// One player's task. Turns slot presses into token moves, and a full
/// set of tokens into a claim.
///
/// - Presses are ignored while the [`Gate`] is locked, frozen or terminated
/// - A press on an own token removes it
/// - A press on a card below arity places a token, claiming at arity
/// - A claim's verdict is followed by a point or penalty freeze
pub struct Actor {
    id: PlayerId,
    score: Score,
    arity: usize,
    board: Arc<Board>,
    arbiter: Arc<Arbiter>,
    ui: Arc<dyn Ui>,
    gate: Gate,
    inbox: Receiver<Slot>,
    point_freeze: Duration,
    penalty_freeze: Duration,
}

impl Actor {
    pub fn new(
        id: PlayerId,
        config: &Config,
        arbiter: Arc<Arbiter>,
        ui: Arc<dyn Ui>,
        gate: Gate,
        inbox: Receiver<Slot>,
    ) -> Self {
        Self {
            id,
            score: 0,
            arity: config.arity,
            board: arbiter.board().clone(),
            arbiter,
            ui,
            gate,
            inbox,
            point_freeze: config.point_freeze(),
            penalty_freeze: config.penalty_freeze(),
        }
    }
    /// Handles presses until terminated. Returns the final score.
    pub async fn run(mut self) -> Score {
        log::debug!("[actor P{}] started", self.id);
        loop {
            tokio::select! {
                biased;
                _ = self.gate.terminated() => break,
                slot = self.inbox.recv() => match slot {
                    Some(slot) => self.press(slot).await,
                    None => break,
                },
            }
        }
        log::debug!("[actor P{}] terminated with {} points", self.id, self.score);
        self.score
    }
}

impl Actor {
    async fn press(&mut self, slot: Slot) {
        if !self.gate.status().ready() {
            log::trace!("[actor P{}] ignored {} while not ready", self.id, slot);
            return;
        }
        if slot >= self.board.slots() {
            log::warn!("[actor P{}] ignored press on missing slot {}", self.id, slot);
            return;
        }
        if self.board.has_token(self.id, slot) {
            self.board.remove_token(self.id, slot).await;
            return;
        }
        if self.board.token_count(self.id) >= self.arity {
            return;
        }
        if self.board.card_at(slot).is_none() {
            return;
        }
        self.board.place_token(self.id, slot).await;
        if self.board.token_count(self.id) == self.arity {
            self.claim().await;
        }
    }
    async fn claim(&mut self) {
        log::debug!("[actor P{}] claiming {:?}", self.id, self.board.tokens(self.id));
        match self.arbiter.adjudicate(self.id).await {
            Verdict::Match(_) => {
                self.score += 1;
                self.ui.send(Event::Score {
                    player: self.id,
                    score: self.score,
                });
                self.arbiter.reset_clock();
                self.arbiter.wake();
                self.arbiter
                    .freeze(self.id, self.point_freeze, &self.gate)
                    .await;
            }
            verdict => {
                log::debug!("[actor P{}] penalized for {:?}", self.id, verdict);
                self.arbiter
                    .freeze(self.id, self.penalty_freeze, &self.gate)
                    .await;
            }
        }
        self.discard();
    }
    /// Drops presses queued during a freeze.
    fn discard(&mut self) {
        let mut dropped = 0;
        while self.inbox.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            log::trace!("[actor P{}] discarded {} queued presses", self.id, dropped);
        }
    }
}

/// Drives a robot: while the seat is ready, asks the player for a slot
/// and queues it. Stops on termination.
pub async fn generate(mut player: Box<dyn Player>, keypad: Keypad, slots: usize, gate: Gate) {
    let id = keypad.id();
    log::debug!("[robot P{}] started", id);
    while gate.ready().await {
        let slot = player.press(slots).await;
        tokio::select! {
            biased;
            _ = gate.terminated() => break,
            queued = keypad.push(slot) => {
                if !queued {
                    break;
                }
            }
        }
        tokio::task::yield_now().await;
    }
    log::debug!("[robot P{}] stopped", id);
}
