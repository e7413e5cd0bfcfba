use super::*;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Outcome of a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The claimed cards matched and left the board.
    Match(Vec<Card>),
    /// The cards were all present but the oracle rejected them.
    Mismatch,
    /// The claim no longer refers to a full set of cards, typically
    /// because another player's win or a drain got there first.
    Stale,
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match(_))
    }
}

/// The dealer's shared face: everything actors reach concurrently.
///
/// Lock order is claims, then deck, then board. Nothing here takes
/// them in any other order.
pub struct Arbiter {
    arity: usize,
    board: Arc<Board>,
    oracle: Arc<dyn Oracle>,
    ui: Arc<dyn Ui>,
    deck: tokio::sync::Mutex<Deck>,
    clock: Mutex<Timer>,
    claims: tokio::sync::Mutex<()>,
    finished: AtomicBool,
    terminated: AtomicBool,
    wake: Notify,
}

impl Arbiter {
    pub fn new(config: &Config, board: Arc<Board>, ui: Arc<dyn Ui>, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            arity: config.arity,
            board,
            oracle,
            ui,
            deck: tokio::sync::Mutex::new(Deck::new(config.deck_size())),
            clock: Mutex::new(Timer::new(config.mode(), config.warning())),
            claims: tokio::sync::Mutex::new(()),
            finished: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }
    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }
}

impl Arbiter {
    /// Decides a player's claim. Only one adjudication runs at a time;
    /// the check, the card lookup and the commit happen under one guard.
    pub async fn adjudicate(&self, player: PlayerId) -> Verdict {
        let _claims = self.claims.lock().await;
        let slots = self.board.tokens(player);
        if slots.len() != self.arity {
            log::debug!("[arbiter] P{} claim stale: {} tokens", player, slots.len());
            return Verdict::Stale;
        }
        let Some(cards) = slots
            .iter()
            .map(|&s| self.board.card_at(s))
            .collect::<Option<Vec<_>>>()
        else {
            log::debug!("[arbiter] P{} claim stale: vacated slot in {:?}", player, slots);
            return Verdict::Stale;
        };
        if !self.oracle.test(&cards) {
            log::debug!("[arbiter] P{} claim rejected: {:?}", player, cards);
            return Verdict::Mismatch;
        }
        let cards = self.board.commit_match(player).await;
        if self.exhausted().await {
            log::info!("[arbiter] no matches left after P{} claim", player);
            self.finished.store(true, Ordering::SeqCst);
        }
        log::info!("[arbiter] P{} matched {:?}", player, cards);
        Verdict::Match(cards)
    }
    /// Excludes adjudication while the dealer repopulates or drains.
    pub async fn exclusive(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.claims.lock().await
    }
    /// True when neither the deck nor the board hold any match.
    pub async fn exhausted(&self) -> bool {
        let deck = self.deck.lock().await;
        let cards = deck
            .cards()
            .iter()
            .copied()
            .chain(self.board.cards())
            .collect::<Vec<_>>();
        self.oracle.find(&cards, 1).is_empty()
    }
    pub async fn deck(&self) -> tokio::sync::MutexGuard<'_, Deck> {
        self.deck.lock().await
    }
}

impl Arbiter {
    /// Holds the calling actor for `duration`, reporting the time left at
    /// most once per [`FREEZE_STEP`]. Ends early only on termination.
    pub async fn freeze(&self, player: PlayerId, duration: Duration, gate: &Gate) {
        gate.freeze();
        let deadline = Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.ui.send(Event::Freeze { player, remaining });
            if remaining.is_zero() {
                break;
            }
            tokio::select! {
                biased;
                _ = gate.terminated() => {
                    self.ui.send(Event::Freeze { player, remaining: Duration::ZERO });
                    break;
                }
                _ = tokio::time::sleep(remaining.min(FREEZE_STEP)) => {}
            }
        }
        gate.thaw();
    }
}

impl Arbiter {
    pub fn clock(&self) -> MutexGuard<'_, Timer> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }
    pub fn reset_clock(&self) {
        self.clock().reset();
    }
    /// Interrupts the dealer's current wait.
    pub fn wake(&self) {
        self.wake.notify_one();
    }
    /// Sleeps for `duration` or until woken, whichever comes first.
    pub async fn sleep(&self, duration: Duration) {
        tokio::select! {
            _ = self.wake.notified() => {}
            _ = tokio::time::sleep(duration) => {}
        }
    }
    /// Latched once a successful claim leaves no possible match.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
    /// Requests a graceful end of the game from outside.
    pub fn terminate(&self) {
        log::warn!("[arbiter] termination requested");
        self.terminated.store(true, Ordering::SeqCst);
        self.wake();
    }
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(players: usize) -> Config {
        Config {
            humans: players,
            robots: 0,
            table_delay_millis: 0,
            ..Config::default()
        }
    }
    fn arbiter(players: usize, oracle: impl Oracle + 'static) -> Arbiter {
        let config = config(players);
        let oracle = Arc::new(oracle) as Arc<dyn Oracle>;
        let board = Arc::new(Board::new(&config, Arc::new(Mute), oracle.clone()));
        Arbiter::new(&config, board, Arc::new(Mute), oracle)
    }
    async fn deal(arbiter: &Arbiter, cards: &[Card]) {
        let mut deck = arbiter.deck().await;
        let rest = deck
            .cards()
            .iter()
            .copied()
            .filter(|c| !cards.contains(c))
            .collect::<Vec<_>>();
        *deck = Deck::from(rest);
        for (slot, &card) in cards.iter().enumerate() {
            arbiter.board().place_card(card, slot).await;
        }
    }
    async fn claim(arbiter: &Arbiter, player: PlayerId, slots: &[Slot]) {
        for &slot in slots {
            arbiter.board().place_token(player, slot).await;
        }
    }

    #[tokio::test]
    async fn matching_claim_commits() {
        let arbiter = arbiter(2, Whitelist::new(3, [[0, 1, 2]]));
        deal(&arbiter, &[0, 1, 2]).await;
        claim(&arbiter, 0, &[0, 1, 2]).await;
        claim(&arbiter, 1, &[1]).await;
        let verdict = arbiter.adjudicate(0).await;
        assert!(verdict.is_match());
        assert_eq!(arbiter.board().occupied_count(), 0);
        assert_eq!(arbiter.board().token_count(0), 0);
        assert_eq!(arbiter.board().token_count(1), 0);
    }
    #[tokio::test]
    async fn mismatch_leaves_board_alone() {
        let arbiter = arbiter(1, Whitelist::new(3, [[0, 1, 2]]));
        deal(&arbiter, &[0, 1, 3]).await;
        claim(&arbiter, 0, &[0, 1, 2]).await;
        assert_eq!(arbiter.adjudicate(0).await, Verdict::Mismatch);
        assert_eq!(arbiter.board().occupied_count(), 3);
        assert_eq!(arbiter.board().tokens(0), vec![0, 1, 2]);
    }
    #[tokio::test]
    async fn incomplete_claim_is_stale() {
        let arbiter = arbiter(1, Whitelist::new(3, [[0, 1, 2]]));
        deal(&arbiter, &[0, 1, 2]).await;
        claim(&arbiter, 0, &[0, 1]).await;
        assert_eq!(arbiter.adjudicate(0).await, Verdict::Stale);
        assert_eq!(arbiter.board().occupied_count(), 3);
    }
    #[tokio::test]
    async fn vacated_slot_is_stale() {
        let arbiter = arbiter(2, Whitelist::new(3, [[0, 1, 2], [1, 2, 3]]));
        deal(&arbiter, &[0, 1, 2, 3]).await;
        claim(&arbiter, 0, &[0, 1, 2]).await;
        claim(&arbiter, 1, &[1, 2, 3]).await;
        assert!(arbiter.adjudicate(0).await.is_match());
        // P1 lost the tokens on slots 1 and 2 to P0's win
        assert_eq!(arbiter.board().tokens(1), vec![3]);
        assert_eq!(arbiter.adjudicate(1).await, Verdict::Stale);
        assert_eq!(arbiter.board().card_at(3), Some(3));
    }
    #[tokio::test]
    async fn emptied_slot_under_full_claim_is_stale() {
        let arbiter = arbiter(1, Whitelist::new(3, [[0, 1, 2]]));
        deal(&arbiter, &[0, 1, 2]).await;
        claim(&arbiter, 0, &[0, 1, 2]).await;
        arbiter.board().remove_card(1).await;
        assert_eq!(arbiter.adjudicate(0).await, Verdict::Stale);
    }
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_claims_award_exactly_one() {
        let n = 8;
        let arbiter = Arc::new(arbiter(n, Whitelist::new(3, [[0, 1, 2]])));
        deal(&arbiter, &[0, 1, 2]).await;
        for player in 0..n {
            claim(&arbiter, player, &[0, 1, 2]).await;
        }
        let tasks = (0..n)
            .map(|player| {
                let arbiter = arbiter.clone();
                tokio::spawn(async move { arbiter.adjudicate(player).await })
            })
            .collect::<Vec<_>>();
        let mut verdicts = Vec::new();
        for task in tasks {
            verdicts.push(task.await.unwrap());
        }
        assert_eq!(verdicts.iter().filter(|v| v.is_match()).count(), 1);
        assert_eq!(verdicts.iter().filter(|v| **v == Verdict::Stale).count(), n - 1);
        assert!(arbiter.board().is_consistent());
    }
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn disjoint_claims_award_only_the_match() {
        let n = 4;
        let arbiter = Arc::new(arbiter(n, Whitelist::new(3, [[6, 7, 8]])));
        deal(&arbiter, &(0..12).collect::<Vec<_>>()).await;
        for player in 0..n {
            claim(&arbiter, player, &[3 * player, 3 * player + 1, 3 * player + 2]).await;
        }
        let tasks = (0..n)
            .map(|player| {
                let arbiter = arbiter.clone();
                tokio::spawn(async move { (player, arbiter.adjudicate(player).await) })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            let (player, verdict) = task.await.unwrap();
            assert_eq!(verdict.is_match(), player == 2);
        }
        assert_eq!(arbiter.board().occupied_count(), 9);
    }
    #[tokio::test]
    async fn last_match_latches_finish() {
        let arbiter = arbiter(1, Whitelist::new(3, [[0, 1, 2]]));
        deal(&arbiter, &[0, 1, 2]).await;
        assert!(!arbiter.exhausted().await);
        claim(&arbiter, 0, &[0, 1, 2]).await;
        assert!(arbiter.adjudicate(0).await.is_match());
        assert!(arbiter.exhausted().await);
        assert!(arbiter.is_finished());
    }
    #[tokio::test]
    async fn freeze_reports_and_thaws() {
        let (feed, mut rx) = Feed::new();
        let config = config(1);
        let oracle = Arc::new(Whitelist::default()) as Arc<dyn Oracle>;
        let board = Arc::new(Board::new(&config, Arc::new(Mute), oracle.clone()));
        let arbiter = Arbiter::new(&config, board, Arc::new(feed), oracle);
        let gate = Gate::default();
        let start = Instant::now();
        arbiter.freeze(0, Duration::from_millis(50), &gate).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(!gate.status().frozen);
        let events = std::iter::from_fn(|| rx.try_recv().ok()).collect::<Vec<_>>();
        assert!(matches!(events.first(), Some(Event::Freeze { player: 0, .. })));
        assert_eq!(
            events.last(),
            Some(&Event::Freeze {
                player: 0,
                remaining: Duration::ZERO
            })
        );
    }
    #[tokio::test]
    async fn termination_cuts_freeze_short() {
        let arbiter = Arc::new(arbiter(1, Whitelist::default()));
        let gate = Gate::default();
        let frozen = tokio::spawn({
            let arbiter = arbiter.clone();
            let gate = gate.clone();
            async move { arbiter.freeze(0, Duration::from_secs(30), &gate).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(gate.status().frozen);
        gate.terminate();
        tokio::time::timeout(Duration::from_secs(1), frozen)
            .await
            .expect("freeze ignored termination")
            .unwrap();
    }
    #[tokio::test]
    async fn wake_interrupts_sleep() {
        let arbiter = Arc::new(arbiter(1, Whitelist::default()));
        let start = Instant::now();
        arbiter.wake();
        arbiter.sleep(Duration::from_secs(30)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
