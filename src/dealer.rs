use super::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Final standings of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Points by player id.
    pub scores: Vec<Score>,
    /// Every player tied for the highest score.
    pub winners: Vec<PlayerId>,
}

impl From<Vec<Score>> for Outcome {
    fn from(scores: Vec<Score>) -> Self {
        let best = scores.iter().copied().max().unwrap_or_default();
        let winners = scores
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == best)
            .map(|(p, _)| p)
            .collect();
        Self { scores, winners }
    }
}

/// Runs a game from the first deal to the announcement of winners.
///
/// Each round deals the board, lets the actors race while refilling
/// vacated slots and ticking the clock, then drains every card back
/// into the deck. The game ends once the deck holds no match or
/// termination is requested.
pub struct Dealer {
    config: Config,
    board: Arc<Board>,
    arbiter: Arc<Arbiter>,
    ui: Arc<dyn Ui>,
    table: Table,
    rng: SmallRng,
}

impl Dealer {
    pub fn new(config: Config, ui: Arc<dyn Ui>, oracle: Arc<dyn Oracle>) -> Self {
        let board = Arc::new(Board::new(&config, ui.clone(), oracle.clone()));
        let arbiter = Arc::new(Arbiter::new(&config, board.clone(), ui.clone(), oracle));
        let table = Table::new(&config);
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Self {
            config,
            board,
            arbiter,
            ui,
            table,
            rng,
        }
    }
    /// Shared handle, for requesting termination from outside the game.
    pub fn arbiter(&self) -> Arc<Arbiter> {
        self.arbiter.clone()
    }
    /// Keypads of the human seats, by player id.
    pub fn keypads(&self) -> Vec<Keypad> {
        (0..self.table.seats())
            .filter_map(|id| self.table.keypad(id))
            .collect()
    }
}

impl Dealer {
    pub async fn run(mut self) -> Outcome {
        log::info!(
            "[dealer] starting with {} humans and {} robots on {} slots",
            self.config.humans,
            self.config.robots,
            self.config.table_size()
        );
        self.table.start(&self.config, &self.arbiter, &self.ui);
        while !self.arbiter.is_terminated() && !self.arbiter.exhausted().await {
            self.deal().await;
            self.play().await;
            self.drain().await;
        }
        let scores = self.table.dismiss().await;
        for player in 0..self.board.players() {
            self.board.clear_tokens(player).await;
        }
        let outcome = Outcome::from(scores);
        log::info!("[dealer] game over, scores {:?}", outcome.scores);
        self.ui.send(Event::Winners(outcome.winners.clone()));
        outcome
    }
}

impl Dealer {
    async fn deal(&mut self) {
        log::debug!("[dealer] dealing");
        let arbiter = self.arbiter.clone();
        self.table.lock();
        {
            let _claims = arbiter.exclusive().await;
            let mut deck = arbiter.deck().await;
            deck.shuffle(&mut self.rng);
            self.populate(&mut deck).await;
        }
        arbiter.reset_clock();
        self.table.unlock();
        if self.config.hints {
            self.board.hints();
        }
    }
    /// Runs the round until the clock expires, the board runs dry, the
    /// game is finished or termination is requested.
    async fn play(&mut self) {
        let arbiter = self.arbiter.clone();
        let tick = self.config.tick();
        loop {
            if arbiter.is_terminated() || arbiter.is_finished() {
                break;
            }
            let stocked = !arbiter.deck().await.is_empty();
            if stocked && !self.board.empty_slots().is_empty() {
                self.refill().await;
            }
            let (mode, event, expired, wait) = {
                let clock = arbiter.clock();
                (clock.mode(), clock.event(), clock.expired(), clock.until_tick(tick))
            };
            if let Some(event) = event {
                self.ui.send(event);
            }
            if expired {
                log::debug!("[dealer] round timed out");
                break;
            }
            let countdown = matches!(mode, Mode::Countdown(_));
            if !countdown && self.stalled().await {
                log::debug!("[dealer] no match left on the board");
                break;
            }
            arbiter.sleep(wait).await;
        }
    }
    /// True when the board holds no match and the deck cannot add to it.
    /// Checked under the claim lock so no commit lands in between.
    async fn stalled(&self) -> bool {
        let _claims = self.arbiter.exclusive().await;
        let deck = self.arbiter.deck().await;
        let refillable = !deck.is_empty() && !self.board.empty_slots().is_empty();
        !refillable && !self.board.has_any_match()
    }
    async fn refill(&mut self) {
        let arbiter = self.arbiter.clone();
        self.table.lock();
        {
            let _claims = arbiter.exclusive().await;
            let mut deck = arbiter.deck().await;
            self.populate(&mut deck).await;
        }
        self.table.unlock();
        if self.config.hints {
            self.board.hints();
        }
    }
    /// Places cards from the deck into the empty slots, in random slot
    /// order, until either runs out.
    async fn populate(&mut self, deck: &mut Deck) {
        let mut slots = self.board.empty_slots();
        slots.shuffle(&mut self.rng);
        for slot in slots {
            match deck.draw() {
                Some(card) => self.board.place_card(card, slot).await,
                None => break,
            }
        }
    }
    /// Returns every card to the deck and clears all tokens. Input
    /// stays suspended until the next deal.
    async fn drain(&mut self) {
        log::debug!("[dealer] draining");
        let arbiter = self.arbiter.clone();
        self.table.lock();
        let _claims = arbiter.exclusive().await;
        let mut deck = arbiter.deck().await;
        for slot in 0..self.board.slots() {
            if self.board.card_at(slot).is_some() {
                if let Some(card) = self.board.remove_card(slot).await {
                    deck.put(card);
                }
            }
        }
        for player in 0..self.board.players() {
            self.board.clear_tokens(player).await;
        }
    }
}
