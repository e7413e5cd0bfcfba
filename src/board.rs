use super::*;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

/// Grid occupancy and token claims. Only touched under the board mutex.
///
/// Invariant: `slots[s] == Some(c)` iff `cards[c] == Some(s)`.
#[derive(Debug)]
struct Grid {
    slots: Vec<Option<Card>>,
    cards: Vec<Option<Slot>>,
    tokens: Vec<Vec<Slot>>,
}

impl Grid {
    fn remove_card(&mut self, slot: Slot) -> Option<Card> {
        let card = self.slots[slot].take()?;
        self.cards[card] = None;
        Some(card)
    }
    fn remove_token(&mut self, player: PlayerId, slot: Slot) -> bool {
        let tokens = &mut self.tokens[player];
        match tokens.iter().position(|&s| s == slot) {
            Some(i) => {
                tokens.remove(i);
                true
            }
            None => false,
        }
    }
}

/// Single source of truth for which card sits where and which slots
/// each player has claimed.
///
/// Every public operation is one critical section under a single mutex,
/// so readers always observe a consistent snapshot. Mutating operations
/// first sleep for the configured artificial delay, outside the lock.
pub struct Board {
    ui: Arc<dyn Ui>,
    oracle: Arc<dyn Oracle>,
    arity: usize,
    delay: Duration,
    grid: Mutex<Grid>,
}

impl Board {
    pub fn new(config: &Config, ui: Arc<dyn Ui>, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            ui,
            oracle,
            arity: config.arity,
            delay: config.table_delay(),
            grid: Mutex::new(Grid {
                slots: vec![None; config.table_size()],
                cards: vec![None; config.deck_size()],
                tokens: vec![Vec::with_capacity(config.arity); config.players()],
            }),
        }
    }
    pub fn slots(&self) -> usize {
        self.grid().slots.len()
    }
    pub fn players(&self) -> usize {
        self.grid().tokens.len()
    }
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl Board {
    /// Puts `card` on the empty `slot`.
    ///
    /// Panics if the slot is occupied or the card is already placed.
    pub async fn place_card(&self, card: Card, slot: Slot) {
        self.throttle().await;
        let mut grid = self.grid();
        assert!(
            grid.slots[slot].is_none(),
            "slot {} already holds card {:?}",
            slot,
            grid.slots[slot]
        );
        assert!(
            grid.cards[card].is_none(),
            "card {} already on slot {:?}",
            card,
            grid.cards[card]
        );
        grid.slots[slot] = Some(card);
        grid.cards[card] = Some(slot);
        self.ui.send(Event::PlaceCard { card, slot });
    }
    /// Clears `slot`, returning the card that was there. No-op when empty.
    pub async fn remove_card(&self, slot: Slot) -> Option<Card> {
        self.throttle().await;
        let mut grid = self.grid();
        let card = grid.remove_card(slot)?;
        self.ui.send(Event::RemoveCard { slot });
        Some(card)
    }
    /// Appends `slot` to the player's tokens. The caller checks that a
    /// card is present first.
    ///
    /// Panics if the player already holds `arity` tokens or a token on `slot`.
    pub async fn place_token(&self, player: PlayerId, slot: Slot) {
        self.throttle().await;
        let mut grid = self.grid();
        let tokens = &mut grid.tokens[player];
        assert!(
            tokens.len() < self.arity,
            "P{} already holds {} tokens",
            player,
            tokens.len()
        );
        assert!(
            !tokens.contains(&slot),
            "P{} already has a token on {}",
            player,
            slot
        );
        tokens.push(slot);
        self.ui.send(Event::PlaceToken { player, slot });
    }
    pub async fn remove_token(&self, player: PlayerId, slot: Slot) -> bool {
        self.throttle().await;
        let mut grid = self.grid();
        let removed = grid.remove_token(player, slot);
        if removed {
            self.ui.send(Event::RemoveToken { player, slot });
        }
        removed
    }
    pub async fn clear_tokens(&self, player: PlayerId) {
        self.throttle().await;
        let mut grid = self.grid();
        for slot in std::mem::take(&mut grid.tokens[player]) {
            self.ui.send(Event::RemoveToken { player, slot });
        }
    }
    /// Accepts the player's claim as one atomic transaction: every other
    /// player's token on a claimed slot goes, the claimed cards leave the
    /// board, and the player's tokens are cleared. Returns the cards.
    pub async fn commit_match(&self, player: PlayerId) -> Vec<Card> {
        self.throttle().await;
        let mut grid = self.grid();
        let claimed = std::mem::take(&mut grid.tokens[player]);
        let mut cards = Vec::with_capacity(claimed.len());
        for &slot in claimed.iter() {
            for other in 0..grid.tokens.len() {
                if other != player && grid.remove_token(other, slot) {
                    self.ui.send(Event::RemoveToken {
                        player: other,
                        slot,
                    });
                }
            }
            self.ui.send(Event::RemoveToken { player, slot });
            if let Some(card) = grid.remove_card(slot) {
                self.ui.send(Event::RemoveCard { slot });
                cards.push(card);
            }
        }
        log::debug!("[board] P{} committed {:?} from {:?}", player, cards, claimed);
        cards
    }
}

impl Board {
    pub fn card_at(&self, slot: Slot) -> Option<Card> {
        self.grid().slots[slot]
    }
    pub fn slot_of(&self, card: Card) -> Option<Slot> {
        self.grid().cards[card]
    }
    pub fn token_count(&self, player: PlayerId) -> usize {
        self.grid().tokens[player].len()
    }
    pub fn tokens(&self, player: PlayerId) -> Vec<Slot> {
        self.grid().tokens[player].clone()
    }
    pub fn has_token(&self, player: PlayerId, slot: Slot) -> bool {
        self.grid().tokens[player].contains(&slot)
    }
    pub fn occupied_count(&self) -> usize {
        self.grid().slots.iter().flatten().count()
    }
    /// Cards on the board, in slot order.
    pub fn cards(&self) -> Vec<Card> {
        self.grid().slots.iter().flatten().copied().collect()
    }
    pub fn empty_slots(&self) -> Vec<Slot> {
        self.grid()
            .slots
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(s, _)| s)
            .collect()
    }
    pub fn has_any_match(&self) -> bool {
        !self.oracle.find(&self.cards(), 1).is_empty()
    }
    /// Slot groups of every match on the board, each logged as a hint.
    pub fn hints(&self) -> Vec<Vec<Slot>> {
        let grid = self.grid();
        let cards = grid.slots.iter().flatten().copied().collect::<Vec<_>>();
        self.oracle
            .find(&cards, usize::MAX)
            .into_iter()
            .map(|group| {
                let mut slots = group
                    .iter()
                    .filter_map(|&c| grid.cards[c])
                    .collect::<Vec<_>>();
                slots.sort_unstable();
                log::info!("[board] hint: slots {:?} cards {:?}", slots, group);
                slots
            })
            .collect()
    }
    /// Checks the slot/card bijection and the token bound.
    pub fn is_consistent(&self) -> bool {
        let grid = self.grid();
        let forward = grid
            .slots
            .iter()
            .enumerate()
            .all(|(s, c)| c.map_or(true, |c| grid.cards[c] == Some(s)));
        let backward = grid
            .cards
            .iter()
            .enumerate()
            .all(|(c, s)| s.map_or(true, |s| grid.slots[s] == Some(c)));
        let bounded = grid.tokens.iter().all(|t| t.len() <= self.arity);
        forward && backward && bounded
    }
}

impl Board {
    fn grid(&self) -> MutexGuard<'_, Grid> {
        self.grid.lock().unwrap_or_else(PoisonError::into_inner)
    }
    async fn throttle(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
