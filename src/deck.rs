use super::*;
use rand::Rng;
use rand::seq::SliceRandom;

/// Cards neither on the board nor dealt. Order is irrelevant between
/// shuffles; `draw` takes from the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Full deck of `size` cards.
    pub fn new(size: usize) -> Self {
        Self {
            cards: (0..size).collect(),
        }
    }
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }
    pub fn put(&mut self, card: Card) {
        debug_assert!(!self.cards.contains(&card), "card {} already in deck", card);
        self.cards.push(card);
    }
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
    pub fn len(&self) -> usize {
        self.cards.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    #[test]
    fn draw_until_empty() {
        let mut deck = Deck::new(3);
        assert_eq!(deck.len(), 3);
        assert!(deck.draw().is_some());
        assert!(deck.draw().is_some());
        assert!(deck.draw().is_some());
        assert!(deck.draw().is_none());
        assert!(deck.is_empty());
    }
    #[test]
    fn shuffle_keeps_cards() {
        let mut deck = Deck::new(20);
        deck.shuffle(&mut SmallRng::seed_from_u64(7));
        let mut cards = deck.cards().to_vec();
        assert_ne!(cards, (0..20).collect::<Vec<_>>());
        cards.sort();
        assert_eq!(cards, (0..20).collect::<Vec<_>>());
    }
    #[test]
    fn put_returns_card() {
        let mut deck = Deck::from(vec![1, 2]);
        let card = deck.draw().unwrap();
        deck.put(card);
        assert_eq!(deck.len(), 2);
    }
}
