use super::*;
use std::collections::BTreeSet;

/// Pure matching predicate and enumerator over card ids.
/// Implementations must be deterministic and free of side effects.
pub trait Oracle: Send + Sync {
    /// True iff `cards` form a match.
    fn test(&self, cards: &[Card]) -> bool;
    /// Up to `limit` matching groups drawn from `cards`.
    fn find(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>>;
}

/// The classic feature game.
///
/// A card id written in base `size` with `count` digits gives its
/// features. `arity` distinct cards match iff every feature is either
/// shared by all of them or different on each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    size: usize,
    count: usize,
    arity: usize,
}

impl Features {
    pub fn new(size: usize, count: usize, arity: usize) -> Self {
        assert!(size > 1, "features need at least two values");
        assert!(arity > 1 && arity <= size, "arity {} outside 2..={}", arity, size);
        Self { size, count, arity }
    }
    /// Feature values of a card, least significant first.
    fn features(&self, card: Card) -> Vec<usize> {
        (0..self.count)
            .scan(card, |rest, _| {
                let digit = *rest % self.size;
                *rest /= self.size;
                Some(digit)
            })
            .collect()
    }
}

impl From<&Config> for Features {
    fn from(config: &Config) -> Self {
        Self::new(config.feature_size, config.feature_count, config.arity)
    }
}

impl Oracle for Features {
    fn test(&self, cards: &[Card]) -> bool {
        if cards.len() != self.arity {
            return false;
        }
        if cards.iter().collect::<BTreeSet<_>>().len() != cards.len() {
            return false;
        }
        let features = cards
            .iter()
            .map(|&c| self.features(c))
            .collect::<Vec<_>>();
        (0..self.count).all(|i| {
            let values = features
                .iter()
                .map(|f| f[i])
                .collect::<BTreeSet<_>>()
                .len();
            values == 1 || values == cards.len()
        })
    }
    fn find(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>> {
        search(self, cards, self.arity, limit)
    }
}

/// Matches exactly the listed groups, ignoring order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    arity: usize,
    groups: BTreeSet<BTreeSet<Card>>,
}

impl Whitelist {
    pub fn new<G>(arity: usize, groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = Card>,
    {
        Self {
            arity,
            groups: groups
                .into_iter()
                .map(|g| g.into_iter().collect::<BTreeSet<_>>())
                .inspect(|g| assert_eq!(g.len(), arity, "group size must equal arity"))
                .collect(),
        }
    }
}

impl Oracle for Whitelist {
    fn test(&self, cards: &[Card]) -> bool {
        cards.len() == self.arity
            && self
                .groups
                .contains(&cards.iter().copied().collect::<BTreeSet<_>>())
    }
    fn find(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>> {
        search(self, cards, self.arity, limit)
    }
}

/// Scans `k`-combinations of `cards` in lexicographic index order,
/// keeping the first `limit` that the oracle accepts.
fn search<O: Oracle + ?Sized>(oracle: &O, cards: &[Card], k: usize, limit: usize) -> Vec<Vec<Card>> {
    Combinations::new(cards.len(), k)
        .map(|idx| idx.into_iter().map(|i| cards[i]).collect::<Vec<_>>())
        .filter(|group| oracle.test(group))
        .take(limit)
        .collect()
}

/// Index combinations `k` of `n`.
struct Combinations {
    n: usize,
    idx: Vec<usize>,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            idx: (0..k).collect(),
            done: k == 0 || k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.idx.clone();
        let k = self.idx.len();
        match (0..k).rev().find(|&i| self.idx[i] < self.n - k + i) {
            Some(i) => {
                self.idx[i] += 1;
                for j in i + 1..k {
                    self.idx[j] = self.idx[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(item)
    }
}
