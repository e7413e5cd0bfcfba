use crate::*;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Robot that presses slots uniformly at random.
pub struct Fish {
    rng: SmallRng,
}

impl Fish {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: match seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_rng(&mut rand::rng()),
            },
        }
    }
}

#[async_trait::async_trait]
impl Player for Fish {
    async fn press(&mut self, slots: usize) -> Slot {
        self.rng.random_range(0..slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[tokio::test]
    async fn presses_within_board() {
        let mut fish = Fish::new(Some(3));
        for _ in 0..200 {
            assert!(fish.press(12).await < 12);
        }
    }
    #[tokio::test]
    async fn seeded_fish_repeat() {
        let mut a = Fish::new(Some(9));
        let mut b = Fish::new(Some(9));
        for _ in 0..20 {
            assert_eq!(a.press(81).await, b.press(81).await);
        }
    }
}
