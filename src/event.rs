use super::*;
use std::time::Duration;

/// Notifications sent from the core to the UI collaborator.
/// Every variant is fire-and-forget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    PlaceCard { card: Card, slot: Slot },
    RemoveCard { slot: Slot },
    PlaceToken { player: PlayerId, slot: Slot },
    RemoveToken { player: PlayerId, slot: Slot },
    Score { player: PlayerId, score: Score },
    /// Time left in a countdown round; `warn` inside the warning window.
    Countdown { remaining: Duration, warn: bool },
    /// Time since the round clock was last reset.
    Elapsed(Duration),
    /// Time left on a player's freeze; zero when it ends.
    Freeze { player: PlayerId, remaining: Duration },
    /// Every player tied for the top score.
    Winners(Vec<PlayerId>),
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::PlaceCard { card, slot } => write!(f, "card {} -> slot {}", card, slot),
            Event::RemoveCard { slot } => write!(f, "slot {} cleared", slot),
            Event::PlaceToken { player, slot } => write!(f, "P{}: token on {}", player, slot),
            Event::RemoveToken { player, slot } => write!(f, "P{}: token off {}", player, slot),
            Event::Score { player, score } => write!(f, "P{}: score {}", player, score),
            Event::Countdown { remaining, warn } => write!(
                f,
                "{}{}ms left",
                if *warn { "! " } else { "" },
                remaining.as_millis()
            ),
            Event::Elapsed(elapsed) => write!(f, "{}ms elapsed", elapsed.as_millis()),
            Event::Freeze { player, remaining } => {
                write!(f, "P{}: frozen {}ms", player, remaining.as_millis())
            }
            Event::Winners(winners) => {
                let s = winners
                    .iter()
                    .map(|p| format!("P{}", p))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Winners: {}", s)
            }
        }
    }
}
