use super::*;
use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Game parameters, loaded from JSON with every field defaulted.
///
/// Durations are kept as signed or unsigned milliseconds so the file
/// format stays flat; the accessor methods convert them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keypad-driven players. They take the lowest ids.
    pub humans: usize,
    /// Generator-driven players.
    pub robots: usize,
    pub rows: usize,
    pub columns: usize,
    /// Distinct values each feature can take.
    pub feature_size: usize,
    /// Features per card.
    pub feature_count: usize,
    /// Cards per match.
    pub arity: usize,
    /// Negative is untimed, zero shows elapsed time, positive counts down.
    pub turn_timeout_millis: i64,
    pub turn_timeout_warning_millis: u64,
    pub point_freeze_millis: u64,
    pub penalty_freeze_millis: u64,
    /// Artificial latency before every board mutation.
    pub table_delay_millis: u64,
    /// Upper bound between two clock updates of the dealer.
    pub tick_millis: u64,
    /// Log every match on the board after each deal.
    pub hints: bool,
    /// Seeds the dealer shuffle and the robots. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            humans: 0,
            robots: 2,
            rows: 3,
            columns: 4,
            feature_size: 3,
            feature_count: 4,
            arity: 3,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            table_delay_millis: 100,
            tick_millis: 100,
            hints: false,
            seed: None,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = serde_json::from_str::<Self>(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        config.validate().map(|_| config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.players() > 0, "at least one player is required");
        anyhow::ensure!(
            self.rows.checked_mul(self.columns).is_some(),
            "grid of {}x{} slots overflows",
            self.rows,
            self.columns
        );
        anyhow::ensure!(self.table_size() > 0, "grid must have at least one slot");
        anyhow::ensure!(
            (2..=self.table_size()).contains(&self.arity),
            "arity {} outside 2..={}",
            self.arity,
            self.table_size()
        );
        anyhow::ensure!(
            self.arity <= self.feature_size,
            "arity {} exceeds feature size {}",
            self.arity,
            self.feature_size
        );
        anyhow::ensure!(
            self.checked_deck_size().is_some_and(|n| n <= MAX_DECK),
            "deck of {}^{} cards exceeds {} cards",
            self.feature_size,
            self.feature_count,
            MAX_DECK
        );
        Ok(())
    }
}

impl Config {
    pub fn players(&self) -> usize {
        self.humans.saturating_add(self.robots)
    }
    pub fn table_size(&self) -> usize {
        self.rows * self.columns
    }
    /// Number of distinct cards. Only meaningful on a validated config.
    pub fn deck_size(&self) -> usize {
        self.checked_deck_size().unwrap_or(usize::MAX)
    }
    fn checked_deck_size(&self) -> Option<usize> {
        u32::try_from(self.feature_count)
            .ok()
            .and_then(|count| self.feature_size.checked_pow(count))
    }
    pub fn mode(&self) -> Mode {
        match self.turn_timeout_millis {
            t if t < 0 => Mode::Untimed,
            0 => Mode::Elapsed,
            t => Mode::Countdown(Duration::from_millis(t as u64)),
        }
    }
    pub fn warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_millis)
    }
    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_millis)
    }
    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }
    pub fn table_delay(&self) -> Duration {
        Duration::from_millis(self.table_delay_millis)
    }
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}
