//! Concurrent coordination for a real-time card matching game.
//!
//! One dealer supervises a shared board while several players race to
//! claim groups of cards that an [`Oracle`] accepts as a match.
//!
//! ## Architecture
//!
//! - [`Board`]: Slot/card bijection and per-player tokens behind one mutex
//! - [`Arbiter`]: Serialized claim adjudication, freezes, round clock, deck
//! - [`Actor`]: Async task turning slot presses into token moves and claims
//! - [`Dealer`]: Round loop: deal, run, drain, and ordered shutdown
//! - [`Table`]: Seats, per-player [`Gate`]s, and join handles
//!
//! ## Collaborators
//!
//! - [`Ui`]: Fire-and-forget sink for [`Event`]s
//! - [`Oracle`]: Pure matching predicate and enumerator
//! - [`Player`]: Automated input source driven by a generator task
mod actor;
mod arbiter;
mod board;
mod config;
mod dealer;
mod deck;
mod event;
mod gate;
mod oracle;
mod player;
mod table;
mod timer;
mod ui;

pub mod players;

pub use actor::*;
pub use arbiter::*;
pub use board::*;
pub use config::*;
pub use dealer::*;
pub use deck::*;
pub use event::*;
pub use gate::*;
pub use oracle::*;
pub use player::*;
pub use players::*;
pub use table::*;
pub use timer::*;
pub use ui::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Opaque card identity in `0..deck_size`.
pub type Card = usize;
/// Grid position in `0..table_size`.
pub type Slot = usize;
/// Player index; humans are seated first, then robots.
pub type PlayerId = usize;
/// Number of matches a player has claimed.
pub type Score = u32;

// ============================================================================
// LIMITS
// ============================================================================
/// Largest deck a config may ask for. Board and deck allocate per card.
pub const MAX_DECK: usize = 1 << 20;

// ============================================================================
// TIMING
// ============================================================================
/// Granularity of freeze countdown reports to the UI.
pub const FREEZE_STEP: std::time::Duration = std::time::Duration::from_secs(1);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Logs to the terminal at INFO and to a fresh `game-<unix>.log` under
/// `dir` at DEBUG. Only records whose target starts with one of
/// `targets` pass. Returns the log file's path.
#[cfg(feature = "server")]
pub fn log(
    dir: impl AsRef<std::path::Path>,
    targets: &[&'static str],
) -> anyhow::Result<std::path::PathBuf> {
    use anyhow::Context;
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let started = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .context("system clock before epoch")?;
    let path = logfile(dir, started);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("create {}", path.display()))?;
    let mut builder = simplelog::ConfigBuilder::new();
    for target in targets {
        builder.add_filter_allow_str(*target);
    }
    let config = builder
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::CombinedLogger::init(vec![
        simplelog::TermLogger::new(
            log::LevelFilter::Info,
            config.clone(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        ),
        simplelog::WriteLogger::new(log::LevelFilter::Debug, config, file),
    ])
    .context("initialize logger")?;
    Ok(path)
}

/// Log file of a game started `started` after the epoch.
#[cfg(feature = "server")]
fn logfile(dir: &std::path::Path, started: std::time::Duration) -> std::path::PathBuf {
    dir.join(format!("game-{}.log", started.as_secs()))
}
