use super::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Sink for display notifications.
///
/// Called from inside the board's critical section, so implementations
/// must return immediately: no blocking, no locking of game state.
pub trait Ui: Send + Sync {
    fn send(&self, event: Event);
}

/// Writes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Ui for Console {
    fn send(&self, event: Event) {
        match event {
            Event::Countdown { .. } | Event::Elapsed(_) | Event::Freeze { .. } => {
                log::trace!("[ui] {}", event)
            }
            Event::Score { .. } | Event::Winners(_) => log::info!("[ui] {}", event),
            _ => log::debug!("[ui] {}", event),
        }
    }
}

/// Forwards events into an unbounded channel for an external renderer.
#[derive(Debug, Clone)]
pub struct Feed(UnboundedSender<Event>);

impl Feed {
    pub fn new() -> (Self, UnboundedReceiver<Event>) {
        let (tx, rx) = unbounded_channel();
        (Self(tx), rx)
    }
}

impl Ui for Feed {
    fn send(&self, event: Event) {
        if let Err(e) = self.0.send(event) {
            log::trace!("[ui] feed closed, dropped {}", e.0);
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mute;

impl Ui for Mute {
    fn send(&self, _: Event) {}
}
