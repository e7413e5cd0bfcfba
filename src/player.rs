use super::*;

/// Source of key presses for a robot seat.
///
/// The generator task asks for the next press only while the seat is
/// ready, so implementations never see locked or frozen periods.
#[async_trait::async_trait]
pub trait Player: Send + Sync {
    /// Next slot to press on a board of `slots` slots.
    async fn press(&mut self, slots: usize) -> Slot;
}
