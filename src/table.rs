use super::*;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;

/// One player's place at the table: its gate, its keypad and, once
/// started, the tasks serving it.
struct Seat {
    id: PlayerId,
    human: bool,
    gate: Gate,
    keypad: Keypad,
    inbox: Option<Receiver<Slot>>,
    robot: Option<Box<dyn Player>>,
    actor: Option<JoinHandle<Score>>,
    generator: Option<JoinHandle<()>>,
}

/// Manages seats, player lifecycle and task supervision.
/// Separates who is playing from the rules of play.
pub struct Table {
    seats: Vec<Seat>,
}

impl Table {
    /// Seats humans first, then robots.
    pub fn new(config: &Config) -> Self {
        let mut table = Self { seats: Vec::new() };
        for _ in 0..config.humans {
            table.sit(config, None);
        }
        for _ in 0..config.robots {
            let seed = config.seed.map(|s| s.wrapping_add(table.seats() as u64 + 1));
            table.sit(config, Some(Box::new(Fish::new(seed))));
        }
        table
    }
    /// Adds a seat, driven by `robot` if given or by its keypad otherwise.
    pub fn sit(&mut self, config: &Config, robot: Option<Box<dyn Player>>) -> PlayerId {
        let id = self.seats.len();
        let (keypad, inbox) = Keypad::new(id, config.arity);
        self.seats.push(Seat {
            id,
            human: robot.is_none(),
            gate: Gate::default(),
            keypad,
            inbox: Some(inbox),
            robot,
            actor: None,
            generator: None,
        });
        id
    }
    pub fn seats(&self) -> usize {
        self.seats.len()
    }
    /// Keypad of a human seat.
    pub fn keypad(&self, id: PlayerId) -> Option<Keypad> {
        self.seats
            .get(id)
            .filter(|seat| seat.human)
            .map(|seat| seat.keypad.clone())
    }
    pub fn gate(&self, id: PlayerId) -> Option<&Gate> {
        self.seats.get(id).map(|seat| &seat.gate)
    }
}

impl Table {
    /// Spawns an actor per seat and a generator per robot, in seat order.
    pub fn start(&mut self, config: &Config, arbiter: &Arc<Arbiter>, ui: &Arc<dyn Ui>) {
        let slots = config.table_size();
        for seat in self.seats.iter_mut() {
            let Some(inbox) = seat.inbox.take() else {
                log::warn!("[table] P{} already started", seat.id);
                continue;
            };
            let actor = Actor::new(
                seat.id,
                config,
                arbiter.clone(),
                ui.clone(),
                seat.gate.clone(),
                inbox,
            );
            seat.actor = Some(tokio::spawn(actor.run()));
            if let Some(robot) = seat.robot.take() {
                let keypad = seat.keypad.clone();
                let gate = seat.gate.clone();
                seat.generator = Some(tokio::spawn(generate(robot, keypad, slots, gate)));
            }
            log::debug!("[table] P{} seated", seat.id);
        }
    }
    /// Suspends input on every seat.
    pub fn lock(&self) {
        self.seats.iter().for_each(|seat| seat.gate.lock());
    }
    pub fn unlock(&self) {
        self.seats.iter().for_each(|seat| seat.gate.unlock());
    }
    /// Terminates every seat in reverse start order, joining the
    /// generator and then the actor of each. Returns scores by seat.
    pub async fn dismiss(&mut self) -> Vec<Score> {
        let mut scores = vec![0; self.seats.len()];
        for seat in self.seats.iter_mut().rev() {
            seat.gate.terminate();
            if let Some(generator) = seat.generator.take() {
                if let Err(e) = generator.await {
                    log::error!("[table] P{} generator failed: {}", seat.id, e);
                }
            }
            if let Some(actor) = seat.actor.take() {
                match actor.await {
                    Ok(score) => scores[seat.id] = score,
                    Err(e) => log::error!("[table] P{} actor failed: {}", seat.id, e),
                }
            }
            log::debug!("[table] P{} dismissed", seat.id);
        }
        scores
    }
}
