//! Driving rounds without a browser.
//!
//! A [TickSource] decides when a cabinet advances and a [Controller] decides
//! what the player does between ticks. [drive] combines them. Wrapping the
//! returned future with [futures::future::abortable] gives callers a handle
//! to stop a round loop from outside.

use crate::{arcade::GameState, Cabinet, Economy, Error, State};
use futures::{channel::mpsc::UnboundedReceiver, FutureExt, StreamExt};
use std::{future::Future, time::Duration};
use tracing::debug;
use winfinity_types::arcade::{Event, GameType, Intent, SNAKE_TICK_MS};

/// Interval between animation frames.
pub const FRAME: Duration = Duration::from_millis(16);

/// Resolution of timers for input-driven games.
pub const TIMER_RESOLUTION: Duration = Duration::from_millis(50);

/// How often a game needs to be ticked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Fixed wall-clock interval
    Interval(Duration),
    /// Once per animation frame
    Frame,
    /// Driven by input, with ticks only to fire timers
    OnInput { timer: Duration },
}

impl Cadence {
    pub fn for_game(game: GameType) -> Self {
        match game {
            GameType::Snake => Cadence::Interval(Duration::from_millis(SNAKE_TICK_MS)),
            GameType::FlappyBird | GameType::Plinko => Cadence::Frame,
            GameType::Memory => Cadence::OnInput {
                timer: TIMER_RESOLUTION,
            },
        }
    }

    /// Time between consecutive ticks.
    pub fn period(&self) -> Duration {
        match self {
            Cadence::Interval(period) => *period,
            Cadence::Frame => FRAME,
            Cadence::OnInput { timer } => *timer,
        }
    }
}

/// Source of tick timestamps, in milliseconds.
pub trait TickSource {
    /// Wait for the next tick. `None` means the source is exhausted.
    fn next_tick(&mut self) -> impl Future<Output = Option<u64>>;
}

/// Virtual clock that advances by a fixed step whenever it is polled.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: u64,
    step: u64,
    remaining: Option<u64>,
}

impl ManualClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: 0,
            step: step.as_millis() as u64,
            remaining: None,
        }
    }

    pub fn for_cadence(cadence: Cadence) -> Self {
        Self::new(cadence.period())
    }

    /// Stop after `ticks` more ticks.
    pub fn limit(mut self, ticks: u64) -> Self {
        self.remaining = Some(ticks);
        self
    }

    pub fn starting_at(mut self, now: u64) -> Self {
        self.now = now;
        self
    }

    pub fn now(&self) -> u64 {
        self.now
    }
}

impl TickSource for ManualClock {
    async fn next_tick(&mut self) -> Option<u64> {
        if let Some(remaining) = &mut self.remaining {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        self.now = self.now.saturating_add(self.step);
        Some(self.now)
    }
}

/// Supplies player intents before each tick.
pub trait Controller {
    fn poll(&mut self, state: &GameState, now: u64) -> Vec<Intent>;
}

/// Intents queued by an input handler.
impl Controller for UnboundedReceiver<Intent> {
    fn poll(&mut self, _state: &GameState, _now: u64) -> Vec<Intent> {
        let mut intents = Vec::new();
        while let Some(Some(intent)) = self.next().now_or_never() {
            intents.push(intent);
        }
        intents
    }
}

/// Run the cabinet's active round until it ends or `clock` runs out.
///
/// Returns the settlement event, or `None` if no round was active or the
/// clock was exhausted first. Rejected moves are skipped; a simulation fault
/// ends the loop with an error after the cabinet has forced the round over.
pub async fn drive<S, T, C>(
    cabinet: &mut Cabinet,
    economy: &mut Economy<S>,
    clock: &mut T,
    controller: &mut C,
) -> Result<Option<Event>, Error>
where
    S: State,
    T: TickSource,
    C: Controller,
{
    while cabinet.is_active() {
        let Some(now) = clock.next_tick().await else {
            debug!(game = %cabinet.game(), "tick source exhausted");
            return Ok(None);
        };
        let intents = match cabinet.round() {
            Some(round) => controller.poll(round.state(), now),
            None => Vec::new(),
        };
        for intent in intents {
            match cabinet.input(economy, intent, now) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) | Err(Error::InvalidMove) => {}
                Err(e) => return Err(e),
            }
        }
        if let Some(event) = cabinet.tick(economy, now)? {
            return Ok(Some(event));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_rng, economy_with_deposit};
    use futures::{
        channel::mpsc,
        executor::block_on,
        future::{abortable, Aborted},
    };
    use winfinity_types::arcade::{Amount, Direction};

    #[test]
    fn test_cadence_per_game() {
        assert_eq!(
            Cadence::for_game(GameType::Snake).period(),
            Duration::from_millis(200)
        );
        assert_eq!(Cadence::for_game(GameType::FlappyBird), Cadence::Frame);
        assert_eq!(Cadence::for_game(GameType::Plinko).period(), FRAME);
        assert!(matches!(
            Cadence::for_game(GameType::Memory),
            Cadence::OnInput { .. }
        ));
    }

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::new(Duration::from_millis(200)).limit(2);
        assert_eq!(block_on(clock.next_tick()), Some(200));
        assert_eq!(block_on(clock.next_tick()), Some(400));
        assert_eq!(block_on(clock.next_tick()), None);
        assert_eq!(clock.now(), 400);
    }

    #[test]
    fn test_drive_snake_into_wall() {
        let mut economy = economy_with_deposit(Amount::from_units(10));
        let mut cabinet = Cabinet::new(GameType::Snake, create_rng(1)).with_target(15);
        cabinet.confirm_play(&mut economy, 0).unwrap();

        let (sender, mut receiver) = mpsc::unbounded();
        // Turn away from the food row, then keep going down into the floor
        sender.unbounded_send(Intent::Steer(Direction::Down)).unwrap();
        let mut clock = ManualClock::for_cadence(Cadence::for_game(GameType::Snake));
        let event = block_on(drive(&mut cabinet, &mut economy, &mut clock, &mut receiver))
            .unwrap()
            .unwrap();
        assert!(matches!(event, Event::RoundEnded { score: 0, .. }));
        // Fifteen moves from row 5 to leave the bottom edge
        assert_eq!(clock.now(), 15 * 200);
    }

    #[test]
    fn test_drive_stops_when_clock_exhausted() {
        let mut economy = economy_with_deposit(Amount::from_units(20));
        let mut cabinet = Cabinet::new(GameType::FlappyBird, create_rng(2));
        cabinet.confirm_play(&mut economy, 0).unwrap();
        let (_sender, mut receiver) = mpsc::unbounded::<Intent>();
        let mut clock = ManualClock::for_cadence(Cadence::Frame).limit(10);
        // Bird waits for the first jump, so nothing ends
        let result = block_on(drive(&mut cabinet, &mut economy, &mut clock, &mut receiver));
        assert_eq!(result, Ok(None));
        assert!(cabinet.is_active());
    }

    #[test]
    fn test_drive_without_round() {
        let mut economy = economy_with_deposit(Amount::ZERO);
        let mut cabinet = Cabinet::new(GameType::Memory, create_rng(3));
        let (_sender, mut receiver) = mpsc::unbounded::<Intent>();
        let mut clock = ManualClock::for_cadence(Cadence::for_game(GameType::Memory));
        let result = block_on(drive(&mut cabinet, &mut economy, &mut clock, &mut receiver));
        assert_eq!(result, Ok(None));
        assert_eq!(clock.now(), 0);
    }

    #[test]
    fn test_drive_can_be_aborted() {
        let mut economy = economy_with_deposit(Amount::from_units(10));
        let mut cabinet = Cabinet::new(GameType::Plinko, create_rng(4));
        cabinet.confirm_play(&mut economy, 0).unwrap();
        let (_sender, mut receiver) = mpsc::unbounded::<Intent>();
        let mut clock = ManualClock::for_cadence(Cadence::Frame);

        let (round, handle) = abortable(drive(
            &mut cabinet,
            &mut economy,
            &mut clock,
            &mut receiver,
        ));
        handle.abort();
        assert_eq!(block_on(round), Err(Aborted));
        assert!(cabinet.is_active());
    }

    #[test]
    fn test_drive_plinko_to_landing() {
        let mut economy = economy_with_deposit(Amount::from_units(10));
        let mut cabinet = Cabinet::new(GameType::Plinko, create_rng(5)).with_target(15);
        cabinet.confirm_play(&mut economy, 0).unwrap();
        let (sender, mut receiver) = mpsc::unbounded();
        sender.unbounded_send(Intent::Drop).unwrap();
        // A second drop is rejected and skipped
        sender.unbounded_send(Intent::Drop).unwrap();
        let mut clock = ManualClock::for_cadence(Cadence::Frame);
        let event = block_on(drive(&mut cabinet, &mut economy, &mut clock, &mut receiver))
            .unwrap()
            .unwrap();
        let Event::RoundEnded { score, reward, .. } = event else {
            panic!("unexpected event {event:?}");
        };
        assert!(score >= 3);
        let expected = crate::arcade::settle(score, 15, &GameType::Plinko.policy());
        assert_eq!(reward, expected);
        assert_eq!(economy.wallet().deposit, expected);
        // Sixteen rows, one per frame
        assert_eq!(clock.now(), 16 * 16);
    }
}
