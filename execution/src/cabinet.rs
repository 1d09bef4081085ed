//! Round lifecycle for a single game.
//!
//! A [Cabinet] is one game instance on the arcade floor: it owns the target
//! score, the current [Round] (if any) and the random generator used by its
//! simulations. Balances live in the shared [Economy], which is passed in by
//! reference whenever an operation moves money.

use crate::{
    arcade::{settle, GameError, GameOptions, GameRng, GameState, Simulation},
    Economy, Error, State,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use winfinity_types::arcade::{Amount, Event, GameType, Intent, Phase, SettlementPolicy};

/// How a round ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub score: u32,
    pub target: u32,
    pub reward: Amount,
    /// Set when a simulation fault ended the round without settlement
    pub fault: Option<String>,
}

/// One paid play, from confirmation to its terminal state.
#[derive(Clone, Debug, Serialize)]
pub struct Round {
    state: GameState,
    cost: Amount,
    started_at: u64,
    outcome: Option<Outcome>,
}

impl Round {
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.state.score()
    }

    pub fn cost(&self) -> Amount {
        self.cost
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }
}

#[derive(Clone, Debug)]
enum Stage {
    Idle,
    Confirming,
    Active(Round),
    Over(Round),
}

pub struct Cabinet {
    game: GameType,
    cost: Amount,
    policy: SettlementPolicy,
    options: GameOptions,
    target: u32,
    redraw_target: bool,
    rounds: u32,
    rng: GameRng,
    stage: Stage,
}

impl Cabinet {
    /// Open a cabinet for `game`, drawing its target score from `rng`.
    pub fn new(game: GameType, mut rng: GameRng) -> Self {
        let target = rng.draw_target();
        debug!(%game, target, "opened cabinet");
        Self {
            game,
            cost: game.cost(),
            policy: game.policy(),
            options: GameOptions::default(),
            target,
            redraw_target: false,
            rounds: 0,
            rng,
            stage: Stage::Idle,
        }
    }

    pub fn with_options(mut self, options: GameOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_target(mut self, target: u32) -> Self {
        self.target = target;
        self
    }

    /// Draw a fresh target before every round after the first.
    pub fn redraw_each_round(mut self, redraw: bool) -> Self {
        self.redraw_target = redraw;
        self
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    pub fn cost(&self) -> Amount {
        self.cost
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn options(&self) -> GameOptions {
        self.options
    }

    /// Rounds started on this cabinet.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Current or most recently finished round.
    pub fn round(&self) -> Option<&Round> {
        match &self.stage {
            Stage::Active(round) | Stage::Over(round) => Some(round),
            Stage::Idle | Stage::Confirming => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.stage, Stage::Active(_))
    }

    pub fn phase<S: State>(&self, economy: &Economy<S>) -> Phase {
        match self.stage {
            Stage::Idle if economy.can_afford(self.cost) => Phase::ReadyToPlay,
            Stage::Idle => Phase::NoFunds,
            Stage::Confirming => Phase::AwaitingConfirmation,
            Stage::Active(_) => Phase::Active,
            Stage::Over(_) => Phase::Over,
        }
    }

    fn insufficient<S: State>(&self, economy: &Economy<S>) -> Error {
        Error::InsufficientFunds {
            have: economy.wallet().deposit,
            need: self.cost,
        }
    }

    /// Ask to play, pending confirmation of the cost.
    pub fn request_play<S: State>(&mut self, economy: &Economy<S>) -> Result<Event, Error> {
        match self.phase(economy) {
            Phase::ReadyToPlay => {}
            Phase::NoFunds => return Err(self.insufficient(economy)),
            phase => {
                return Err(Error::InvalidTransition {
                    action: "request play",
                    phase,
                })
            }
        }
        self.stage = Stage::Confirming;
        Ok(Event::PlayRequested {
            game: self.game,
            cost: self.cost,
        })
    }

    pub fn cancel_play(&mut self) -> Result<Event, Error> {
        if !matches!(self.stage, Stage::Confirming) {
            return Err(Error::InvalidTransition {
                action: "cancel play",
                phase: self.stage_phase(),
            });
        }
        self.stage = Stage::Idle;
        Ok(Event::PlayCancelled { game: self.game })
    }

    /// Pay the cost and start a round.
    ///
    /// Allowed when ready, when confirming a request, and after a round is
    /// over ("play again"). Without enough deposit nothing changes.
    pub fn confirm_play<S: State>(
        &mut self,
        economy: &mut Economy<S>,
        now: u64,
    ) -> Result<Event, Error> {
        if let Stage::Active(_) = self.stage {
            return Err(Error::InvalidTransition {
                action: "confirm play",
                phase: Phase::Active,
            });
        }
        if !economy.can_afford(self.cost) {
            let err = self.insufficient(economy);
            info!(game = %self.game, error = %err, "cannot start round");
            return Err(err);
        }

        let target = if self.redraw_target && self.rounds > 0 {
            self.rng.draw_target()
        } else {
            self.target
        };
        let state =
            GameState::new(self.game, &self.options, &mut self.rng).map_err(Error::Simulation)?;
        let deposit = economy.debit(self.cost)?;

        self.target = target;
        self.rounds += 1;
        self.stage = Stage::Active(Round {
            state,
            cost: self.cost,
            started_at: now,
            outcome: None,
        });
        info!(game = %self.game, target, cost = %self.cost, %deposit, "round started");
        Ok(Event::RoundStarted {
            game: self.game,
            cost: self.cost,
            deposit,
            target,
        })
    }

    /// Forward a player intent to the running round.
    ///
    /// Returns the settlement event if the intent ended the round. Rejected
    /// moves leave the round running.
    pub fn input<S: State>(
        &mut self,
        economy: &mut Economy<S>,
        intent: Intent,
        now: u64,
    ) -> Result<Option<Event>, Error> {
        let phase = self.stage_phase();
        let Stage::Active(round) = &mut self.stage else {
            return Err(Error::InvalidTransition {
                action: "play",
                phase,
            });
        };
        match round.state.apply(intent, now, &mut self.rng) {
            Ok(()) => {}
            Err(GameError::InvalidMove) => {
                debug!(game = %self.game, ?intent, "rejected move");
                return Err(Error::InvalidMove);
            }
            Err(e) => return Err(self.fault(e)),
        }
        Ok(self.conclude(economy))
    }

    /// Advance the running round. Does nothing when no round is active.
    pub fn tick<S: State>(
        &mut self,
        economy: &mut Economy<S>,
        now: u64,
    ) -> Result<Option<Event>, Error> {
        let Stage::Active(round) = &mut self.stage else {
            return Ok(None);
        };
        if let Err(e) = round.state.tick(now, &mut self.rng) {
            return Err(self.fault(e));
        }
        Ok(self.conclude(economy))
    }

    /// Turn down "play again", discarding the finished round.
    pub fn decline<S: State>(&mut self, economy: &Economy<S>) -> Result<Event, Error> {
        if !matches!(self.stage, Stage::Over(_)) {
            return Err(Error::InvalidTransition {
                action: "decline",
                phase: self.phase(economy),
            });
        }
        self.stage = Stage::Idle;
        Ok(Event::RoundDeclined { game: self.game })
    }

    /// Phase without consulting the wallet, for error reporting.
    fn stage_phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::ReadyToPlay,
            Stage::Confirming => Phase::AwaitingConfirmation,
            Stage::Active(_) => Phase::Active,
            Stage::Over(_) => Phase::Over,
        }
    }

    /// Settle the round if the simulation reached a terminal state.
    fn conclude<S: State>(&mut self, economy: &mut Economy<S>) -> Option<Event> {
        let Stage::Active(round) = &self.stage else {
            return None;
        };
        if !round.state.is_terminal() {
            return None;
        }
        let score = round.state.score();
        let reward = settle(score, self.target, &self.policy);
        let deposit = economy.credit(reward);
        info!(game = %self.game, score, target = self.target, %reward, %deposit, "round ended");
        self.end(Outcome {
            score,
            target: self.target,
            reward,
            fault: None,
        });
        Some(Event::RoundEnded {
            game: self.game,
            score,
            target: self.target,
            reward,
            deposit,
        })
    }

    /// Force the round over without settlement.
    fn fault(&mut self, error: GameError) -> Error {
        let score = self.round().map(Round::score).unwrap_or_default();
        warn!(game = %self.game, score, %error, "simulation fault, round ended without reward");
        self.end(Outcome {
            score,
            target: self.target,
            reward: Amount::ZERO,
            fault: Some(error.to_string()),
        });
        Error::Simulation(error)
    }

    fn end(&mut self, outcome: Outcome) {
        let stage = std::mem::replace(&mut self.stage, Stage::Idle);
        self.stage = match stage {
            Stage::Active(mut round) => {
                round.outcome = Some(outcome);
                Stage::Over(round)
            }
            other => other,
        };
    }

    #[cfg(test)]
    pub(crate) fn finish_with<S: State>(
        &mut self,
        economy: &mut Economy<S>,
        score: u32,
    ) -> Option<Event> {
        if let Stage::Active(round) = &mut self.stage {
            round.state.force_over(score);
        }
        self.conclude(economy)
    }

    #[cfg(test)]
    pub(crate) fn inject_fault(&mut self, error: GameError) -> Error {
        self.fault(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_rng, economy_with_deposit};
    use winfinity_types::arcade::{Direction, Key};

    fn cabinet(game: GameType) -> Cabinet {
        Cabinet::new(game, create_rng(1)).with_target(15)
    }

    #[test]
    fn test_target_drawn_on_open() {
        for seed in 0..50 {
            let cabinet = Cabinet::new(GameType::Snake, create_rng(seed));
            assert!((15..=30).contains(&cabinet.target()));
        }
    }

    #[test]
    fn test_phase_follows_deposit() {
        let cabinet = cabinet(GameType::FlappyBird);
        let poor = economy_with_deposit(Amount::from_units(19));
        let rich = economy_with_deposit(Amount::from_units(20));
        assert_eq!(cabinet.phase(&poor), Phase::NoFunds);
        assert_eq!(cabinet.phase(&rich), Phase::ReadyToPlay);
    }

    #[test]
    fn test_request_and_cancel() {
        let economy = economy_with_deposit(Amount::from_units(10));
        let mut cabinet = cabinet(GameType::Snake);
        let event = cabinet.request_play(&economy).unwrap();
        assert_eq!(
            event,
            Event::PlayRequested {
                game: GameType::Snake,
                cost: Amount::from_units(10),
            }
        );
        assert_eq!(cabinet.phase(&economy), Phase::AwaitingConfirmation);
        assert!(matches!(
            cabinet.request_play(&economy),
            Err(Error::InvalidTransition { .. })
        ));
        cabinet.cancel_play().unwrap();
        assert_eq!(cabinet.phase(&economy), Phase::ReadyToPlay);
        assert!(cabinet.cancel_play().is_err());
    }

    #[test]
    fn test_request_without_funds() {
        let economy = economy_with_deposit(Amount::from_units(39));
        let mut cabinet = cabinet(GameType::Memory);
        let err = cabinet.request_play(&economy).unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientFunds {
                have: Amount::from_units(39),
                need: Amount::from_units(40),
            }
        );
        assert_eq!(cabinet.phase(&economy), Phase::NoFunds);
    }

    #[test]
    fn test_confirm_without_funds_changes_nothing() {
        let mut economy = economy_with_deposit(Amount::from_units(9));
        let mut cabinet = cabinet(GameType::Snake);
        let err = cabinet.confirm_play(&mut economy, 0).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert_eq!(economy.wallet().deposit, Amount::from_units(9));
        assert!(cabinet.round().is_none());
        assert_eq!(cabinet.rounds(), 0);
    }

    #[test]
    fn test_confirm_deducts_cost() {
        let mut economy = economy_with_deposit(Amount::from_units(25));
        let mut cabinet = cabinet(GameType::Snake);
        cabinet.request_play(&economy).unwrap();
        let event = cabinet.confirm_play(&mut economy, 0).unwrap();
        assert_eq!(
            event,
            Event::RoundStarted {
                game: GameType::Snake,
                cost: Amount::from_units(10),
                deposit: Amount::from_units(15),
                target: 15,
            }
        );
        assert_eq!(cabinet.phase(&economy), Phase::Active);
        assert_eq!(economy.state().get(Key::Deposit).as_deref(), Some("15.0"));
        assert!(matches!(
            cabinet.confirm_play(&mut economy, 1),
            Err(Error::InvalidTransition { .. })
        ));
        assert_eq!(economy.wallet().deposit, Amount::from_units(15));
    }

    #[test]
    fn test_input_outside_round() {
        let mut economy = economy_with_deposit(Amount::from_units(25));
        let mut cabinet = cabinet(GameType::Snake);
        assert!(matches!(
            cabinet.input(&mut economy, Intent::Steer(Direction::Up), 0),
            Err(Error::InvalidTransition { .. })
        ));
        assert_eq!(cabinet.tick(&mut economy, 0), Ok(None));
    }

    #[test]
    fn test_round_ends_and_settles() {
        let mut economy = economy_with_deposit(Amount::from_units(10));
        let mut cabinet = cabinet(GameType::Snake);
        cabinet.confirm_play(&mut economy, 0).unwrap();

        // Run into the right wall
        let mut now = 0;
        let event = loop {
            now += 200;
            if let Some(event) = cabinet.tick(&mut economy, now).unwrap() {
                break event;
            }
        };
        assert_eq!(
            event,
            Event::RoundEnded {
                game: GameType::Snake,
                score: 0,
                target: 15,
                reward: Amount::ZERO,
                deposit: Amount::ZERO,
            }
        );
        assert_eq!(cabinet.phase(&economy), Phase::Over);
        assert_eq!(cabinet.round().unwrap().outcome().unwrap().score, 0);
        // Over rounds are not ticked again
        assert_eq!(cabinet.tick(&mut economy, now + 200), Ok(None));
    }

    #[test]
    fn test_decline_returns_to_no_funds() {
        let mut economy = economy_with_deposit(Amount::from_units(20));
        let mut cabinet = cabinet(GameType::FlappyBird);
        assert!(cabinet.decline(&economy).is_err());
        cabinet.confirm_play(&mut economy, 0).unwrap();
        cabinet.finish_with(&mut economy, 3).unwrap();
        let event = cabinet.decline(&economy).unwrap();
        assert_eq!(
            event,
            Event::RoundDeclined {
                game: GameType::FlappyBird,
            }
        );
        assert!(cabinet.round().is_none());
        assert_eq!(cabinet.phase(&economy), Phase::NoFunds);
    }

    #[test]
    fn test_play_again_from_over() {
        let mut economy = economy_with_deposit(Amount::from_units(20));
        let mut cabinet = cabinet(GameType::Snake);
        cabinet.confirm_play(&mut economy, 0).unwrap();
        cabinet.finish_with(&mut economy, 0).unwrap();
        cabinet.confirm_play(&mut economy, 1_000).unwrap();
        assert_eq!(cabinet.phase(&economy), Phase::Active);
        assert_eq!(economy.wallet().deposit, Amount::ZERO);
        assert_eq!(cabinet.rounds(), 2);
    }

    #[test]
    fn test_target_redraw() {
        let mut economy = economy_with_deposit(Amount::from_units(1_000));
        let mut fixed = cabinet(GameType::Snake);
        let mut redraw = Cabinet::new(GameType::Snake, create_rng(9))
            .with_target(99)
            .redraw_each_round(true);
        let mut targets = Vec::new();
        for _ in 0..20 {
            fixed.confirm_play(&mut economy, 0).unwrap();
            fixed.finish_with(&mut economy, 0).unwrap();
            assert_eq!(fixed.target(), 15);

            redraw.confirm_play(&mut economy, 0).unwrap();
            redraw.finish_with(&mut economy, 0).unwrap();
            targets.push(redraw.target());
        }
        // First round keeps the opening target, later ones are redrawn
        assert_eq!(targets[0], 99);
        assert!(targets[1..].iter().all(|t| (15..=30).contains(t)));
    }

    #[test]
    fn test_fault_forces_over_without_reward() {
        let mut economy = economy_with_deposit(Amount::from_units(20));
        let mut cabinet = cabinet(GameType::FlappyBird);
        cabinet.confirm_play(&mut economy, 0).unwrap();
        let err = cabinet.inject_fault(GameError::InvalidState("bad".to_string()));
        assert_eq!(err.kind(), winfinity_types::arcade::NoticeKind::SimulationFault);
        assert_eq!(cabinet.phase(&economy), Phase::Over);
        let outcome = cabinet.round().unwrap().outcome().unwrap();
        assert_eq!(outcome.reward, Amount::ZERO);
        assert!(outcome.fault.is_some());
        assert_eq!(economy.wallet().deposit, Amount::ZERO);
    }

    #[test]
    fn test_invalid_move_keeps_round() {
        let mut economy = economy_with_deposit(Amount::from_units(40));
        let mut cabinet = cabinet(GameType::Memory);
        cabinet.confirm_play(&mut economy, 0).unwrap();
        let err = cabinet
            .input(&mut economy, Intent::Flip(99), 0)
            .unwrap_err();
        assert_eq!(err, Error::InvalidMove);
        assert_eq!(cabinet.phase(&economy), Phase::Active);
    }

    #[test]
    fn test_invalid_plinko_options_do_not_charge() {
        let mut economy = economy_with_deposit(Amount::from_units(10));
        let mut cabinet = cabinet(GameType::Plinko).with_options(GameOptions { plinko_lines: 3 });
        let err = cabinet.confirm_play(&mut economy, 0).unwrap_err();
        assert!(matches!(err, Error::Simulation(GameError::InvalidOptions(_))));
        assert_eq!(economy.wallet().deposit, Amount::from_units(10));
        assert!(cabinet.round().is_none());
    }
}
