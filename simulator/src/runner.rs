use crate::{config::ValidatedConfig, pilot::Pilot, staking::LocalStaking};
use serde::Serialize;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};
use tracing::{info, warn};
use winfinity_execution::{
    scheduler::{drive, Cadence, ManualClock, TickSource},
    Cabinet, Economy, Error, State,
};
use winfinity_types::arcade::{Amount, Event, GameType, StakingSnapshot, Wallet};

/// Wall-clock ticks at the game's cadence, in milliseconds since `start`.
pub struct RealTimeClock {
    interval: Interval,
    start: Instant,
    remaining: u64,
}

impl RealTimeClock {
    /// Clocks sharing a `start` report times on one timeline.
    pub fn new(cadence: Cadence, max_ticks: u64, start: Instant) -> Self {
        let mut interval = interval(cadence.period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            start,
            remaining: max_ticks,
        }
    }
}

impl TickSource for RealTimeClock {
    async fn next_tick(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let at = self.interval.tick().await;
        Some(at.duration_since(self.start).as_millis() as u64)
    }
}

pub enum Clock {
    Manual(ManualClock),
    RealTime(RealTimeClock),
}

impl Clock {
    /// Clock for one round. Virtual clocks continue from `now`, wall clocks
    /// count from the run's `start`.
    fn for_round(
        game: GameType,
        realtime: bool,
        max_ticks: u64,
        now: u64,
        start: Instant,
    ) -> Self {
        let cadence = Cadence::for_game(game);
        if realtime {
            Clock::RealTime(RealTimeClock::new(cadence, max_ticks, start))
        } else {
            Clock::Manual(
                ManualClock::for_cadence(cadence)
                    .starting_at(now)
                    .limit(max_ticks),
            )
        }
    }

    fn now(&self) -> u64 {
        match self {
            Clock::Manual(clock) => clock.now(),
            Clock::RealTime(clock) => clock.start.elapsed().as_millis() as u64,
        }
    }
}

impl TickSource for Clock {
    async fn next_tick(&mut self) -> Option<u64> {
        match self {
            Clock::Manual(clock) => clock.next_tick().await,
            Clock::RealTime(clock) => clock.next_tick().await,
        }
    }
}

/// Result of a simulator run.
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub game: GameType,
    pub rounds: u32,
    /// Rounds that paid a reward
    pub wins: u32,
    pub faults: u32,
    pub total_reward: Amount,
    pub wallet: Wallet,
    pub staking: StakingSnapshot,
}

/// Plays a cabinet round after round with an autopilot.
pub struct Runner<S: State> {
    economy: Economy<S>,
    staking: LocalStaking,
    cabinet: Cabinet,
    pilot: Pilot,

    rounds: u32,
    deposit: Amount,
    realtime: bool,
    max_ticks: u64,
}

impl<S: State> Runner<S> {
    pub fn new(
        config: &ValidatedConfig,
        economy: Economy<S>,
        staking: LocalStaking,
        cabinet: Cabinet,
    ) -> Self {
        Self {
            economy,
            staking,
            pilot: Pilot::for_game(cabinet.game()),
            cabinet,
            rounds: config.rounds,
            deposit: config.deposit,
            realtime: config.realtime,
            max_ticks: config.max_ticks,
        }
    }

    pub fn economy(&self) -> &Economy<S> {
        &self.economy
    }

    /// Top up, play up to the configured number of rounds, then claim any yield.
    ///
    /// Stops early when the deposit no longer covers a round. Staking failures
    /// and simulation faults are logged and do not end the run.
    pub async fn run(&mut self) -> Result<Summary, Error> {
        let game = self.cabinet.game();
        let start = Instant::now();
        let mut summary = Summary {
            game,
            rounds: 0,
            wins: 0,
            faults: 0,
            total_reward: Amount::ZERO,
            wallet: self.economy.wallet(),
            staking: self.economy.snapshot(),
        };

        if !self.economy.can_afford(self.cabinet.cost()) && !self.deposit.is_zero() {
            if let Err(e) = self.economy.deposit(&mut self.staking, self.deposit).await {
                warn!(error = %e, "initial deposit failed");
            }
        }

        let mut now = 0;
        for _ in 0..self.rounds {
            match self.cabinet.confirm_play(&mut self.economy, now) {
                Ok(_) => {}
                Err(Error::InsufficientFunds { have, need }) => {
                    info!(%have, %need, "out of funds");
                    break;
                }
                Err(e) => return Err(e),
            }
            summary.rounds += 1;
            self.pilot.reset();

            let mut clock = Clock::for_round(game, self.realtime, self.max_ticks, now, start);
            match drive(
                &mut self.cabinet,
                &mut self.economy,
                &mut clock,
                &mut self.pilot,
            )
            .await
            {
                Ok(Some(Event::RoundEnded { reward, .. })) => {
                    if !reward.is_zero() {
                        summary.wins += 1;
                        summary.total_reward = summary.total_reward.saturating_add(reward);
                    }
                }
                Ok(_) => {
                    warn!(%game, max_ticks = self.max_ticks, "round did not finish");
                    break;
                }
                Err(Error::Simulation(e)) => {
                    warn!(%game, error = %e, "round faulted");
                    summary.faults += 1;
                }
                Err(e) => return Err(e),
            }
            now = clock.now();

            self.staking.accrue();
            self.economy.refresh(&self.staking).await;
        }

        if !self.economy.snapshot().yield_amount.is_zero() {
            if let Err(e) = self.economy.claim(&mut self.staking).await {
                warn!(error = %e, "claim failed");
            }
            self.economy.refresh(&self.staking).await;
        }

        summary.wallet = self.economy.wallet();
        summary.staking = self.economy.snapshot();
        info!(
            %game,
            rounds = summary.rounds,
            wins = summary.wins,
            reward = %summary.total_reward,
            deposit = %summary.wallet.deposit,
            "run complete"
        );
        Ok(summary)
    }
}
