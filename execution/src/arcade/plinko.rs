//! Plinko.
//!
//! A released ball falls through `lines` rows of pegs, bouncing left or right
//! with equal odds at each, and lands in one of `lines + 1` buckets. The
//! round's score is the bucket's multiplier expressed in tenths.

use super::{GameError, GameRng, Simulation};
use serde::Serialize;
use winfinity_types::arcade::{Intent, PLINKO_MAX_LINES, PLINKO_MIN_LINES};

/// Bucket multipliers in tenths, indexed by `lines - PLINKO_MIN_LINES`.
const MULTIPLIERS: [&[u32]; 9] = [
    &[50, 30, 15, 5, 3, 5, 15, 30, 50],
    &[100, 50, 20, 15, 3, 3, 15, 20, 50, 100],
    &[250, 50, 20, 15, 5, 3, 5, 15, 20, 50, 250],
    &[250, 50, 30, 20, 5, 3, 3, 5, 20, 30, 50, 250],
    &[330, 100, 30, 20, 15, 5, 3, 5, 15, 20, 30, 100, 330],
    &[410, 150, 50, 30, 15, 5, 3, 3, 5, 15, 30, 50, 150, 410],
    &[410, 150, 50, 30, 15, 10, 5, 3, 5, 10, 15, 30, 50, 150, 410],
    &[880, 180, 100, 50, 30, 15, 5, 3, 3, 5, 15, 30, 50, 100, 180, 880],
    &[1100, 410, 100, 50, 30, 15, 10, 5, 3, 5, 10, 15, 30, 50, 100, 410, 1100],
];

/// Multipliers (in tenths) for a board with `lines` rows.
pub fn multipliers(lines: u8) -> Option<&'static [u32]> {
    if !(PLINKO_MIN_LINES..=PLINKO_MAX_LINES).contains(&lines) {
        return None;
    }
    MULTIPLIERS.get((lines - PLINKO_MIN_LINES) as usize).copied()
}

#[derive(Clone, Debug, Serialize)]
pub struct Plinko {
    lines: u8,
    /// Bounce taken at each row so far, `true` for right
    path: Vec<bool>,
    dropped: bool,
    bucket: Option<usize>,
    score: u32,
}

impl Plinko {
    pub fn new(lines: u8) -> Result<Self, GameError> {
        if multipliers(lines).is_none() {
            return Err(GameError::InvalidOptions(format!(
                "plinko lines must be between {PLINKO_MIN_LINES} and {PLINKO_MAX_LINES} (got {lines})"
            )));
        }
        Ok(Self {
            lines,
            path: Vec::with_capacity(lines as usize),
            dropped: false,
            bucket: None,
            score: 0,
        })
    }

    pub fn lines(&self) -> u8 {
        self.lines
    }

    pub fn path(&self) -> &[bool] {
        &self.path
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn bucket(&self) -> Option<usize> {
        self.bucket
    }

    fn land(&mut self) -> Result<(), GameError> {
        let bucket = self.path.iter().filter(|right| **right).count();
        let multiplier = multipliers(self.lines)
            .and_then(|table| table.get(bucket))
            .copied()
            .ok_or_else(|| {
                GameError::InvalidState(format!(
                    "no bucket {bucket} on a {}-line board",
                    self.lines
                ))
            })?;
        self.bucket = Some(bucket);
        self.score = multiplier;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn force_over(&mut self, score: u32) {
        self.dropped = true;
        self.score = score;
        self.bucket = Some(0);
    }
}

impl Simulation for Plinko {
    fn apply(&mut self, intent: Intent, _now: u64, _rng: &mut GameRng) -> Result<(), GameError> {
        if self.is_terminal() {
            return Err(GameError::GameAlreadyComplete);
        }
        match intent {
            Intent::Drop if self.dropped => Err(GameError::InvalidMove),
            Intent::Drop => {
                self.dropped = true;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn tick(&mut self, _now: u64, rng: &mut GameRng) -> Result<(), GameError> {
        if self.is_terminal() {
            return Err(GameError::GameAlreadyComplete);
        }
        if !self.dropped {
            return Ok(());
        }
        self.path.push(rng.coin());
        if self.path.len() == self.lines as usize {
            self.land()?;
        }
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.bucket.is_some()
    }

    fn score(&self) -> u32 {
        self.score
    }
}
