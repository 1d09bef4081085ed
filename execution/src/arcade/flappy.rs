//! Flappy Bird physics.
//!
//! The bird stays at the horizontal centre of the playfield while pipes
//! scroll left. A paid round waits for the first jump before anything moves.

use super::{GameError, GameRng, Simulation};
use serde::Serialize;
use winfinity_types::arcade::{
    Intent, FLAPPY_BIRD_SIZE, FLAPPY_GAP_HEIGHT, FLAPPY_GAP_TOP_MIN, FLAPPY_GAP_TOP_SPREAD,
    FLAPPY_GRAVITY, FLAPPY_HEIGHT, FLAPPY_JUMP_VELOCITY, FLAPPY_MAX_PIPES, FLAPPY_PIPE_SPEED,
    FLAPPY_PIPE_WIDTH, FLAPPY_SPAWN_FRACTION, FLAPPY_WIDTH,
};

/// Horizontal position of the bird's centre.
pub const BIRD_X: f64 = FLAPPY_WIDTH / 2.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pipe {
    /// Left edge
    pub x: f64,
    /// Top edge of the gap
    pub gap_top: f64,
    pub passed: bool,
}

impl Pipe {
    fn spawn(rng: &mut GameRng) -> Self {
        Self {
            x: FLAPPY_WIDTH,
            gap_top: rng.next_f64() * FLAPPY_GAP_TOP_SPREAD + FLAPPY_GAP_TOP_MIN,
            passed: false,
        }
    }

    /// Whether the bird, centred at `y`, overlaps this pipe's solid parts.
    fn hits(&self, y: f64) -> bool {
        let half = FLAPPY_BIRD_SIZE / 2.0;
        let within = self.x < BIRD_X + half && self.x + FLAPPY_PIPE_WIDTH > BIRD_X - half;
        let top = y - half < self.gap_top;
        let bottom = y + half > self.gap_top + FLAPPY_GAP_HEIGHT;
        within && (top || bottom)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FlappyBird {
    y: f64,
    velocity: f64,
    pipes: Vec<Pipe>,
    score: u32,
    /// Set by the first jump
    launched: bool,
    over: bool,
}

impl FlappyBird {
    pub fn new(rng: &mut GameRng) -> Self {
        Self {
            y: FLAPPY_HEIGHT / 2.0,
            velocity: 0.0,
            pipes: vec![Pipe::spawn(rng)],
            score: 0,
            launched: false,
            over: false,
        }
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    fn should_spawn(&self) -> bool {
        match self.pipes.last() {
            None => true,
            Some(last) => {
                self.pipes.len() < FLAPPY_MAX_PIPES && last.x < FLAPPY_WIDTH * FLAPPY_SPAWN_FRACTION
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn with_pipes(y: f64, pipes: Vec<Pipe>) -> Self {
        Self {
            y,
            velocity: 0.0,
            pipes,
            score: 0,
            launched: true,
            over: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn force_over(&mut self, score: u32) {
        self.score = score;
        self.over = true;
    }
}

impl Simulation for FlappyBird {
    fn apply(&mut self, intent: Intent, _now: u64, _rng: &mut GameRng) -> Result<(), GameError> {
        if self.over {
            return Err(GameError::GameAlreadyComplete);
        }
        if intent == Intent::Jump {
            self.launched = true;
            self.velocity = FLAPPY_JUMP_VELOCITY;
        }
        Ok(())
    }

    fn tick(&mut self, _now: u64, rng: &mut GameRng) -> Result<(), GameError> {
        if self.over {
            return Err(GameError::GameAlreadyComplete);
        }
        if !self.launched {
            return Ok(());
        }

        self.y += self.velocity;
        self.velocity += FLAPPY_GRAVITY;
        if !self.y.is_finite() {
            return Err(GameError::InvalidState(format!("bird left the playfield at y={}", self.y)));
        }

        for pipe in &mut self.pipes {
            pipe.x -= FLAPPY_PIPE_SPEED;
        }
        self.pipes.retain(|pipe| pipe.x + FLAPPY_PIPE_WIDTH > 0.0);
        if self.should_spawn() {
            self.pipes.push(Pipe::spawn(rng));
        }

        for pipe in &mut self.pipes {
            if !pipe.passed && pipe.x + FLAPPY_PIPE_WIDTH < BIRD_X {
                pipe.passed = true;
                self.score += 1;
            }
        }

        let half = FLAPPY_BIRD_SIZE / 2.0;
        let out_of_bounds = self.y + half > FLAPPY_HEIGHT || self.y - half < 0.0;
        if out_of_bounds || self.pipes.iter().any(|pipe| pipe.hits(self.y)) {
            self.over = true;
        }
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.over
    }

    fn score(&self) -> u32 {
        self.score
    }
}
