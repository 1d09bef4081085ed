//! Snake on a square grid.
//!
//! The head advances one cell per tick. Steering is buffered until the next
//! tick and a request to reverse onto the body is dropped. Eating food grows
//! the snake and scores [SNAKE_POINTS_PER_FOOD].

use super::{GameError, GameRng, Simulation};
use serde::Serialize;
use std::collections::VecDeque;
use winfinity_types::arcade::{Direction, Intent, SNAKE_GRID_SIZE, SNAKE_POINTS_PER_FOOD};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(self) -> bool {
        (0..SNAKE_GRID_SIZE).contains(&self.x) && (0..SNAKE_GRID_SIZE).contains(&self.y)
    }
}

const START: Cell = Cell::new(5, 5);
const FIRST_FOOD: Cell = Cell::new(10, 10);

#[derive(Clone, Debug, Serialize)]
pub struct Snake {
    /// Head first
    body: VecDeque<Cell>,
    food: Cell,
    heading: Direction,
    pending: Option<Direction>,
    score: u32,
    paused: bool,
    over: bool,
}

impl Default for Snake {
    fn default() -> Self {
        Self::new()
    }
}

impl Snake {
    pub fn new() -> Self {
        Self {
            body: VecDeque::from([START]),
            food: FIRST_FOOD,
            heading: Direction::Right,
            pending: None,
            score: 0,
            paused: false,
            over: false,
        }
    }

    pub fn head(&self) -> Cell {
        // Body is never empty
        self.body.front().copied().unwrap_or(START)
    }

    pub fn body(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn place_food(&mut self, rng: &mut GameRng) -> bool {
        let free: Vec<Cell> = (0..SNAKE_GRID_SIZE)
            .flat_map(|y| (0..SNAKE_GRID_SIZE).map(move |x| Cell::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        if free.is_empty() {
            return false;
        }
        self.food = free[rng.next_bounded(free.len())];
        true
    }

    #[cfg(test)]
    pub(crate) fn with_body(body: Vec<Cell>, heading: Direction, food: Cell) -> Self {
        Self {
            body: body.into(),
            food,
            heading,
            ..Self::new()
        }
    }

    #[cfg(test)]
    pub(crate) fn force_over(&mut self, score: u32) {
        self.score = score;
        self.over = true;
    }
}

impl Simulation for Snake {
    fn apply(&mut self, intent: Intent, _now: u64, _rng: &mut GameRng) -> Result<(), GameError> {
        if self.over {
            return Err(GameError::GameAlreadyComplete);
        }
        match intent {
            Intent::Steer(direction) if direction != self.heading.opposite() => {
                self.pending = Some(direction);
            }
            Intent::Pause => self.paused = !self.paused,
            _ => {}
        }
        Ok(())
    }

    fn tick(&mut self, _now: u64, rng: &mut GameRng) -> Result<(), GameError> {
        if self.over {
            return Err(GameError::GameAlreadyComplete);
        }
        if self.paused {
            return Ok(());
        }
        if let Some(direction) = self.pending.take() {
            self.heading = direction;
        }

        let head = self.head().step(self.heading);
        if !head.in_bounds() || self.body.iter().skip(1).any(|cell| *cell == head) {
            self.over = true;
            return Ok(());
        }

        self.body.push_front(head);
        if head == self.food {
            self.score += SNAKE_POINTS_PER_FOOD;
            if !self.place_food(rng) {
                // Board is full
                self.over = true;
            }
        } else {
            self.body.pop_back();
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
