//! Autopilot controllers that play rounds without a human.

use std::collections::HashMap;
use winfinity_execution::{
    arcade::{
        flappy::{FlappyBird, BIRD_X},
        memory::MemoryMatch,
        snake::Snake,
        GameState,
    },
    scheduler::Controller,
};
use winfinity_types::arcade::{
    Direction, GameType, Intent, FLAPPY_BIRD_SIZE, FLAPPY_GAP_HEIGHT, FLAPPY_HEIGHT,
    FLAPPY_PIPE_WIDTH,
};

/// Controller for a given game.
pub enum Pilot {
    Snake,
    Flappy,
    Memory(MemoryPilot),
    Plinko,
}

impl Pilot {
    pub fn for_game(game: GameType) -> Self {
        match game {
            GameType::Snake => Pilot::Snake,
            GameType::FlappyBird => Pilot::Flappy,
            GameType::Memory => Pilot::Memory(MemoryPilot::default()),
            GameType::Plinko => Pilot::Plinko,
        }
    }

    /// Forget anything learned during the previous round.
    pub fn reset(&mut self) {
        if let Pilot::Memory(pilot) = self {
            *pilot = MemoryPilot::default();
        }
    }
}

impl Controller for Pilot {
    fn poll(&mut self, state: &GameState, _now: u64) -> Vec<Intent> {
        match (self, state) {
            (Pilot::Snake, GameState::Snake(snake)) => steer_snake(snake).into_iter().collect(),
            (Pilot::Flappy, GameState::FlappyBird(bird)) => flap(bird).into_iter().collect(),
            (Pilot::Memory(pilot), GameState::Memory(game)) => {
                pilot.next_flip(game).into_iter().collect()
            }
            (Pilot::Plinko, GameState::Plinko(board)) if !board.is_dropped() => vec![Intent::Drop],
            _ => Vec::new(),
        }
    }
}

/// Head for the food along the longer axis, avoiding walls and the body.
fn steer_snake(snake: &Snake) -> Option<Intent> {
    let head = snake.head();
    let food = snake.food();
    let heading = snake.heading();
    let safe = |direction: Direction| {
        let next = head.step(direction);
        next.in_bounds() && snake.body().skip(1).all(|cell| cell != next)
    };

    let mut preferred = Vec::with_capacity(4);
    let (dx, dy) = (food.x - head.x, food.y - head.y);
    let horizontal = if dx > 0 { Direction::Right } else { Direction::Left };
    let vertical = if dy > 0 { Direction::Down } else { Direction::Up };
    if dx.abs() >= dy.abs() {
        if dx != 0 {
            preferred.push(horizontal);
        }
        if dy != 0 {
            preferred.push(vertical);
        }
    } else {
        preferred.push(vertical);
        if dx != 0 {
            preferred.push(horizontal);
        }
    }
    preferred.extend([
        heading,
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ]);

    let choice = preferred
        .into_iter()
        .find(|direction| *direction != heading.opposite() && safe(*direction))?;
    (choice != heading).then_some(Intent::Steer(choice))
}

/// Keep the bird just below the middle of the next gap.
fn flap(bird: &FlappyBird) -> Option<Intent> {
    if !bird.is_launched() {
        return Some(Intent::Jump);
    }
    let gap_centre = bird
        .pipes()
        .iter()
        .find(|pipe| pipe.x + FLAPPY_PIPE_WIDTH >= BIRD_X - FLAPPY_BIRD_SIZE / 2.0)
        .map(|pipe| pipe.gap_top + FLAPPY_GAP_HEIGHT / 2.0)
        .unwrap_or(FLAPPY_HEIGHT / 2.0);
    let aim = gap_centre + FLAPPY_GAP_HEIGHT / 5.0;
    (bird.y() > aim && bird.velocity() >= 0.0).then_some(Intent::Jump)
}

/// Flips one card per poll and remembers every value it has seen.
#[derive(Default)]
pub struct MemoryPilot {
    seen: HashMap<usize, u8>,
}

impl MemoryPilot {
    fn next_flip(&mut self, game: &MemoryMatch) -> Option<Intent> {
        let cards = game.cards();
        for (index, card) in cards.iter().enumerate() {
            if card.face_up || card.matched {
                self.seen.insert(index, card.value);
            }
        }
        let available =
            |index: usize| cards.get(index).is_some_and(|card| !card.face_up && !card.matched);

        if let Some(first) = game.selected() {
            let value = cards.get(first)?.value;
            // Known partner, else any card not seen yet, else anything
            let partner = self
                .seen
                .iter()
                .find(|(index, v)| **index != first && **v == value && available(**index))
                .map(|(index, _)| *index);
            let choice = partner
                .or_else(|| (0..cards.len()).find(|i| available(*i) && !self.seen.contains_key(i)))
                .or_else(|| (0..cards.len()).find(|i| available(*i)))?;
            return Some(Intent::Flip(choice));
        }

        // Start with a known pair if there is one
        for (a, va) in &self.seen {
            if !available(*a) {
                continue;
            }
            let known_pair = self
                .seen
                .iter()
                .any(|(b, vb)| b != a && vb == va && available(*b));
            if known_pair {
                return Some(Intent::Flip(*a));
            }
        }
        (0..cards.len())
            .find(|i| available(*i) && !self.seen.contains_key(i))
            .or_else(|| (0..cards.len()).find(|i| available(*i)))
            .map(Intent::Flip)
    }
}
