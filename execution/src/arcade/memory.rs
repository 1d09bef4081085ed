//! Memory Match.
//!
//! Sixteen face-down cards hold eight pairs. Turning over a second card
//! resolves the pair and costs one move; a mismatch stays visible for
//! [MEMORY_REVEAL_MS] before flipping back.

use super::{GameError, GameRng, Simulation};
use serde::Serialize;
use winfinity_types::arcade::{Intent, MEMORY_MOVES, MEMORY_PAIRS, MEMORY_REVEAL_MS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Card {
    pub value: u8,
    pub face_up: bool,
    pub matched: bool,
}

/// Mismatched pair waiting to flip back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
struct Revert {
    at: u64,
    cards: [usize; 2],
}

#[derive(Clone, Debug, Serialize)]
pub struct MemoryMatch {
    cards: Vec<Card>,
    /// Face-up card waiting for its partner
    selected: Option<usize>,
    reverts: Vec<Revert>,
    moves_left: u32,
    matched_pairs: u32,
}

impl MemoryMatch {
    pub fn new(rng: &mut GameRng) -> Self {
        let mut values: Vec<u8> = (0..MEMORY_PAIRS as u8).flat_map(|v| [v, v]).collect();
        rng.shuffle(&mut values);
        Self::with_values(values)
    }

    fn with_values(values: Vec<u8>) -> Self {
        Self {
            cards: values
                .into_iter()
                .map(|value| Card {
                    value,
                    face_up: false,
                    matched: false,
                })
                .collect(),
            selected: None,
            reverts: Vec::new(),
            moves_left: MEMORY_MOVES,
            matched_pairs: 0,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    /// Card currently waiting for its partner.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_won(&self) -> bool {
        self.matched_pairs as usize == MEMORY_PAIRS
    }

    fn flip(&mut self, index: usize, now: u64) -> Result<(), GameError> {
        if self.moves_left == 0 {
            return Err(GameError::InvalidMove);
        }
        let card = self.cards.get_mut(index).ok_or(GameError::InvalidMove)?;
        if card.face_up || card.matched {
            return Err(GameError::InvalidMove);
        }
        card.face_up = true;

        let Some(first) = self.selected.take() else {
            self.selected = Some(index);
            return Ok(());
        };
        if self.cards[first].value == self.cards[index].value {
            self.cards[first].matched = true;
            self.cards[index].matched = true;
            self.matched_pairs += 1;
        } else {
            self.reverts.push(Revert {
                at: now.saturating_add(MEMORY_REVEAL_MS),
                cards: [first, index],
            });
        }
        self.moves_left -= 1;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn force_over(&mut self, score: u32) {
        self.matched_pairs = score;
        self.moves_left = 0;
    }
}

impl Simulation for MemoryMatch {
    fn apply(&mut self, intent: Intent, now: u64, _rng: &mut GameRng) -> Result<(), GameError> {
        if self.is_terminal() {
            return Err(GameError::GameAlreadyComplete);
        }
        match intent {
            Intent::Flip(index) => self.flip(index, now),
            _ => Ok(()),
        }
    }

    fn tick(&mut self, now: u64, _rng: &mut GameRng) -> Result<(), GameError> {
        let cards = &mut self.cards;
        self.reverts.retain(|revert| {
            if revert.at > now {
                return true;
            }
            for index in revert.cards {
                if let Some(card) = cards.get_mut(index) {
                    card.face_up = false;
                }
            }
            false
        });
        Ok(())
    }

    /// Over once every pair is found, even with moves to spare, or when the
    /// budget runs out with pairs remaining.
    fn is_terminal(&self) -> bool {
        self.is_won() || self.moves_left == 0
    }

    fn score(&self) -> u32 {
        self.matched_pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_rng;

    /// Cards laid out as 0,0,1,1,...,7,7
    fn ordered() -> MemoryMatch {
        MemoryMatch::with_values((0..MEMORY_PAIRS as u8).flat_map(|v| [v, v]).collect())
    }

    fn flip(game: &mut MemoryMatch, index: usize, now: u64) -> Result<(), GameError> {
        let mut rng = create_rng(0);
        game.apply(Intent::Flip(index), now, &mut rng)
    }

    #[test]
    fn test_deck_has_pairs() {
        let mut rng = create_rng(1);
        let game = MemoryMatch::new(&mut rng);
        assert_eq!(game.cards().len(), 16);
        let mut counts = [0u8; MEMORY_PAIRS];
        for card in game.cards() {
            counts[card.value as usize] += 1;
            assert!(!card.face_up && !card.matched);
        }
        assert!(counts.iter().all(|count| *count == 2));
        assert_eq!(game.moves_left(), 10);
    }

    #[test]
    fn test_match_consumes_move() {
        let mut game = ordered();
        flip(&mut game, 0, 0).unwrap();
        assert_eq!(game.moves_left(), 10);
        assert_eq!(game.selected(), Some(0));
        flip(&mut game, 1, 0).unwrap();
        assert_eq!(game.moves_left(), 9);
        assert_eq!(game.matched_pairs(), 1);
        assert!(game.cards()[0].matched && game.cards()[1].matched);
    }

    #[test]
    fn test_mismatch_flips_back_after_delay() {
        let mut rng = create_rng(2);
        let mut game = ordered();
        flip(&mut game, 0, 100).unwrap();
        flip(&mut game, 2, 100).unwrap();
        assert_eq!(game.moves_left(), 9);
        assert_eq!(game.matched_pairs(), 0);

        game.tick(1_099, &mut rng).unwrap();
        assert!(game.cards()[0].face_up && game.cards()[2].face_up);
        // Still face up, so not selectable
        assert_eq!(flip(&mut game, 0, 1_099), Err(GameError::InvalidMove));

        game.tick(1_100, &mut rng).unwrap();
        assert!(!game.cards()[0].face_up && !game.cards()[2].face_up);
        flip(&mut game, 0, 1_200).unwrap();
    }

    #[test]
    fn test_other_cards_flip_during_reveal() {
        let mut game = ordered();
        flip(&mut game, 0, 0).unwrap();
        flip(&mut game, 2, 0).unwrap();
        flip(&mut game, 4, 10).unwrap();
        flip(&mut game, 5, 10).unwrap();
        assert_eq!(game.matched_pairs(), 1);
        assert_eq!(game.moves_left(), 8);
    }

    #[test]
    fn test_invalid_flips_are_rejected() {
        let mut game = ordered();
        assert_eq!(flip(&mut game, 16, 0), Err(GameError::InvalidMove));
        flip(&mut game, 0, 0).unwrap();
        assert_eq!(flip(&mut game, 0, 0), Err(GameError::InvalidMove));
        flip(&mut game, 1, 0).unwrap();
        assert_eq!(flip(&mut game, 1, 0), Err(GameError::InvalidMove));
        assert_eq!(game.moves_left(), 9);
        assert!(!game.is_terminal());
    }

    #[test]
    fn test_budget_exhausted_ends_round() {
        let mut rng = create_rng(3);
        let mut game = ordered();
        let mut now = 0;
        let mut previous = game.moves_left();
        // Always pick a mismatching pair
        while !game.is_terminal() {
            flip(&mut game, 0, now).unwrap();
            flip(&mut game, 2, now).unwrap();
            assert_eq!(game.moves_left(), previous - 1);
            previous = game.moves_left();
            now += MEMORY_REVEAL_MS;
            game.tick(now, &mut rng).unwrap();
        }
        assert_eq!(game.moves_left(), 0);
        assert_eq!(game.score(), 0);
        assert!(!game.is_won());
        assert_eq!(
            flip(&mut game, 4, now),
            Err(GameError::GameAlreadyComplete)
        );
    }

    #[test]
    fn test_all_pairs_win() {
        let mut game = ordered();
        for pair in 0..MEMORY_PAIRS {
            flip(&mut game, pair * 2, 0).unwrap();
            flip(&mut game, pair * 2 + 1, 0).unwrap();
        }
        assert!(game.is_won());
        assert!(game.is_terminal());
        assert_eq!(game.score(), 8);
        assert_eq!(game.moves_left(), 2);

        // Moves left over cannot be spent after the win
        assert!(matches!(
            game.apply(Intent::Flip(0), 0, &mut create_rng(0)),
            Err(GameError::GameAlreadyComplete)
        ));
    }
}
