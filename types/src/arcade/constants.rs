use super::Amount;

/// Lowest target score a cabinet can draw (inclusive)
pub const TARGET_SCORE_MIN: u32 = 15;

/// Highest target score a cabinet can draw (inclusive)
pub const TARGET_SCORE_MAX: u32 = 30;

/// Deposit amounts offered by the deposit dialog
pub const DEPOSIT_PRESETS: [Amount; 3] = [
    Amount::from_units(100),
    Amount::from_units(150),
    Amount::from_units(200),
];

/// Storage key holding the JSON-encoded deposit
pub const DEPOSIT_KEY: &str = "deposit";

/// Storage key holding the JSON-encoded stake
pub const STAKE_KEY: &str = "stake";

// Snake

pub const SNAKE_COST: Amount = Amount::from_units(10);
pub const SNAKE_REWARD_RATE: Amount = Amount::from_cents(10);
/// Flat bonus added to any non-zero Snake reward
pub const SNAKE_REWARD_BONUS: Amount = Amount::from_units(10);
pub const SNAKE_GRID_SIZE: i32 = 20;
pub const SNAKE_POINTS_PER_FOOD: u32 = 2;
/// Milliseconds between Snake moves
pub const SNAKE_TICK_MS: u64 = 200;

// Flappy Bird

pub const FLAPPY_COST: Amount = Amount::from_units(20);
pub const FLAPPY_REWARD_RATE: Amount = Amount::from_cents(50);
pub const FLAPPY_WIDTH: f64 = 400.0;
pub const FLAPPY_HEIGHT: f64 = 600.0;
pub const FLAPPY_BIRD_SIZE: f64 = 30.0;
pub const FLAPPY_GAP_HEIGHT: f64 = 200.0;
pub const FLAPPY_PIPE_WIDTH: f64 = 60.0;
pub const FLAPPY_PIPE_SPEED: f64 = 1.2;
pub const FLAPPY_GRAVITY: f64 = 0.5;
pub const FLAPPY_JUMP_VELOCITY: f64 = -9.0;
/// Lowest allowed top edge of a gap
pub const FLAPPY_GAP_TOP_MIN: f64 = 100.0;
/// Width of the range a gap's top edge is drawn from
pub const FLAPPY_GAP_TOP_SPREAD: f64 = FLAPPY_HEIGHT - FLAPPY_GAP_HEIGHT - 200.0;
pub const FLAPPY_MAX_PIPES: usize = 3;
/// Fraction of the width the latest pipe must cross before another spawns
pub const FLAPPY_SPAWN_FRACTION: f64 = 0.6;

// Memory

pub const MEMORY_COST: Amount = Amount::from_units(40);
pub const MEMORY_REWARD_RATE: Amount = Amount::ZERO;
pub const MEMORY_PAIRS: usize = 8;
pub const MEMORY_MOVES: u32 = 10;
/// Milliseconds a mismatched pair stays face up
pub const MEMORY_REVEAL_MS: u64 = 1_000;

// Plinko

pub const PLINKO_COST: Amount = Amount::from_units(10);
pub const PLINKO_REWARD_RATE: Amount = Amount::from_cents(10);
pub const PLINKO_MIN_LINES: u8 = 8;
pub const PLINKO_MAX_LINES: u8 = 16;
pub const PLINKO_DEFAULT_LINES: u8 = 16;

/// Minimum swipe distance (in pixels) recognized as a direction change
pub const SWIPE_THRESHOLD: f64 = 30.0;
