use super::*;
use proptest::prelude::*;

#[test]
fn test_game_type_roundtrip() {
    for game_type in GameType::ALL {
        assert_eq!(game_type.name().parse::<GameType>().unwrap(), game_type);

        let json = serde_json::to_string(&game_type).unwrap();
        let decoded: GameType = serde_json::from_str(&json).unwrap();
        assert_eq!(game_type, decoded);
    }
    assert_eq!(
        "pong".parse::<GameType>(),
        Err(GameTypeError::Unknown("pong".to_string()))
    );
    assert_eq!("Flappy".parse::<GameType>().unwrap(), GameType::FlappyBird);
}

#[test]
fn test_catalogue() {
    assert_eq!(GameType::Snake.cost(), Amount::from_units(10));
    assert_eq!(GameType::FlappyBird.cost(), Amount::from_units(20));
    assert_eq!(GameType::Memory.cost(), Amount::from_units(40));
    assert_eq!(GameType::Plinko.cost(), Amount::from_units(10));

    let snake = GameType::Snake.policy();
    assert_eq!(snake.rate, Amount::from_cents(10));
    assert_eq!(snake.bonus, Amount::from_units(10));
    assert_eq!(GameType::FlappyBird.policy().bonus, Amount::ZERO);
    assert!(GameType::Memory.policy().rate.is_zero());
}

#[test]
fn test_amount_from_f64() {
    assert_eq!(Amount::from_f64(1.5).unwrap(), Amount::from_cents(150));
    assert_eq!(Amount::from_f64(0.0).unwrap(), Amount::ZERO);
    // 0.1 + 0.2 is not exactly 0.3 in binary
    assert_eq!(Amount::from_f64(0.1 + 0.2).unwrap(), Amount::from_cents(30));
    assert_eq!(Amount::from_f64(-1.0), Err(AmountError::Negative(-1.0)));
    assert!(matches!(
        Amount::from_f64(f64::NAN),
        Err(AmountError::NotFinite(_))
    ));
    assert!(matches!(
        Amount::from_f64(f64::INFINITY),
        Err(AmountError::NotFinite(_))
    ));
    assert!(matches!(
        Amount::from_f64(1e30),
        Err(AmountError::Overflow(_))
    ));
}

#[test]
fn test_amount_arithmetic() {
    let ten = Amount::from_units(10);
    assert_eq!(ten.checked_sub(Amount::from_units(11)), None);
    assert_eq!(ten.saturating_sub(Amount::from_units(11)), Amount::ZERO);
    assert_eq!(Amount::from_cents(50) * 3, Amount::from_cents(150));
    assert_eq!(Amount::from_cents(150).to_string(), "1.50");
    assert_eq!(Amount::from_units(11).to_string(), "11.00");
}

#[test]
fn test_amount_json() {
    assert_eq!(serde_json::to_string(&Amount::from_cents(150)).unwrap(), "1.5");
    assert_eq!(serde_json::to_string(&Amount::from_units(20)).unwrap(), "20.0");
    let parsed: Amount = serde_json::from_str("20").unwrap();
    assert_eq!(parsed, Amount::from_units(20));
    assert!(serde_json::from_str::<Amount>("-3").is_err());
    assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
}

#[test]
fn test_wallet_json() {
    let wallet = Wallet {
        deposit: Amount::from_cents(150),
        stake: Amount::from_units(100),
    };
    let json = serde_json::to_string(&wallet).unwrap();
    let decoded: Wallet = serde_json::from_str(&json).unwrap();
    assert_eq!(wallet, decoded);
    assert_eq!(Key::Deposit.as_str(), "deposit");
    assert_eq!(Key::Stake.as_str(), "stake");
}

#[test]
fn test_event_json() {
    let event = Event::RoundEnded {
        game: GameType::FlappyBird,
        score: 18,
        target: 15,
        reward: Amount::from_cents(150),
        deposit: Amount::from_cents(150),
    };
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["type"], "round_ended");
    assert_eq!(value["game"], "flappy_bird");
    assert_eq!(value["reward"], 1.5);
    let decoded: Event = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, event);
}

#[test]
fn test_key_intents() {
    assert_eq!(
        intent_for_key("ArrowLeft"),
        Some(Intent::Steer(Direction::Left))
    );
    assert_eq!(intent_for_key(" "), Some(Intent::Jump));
    assert_eq!(intent_for_key("Space"), Some(Intent::Jump));
    assert_eq!(intent_for_key("Escape"), Some(Intent::Pause));
    assert_eq!(intent_for_key("KeyA"), None);
}

#[test]
fn test_swipe_intents() {
    assert_eq!(swipe_intent(31.0, 5.0), Some(Intent::Steer(Direction::Right)));
    assert_eq!(swipe_intent(-50.0, 40.0), Some(Intent::Steer(Direction::Left)));
    assert_eq!(swipe_intent(3.0, -45.0), Some(Intent::Steer(Direction::Up)));
    assert_eq!(swipe_intent(0.0, 80.0), Some(Intent::Steer(Direction::Down)));
    // Dominant axis below threshold
    assert_eq!(swipe_intent(30.0, 2.0), None);
    assert_eq!(swipe_intent(10.0, 12.0), None);
    assert_eq!(swipe_intent(f64::NAN, 100.0), None);
}

#[test]
fn test_direction_opposite() {
    for direction in [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ] {
        assert_eq!(direction.opposite().opposite(), direction);
        let (dx, dy) = direction.delta();
        let (ox, oy) = direction.opposite().delta();
        assert_eq!((dx + ox, dy + oy), (0, 0));
    }
}

proptest! {
    #[test]
    fn amount_units_roundtrip(cents in 0u64..1_000_000_000) {
        let amount = Amount::from_cents(cents);
        prop_assert_eq!(Amount::from_f64(amount.to_f64()).unwrap(), amount);
    }

    #[test]
    fn amount_sub_never_underflows(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let (a, b) = (Amount::from_cents(a), Amount::from_cents(b));
        match a.checked_sub(b) {
            Some(rest) => prop_assert_eq!(rest.checked_add(b), Some(a)),
            None => prop_assert!(a < b),
        }
    }
}
