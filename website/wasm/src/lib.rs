use js_sys::{Array, Function, Promise, Reflect};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use tracing::warn;
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::Storage;
use winfinity_execution::{
    arcade::GameRng,
    cabinet::Round,
    economy::{check_deposit, staking_failed, Readings},
    Cabinet, Economy, Error, Staking, StakingError, State,
};
use winfinity_types::arcade::{
    intent_for_key, swipe_intent, Amount, GameType, Intent, Key, NoticeKind, Phase,
    StakingSnapshot, Wallet,
};

/// Route panics and `tracing` events to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    console_log::init_with_level(log::Level::Info).ok();
}

/// Helper to convert a serializable value to a plain JavaScript object
fn to_object<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize: {e}")))
}

/// Error shown to the player.
#[derive(Debug, PartialEq, Serialize)]
struct Notice {
    kind: NoticeKind,
    message: String,
}

impl From<&Error> for Notice {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

fn notice(error: Error) -> JsValue {
    to_object(&Notice::from(&error)).unwrap_or_else(|e| e)
}

fn invalid(message: String) -> JsValue {
    to_object(&Notice {
        kind: NoticeKind::InvalidAction,
        message,
    })
    .unwrap_or_else(|e| e)
}

/// Timestamps from `performance.now()` or `Date.now()`.
fn millis(now: f64) -> u64 {
    if now.is_finite() && now > 0.0 {
        now as u64
    } else {
        0
    }
}

fn parse_amount(value: f64) -> Result<Amount, JsValue> {
    Amount::from_f64(value).map_err(|_| notice(Error::InvalidAmount))
}

/// Best-effort text of a thrown JS value.
fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Wallet storage in `window.localStorage`.
///
/// Falls back to memory when storage is missing or throws (private browsing,
/// quota), so the session keeps working without persistence.
pub struct LocalStore {
    storage: Option<Storage>,
    fallback: HashMap<Key, String>,
}

impl LocalStore {
    pub fn open() -> Self {
        match web_sys::window().and_then(|window| window.local_storage().ok().flatten()) {
            Some(storage) => Self {
                storage: Some(storage),
                fallback: HashMap::new(),
            },
            None => Self::detached(),
        }
    }

    /// Store kept only in memory.
    fn detached() -> Self {
        warn!("localStorage unavailable, wallet will not persist");
        Self {
            storage: None,
            fallback: HashMap::new(),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }
}

impl State for LocalStore {
    fn get(&self, key: Key) -> Option<String> {
        if let Some(storage) = &self.storage {
            match storage.get_item(key.as_str()) {
                Ok(value) => return value,
                Err(e) => warn!(key = key.as_str(), error = %describe(&e), "failed to read"),
            }
        }
        self.fallback.get(&key).cloned()
    }

    fn insert(&mut self, key: Key, value: String) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.set_item(key.as_str(), &value) {
                warn!(key = key.as_str(), error = %describe(&e), "failed to write");
            }
        }
        self.fallback.insert(key, value);
    }

    fn delete(&mut self, key: Key) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.remove_item(key.as_str()) {
                warn!(key = key.as_str(), error = %describe(&e), "failed to delete");
            }
        }
        self.fallback.remove(&key);
    }
}

/// Staking contract reached through a JS object whose methods return
/// promises: `stake(amount)`, `unstake(amount)`, `claim()`,
/// `currentStake()`, `currentYield()` and `currentRewardPerToken()`.
/// Amounts cross the boundary as numbers in whole units.
#[derive(Clone)]
pub struct JsStaking {
    contract: JsValue,
}

impl JsStaking {
    async fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue, StakingError> {
        let function = Reflect::get(&self.contract, &JsValue::from_str(method))
            .map_err(|e| StakingError::Unavailable(describe(&e)))?
            .dyn_into::<Function>()
            .map_err(|_| StakingError::Unavailable(format!("{method} is not a function")))?;
        let args: Array = args.iter().collect();
        let returned = function
            .apply(&self.contract, &args)
            .map_err(|e| StakingError::Rejected(describe(&e)))?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| StakingError::Rejected(describe(&e)))
    }

    async fn read(&self, method: &str) -> Result<Amount, StakingError> {
        let value = self.call(method, &[]).await?;
        value
            .as_f64()
            .and_then(|units| Amount::from_f64(units).ok())
            .ok_or_else(|| StakingError::Unavailable(format!("{method} returned {value:?}")))
    }
}

impl Staking for JsStaking {
    async fn stake(&mut self, amount: Amount) -> Result<(), StakingError> {
        self.call("stake", &[JsValue::from_f64(amount.to_f64())])
            .await
            .map(|_| ())
    }

    async fn unstake(&mut self, amount: Amount) -> Result<(), StakingError> {
        self.call("unstake", &[JsValue::from_f64(amount.to_f64())])
            .await
            .map(|_| ())
    }

    async fn claim(&mut self) -> Result<(), StakingError> {
        self.call("claim", &[]).await.map(|_| ())
    }

    async fn current_stake(&self) -> Result<Amount, StakingError> {
        self.read("currentStake").await
    }

    async fn current_yield(&self) -> Result<Amount, StakingError> {
        self.read("currentYield").await
    }

    async fn current_reward_per_token(&self) -> Result<Amount, StakingError> {
        self.read("currentRewardPerToken").await
    }
}

struct Inner {
    economy: Economy<LocalStore>,
    cabinets: HashMap<GameType, Cabinet>,
}

impl Inner {
    fn cabinet(&mut self, game: &str) -> Result<(&mut Cabinet, &mut Economy<LocalStore>), JsValue> {
        let game: GameType = game.parse().map_err(|e| invalid(format!("{e}")))?;
        let cabinet = self
            .cabinets
            .get_mut(&game)
            .ok_or_else(|| invalid(format!("no cabinet for {game}")))?;
        Ok((cabinet, &mut self.economy))
    }
}

/// View of one cabinet for rendering.
#[derive(Serialize)]
struct CabinetView<'a> {
    game: GameType,
    phase: Phase,
    cost: Amount,
    target: u32,
    rounds: u32,
    round: Option<&'a Round>,
    wallet: Wallet,
    staking: StakingSnapshot,
}

/// The arcade floor: one cabinet per game sharing a single wallet.
#[wasm_bindgen]
pub struct Arcade {
    inner: Rc<RefCell<Inner>>,
    staking: JsStaking,
}

#[wasm_bindgen]
impl Arcade {
    /// Open the arcade with a staking contract object and an optional seed.
    #[wasm_bindgen(constructor)]
    pub fn new(staking: JsValue, seed: Option<f64>) -> Arcade {
        let seed = seed.map(|s| s as u64).unwrap_or_else(|| OsRng.next_u64());
        let mut rng = GameRng::new(seed);
        let cabinets = GameType::ALL
            .iter()
            .map(|game| (*game, Cabinet::new(*game, rng.fork())))
            .collect();
        Arcade {
            inner: Rc::new(RefCell::new(Inner {
                economy: Economy::new(LocalStore::open()),
                cabinets,
            })),
            staking: JsStaking { contract: staking },
        }
    }

    /// Whether the wallet survives a reload. False when `localStorage` is
    /// missing or blocked.
    #[wasm_bindgen(getter)]
    pub fn persistent(&self) -> bool {
        self.inner.borrow().economy.state().is_persistent()
    }

    /// Current deposit and stake.
    #[wasm_bindgen]
    pub fn wallet(&self) -> Result<JsValue, JsValue> {
        to_object(&self.inner.borrow().economy.wallet())
    }

    #[wasm_bindgen]
    pub fn phase(&self, game: &str) -> Result<JsValue, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let (cabinet, economy) = inner.cabinet(game)?;
        to_object(&cabinet.phase(economy))
    }

    /// Everything needed to draw a cabinet, including the running round.
    #[wasm_bindgen]
    pub fn snapshot(&self, game: &str) -> Result<JsValue, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let (cabinet, economy) = inner.cabinet(game)?;
        to_object(&CabinetView {
            game: cabinet.game(),
            phase: cabinet.phase(economy),
            cost: cabinet.cost(),
            target: cabinet.target(),
            rounds: cabinet.rounds(),
            round: cabinet.round(),
            wallet: economy.wallet(),
            staking: economy.snapshot(),
        })
    }

    #[wasm_bindgen(js_name = requestPlay)]
    pub fn request_play(&self, game: &str) -> Result<JsValue, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let (cabinet, economy) = inner.cabinet(game)?;
        to_object(&cabinet.request_play(economy).map_err(notice)?)
    }

    #[wasm_bindgen(js_name = cancelPlay)]
    pub fn cancel_play(&self, game: &str) -> Result<JsValue, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let (cabinet, _) = inner.cabinet(game)?;
        to_object(&cabinet.cancel_play().map_err(notice)?)
    }

    /// Pay and start a round (also "play again" after a round ends).
    #[wasm_bindgen(js_name = confirmPlay)]
    pub fn confirm_play(&self, game: &str, now: f64) -> Result<JsValue, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let (cabinet, economy) = inner.cabinet(game)?;
        to_object(&cabinet.confirm_play(economy, millis(now)).map_err(notice)?)
    }

    #[wasm_bindgen]
    pub fn decline(&self, game: &str) -> Result<JsValue, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let (cabinet, economy) = inner.cabinet(game)?;
        to_object(&cabinet.decline(economy).map_err(notice)?)
    }

    /// Keyboard input by `KeyboardEvent.key`. Unmapped keys are ignored.
    #[wasm_bindgen]
    pub fn key(&self, game: &str, key: &str, now: f64) -> Result<JsValue, JsValue> {
        match intent_for_key(key) {
            Some(intent) => self.input(game, intent, now),
            None => Ok(JsValue::NULL),
        }
    }

    /// Touch swipe by its displacement in pixels.
    #[wasm_bindgen]
    pub fn swipe(&self, game: &str, dx: f64, dy: f64, now: f64) -> Result<JsValue, JsValue> {
        match swipe_intent(dx, dy) {
            Some(intent) => self.input(game, intent, now),
            None => Ok(JsValue::NULL),
        }
    }

    /// Click or tap anywhere on the board.
    #[wasm_bindgen]
    pub fn tap(&self, game: &str, now: f64) -> Result<JsValue, JsValue> {
        self.input(game, Intent::Jump, now)
    }

    #[wasm_bindgen]
    pub fn flip(&self, game: &str, index: usize, now: f64) -> Result<JsValue, JsValue> {
        self.input(game, Intent::Flip(index), now)
    }

    #[wasm_bindgen]
    pub fn drop(&self, game: &str, now: f64) -> Result<JsValue, JsValue> {
        self.input(game, Intent::Drop, now)
    }

    /// Advance the running round. Returns the round-end event or `null`.
    #[wasm_bindgen]
    pub fn tick(&self, game: &str, now: f64) -> Result<JsValue, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let (cabinet, economy) = inner.cabinet(game)?;
        match cabinet.tick(economy, millis(now)).map_err(notice)? {
            Some(event) => to_object(&event),
            None => Ok(JsValue::NULL),
        }
    }

    /// Stake `amount` and add it to the deposit once the contract accepts.
    #[wasm_bindgen]
    pub fn deposit(&self, amount: f64) -> Promise {
        let inner = self.inner.clone();
        let mut staking = self.staking.clone();
        future_to_promise(async move {
            let amount = parse_amount(amount)?;
            check_deposit(amount).map_err(notice)?;
            staking
                .stake(amount)
                .await
                .map_err(|e| notice(staking_failed("stake", e)))?;
            let event = inner.borrow_mut().economy.record_deposit(amount);
            to_object(&event)
        })
    }

    #[wasm_bindgen]
    pub fn unstake(&self, amount: f64) -> Promise {
        let inner = self.inner.clone();
        let mut staking = self.staking.clone();
        future_to_promise(async move {
            let amount = parse_amount(amount)?;
            inner
                .borrow()
                .economy
                .check_unstake(amount)
                .map_err(notice)?;
            staking
                .unstake(amount)
                .await
                .map_err(|e| notice(staking_failed("unstake", e)))?;
            let event = inner.borrow_mut().economy.record_unstake(amount);
            to_object(&event)
        })
    }

    #[wasm_bindgen]
    pub fn claim(&self) -> Promise {
        let inner = self.inner.clone();
        let mut staking = self.staking.clone();
        future_to_promise(async move {
            staking
                .claim()
                .await
                .map_err(|e| notice(staking_failed("claim", e)))?;
            let event = inner.borrow_mut().economy.record_claim();
            to_object(&event)
        })
    }

    /// Read stake, yield and reward rate back from the contract.
    #[wasm_bindgen]
    pub fn refresh(&self) -> Promise {
        let inner = self.inner.clone();
        let staking = self.staking.clone();
        future_to_promise(async move {
            let readings = Readings::read(&staking).await;
            let snapshot = inner.borrow_mut().economy.record_refresh(readings);
            to_object(&snapshot)
        })
    }
}

impl Arcade {
    fn input(&self, game: &str, intent: Intent, now: f64) -> Result<JsValue, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let (cabinet, economy) = inner.cabinet(game)?;
        match cabinet.input(economy, intent, millis(now)).map_err(notice)? {
            Some(event) => to_object(&event),
            None => Ok(JsValue::NULL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Captures records forwarded from `tracing` to the `log` facade.
    struct Capture(Mutex<Vec<String>>);

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = self.0.lock() {
                records.push(format!("{} {}", record.level(), record.args()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    #[test]
    fn test_detached_store_is_reported() {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(log::LevelFilter::Trace);

        let mut store = LocalStore::detached();
        assert!(!store.is_persistent());
        let records = CAPTURE.0.lock().unwrap().clone();
        assert!(records
            .iter()
            .any(|r| r.starts_with("WARN") && r.contains("localStorage unavailable")));

        // Still usable for the session
        store.insert(Key::Deposit, "12.5".to_string());
        assert_eq!(store.get(Key::Deposit).as_deref(), Some("12.5"));
        store.delete(Key::Deposit);
        assert_eq!(store.get(Key::Deposit), None);
    }

    #[test]
    fn test_millis() {
        assert_eq!(millis(1234.7), 1234);
        assert_eq!(millis(-5.0), 0);
        assert_eq!(millis(f64::NAN), 0);
        assert_eq!(millis(f64::INFINITY), 0);
    }

    #[test]
    fn test_notice_from_error() {
        let error = Error::InsufficientFunds {
            have: Amount::from_units(5),
            need: Amount::from_units(10),
        };
        assert_eq!(
            Notice::from(&error),
            Notice {
                kind: NoticeKind::InsufficientFunds,
                message: "not enough deposit to play: have 5.00, need 10.00".to_string(),
            }
        );
        let error = Error::from(StakingError::Rejected("user denied".to_string()));
        assert_eq!(Notice::from(&error).kind, NoticeKind::ExternalCall);
    }
}
