use std::collections::HashMap;
use tracing::warn;
use winfinity_types::arcade::{Amount, Key, Wallet};

/// Storage port for values that outlive a session.
///
/// Values are JSON strings so a browser's `localStorage` can back the trait
/// directly.
pub trait State {
    fn get(&self, key: Key) -> Option<String>;
    fn insert(&mut self, key: Key, value: String);
    fn delete(&mut self, key: Key);

    fn apply(&mut self, changes: Vec<(Key, Status)>) {
        for (key, status) in changes {
            match status {
                Status::Update(value) => self.insert(key, value),
                Status::Delete => self.delete(key),
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Memory {
    state: HashMap<Key, String>,
}

impl State for Memory {
    fn get(&self, key: Key) -> Option<String> {
        self.state.get(&key).cloned()
    }

    fn insert(&mut self, key: Key, value: String) {
        self.state.insert(key, value);
    }

    fn delete(&mut self, key: Key) {
        self.state.remove(&key);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Update(String),
    Delete,
}

/// Load the wallet, treating missing or unreadable values as zero.
pub fn load_wallet<S: State>(state: &S) -> Wallet {
    Wallet {
        deposit: load_amount(state, Key::Deposit),
        stake: load_amount(state, Key::Stake),
    }
}

fn load_amount<S: State>(state: &S, key: Key) -> Amount {
    let Some(raw) = state.get(key) else {
        return Amount::ZERO;
    };
    match serde_json::from_str::<Amount>(&raw) {
        Ok(amount) => amount,
        Err(e) => {
            warn!(key = key.as_str(), value = %raw, error = %e, "ignoring corrupt stored amount");
            Amount::ZERO
        }
    }
}

/// Persist both wallet fields.
pub fn store_wallet<S: State>(state: &mut S, wallet: &Wallet) {
    let mut changes = Vec::with_capacity(Key::ALL.len());
    for key in Key::ALL {
        let amount = match key {
            Key::Deposit => wallet.deposit,
            Key::Stake => wallet.stake,
        };
        match serde_json::to_string(&amount) {
            Ok(value) => changes.push((key, Status::Update(value))),
            Err(e) => warn!(key = key.as_str(), error = %e, "failed to encode amount"),
        }
    }
    state.apply(changes);
}
