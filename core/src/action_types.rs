//! Reserved lifecycle action types.
//!
//! The store dispatches `INIT` when it is created and `REPLACE` when its
//! reducer is swapped; the reducer combiner probes slice reducers with
//! `PROBE_UNKNOWN_ACTION`. Each tag carries a random suffix so it cannot
//! collide with an application-defined type. The suffix is not
//! cryptographically strong; it only has to be unguessable in practice.
//!
//! The values are generated once and then passed around by reference.
//! [`ActionTypes::global`] is the process-wide default; tests and embedders
//! can build their own set with [`ActionTypes::from_rng`].

use crate::action::Action;
use rand::Rng;
use std::sync::{Arc, OnceLock};

const PREFIX: &str = "@@statecell";
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

/// The three reserved lifecycle action types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypes {
    init: String,
    replace: String,
    probe_unknown_action: String,
}

impl ActionTypes {
    /// Generate a fresh set using the thread-local RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_rng(&mut rand::thread_rng())
    }

    /// Generate a fresh set from the given RNG.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            init: format!("{PREFIX}/INIT{}", random_suffix(rng)),
            replace: format!("{PREFIX}/REPLACE{}", random_suffix(rng)),
            probe_unknown_action: format!("{PREFIX}/PROBE_UNKNOWN_ACTION{}", random_suffix(rng)),
        }
    }

    /// The process-wide set, generated on first use.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<ActionTypes>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::generate())))
    }

    /// Type dispatched once when a store is created
    #[must_use]
    pub fn init(&self) -> &str {
        &self.init
    }

    /// Type dispatched after the store's reducer is replaced
    #[must_use]
    pub fn replace(&self) -> &str {
        &self.replace
    }

    /// Type used to probe reducers with an action they cannot know
    #[must_use]
    pub fn probe_unknown_action(&self) -> &str {
        &self.probe_unknown_action
    }

    /// A fresh `INIT` action.
    #[must_use]
    pub fn init_action(&self) -> Action {
        Action::new(self.init.as_str())
    }

    /// A fresh `REPLACE` action.
    #[must_use]
    pub fn replace_action(&self) -> Action {
        Action::new(self.replace.as_str())
    }

    /// A fresh `PROBE_UNKNOWN_ACTION` action.
    #[must_use]
    pub fn probe_action(&self) -> Action {
        Action::new(self.probe_unknown_action.as_str())
    }

    /// Whether `action_type` is one of the reserved tags.
    #[must_use]
    pub fn is_reserved(&self, action_type: &str) -> bool {
        action_type == self.init
            || action_type == self.replace
            || action_type == self.probe_unknown_action
    }
}

/// Six base-36 characters separated by dots, e.g. `"k.3.f.9.a.q"`.
fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    let chars: Vec<String> = (0..SUFFIX_LEN)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]).to_string())
        .collect();
    chars.join(".")
}
