//! Boundary with the host application's state.
//!
//! The engine never owns live state. It reads it through a
//! [`StateContainer`] and repairs persisted copies through a [`StateSchema`]
//! before handing them back.

use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::NormalizationError;

/// The host's live state container.
pub trait StateContainer: Send + Sync + 'static {
    /// Canonical in-memory state.
    type State: Serialize + Send + 'static;

    /// Current state, captured on every tick.
    fn current_state(&self) -> Self::State;

    /// Replace the live state (startup restore and slot restore).
    fn replace_state(&self, state: Self::State);
}

/// Schema migration and defaults for persisted state.
pub trait StateSchema: Send + Sync + 'static {
    type State;

    /// Repair or migrate a persisted state to the current schema.
    ///
    /// Must accept well-formed input from older schema versions.
    fn normalize(&self, raw: Value) -> Result<Self::State, NormalizationError>;

    /// Valid state used when no history exists.
    fn default_state(&self) -> Self::State;
}

/// Serde-driven schema for plain state structs.
///
/// Missing fields are filled from `T::default()`, unknown fields are dropped
/// by serde, and anything that still fails to deserialize is rejected.
pub struct JsonSchema<T> {
    _state: PhantomData<fn() -> T>,
}

impl<T> JsonSchema<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _state: PhantomData,
        }
    }
}

impl<T> Default for JsonSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for JsonSchema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JsonSchema")
    }
}

/// Overlay `raw` onto `defaults`, recursing into objects present in both.
pub fn fill_missing(defaults: Value, raw: Value) -> Value {
    match (defaults, raw) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (field, value) in overlay {
                let merged = match base.remove(&field) {
                    Some(default) => fill_missing(default, value),
                    None => value,
                };
                base.insert(field, merged);
            }
            Value::Object(base)
        }
        (_, raw) => raw,
    }
}

impl<T> StateSchema for JsonSchema<T>
where
    T: Serialize + DeserializeOwned + Default + 'static,
{
    type State = T;

    fn normalize(&self, raw: Value) -> Result<T, NormalizationError> {
        let defaults = serde_json::to_value(T::default())
            .map_err(|e| NormalizationError::new(format!("default state: {e}")))?;
        let merged = fill_missing(defaults, raw);
        trace!("Deserializing normalized state");
        serde_json::from_value(merged).map_err(|e| NormalizationError::new(e.to_string()))
    }

    fn default_state(&self) -> T {
        T::default()
    }
}

/// Mutex-guarded state container for hosts without their own store.
#[derive(Debug, Default)]
pub struct SharedState<T> {
    state: Mutex<T>,
    replacements: Mutex<usize>,
}

impl<T> SharedState<T> {
    pub fn new(state: T) -> Self {
        Self {
            state: Mutex::new(state),
            replacements: Mutex::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the state (an edit by the host).
    pub fn set(&self, state: T) {
        *self.lock() = state;
    }

    /// Mutate the state in place.
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut *self.lock());
    }

    /// How many times the engine replaced the state.
    pub fn replacement_count(&self) -> usize {
        *self.replacements.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> SharedState<T> {
    pub fn get(&self) -> T {
        self.lock().clone()
    }
}

impl<T> StateContainer for SharedState<T>
where
    T: Serialize + Clone + Send + 'static,
{
    type State = T;

    fn current_state(&self) -> T {
        self.get()
    }

    fn replace_state(&self, state: T) {
        debug!("Replacing live state");
        *self.lock() = state;
        *self.replacements.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }
}
