//! Observable per-feature state.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What a client can observe about one feature at any time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureState<T> {
    pub loading: bool,
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for FeatureState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            result: None,
            error: None,
        }
    }
}

/// Holds a [`FeatureState`] behind a mutex.
///
/// The lock is only taken for short synchronous updates and never across an
/// await point.
pub struct FeatureSlot<T> {
    state: Mutex<FeatureState<T>>,
}

impl<T> Default for FeatureSlot<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(FeatureState::default()),
        }
    }
}

impl<T: Clone> FeatureSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FeatureState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the feature as loading, dropping any previous result or error.
    pub fn begin(&self) {
        let mut state = self.lock();
        state.loading = true;
        state.result = None;
        state.error = None;
    }

    pub fn succeed(&self, result: T) {
        let mut state = self.lock();
        state.loading = false;
        state.result = Some(result);
        state.error = None;
    }

    pub fn fail(&self, message: impl Into<String>) {
        let mut state = self.lock();
        state.loading = false;
        state.result = None;
        state.error = Some(message.into());
    }

    /// Back to the initial state.
    pub fn reset(&self) {
        *self.lock() = FeatureState::default();
    }

    pub fn snapshot(&self) -> FeatureState<T> {
        self.lock().clone()
    }

    pub fn result(&self) -> Option<T> {
        self.lock().result.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Mutate the current result in place, if there is one.
    pub fn update_result<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.lock().result.as_mut().map(f)
    }
}
