//! Shared, thread-safe preference storage.

use std::sync::{Arc, RwLock};

use crate::prefs::{PreferenceError, PreferenceSet};

/// Holds the active [`PreferenceSet`] behind an atomically swapped `Arc`.
///
/// Readers take a snapshot and keep using it for as long as they like;
/// writers build a modified copy and swap it in.
#[derive(Debug, Default)]
pub struct PreferenceContext {
    current: RwLock<Arc<PreferenceSet>>,
}

impl PreferenceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context starting from the given preferences.
    pub fn with_preferences(preferences: PreferenceSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(preferences)),
        }
    }

    /// The current preferences.
    pub fn snapshot(&self) -> Arc<PreferenceSet> {
        Arc::clone(&self.current.read().expect("preference lock poisoned"))
    }

    /// Set one preference. On error the current preferences are untouched.
    pub fn set_preference(&self, name: &str, value: &str) -> Result<(), PreferenceError> {
        let mut guard = self.current.write().expect("preference lock poisoned");
        let mut next = PreferenceSet::clone(&guard);
        next.set(name, value)?;
        *guard = Arc::new(next);
        Ok(())
    }

    /// Read one preference's value.
    pub fn get_preference(&self, name: &str) -> Result<String, PreferenceError> {
        self.snapshot().get(name)
    }

    /// Replace all preferences at once.
    pub fn replace(&self, preferences: PreferenceSet) {
        *self.current.write().expect("preference lock poisoned") = Arc::new(preferences);
    }

    /// Restore the defaults.
    pub fn reset(&self) {
        self.replace(PreferenceSet::default());
    }
}
