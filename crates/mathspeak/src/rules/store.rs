//! The active rule pack.

use std::sync::{Arc, RwLock};

use crate::rules::RulePack;

/// Holds the active [`RulePack`].
///
/// Replacement swaps in a fully loaded pack, so a reader sees either the
/// whole old pack or the whole new one.
#[derive(Debug, Default)]
pub struct RuleStore {
    active: RwLock<Option<Arc<RulePack>>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a pack already active.
    pub fn with_pack(pack: RulePack) -> Self {
        Self {
            active: RwLock::new(Some(Arc::new(pack))),
        }
    }

    /// The active pack, if any has been loaded.
    pub fn current(&self) -> Option<Arc<RulePack>> {
        self.active.read().expect("rule store lock poisoned").clone()
    }

    /// Make `pack` the active pack, returning the previous one.
    pub fn replace(&self, pack: RulePack) -> Option<Arc<RulePack>> {
        self.active
            .write()
            .expect("rule store lock poisoned")
            .replace(Arc::new(pack))
    }

    pub fn is_loaded(&self) -> bool {
        self.active.read().expect("rule store lock poisoned").is_some()
    }
}
