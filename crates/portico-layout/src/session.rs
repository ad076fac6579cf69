//! Per-session flags, cleared when the process (the "tab") ends.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Set once the first mount of a session has framed the view.
pub const INITIAL_ZOOM_PERFORMED: &str = "initialZoomPerformed";

#[derive(Debug, Default)]
pub struct SessionFlags {
    flags: RwLock<HashSet<String>>,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, flag: &str) -> bool {
        self.flags.read().contains(flag)
    }

    pub fn set(&self, flag: &str) {
        self.flags.write().insert(flag.to_string());
    }

    pub fn clear(&self, flag: &str) {
        self.flags.write().remove(flag);
    }

    /// Let the next mount frame the view again, e.g. after the data changed.
    pub fn reset_initial_zoom(&self) {
        self.clear(INITIAL_ZOOM_PERFORMED);
    }
}
