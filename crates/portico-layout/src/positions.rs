//! Saved node positions and viewport transform.
//!
//! Both are caches of user interaction: unreadable values are logged and
//! treated as absent, never as errors.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::warn;

use crate::storage::{LayoutStorage, Result};
use crate::types::{Point, ZoomTransform};

pub const NODE_POSITIONS_KEY: &str = "nodePositions";
pub const ZOOM_TRANSFORM_KEY: &str = "zoomTransform";

/// Node id to pinned position.
pub type PositionMap = BTreeMap<String, Point>;

#[derive(Clone)]
pub struct PositionCache {
    storage: Arc<dyn LayoutStorage>,
}

impl PositionCache {
    pub fn new(storage: Arc<dyn LayoutStorage>) -> Self {
        Self { storage }
    }

    pub fn positions(&self) -> PositionMap {
        let Some(raw) = self.storage.get(NODE_POSITIONS_KEY) else {
            return PositionMap::new();
        };
        match serde_json::from_str::<PositionMap>(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!("Failed to restore node positions: {}", e);
                PositionMap::new()
            }
        }
    }

    /// An empty map removes the key instead of storing `{}`.
    fn write_positions(&self, map: &PositionMap) -> Result<()> {
        if map.is_empty() {
            return self.storage.remove(NODE_POSITIONS_KEY);
        }
        self.storage
            .set(NODE_POSITIONS_KEY, serde_json::to_string(map)?)
    }

    pub fn save_position(&self, id: &str, at: Point) -> Result<()> {
        let mut map = self.positions();
        map.insert(id.to_string(), at);
        self.write_positions(&map)
    }

    /// Drop one saved position so the node is placed afresh next mount.
    pub fn forget(&self, id: &str) -> Result<()> {
        let mut map = self.positions();
        if map.remove(id).is_some() {
            self.write_positions(&map)?;
        }
        Ok(())
    }

    /// Drop saved positions of nodes that no longer exist. `ids` must be the
    /// full, unfiltered node set. Returns how many were dropped.
    pub fn retain_known<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Result<usize> {
        let known: HashSet<&str> = ids.into_iter().collect();
        let mut map = self.positions();
        let before = map.len();
        map.retain(|id, _| known.contains(id.as_str()));
        let dropped = before - map.len();
        if dropped > 0 {
            self.write_positions(&map)?;
        }
        Ok(dropped)
    }

    pub fn transform(&self) -> Option<ZoomTransform> {
        let raw = self.storage.get(ZOOM_TRANSFORM_KEY)?;
        match serde_json::from_str::<ZoomTransform>(&raw) {
            Ok(t) if t.is_valid() => Some(t),
            Ok(t) => {
                warn!("Ignoring unusable zoom transform {:?}", t);
                None
            }
            Err(e) => {
                warn!("Failed to restore zoom transform: {}", e);
                None
            }
        }
    }

    pub fn save_transform(&self, t: &ZoomTransform) -> Result<()> {
        self.storage
            .set(ZOOM_TRANSFORM_KEY, serde_json::to_string(t)?)
    }

    pub fn storage(&self) -> &Arc<dyn LayoutStorage> {
        &self.storage
    }
}
