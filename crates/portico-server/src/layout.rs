//! Headless layout of a saved `/api/network` response.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use portico_core::NetworkData;
use portico_layout::{GraphView, LayoutConfig, MemoryStorage, Point, SessionFlags};

pub const DEFAULT_WIDTH: f64 = 1200.0;
pub const DEFAULT_HEIGHT: f64 = 800.0;

const MAX_TICKS: usize = 5_000;

pub fn settle_file(path: &Path, width: f64, height: f64) -> anyhow::Result<BTreeMap<String, Point>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data: NetworkData = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a network projection", path.display()))?;
    Ok(settle(data, width, height))
}

pub fn settle(data: NetworkData, width: f64, height: f64) -> BTreeMap<String, Point> {
    let mut view = GraphView::mount(
        data,
        width,
        height,
        Arc::new(MemoryStorage::new()),
        &SessionFlags::new(),
        LayoutConfig::default(),
    );
    let ticks = view.settle(MAX_TICKS);
    info!("Layout settled after {} ticks", ticks);
    view.positions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use portico_store::MemStore;

    #[test]
    fn test_settle_file_positions_every_node() {
        let data = MemStore::with_default_clusters().network_data();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&data).unwrap().as_bytes())
            .unwrap();

        let positions = settle_file(file.path(), 800.0, 600.0).unwrap();
        assert_eq!(positions.len(), 5);
        // The hub is pinned to the canvas center.
        assert_eq!(positions["portico"], Point::new(400.0, 300.0));
    }

    #[test]
    fn test_settle_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        assert!(settle_file(file.path(), 800.0, 600.0).is_err());
    }
}
