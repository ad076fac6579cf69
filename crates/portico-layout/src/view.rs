//! The mounted network view: simulation, transform and persistence wired
//! together the way the browser canvas uses them.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use portico_core::{NetworkData, NetworkNode};

use crate::config::LayoutConfig;
use crate::interaction::{GraphEvent, Interaction};
use crate::placement::initial_placement;
use crate::positions::PositionCache;
use crate::session::{SessionFlags, INITIAL_ZOOM_PERFORMED};
use crate::simulation::{SimNode, Simulation};
use crate::storage::LayoutStorage;
use crate::types::{NodeKind, NodeState, Point, ZoomTransform};
use crate::viewport;

pub struct GraphView {
    data: NetworkData,
    sim: Simulation,
    transform: ZoomTransform,
    width: f64,
    height: f64,
    cache: PositionCache,
    interaction: Interaction,
}

impl GraphView {
    /// Build the view for `data` (already filtered) in a `width` x `height`
    /// canvas.
    ///
    /// Saved positions pin their nodes; everything else is placed by the
    /// sector rule. The first mount of a session restores the saved
    /// transform, or frames all nodes when there is none.
    pub fn mount(
        data: NetworkData,
        width: f64,
        height: f64,
        storage: Arc<dyn LayoutStorage>,
        session: &SessionFlags,
        config: LayoutConfig,
    ) -> Self {
        let cache = PositionCache::new(storage);
        let saved = cache.positions();
        let placement = initial_placement(&data, width, height, &saved, &config);

        let nodes: Vec<SimNode> = data
            .nodes
            .iter()
            .zip(&placement)
            .map(|(node, place)| {
                let kind = NodeKind::of(node);
                if place.pinned {
                    SimNode::pinned(node.id.clone(), kind, place.position)
                } else {
                    SimNode::new(node.id.clone(), kind, place.position.x, place.position.y)
                }
            })
            .collect();
        let links: Vec<(String, String)> = data
            .links
            .iter()
            .map(|l| (l.source.clone(), l.target.clone()))
            .collect();
        let interaction = Interaction::new(config.click_distance);
        let sim = Simulation::new(nodes, &links, width, height, config);

        let mut view = Self {
            data,
            sim,
            transform: ZoomTransform::IDENTITY,
            width,
            height,
            cache,
            interaction,
        };

        if session.is_set(INITIAL_ZOOM_PERFORMED) {
            if let Some(saved) = view.cache.transform() {
                view.transform = saved;
            }
        } else {
            match view.cache.transform() {
                Some(saved) => {
                    debug!("Restoring saved zoom transform {:?}", saved);
                    view.transform = saved;
                }
                None => view.fit_to_view(),
            }
            session.set(INITIAL_ZOOM_PERFORMED);
        }

        info!(
            "Graph view mounted: {} nodes ({} restored), {}x{}",
            view.data.nodes.len(),
            view.data
                .nodes
                .iter()
                .filter(|n| saved.contains_key(&n.id))
                .count(),
            width,
            height
        );
        view
    }

    pub fn data(&self) -> &NetworkData {
        &self.data
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Advance one frame. Returns whether the layout is still moving.
    pub fn tick(&mut self) -> bool {
        self.sim.tick()
    }

    pub fn settle(&mut self, max_ticks: usize) -> usize {
        self.sim.settle(max_ticks)
    }

    pub fn is_running(&self) -> bool {
        self.sim.is_running()
    }

    /// Stop ticking. Call before dropping or replacing the view.
    pub fn stop(&mut self) {
        self.interaction.cancel(&mut self.sim);
        self.sim.stop();
    }

    pub fn positions(&self) -> BTreeMap<String, Point> {
        self.sim
            .nodes()
            .iter()
            .map(|n| (n.id.clone(), n.position()))
            .collect()
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.sim.node(id).map(|n| n.position())
    }

    pub fn node_state(&self, id: &str) -> Option<NodeState> {
        let idx = self.sim.index_of(id)?;
        if self.interaction.dragging() == Some(idx) {
            return Some(NodeState::Dragging);
        }
        Some(if self.sim.nodes()[idx].is_fixed() {
            NodeState::Pinned
        } else {
            NodeState::Free
        })
    }

    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.data.nodes.iter().find(|n| n.id == id)
    }

    // ---------------------------------------------------------------
    // Pointer input (screen coordinates)
    // ---------------------------------------------------------------

    /// Start a gesture. Returns `NodeMoved` when this press closed a drag
    /// whose release never arrived; that move is persisted like any other.
    pub fn pointer_down(&mut self, screen: Point) -> Option<GraphEvent> {
        let event = self
            .interaction
            .pointer_down(&mut self.sim, &self.transform, screen);
        self.persist_move(&event);
        event
    }

    /// Track the pointer. Background drags pan and report the new transform.
    pub fn pointer_move(&mut self, screen: Point) -> Option<GraphEvent> {
        let t = self
            .interaction
            .pointer_move(&mut self.sim, &self.transform, screen)?;
        self.set_transform(t);
        Some(GraphEvent::TransformChanged(t))
    }

    /// Finish a gesture. Drag ends are persisted before returning.
    pub fn pointer_up(&mut self) -> Option<GraphEvent> {
        let event = self.interaction.pointer_up(&mut self.sim, &self.data.nodes);
        self.persist_move(&event);
        event
    }

    fn persist_move(&self, event: &Option<GraphEvent>) {
        if let Some(GraphEvent::NodeMoved { id, position }) = event {
            if let Err(e) = self.cache.save_position(id, *position) {
                warn!("Failed to save node position for {}: {}", id, e);
            }
        }
    }

    pub fn pointer_leave(&mut self) {
        self.interaction.cancel(&mut self.sim);
    }

    pub fn wheel(&mut self, screen: Point, delta_y: f64) {
        let t = viewport::wheel(&self.transform, screen, delta_y, self.sim.config());
        self.set_transform(t);
    }

    // ---------------------------------------------------------------
    // Zoom controls
    // ---------------------------------------------------------------

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    /// Apply and persist a transform.
    pub fn set_transform(&mut self, t: ZoomTransform) {
        self.transform = t;
        if let Err(e) = self.cache.save_transform(&t) {
            warn!("Failed to save zoom transform: {}", e);
        }
    }

    pub fn zoom_in(&mut self) {
        let t = viewport::zoom_in(&self.transform, self.width, self.height, self.sim.config());
        self.set_transform(t);
    }

    pub fn zoom_out(&mut self) {
        let t = viewport::zoom_out(&self.transform, self.width, self.height, self.sim.config());
        self.set_transform(t);
    }

    pub fn fit_to_view(&mut self) {
        let nodes: Vec<(Point, NodeKind)> = self
            .sim
            .nodes()
            .iter()
            .map(|n| (n.position(), n.kind))
            .collect();
        if let Some(t) = viewport::fit_to_view(&nodes, self.width, self.height, self.sim.config()) {
            self.set_transform(t);
        }
    }

    /// Release a node's pin and forget its saved position.
    pub fn release(&mut self, id: &str) {
        let Some(idx) = self.sim.index_of(id) else {
            return;
        };
        if NodeKind::of(&self.data.nodes[idx]) == NodeKind::Hub {
            return;
        }
        self.sim.unpin(idx);
        self.sim.restart();
        if let Err(e) = self.cache.forget(id) {
            warn!("Failed to forget node position for {}: {}", id, e);
        }
    }
}

impl Drop for GraphView {
    fn drop(&mut self) {
        self.sim.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positions::ZOOM_TRANSFORM_KEY;
    use crate::storage::MemoryStorage;
    use portico_core::{Cluster, Contact, NewContact};

    fn data() -> NetworkData {
        let clusters = vec![
            Cluster {
                id: 5,
                name: "Sales".into(),
                color: "rgba(1,2,3,0.4)".into(),
            },
            Cluster {
                id: 6,
                name: "Ops".into(),
                color: "rgba(3,2,1,0.4)".into(),
            },
        ];
        let contacts: Vec<Contact> = [(1, 5), (2, 5), (3, 6)]
            .iter()
            .map(|&(id, cluster_id)| {
                Contact::from_new(
                    id,
                    NewContact {
                        name: format!("P{id}"),
                        role: "Rep".into(),
                        cluster_id,
                        ..Default::default()
                    },
                )
            })
            .collect();
        NetworkData::project(&clusters, &contacts)
    }

    fn mount(storage: &Arc<MemoryStorage>, session: &SessionFlags) -> GraphView {
        let storage: Arc<dyn LayoutStorage> = storage.clone();
        GraphView::mount(data(), 800.0, 600.0, storage, session, LayoutConfig::default())
    }

    #[test]
    fn test_hub_pinned_at_center() {
        let storage = Arc::new(MemoryStorage::new());
        let mut view = mount(&storage, &SessionFlags::new());
        view.settle(10_000);
        assert_eq!(view.position("portico"), Some(Point::new(400.0, 300.0)));
        assert_eq!(view.node_state("portico"), Some(NodeState::Pinned));
        assert_eq!(view.node_state("contact-1"), Some(NodeState::Free));
        assert_eq!(view.node_state("nope"), None);
    }

    #[test]
    fn test_drag_persists_and_restores_on_remount() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionFlags::new();
        let mut view = mount(&storage, &session);
        view.set_transform(ZoomTransform::IDENTITY);

        let start = view.position("contact-1").unwrap();
        view.pointer_down(start);
        view.pointer_move(Point::new(200.0, 250.0));
        assert_eq!(view.node_state("contact-1"), Some(NodeState::Dragging));
        view.pointer_move(Point::new(120.0, 340.0));
        let event = view.pointer_up();
        assert_eq!(
            event,
            Some(GraphEvent::NodeMoved {
                id: "contact-1".into(),
                position: Point::new(120.0, 340.0),
            })
        );
        assert_eq!(view.node_state("contact-1"), Some(NodeState::Pinned));
        view.stop();
        drop(view);

        let mut again = mount(&storage, &session);
        assert_eq!(again.node_state("contact-1"), Some(NodeState::Pinned));
        assert_eq!(again.position("contact-1"), Some(Point::new(120.0, 340.0)));
        again.settle(10_000);
        assert_eq!(again.position("contact-1"), Some(Point::new(120.0, 340.0)));
    }

    #[test]
    fn test_lost_release_still_persists_drag() {
        let storage = Arc::new(MemoryStorage::new());
        let mut view = mount(&storage, &SessionFlags::new());
        view.set_transform(ZoomTransform::IDENTITY);

        let start = view.position("contact-1").unwrap();
        assert_eq!(view.pointer_down(start), None);
        view.pointer_move(Point::new(120.0, 340.0));
        let event = view.pointer_down(Point::new(1.0, 1.0));
        assert_eq!(
            event,
            Some(GraphEvent::NodeMoved {
                id: "contact-1".into(),
                position: Point::new(120.0, 340.0),
            })
        );
        assert_eq!(view.simulation().alpha_target(), 0.0);
        assert_eq!(
            view.cache.positions().get("contact-1"),
            Some(&Point::new(120.0, 340.0))
        );
        assert_eq!(view.node_state("contact-1"), Some(NodeState::Pinned));
    }

    #[test]
    fn test_click_selects_full_node() {
        let storage = Arc::new(MemoryStorage::new());
        let mut view = mount(&storage, &SessionFlags::new());
        let at = view.transform().graph_to_screen(view.position("cluster-6").unwrap());
        view.pointer_down(at);
        match view.pointer_up() {
            Some(GraphEvent::NodeSelected(node)) => {
                assert_eq!(node.id, "cluster-6");
                assert_eq!(node.original_id, Some(6));
                assert_eq!(node.color.as_deref(), Some("rgba(3,2,1,0.4)"));
            }
            other => panic!("unexpected {other:?}"),
        }
        // Clicking did not persist anything.
        assert!(view.cache.positions().is_empty());
    }

    #[test]
    fn test_first_mount_fits_then_restores_once() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionFlags::new();
        let view = mount(&storage, &session);
        let fitted = view.transform();
        assert_ne!(fitted, ZoomTransform::IDENTITY);
        assert!(storage.get(ZOOM_TRANSFORM_KEY).is_some());
        assert!(session.is_set(INITIAL_ZOOM_PERFORMED));
        drop(view);

        // A new session starts from the persisted transform, not a fresh fit.
        let custom = ZoomTransform {
            x: 11.0,
            y: 22.0,
            k: 1.7,
        };
        storage
            .set(ZOOM_TRANSFORM_KEY, serde_json::to_string(&custom).unwrap())
            .unwrap();
        let fresh = SessionFlags::new();
        let view = mount(&storage, &fresh);
        assert_eq!(view.transform(), custom);
    }

    #[test]
    fn test_zoom_controls_persist() {
        let storage = Arc::new(MemoryStorage::new());
        let mut view = mount(&storage, &SessionFlags::new());
        view.set_transform(ZoomTransform::IDENTITY);
        view.zoom_in();
        assert!((view.transform().k - 1.3).abs() < 1e-9);
        view.zoom_out();
        assert!((view.transform().k - 0.91).abs() < 1e-9);
        view.wheel(Point::new(0.0, 0.0), -1.0);
        let stored: ZoomTransform =
            serde_json::from_str(&storage.get(ZOOM_TRANSFORM_KEY).unwrap()).unwrap();
        assert_eq!(stored, view.transform());
    }

    #[test]
    fn test_background_pan_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let mut view = mount(&storage, &SessionFlags::new());
        view.set_transform(ZoomTransform::IDENTITY);
        // Top-left corner is outside every node box.
        view.pointer_down(Point::new(1.0, 1.0));
        view.pointer_move(Point::new(31.0, 11.0));
        assert_eq!(view.pointer_up(), None);
        assert_eq!(view.transform(), ZoomTransform { x: 30.0, y: 10.0, k: 1.0 });
    }

    #[test]
    fn test_release_forgets_position() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionFlags::new();
        let mut view = mount(&storage, &session);
        view.set_transform(ZoomTransform::IDENTITY);
        let start = view.position("contact-3").unwrap();
        view.pointer_down(start);
        view.pointer_move(Point::new(300.0, 300.0));
        view.pointer_up();
        assert_eq!(view.cache.positions().len(), 1);

        view.release("contact-3");
        assert_eq!(view.node_state("contact-3"), Some(NodeState::Free));
        assert!(view.cache.positions().is_empty());
    }
}
