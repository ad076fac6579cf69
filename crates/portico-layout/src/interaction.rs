//! Pointer gestures: node drag, click selection, background pan.
//!
//! Coordinates arriving here are screen coordinates; hit-testing and
//! drag targets are resolved in graph space through the current transform.

use portico_core::NetworkNode;

use crate::simulation::Simulation;
use crate::types::{NodeKind, Point, ZoomTransform};
use crate::viewport;

/// What a finished (or ongoing, for pans) gesture means to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// A node was clicked, not dragged. Carries the node's full data.
    NodeSelected(NetworkNode),
    /// Empty canvas was clicked.
    BackgroundClicked,
    /// A drag ended; the node is pinned at `position`.
    NodeMoved { id: String, position: Point },
    TransformChanged(ZoomTransform),
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Idle,
    NodePress {
        idx: usize,
        origin: Point,
        /// Node position minus pointer position, graph space.
        offset: Point,
        /// Pin held before the press, restored on a plain click.
        previous_pin: Option<(f64, f64)>,
        dragging: bool,
    },
    Pan {
        origin: Point,
        start: ZoomTransform,
        moved: bool,
    },
}

/// Topmost node whose drawn box contains `screen`. Later nodes draw on top.
pub fn hit_test(sim: &Simulation, t: &ZoomTransform, screen: Point) -> Option<usize> {
    let p = t.screen_to_graph(screen);
    let config = sim.config();
    sim.nodes()
        .iter()
        .enumerate()
        .rev()
        .find(|(_, n)| {
            let e = config.half_extent(n.kind);
            (n.x - p.x).abs() <= e.w && (n.y - p.y).abs() <= e.h
        })
        .map(|(i, _)| i)
}

/// Cool the simulation and report where the dragged node was left.
fn end_drag(sim: &mut Simulation, idx: usize) -> GraphEvent {
    sim.set_alpha_target(0.0);
    let node = &sim.nodes()[idx];
    GraphEvent::NodeMoved {
        id: node.id.clone(),
        position: Point::new(node.fx.unwrap_or(node.x), node.fy.unwrap_or(node.y)),
    }
}

fn restore_pin(sim: &mut Simulation, idx: usize, previous_pin: Option<(f64, f64)>) {
    match previous_pin {
        Some((x, y)) => sim.pin(idx, Point::new(x, y)),
        None => sim.unpin(idx),
    }
}

pub struct Interaction {
    gesture: Gesture,
    click_distance: f64,
}

impl Interaction {
    pub fn new(click_distance: f64) -> Self {
        Self {
            gesture: Gesture::Idle,
            click_distance,
        }
    }

    /// Index of the node currently being dragged.
    pub fn dragging(&self) -> Option<usize> {
        match self.gesture {
            Gesture::NodePress {
                idx,
                dragging: true,
                ..
            } => Some(idx),
            _ => None,
        }
    }

    /// Press on a node pins it where it is; press on the canvas starts a pan.
    ///
    /// A gesture still in flight (its pointer-up was lost) is closed first:
    /// a drag cools down and comes back as `NodeMoved`.
    pub fn pointer_down(
        &mut self,
        sim: &mut Simulation,
        t: &ZoomTransform,
        screen: Point,
    ) -> Option<GraphEvent> {
        let interrupted = self.interrupt(sim);
        self.gesture = match hit_test(sim, t, screen) {
            Some(idx) => {
                let node = &sim.nodes()[idx];
                let at = node.position();
                let previous_pin = node.fx.zip(node.fy);
                let pointer = t.screen_to_graph(screen);
                sim.pin(idx, at);
                Gesture::NodePress {
                    idx,
                    origin: screen,
                    offset: Point::new(at.x - pointer.x, at.y - pointer.y),
                    previous_pin,
                    dragging: false,
                }
            }
            None => Gesture::Pan {
                origin: screen,
                start: *t,
                moved: false,
            },
        };
        interrupted
    }

    fn interrupt(&mut self, sim: &mut Simulation) -> Option<GraphEvent> {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::NodePress {
                idx,
                dragging: true,
                ..
            } => Some(end_drag(sim, idx)),
            Gesture::NodePress {
                idx, previous_pin, ..
            } => {
                restore_pin(sim, idx, previous_pin);
                None
            }
            Gesture::Idle | Gesture::Pan { .. } => None,
        }
    }

    /// Returns the new transform while panning.
    pub fn pointer_move(
        &mut self,
        sim: &mut Simulation,
        t: &ZoomTransform,
        screen: Point,
    ) -> Option<ZoomTransform> {
        match &mut self.gesture {
            Gesture::Idle => None,
            Gesture::NodePress {
                idx,
                origin,
                offset,
                dragging,
                ..
            } => {
                if !*dragging {
                    // The hub stays at the center; pressing it only selects.
                    if sim.nodes()[*idx].kind == NodeKind::Hub
                        || screen.distance(origin) <= self.click_distance
                    {
                        return None;
                    }
                    *dragging = true;
                    let heat = sim.config().drag_alpha_target;
                    sim.set_alpha_target(heat);
                    sim.restart();
                }
                let pointer = t.screen_to_graph(screen);
                let kind = sim.nodes()[*idx].kind;
                let target = sim.clamp_point(
                    kind,
                    Point::new(pointer.x + offset.x, pointer.y + offset.y),
                );
                sim.pin(*idx, target);
                None
            }
            Gesture::Pan {
                origin,
                start,
                moved,
            } => {
                if !*moved && screen.distance(origin) <= self.click_distance {
                    return None;
                }
                *moved = true;
                Some(viewport::pan_by(
                    start,
                    screen.x - origin.x,
                    screen.y - origin.y,
                ))
            }
        }
    }

    /// Finish the gesture. `nodes` must be in simulation order.
    pub fn pointer_up(&mut self, sim: &mut Simulation, nodes: &[NetworkNode]) -> Option<GraphEvent> {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Idle => None,
            Gesture::NodePress {
                idx,
                dragging: true,
                ..
            } => Some(end_drag(sim, idx)),
            Gesture::NodePress {
                idx, previous_pin, ..
            } => {
                restore_pin(sim, idx, previous_pin);
                nodes.get(idx).cloned().map(GraphEvent::NodeSelected)
            }
            Gesture::Pan { moved: false, .. } => Some(GraphEvent::BackgroundClicked),
            Gesture::Pan { .. } => None,
        }
    }

    /// Abandon any gesture, e.g. when the pointer leaves the canvas.
    pub fn cancel(&mut self, sim: &mut Simulation) {
        if self.dragging().is_some() {
            sim.set_alpha_target(0.0);
        }
        self.gesture = Gesture::Idle;
    }
}
