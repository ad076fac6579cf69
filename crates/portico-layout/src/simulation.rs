//! Cooperative force simulation.
//!
//! Each `tick` cools alpha toward the alpha target, runs the link, charge,
//! center and collision forces in that order, integrates velocities, and
//! clamps every node into the canvas. Nodes with `fx/fy` set stay exactly
//! where they are pinned.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::forces::{self, Lcg, LinkForce};
use crate::types::{NodeKind, Point};

#[derive(Debug, Clone, PartialEq)]
pub struct SimNode {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

impl SimNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
        }
    }

    pub fn pinned(id: impl Into<String>, kind: NodeKind, at: Point) -> Self {
        let mut node = Self::new(id, kind, at.x, at.y);
        node.fx = Some(at.x);
        node.fy = Some(at.y);
        node
    }

    pub fn is_fixed(&self) -> bool {
        self.fx.is_some() && self.fy.is_some()
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

pub struct Simulation {
    nodes: Vec<SimNode>,
    index: HashMap<String, usize>,
    link_force: LinkForce,
    charges: Vec<f64>,
    radii: Vec<f64>,
    width: f64,
    height: f64,
    alpha: f64,
    alpha_target: f64,
    rng: Lcg,
    running: bool,
    config: LayoutConfig,
}

impl Simulation {
    /// Build a simulation over `nodes`. Links naming an unknown node id are
    /// dropped with a warning.
    pub fn new(
        mut nodes: Vec<SimNode>,
        links: &[(String, String)],
        width: f64,
        height: f64,
        config: LayoutConfig,
    ) -> Self {
        let index: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut resolved = Vec::with_capacity(links.len());
        for (source, target) in links {
            match (index.get(source), index.get(target)) {
                (Some(&s), Some(&t)) => resolved.push((s, t)),
                _ => warn!("Dropping link {} -> {}: endpoint not in view", source, target),
            }
        }

        for node in &mut nodes {
            if let Some(fx) = node.fx {
                node.x = fx;
            }
            if let Some(fy) = node.fy {
                node.y = fy;
            }
        }

        let charges = nodes.iter().map(|n| config.charge(n.kind)).collect();
        let radii = nodes
            .iter()
            .map(|n| config.collision_radius(n.kind))
            .collect();
        let link_force = LinkForce::new(resolved, nodes.len(), config.link_distance);

        debug!(
            "Simulation built: {} nodes, {} links",
            nodes.len(),
            link_force.links().len()
        );

        Self {
            nodes,
            index,
            link_force,
            charges,
            radii,
            width,
            height,
            alpha: 1.0,
            alpha_target: 0.0,
            rng: Lcg::new(),
            running: true,
            config,
        }
    }

    /// Advance one step if running. Returns whether the simulation is still
    /// running afterwards.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.step();
        if self.alpha < self.config.alpha_min {
            self.running = false;
            debug!("Simulation settled");
        }
        self.running
    }

    /// Tick until settled or `max_ticks` is reached. Returns ticks taken.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        let mut taken = 0;
        while taken < max_ticks && self.tick() {
            taken += 1;
        }
        taken
    }

    fn step(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;

        self.link_force.apply(&mut self.nodes, alpha, &mut self.rng);
        forces::many_body(&mut self.nodes, &self.charges, alpha, &mut self.rng);
        forces::center(
            &mut self.nodes,
            self.width / 2.0,
            self.height / 2.0,
            self.config.center_strength,
        );
        forces::collide(&mut self.nodes, &self.radii, &mut self.rng);

        let decay = 1.0 - self.config.velocity_decay;
        for node in &mut self.nodes {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= decay;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= decay;
                    node.y += node.vy;
                }
            }
        }
        self.clamp_all();
    }

    fn clamp_all(&mut self) {
        for i in 0..self.nodes.len() {
            let node = &self.nodes[i];
            let p = self.clamp_point(node.kind, node.position());
            self.nodes[i].x = p.x;
            self.nodes[i].y = p.y;
        }
    }

    /// Keep a node of `kind` fully inside the canvas.
    pub fn clamp_point(&self, kind: NodeKind, p: Point) -> Point {
        let e = self.config.half_extent(kind);
        Point::new(
            p.x.min(self.width - e.w).max(e.w),
            p.y.min(self.height - e.h).max(e.h),
        )
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn restart(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn links(&self) -> &[(usize, usize)] {
        self.link_force.links()
    }

    /// Fix node `idx` at `at` (moves it there immediately).
    pub fn pin(&mut self, idx: usize, at: Point) {
        if let Some(node) = self.nodes.get_mut(idx) {
            node.fx = Some(at.x);
            node.fy = Some(at.y);
            node.x = at.x;
            node.y = at.y;
        }
    }

    pub fn unpin(&mut self, idx: usize) {
        if let Some(node) = self.nodes.get_mut(idx) {
            node.fx = None;
            node.fy = None;
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}
