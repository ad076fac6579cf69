//! Force kernels. Each one mirrors the d3-force behaviour it is named after;
//! the many-body and collision kernels are exact pairwise instead of
//! quadtree-approximated, which is fine at address-book sizes.

use crate::simulation::SimNode;

/// d3's linear congruential generator, seeded the same way so runs are
/// reproducible.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

const LCG_A: u64 = 1_664_525;
const LCG_C: u64 = 1_013_904_223;
const LCG_M: u64 = 1 << 32;

impl Lcg {
    pub fn new() -> Self {
        Self { state: 1 }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (LCG_A * self.state + LCG_C) % LCG_M;
        self.state as f64 / LCG_M as f64
    }

    /// Tiny random offset used to separate coincident nodes.
    pub fn jiggle(&mut self) -> f64 {
        (self.next_f64() - 0.5) * 1e-6
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new()
    }
}

/// Spring force pulling linked nodes toward `distance` apart.
#[derive(Debug, Clone)]
pub struct LinkForce {
    links: Vec<(usize, usize)>,
    strengths: Vec<f64>,
    biases: Vec<f64>,
    distance: f64,
}

impl LinkForce {
    /// `links` hold node indices. Strength is `1 / min(degree)` and the
    /// bias moves the lower-degree endpoint more.
    pub fn new(links: Vec<(usize, usize)>, node_count: usize, distance: f64) -> Self {
        let mut degree = vec![0usize; node_count];
        for &(s, t) in &links {
            degree[s] += 1;
            degree[t] += 1;
        }
        let strengths = links
            .iter()
            .map(|&(s, t)| 1.0 / degree[s].min(degree[t]) as f64)
            .collect();
        let biases = links
            .iter()
            .map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
            .collect();
        Self {
            links,
            strengths,
            biases,
            distance,
        }
    }

    pub fn links(&self) -> &[(usize, usize)] {
        &self.links
    }

    pub fn apply(&self, nodes: &mut [SimNode], alpha: f64, rng: &mut Lcg) {
        for (i, &(s, t)) in self.links.iter().enumerate() {
            let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
            if x == 0.0 {
                x = rng.jiggle();
            }
            let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
            if y == 0.0 {
                y = rng.jiggle();
            }
            let len = (x * x + y * y).sqrt();
            let l = (len - self.distance) / len * alpha * self.strengths[i];
            x *= l;
            y *= l;
            let b = self.biases[i];
            nodes[t].vx -= x * b;
            nodes[t].vy -= y * b;
            nodes[s].vx += x * (1.0 - b);
            nodes[s].vy += y * (1.0 - b);
        }
    }
}

/// Pairwise charge. Negative strengths repel.
pub fn many_body(nodes: &mut [SimNode], strengths: &[f64], alpha: f64, rng: &mut Lcg) {
    let n = nodes.len();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let mut x = nodes[j].x - nodes[i].x;
            let mut y = nodes[j].y - nodes[i].y;
            let mut l = x * x + y * y;
            if x == 0.0 {
                x = rng.jiggle();
                l += x * x;
            }
            if y == 0.0 {
                y = rng.jiggle();
                l += y * y;
            }
            // distanceMin² of 1 keeps near-coincident pairs from exploding.
            if l < 1.0 {
                l = l.sqrt();
            }
            let w = strengths[j] * alpha / l;
            nodes[i].vx += x * w;
            nodes[i].vy += y * w;
        }
    }
}

/// Shift free nodes so their mean moves toward `(cx, cy)`.
pub fn center(nodes: &mut [SimNode], cx: f64, cy: f64, strength: f64) {
    let (mut sx, mut sy, mut count) = (0.0, 0.0, 0usize);
    for node in nodes.iter().filter(|n| !n.is_fixed()) {
        sx += node.x;
        sy += node.y;
        count += 1;
    }
    if count == 0 {
        return;
    }
    let dx = (sx / count as f64 - cx) * strength;
    let dy = (sy / count as f64 - cy) * strength;
    for node in nodes.iter_mut().filter(|n| !n.is_fixed()) {
        node.x -= dx;
        node.y -= dy;
    }
}

/// Push overlapping circles apart, each by its share of the overlap.
pub fn collide(nodes: &mut [SimNode], radii: &[f64], rng: &mut Lcg) {
    let n = nodes.len();
    for i in 0..n {
        let ri = radii[i];
        let ri2 = ri * ri;
        let xi = nodes[i].x + nodes[i].vx;
        let yi = nodes[i].y + nodes[i].vy;
        for j in (i + 1)..n {
            let rj = radii[j];
            let r = ri + rj;
            let mut x = xi - nodes[j].x - nodes[j].vx;
            let mut y = yi - nodes[j].y - nodes[j].vy;
            let mut l = x * x + y * y;
            if l >= r * r {
                continue;
            }
            if x == 0.0 {
                x = rng.jiggle();
                l += x * x;
            }
            if y == 0.0 {
                y = rng.jiggle();
                l += y * y;
            }
            let len = l.sqrt();
            let push = (r - len) / len;
            x *= push;
            y *= push;
            let share = (rj * rj) / (ri2 + rj * rj);
            nodes[i].vx += x * share;
            nodes[i].vy += y * share;
            nodes[j].vx -= x * (1.0 - share);
            nodes[j].vy -= y * (1.0 - share);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;

    fn node(id: &str, x: f64, y: f64) -> SimNode {
        SimNode::new(id, NodeKind::Contact, x, y)
    }

    #[test]
    fn test_lcg_matches_d3() {
        let mut rng = Lcg::new();
        // (1664525 * 1 + 1013904223) / 2^32
        let first = rng.next_f64();
        assert!((first - 1_015_568_748.0 / 4_294_967_296.0).abs() < 1e-15);
        let second = rng.next_f64();
        assert!((0.0..1.0).contains(&second));
    }

    #[test]
    fn test_link_pulls_together() {
        let mut nodes = vec![node("a", 0.0, 0.0), node("b", 400.0, 0.0)];
        let force = LinkForce::new(vec![(0, 1)], 2, 150.0);
        force.apply(&mut nodes, 1.0, &mut Lcg::new());
        assert!(nodes[0].vx > 0.0);
        assert!(nodes[1].vx < 0.0);
    }

    #[test]
    fn test_many_body_repels() {
        let mut nodes = vec![node("a", 0.0, 0.0), node("b", 10.0, 0.0)];
        many_body(&mut nodes, &[-400.0, -400.0], 1.0, &mut Lcg::new());
        assert!(nodes[0].vx < 0.0);
        assert!(nodes[1].vx > 0.0);
    }

    #[test]
    fn test_center_moves_only_free_nodes() {
        let mut nodes = vec![node("a", 10.0, 10.0), node("b", 30.0, 10.0)];
        nodes[1].fx = Some(30.0);
        nodes[1].fy = Some(10.0);
        center(&mut nodes, 20.0, 20.0, 1.0);
        assert!((nodes[0].x - 20.0).abs() < 1e-9);
        assert!((nodes[0].y - 20.0).abs() < 1e-9);
        assert_eq!(nodes[1].x, 30.0);
    }

    #[test]
    fn test_collide_separates_coincident() {
        let mut nodes = vec![node("a", 5.0, 5.0), node("b", 5.0, 5.0)];
        collide(&mut nodes, &[85.0, 85.0], &mut Lcg::new());
        assert!(nodes[0].vx != 0.0 || nodes[0].vy != 0.0);
        assert!((nodes[0].vx + nodes[1].vx).abs() < 1e-6);
    }
}
