//! Zoom and pan math on `ZoomTransform`.

use crate::config::LayoutConfig;
use crate::types::{NodeKind, Point, ZoomTransform};

/// Scale by `factor` keeping the graph point under `anchor` (screen) fixed.
/// The resulting scale is clamped to the configured extent.
pub fn zoom_at(t: &ZoomTransform, anchor: Point, factor: f64, config: &LayoutConfig) -> ZoomTransform {
    let k = config.clamp_zoom(t.k * factor);
    let graph = t.screen_to_graph(anchor);
    ZoomTransform {
        x: anchor.x - graph.x * k,
        y: anchor.y - graph.y * k,
        k,
    }
}

pub fn zoom_in(t: &ZoomTransform, width: f64, height: f64, config: &LayoutConfig) -> ZoomTransform {
    zoom_at(t, Point::new(width / 2.0, height / 2.0), config.zoom_in_factor, config)
}

pub fn zoom_out(t: &ZoomTransform, width: f64, height: f64, config: &LayoutConfig) -> ZoomTransform {
    zoom_at(t, Point::new(width / 2.0, height / 2.0), config.zoom_out_factor, config)
}

/// One wheel notch. Scrolling down (`delta_y > 0`) zooms out.
pub fn wheel(t: &ZoomTransform, anchor: Point, delta_y: f64, config: &LayoutConfig) -> ZoomTransform {
    if delta_y == 0.0 {
        return *t;
    }
    let factor = if delta_y > 0.0 {
        1.0 / config.wheel_factor
    } else {
        config.wheel_factor
    };
    zoom_at(t, anchor, factor, config)
}

pub fn pan_by(t: &ZoomTransform, dx: f64, dy: f64) -> ZoomTransform {
    ZoomTransform {
        x: t.x + dx,
        y: t.y + dy,
        k: t.k,
    }
}

/// Frame every node: bounding box of the centers grown by each node's
/// half-extent and a fixed padding, scaled to at most `fit_max_fraction`
/// of the viewport on both axes and centered. `None` without nodes.
pub fn fit_to_view(
    nodes: &[(Point, NodeKind)],
    width: f64,
    height: f64,
    config: &LayoutConfig,
) -> Option<ZoomTransform> {
    if nodes.is_empty() {
        return None;
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (p, kind) in nodes {
        let e = config.half_extent(*kind);
        min_x = min_x.min(p.x - e.w);
        max_x = max_x.max(p.x + e.w);
        min_y = min_y.min(p.y - e.h);
        max_y = max_y.max(p.y + e.h);
    }
    min_x -= config.fit_padding;
    min_y -= config.fit_padding;
    max_x += config.fit_padding;
    max_y += config.fit_padding;

    let bw = max_x - min_x;
    let bh = max_y - min_y;
    let k = config.clamp_zoom(
        (config.fit_max_fraction * width / bw).min(config.fit_max_fraction * height / bh),
    );
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    Some(ZoomTransform {
        x: width / 2.0 - cx * k,
        y: height / 2.0 - cy * k,
        k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_zoom_in_out_around_center() {
        let c = LayoutConfig::default();
        let t = zoom_in(&ZoomTransform::IDENTITY, 800.0, 600.0, &c);
        assert!(approx(t.k, 1.3));
        // The viewport center stays on the same graph point.
        let center = t.screen_to_graph(Point::new(400.0, 300.0));
        assert!(approx(center.x, 400.0) && approx(center.y, 300.0));

        let t = zoom_out(&ZoomTransform::IDENTITY, 800.0, 600.0, &c);
        assert!(approx(t.k, 0.7));
    }

    #[test]
    fn test_zoom_clamped() {
        let c = LayoutConfig::default();
        let mut t = ZoomTransform::IDENTITY;
        for _ in 0..20 {
            t = zoom_in(&t, 800.0, 600.0, &c);
        }
        assert!(approx(t.k, 3.0));
        for _ in 0..40 {
            t = wheel(&t, Point::new(10.0, 10.0), 120.0, &c);
        }
        assert!(approx(t.k, 0.3));
    }

    #[test]
    fn test_wheel_anchor_fixed() {
        let c = LayoutConfig::default();
        let anchor = Point::new(123.0, 45.0);
        let before = ZoomTransform::IDENTITY.screen_to_graph(anchor);
        let t = wheel(&ZoomTransform::IDENTITY, anchor, -1.0, &c);
        let after = t.screen_to_graph(anchor);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
    }

    #[test]
    fn test_pan() {
        let t = pan_by(&ZoomTransform::IDENTITY, 5.0, -3.0);
        assert_eq!(t, ZoomTransform { x: 5.0, y: -3.0, k: 1.0 });
    }

    #[test]
    fn test_fit_to_view() {
        let c = LayoutConfig::default();
        assert_eq!(fit_to_view(&[], 800.0, 600.0, &c), None);

        // Hub alone: box 200x140 + 2*50 padding = 300x240.
        let t = fit_to_view(&[(Point::new(0.0, 0.0), NodeKind::Hub)], 800.0, 600.0, &c).unwrap();
        let expected = (0.9 * 800.0 / 300.0f64).min(0.9 * 600.0 / 240.0);
        assert!(approx(t.k, expected));
        assert!(approx(t.x, 400.0) && approx(t.y, 300.0));

        // Spread far apart: clamped to the minimum scale.
        let wide = [
            (Point::new(-5000.0, 0.0), NodeKind::Contact),
            (Point::new(5000.0, 0.0), NodeKind::Contact),
        ];
        let t = fit_to_view(&wide, 800.0, 600.0, &c).unwrap();
        assert!(approx(t.k, 0.3));
    }
}
