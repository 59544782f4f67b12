//! Side-view wireframe of the robot: body rectangle on a stem over a wheel,
//! rotated rigidly about the wheel/ground contact axis.

use crate::state::UI_ANGLE_SCALE;

pub const BODY_W: f64 = 50.0;
pub const BODY_H: f64 = 180.0;
pub const STEM_H: f64 = 40.0;
pub const WHEEL_R: f64 = 28.0;
pub const GROUND_INSET: f64 = 14.0;
const GROUND_HALF_SPAN: f64 = 140.0;

/// Geometry for one wireframe frame. Coordinates are canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct WireframeScene {
    /// Body rectangle corners, clockwise from top-left.
    pub body: [(f64, f64); 4],
    /// Stem from the body's base toward the wheel hub.
    pub stem: ((f64, f64), (f64, f64)),
    pub wheel_center: (f64, f64),
    pub wheel_radius: f64,
    /// Ground line endpoints.
    pub ground: ((f64, f64), (f64, f64)),
}

fn rotate(p: (f64, f64), pivot: (f64, f64), rad: f64) -> (f64, f64) {
    let (dx, dy) = (p.0 - pivot.0, p.1 - pivot.1);
    let (sin, cos) = rad.sin_cos();
    (pivot.0 + dx * cos - dy * sin, pivot.1 + dx * sin + dy * cos)
}

/// Lay out the wireframe for `display_angle_deg` (telemetry angle plus any
/// kick offset) on a `width` x `height` canvas. The drawn rotation is the
/// angle times half the UI multiplier; the wheel and ground do not rotate.
pub fn layout(display_angle_deg: f64, width: f64, height: f64) -> WireframeScene {
    let rad = display_angle_deg * (UI_ANGLE_SCALE / 2.0) * std::f64::consts::PI / 180.0;

    let cx = width * 0.45;
    let ground_y = height - GROUND_INSET;
    let pivot = (cx, ground_y - WHEEL_R);

    let body_center_y = pivot.1 - WHEEL_R - STEM_H - BODY_H / 2.0 + 10.0;
    let (half_w, half_h) = (BODY_W / 2.0, BODY_H / 2.0);
    let body = [
        rotate((cx - half_w, body_center_y - half_h), pivot, rad),
        rotate((cx + half_w, body_center_y - half_h), pivot, rad),
        rotate((cx + half_w, body_center_y + half_h), pivot, rad),
        rotate((cx - half_w, body_center_y + half_h), pivot, rad),
    ];

    let stem_top = rotate((cx, pivot.1 - WHEEL_R - STEM_H + 10.0), pivot, rad);

    WireframeScene {
        body,
        stem: (stem_top, pivot),
        wheel_center: pivot,
        wheel_radius: WHEEL_R,
        ground: ((cx - GROUND_HALF_SPAN, ground_y), (cx + GROUND_HALF_SPAN, ground_y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 600.0;
    const H: f64 = 400.0;

    fn dist(a: (f64, f64), b: (f64, f64)) -> f64 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }

    #[test]
    fn zero_angle_is_upright_and_symmetric() {
        let scene = layout(0.0, W, H);
        let cx = W * 0.45;

        // Top edge horizontal, centered on the pivot column.
        assert!((scene.body[0].1 - scene.body[1].1).abs() < 1e-9);
        assert!((scene.body[0].0 - (cx - BODY_W / 2.0)).abs() < 1e-9);
        assert!((scene.body[1].0 - (cx + BODY_W / 2.0)).abs() < 1e-9);

        // Stem vertical, ending at the hub.
        assert!((scene.stem.0 .0 - cx).abs() < 1e-9);
        assert_eq!(scene.stem.1, scene.wheel_center);
    }

    #[test]
    fn wheel_and_ground_never_rotate() {
        let a = layout(0.0, W, H);
        let b = layout(25.0, W, H);
        assert_eq!(a.wheel_center, b.wheel_center);
        assert_eq!(a.wheel_radius, b.wheel_radius);
        assert_eq!(a.ground, b.ground);
        assert_eq!(a.wheel_center.1, H - GROUND_INSET - WHEEL_R);
    }

    #[test]
    fn rotation_preserves_distance_to_pivot() {
        let upright = layout(0.0, W, H);
        let tilted = layout(10.0, W, H);
        for i in 0..4 {
            let d0 = dist(upright.body[i], upright.wheel_center);
            let d1 = dist(tilted.body[i], tilted.wheel_center);
            assert!((d0 - d1).abs() < 1e-9);
        }
        let s0 = dist(upright.stem.0, upright.wheel_center);
        let s1 = dist(tilted.stem.0, tilted.wheel_center);
        assert!((s0 - s1).abs() < 1e-9);
    }

    #[test]
    fn drawn_rotation_is_half_the_ui_multiplier() {
        // 10 degrees of tilt draws as 10 * (6/2) = 30 degrees.
        let scene = layout(10.0, W, H);
        let pivot = scene.wheel_center;
        let top = scene.stem.0;
        let drawn = (top.0 - pivot.0).atan2(pivot.1 - top.1).to_degrees();
        assert!((drawn - 30.0).abs() < 1e-9);
    }

    #[test]
    fn opposite_angles_mirror_about_the_pivot_column() {
        let left = layout(-15.0, W, H);
        let right = layout(15.0, W, H);
        let cx = W * 0.45;
        assert!((left.stem.0 .0 - cx + (right.stem.0 .0 - cx)).abs() < 1e-9);
        assert!((left.stem.0 .1 - right.stem.0 .1).abs() < 1e-9);
    }
}
