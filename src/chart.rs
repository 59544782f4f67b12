//! Strip-chart layout for the angle history.
//!
//! All geometry is computed here against plain dimensions so the math is
//! testable on the host; the wasm side only has to stroke what it is given.

use crate::float_fmt::fmt_f64_fixed;
use crate::state::{MAX_POINTS, UI_ANGLE_SCALE};

pub const PAD_LEFT: f64 = 46.0;
pub const PAD_RIGHT: f64 = 6.0;

/// Minimum vertical distance between two tick labels before the later one is
/// dropped.
const LABEL_MIN_GAP: f64 = 14.0;

/// One horizontal gridline. `label` is `None` when the line is drawn but its
/// label would collide with the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Gridline {
    pub y: f64,
    pub label: Option<String>,
}

/// Everything needed to paint one chart frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartScene {
    pub scale: f64,
    pub gridlines: Vec<Gridline>,
    pub polyline: Vec<(f64, f64)>,
}

/// Pixels per degree: the fixed UI multiplier, shrunk when the largest sample
/// would otherwise leave the canvas.
pub fn vertical_scale(max_abs: f64, height: f64) -> f64 {
    if max_abs > 0.0 {
        UI_ANGLE_SCALE.min(height * 0.45 / max_abs)
    } else {
        UI_ANGLE_SCALE
    }
}

/// Round up to a 1/2/5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let exp = raw.log10().floor();
    let base = raw / 10f64.powf(exp);
    let nice = if base >= 5.0 {
        5.0
    } else if base >= 2.0 {
        2.0
    } else {
        1.0
    };
    nice * 10f64.powf(exp)
}

/// Lay out gridlines and the sample polyline for a `width` x `height` canvas.
pub fn layout(samples: &[f64], width: f64, height: f64) -> ChartScene {
    let max_abs = samples.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let scale = vertical_scale(max_abs, height);

    let usable_width = width - PAD_LEFT - PAD_RIGHT;
    let mid_y = height / 2.0;

    // Ticks cover the largest angle still on screen at this scale, snapped to
    // a nice step, symmetric about zero.
    let max_visible_deg = height * 0.45 / scale;
    let max_ticks = ((height / 40.0).floor()).clamp(4.0, 6.0);
    let step = nice_step(max_visible_deg / max_ticks);
    let tick_count = (max_visible_deg / step).ceil() as i64;

    let mut gridlines = Vec::new();
    let mut last_label_y: Option<f64> = None;
    for i in -tick_count..=tick_count {
        let t = i as f64 * step;
        let y = mid_y - t * scale;
        if y < 0.0 || y > height {
            continue;
        }
        let label = match last_label_y {
            Some(prev) if (y - prev).abs() <= LABEL_MIN_GAP => None,
            _ => {
                last_label_y = Some(y);
                Some(format!("{}\u{b0}", fmt_f64_fixed(t, 1)))
            }
        };
        gridlines.push(Gridline { y, label });
    }

    // Samples advance left to right over the full history capacity, so a
    // partially filled buffer occupies only the left portion.
    let polyline = samples
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = PAD_LEFT + (i as f64 / (MAX_POINTS - 1) as f64) * usable_width;
            let y = mid_y - v * scale;
            (x, y)
        })
        .collect();

    ChartScene {
        scale,
        gridlines,
        polyline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_fixed_until_samples_would_clip() {
        // Empty history and small angles use the full multiplier.
        assert_eq!(vertical_scale(0.0, 300.0), UI_ANGLE_SCALE);
        assert_eq!(vertical_scale(10.0, 300.0), UI_ANGLE_SCALE);

        // 0.45 * 300 / 45 = 3.0 pixels per degree.
        assert_eq!(vertical_scale(45.0, 300.0), 3.0);

        // Boundary: exactly at the clip point the multiplier still fits.
        let h = 300.0;
        let max_abs = h * 0.45 / UI_ANGLE_SCALE;
        assert_eq!(vertical_scale(max_abs, h), UI_ANGLE_SCALE);
    }

    #[test]
    fn nice_step_snaps_to_1_2_5() {
        assert_eq!(nice_step(0.7), 1.0);
        assert_eq!(nice_step(1.0), 1.0);
        assert_eq!(nice_step(1.9), 1.0);
        assert_eq!(nice_step(2.0), 2.0);
        assert_eq!(nice_step(4.9), 2.0);
        assert_eq!(nice_step(5.0), 5.0);
        assert_eq!(nice_step(9.0), 5.0);
        assert_eq!(nice_step(23.0), 20.0);
        assert_eq!(nice_step(0.0), 1.0);
        assert_eq!(nice_step(-3.0), 1.0);
    }

    #[test]
    fn gridlines_are_symmetric_and_on_canvas() {
        let scene = layout(&[5.0, -5.0], 600.0, 300.0);
        assert!(!scene.gridlines.is_empty());
        for g in &scene.gridlines {
            assert!(g.y >= 0.0 && g.y <= 300.0);
        }
        // The zero line sits at mid height.
        assert!(scene
            .gridlines
            .iter()
            .any(|g| (g.y - 150.0).abs() < 1e-9));
    }

    #[test]
    fn labels_are_decluttered() {
        let scene = layout(&[1.0], 600.0, 300.0);
        let labelled: Vec<f64> = scene
            .gridlines
            .iter()
            .filter(|g| g.label.is_some())
            .map(|g| g.y)
            .collect();
        for pair in labelled.windows(2) {
            assert!((pair[1] - pair[0]).abs() > LABEL_MIN_GAP);
        }
    }

    #[test]
    fn labels_use_one_decimal_and_degree_sign() {
        let scene = layout(&[1.0], 600.0, 300.0);
        let zero = scene
            .gridlines
            .iter()
            .find(|g| (g.y - 150.0).abs() < 1e-9)
            .unwrap();
        assert_eq!(zero.label.as_deref(), Some("0.0\u{b0}"));
    }

    #[test]
    fn polyline_spans_capacity_not_sample_count() {
        let samples: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
        let scene = layout(&samples, 600.0, 300.0);
        assert_eq!(scene.polyline.len(), 50);

        let usable = 600.0 - PAD_LEFT - PAD_RIGHT;
        assert_eq!(scene.polyline[0].0, PAD_LEFT);
        let expected_last = PAD_LEFT + (49.0 / (MAX_POINTS - 1) as f64) * usable;
        assert!((scene.polyline[49].0 - expected_last).abs() < 1e-9);
        // Half-full buffer stays well inside the left half.
        assert!(scene.polyline[49].0 < PAD_LEFT + usable / 2.0);
    }

    #[test]
    fn polyline_y_follows_scale() {
        let scene = layout(&[2.0], 600.0, 300.0);
        let (_, y) = scene.polyline[0];
        assert!((y - (150.0 - 2.0 * scene.scale)).abs() < 1e-9);
    }
}
