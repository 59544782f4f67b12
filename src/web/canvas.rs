//! Canvas painters. All geometry comes in pre-computed; this module only
//! strokes and fills.

use wasm_bindgen::{JsCast, JsValue};

use crate::chart::{ChartScene, PAD_LEFT, PAD_RIGHT};
use crate::ui_model::Theme;
use crate::wireframe::WireframeScene;

const TRACE_COLOR: &str = "#1fd1c7";
const LABEL_FONT: &str = "12px \"Avenir\", \"Gill Sans\", \"Trebuchet MS\", sans-serif";

fn grid_color(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "#e6e6e6",
        Theme::Dark => "#2a3442",
    }
}

fn label_color(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "#6a6a6a",
        Theme::Dark => "#93a1b0",
    }
}

pub(super) fn context_2d(
    canvas: &web_sys::HtmlCanvasElement,
) -> Result<web_sys::CanvasRenderingContext2d, String> {
    canvas
        .get_context("2d")
        .map_err(|_| "canvas: get_context threw".to_string())?
        .ok_or("canvas: missing 2d context".to_string())?
        .dyn_into::<web_sys::CanvasRenderingContext2d>()
        .map_err(|_| "canvas: context is not 2d".to_string())
}

#[allow(deprecated)]
pub(super) fn paint_chart(
    canvas: &web_sys::HtmlCanvasElement,
    scene: &ChartScene,
    theme: Theme,
) -> Result<(), String> {
    let ctx = context_2d(canvas)?;
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    ctx.clear_rect(0.0, 0.0, w, h);

    ctx.set_stroke_style(&JsValue::from_str(grid_color(theme)));
    ctx.set_line_width(1.0);
    ctx.set_font(LABEL_FONT);
    ctx.set_fill_style(&JsValue::from_str(label_color(theme)));
    for gridline in &scene.gridlines {
        ctx.begin_path();
        ctx.move_to(PAD_LEFT, gridline.y);
        ctx.line_to(w - PAD_RIGHT, gridline.y);
        ctx.stroke();
        if let Some(label) = &gridline.label {
            let _ = ctx.fill_text(label, 6.0, gridline.y + 4.0);
        }
    }

    ctx.set_stroke_style(&JsValue::from_str(TRACE_COLOR));
    ctx.set_line_width(2.0);
    ctx.begin_path();
    for (i, (x, y)) in scene.polyline.iter().enumerate() {
        if i == 0 {
            ctx.move_to(*x, *y);
        } else {
            ctx.line_to(*x, *y);
        }
    }
    ctx.stroke();
    Ok(())
}

#[allow(deprecated)]
pub(super) fn paint_wireframe(
    canvas: &web_sys::HtmlCanvasElement,
    scene: &WireframeScene,
) -> Result<(), String> {
    let ctx = context_2d(canvas)?;
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    ctx.clear_rect(0.0, 0.0, w, h);

    ctx.set_stroke_style(&JsValue::from_str(TRACE_COLOR));
    ctx.set_line_width(2.0);

    ctx.begin_path();
    ctx.move_to(scene.body[0].0, scene.body[0].1);
    for corner in &scene.body[1..] {
        ctx.line_to(corner.0, corner.1);
    }
    ctx.close_path();
    ctx.stroke();

    let (stem_top, stem_base) = scene.stem;
    ctx.begin_path();
    ctx.move_to(stem_top.0, stem_top.1);
    ctx.line_to(stem_base.0, stem_base.1);
    ctx.stroke();

    ctx.begin_path();
    ctx.arc(
        scene.wheel_center.0,
        scene.wheel_center.1,
        scene.wheel_radius,
        0.0,
        std::f64::consts::TAU,
    )
    .map_err(|_| "canvas: arc threw".to_string())?;
    ctx.stroke();

    let (ground_a, ground_b) = scene.ground;
    ctx.begin_path();
    ctx.move_to(ground_a.0, ground_a.1);
    ctx.line_to(ground_b.0, ground_b.1);
    ctx.stroke();
    Ok(())
}
