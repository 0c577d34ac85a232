//! Canvas 2D implementation of the engine's `Surface`.

use std::f64::consts::TAU;

use glam::Vec2;
use orrery_engine::renderer::{Ellipse, RadialGradient, Surface};
use orrery_engine::{Rgba, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement};

/// Paints into an attached `<canvas>`. Until a canvas is attached the surface
/// reports not ready and the renderer skips every frame.
pub struct CanvasSurface {
    target: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
    /// Device pixel ratio; drawing happens in logical pixels under this scale.
    scale: f64,
}

impl CanvasSurface {
    pub fn detached() -> Self {
        Self {
            target: None,
            scale: 1.0,
        }
    }

    pub fn attach(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            target: Some((canvas, ctx)),
            scale: 1.0,
        })
    }

    /// Size the backing store to the viewport's physical resolution.
    pub fn resize(&mut self, viewport: &Viewport) {
        self.scale = viewport.device_pixel_ratio() as f64;
        if let Some((canvas, _)) = &self.target {
            let (w, h) = viewport.pixel_size();
            canvas.set_width(w);
            canvas.set_height(h);
        }
    }

    fn ctx(&self) -> Option<&CanvasRenderingContext2d> {
        self.target.as_ref().map(|(_, ctx)| ctx)
    }

    fn ellipse_path(ctx: &CanvasRenderingContext2d, e: &Ellipse) -> Result<(), JsValue> {
        let (sin_r, cos_r) = (e.rotation as f64).sin_cos();
        let rx = e.radii.x as f64;
        ctx.move_to(e.center.x as f64 + rx * cos_r, e.center.y as f64 + rx * sin_r);
        ctx.ellipse(
            e.center.x as f64,
            e.center.y as f64,
            rx.max(0.0),
            (e.radii.y as f64).max(0.0),
            e.rotation as f64,
            0.0,
            TAU,
        )
    }
}

fn report(op: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("canvas {} failed: {:?}", op, e);
    }
}

impl Surface for CanvasSurface {
    fn is_ready(&self) -> bool {
        self.target
            .as_ref()
            .is_some_and(|(canvas, _)| canvas.width() > 0 && canvas.height() > 0)
    }

    fn clear(&mut self, color: Rgba) {
        let Some((canvas, ctx)) = &self.target else {
            return;
        };
        report(
            "set_transform",
            ctx.set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0),
        );
        ctx.set_fill_style_str(&color.to_css());
        ctx.fill_rect(
            0.0,
            0.0,
            canvas.width() as f64 / self.scale,
            canvas.height() as f64 / self.scale,
        );
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Rgba) {
        let Some(ctx) = self.ctx() else { return };
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        ctx.begin_path();
        ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            ctx.line_to(p.x as f64, p.y as f64);
        }
        if closed {
            ctx.close_path();
        }
        ctx.set_line_width(width as f64);
        ctx.set_stroke_style_str(&color.to_css());
        ctx.stroke();
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, gradient: &RadialGradient) {
        let Some(ctx) = self.ctx() else { return };
        if !(radius > 0.0) {
            return;
        }
        let fill = match ctx.create_radial_gradient(
            gradient.focus.x as f64,
            gradient.focus.y as f64,
            gradient.focus_radius as f64,
            gradient.center.x as f64,
            gradient.center.y as f64,
            gradient.radius as f64,
        ) {
            Ok(g) => g,
            Err(e) => {
                log::warn!("canvas gradient failed: {:?}", e);
                return;
            }
        };
        for stop in &gradient.stops {
            report("add_color_stop", fill.add_color_stop(stop.offset, &stop.color.to_css()));
        }
        ctx.begin_path();
        report(
            "arc",
            ctx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU),
        );
        ctx.set_fill_style_canvas_gradient(&fill);
        ctx.fill();
    }

    fn fill_annulus(&mut self, outer: &Ellipse, inner: &Ellipse, color: Rgba) {
        let Some(ctx) = self.ctx() else { return };
        ctx.begin_path();
        report("ellipse", Self::ellipse_path(ctx, outer));
        report("ellipse", Self::ellipse_path(ctx, inner));
        ctx.set_fill_style_str(&color.to_css());
        ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
    }

    fn stroke_ellipse(&mut self, ellipse: &Ellipse, width: f32, color: Rgba) {
        let Some(ctx) = self.ctx() else { return };
        ctx.begin_path();
        report("ellipse", Self::ellipse_path(ctx, ellipse));
        ctx.set_line_width(width as f64);
        ctx.set_stroke_style_str(&color.to_css());
        ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, size: f32, color: Rgba) {
        let Some(ctx) = self.ctx() else { return };
        ctx.set_font(&format!("{}px sans-serif", size));
        ctx.set_text_baseline("top");
        ctx.set_fill_style_str(&color.to_css());
        report("fill_text", ctx.fill_text(text, pos.x as f64, pos.y as f64));
    }
}
