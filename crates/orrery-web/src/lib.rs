//! WASM bridge for the orrery view.
//!
//! The view lives in a `thread_local!` because wasm-bindgen cannot export a
//! stateful struct with a frame loop attached. JavaScript calls the free
//! functions below; the rAF loop started by `view_start` ticks the view and
//! paints it onto the attached canvas.

pub mod canvas;
pub mod frame_loop;

use std::cell::RefCell;

use orrery_engine::{InputEvent, OrreryView, Touches, ViewConfig};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::canvas::CanvasSurface;
use crate::frame_loop::FrameLoop;

thread_local! {
    static VIEW: RefCell<Option<OrreryView>> = const { RefCell::new(None) };
    static SURFACE: RefCell<CanvasSurface> = RefCell::new(CanvasSurface::detached());
    static FRAME_LOOP: RefCell<Option<FrameLoop>> = const { RefCell::new(None) };
}

/// Run `f` against the view. Logs and returns `None` before `view_init`.
fn with_view<R>(f: impl FnOnce(&mut OrreryView) -> R) -> Option<R> {
    VIEW.with(|cell| match cell.borrow_mut().as_mut() {
        Some(view) => Some(f(view)),
        None => {
            log::warn!("orrery view not initialized; call view_init() first");
            None
        }
    })
}

fn push(event: InputEvent) {
    with_view(|v| v.handle_input(event));
}

fn touches(count: u32, x0: f32, y0: f32, x1: f32, y1: f32) -> Touches {
    Touches::from_raw(count, glam::Vec2::new(x0, y0), glam::Vec2::new(x1, y1))
}

/// JS timestamps arrive as f64 milliseconds.
fn epoch_ms(ms: f64) -> u64 {
    if ms.is_finite() && ms > 0.0 {
        ms as u64
    } else {
        0
    }
}

fn frame(dt: f64) {
    VIEW.with(|view| {
        SURFACE.with(|surface| {
            if let Some(view) = view.borrow_mut().as_mut() {
                view.tick(dt, &mut *surface.borrow_mut());
            }
        })
    });
}

// ---- Lifecycle ----

/// Create the view. `config_json` optionally overrides tunables; invalid JSON
/// keeps the defaults.
#[wasm_bindgen]
pub fn view_init(width: f32, height: f32, dpr: f32, config_json: Option<String>) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = match config_json.as_deref().map(ViewConfig::from_json) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            log::warn!("view config rejected, using defaults: {}", e);
            ViewConfig::default()
        }
        None => ViewConfig::default(),
    };

    view_stop();
    let view = OrreryView::new(config, width, height, dpr);
    SURFACE.with(|s| s.borrow_mut().resize(view.viewport()));
    VIEW.with(|cell| *cell.borrow_mut() = Some(view));
    log::info!("orrery: initialized");
}

#[wasm_bindgen]
pub fn view_attach_canvas(canvas: HtmlCanvasElement) -> Result<(), JsValue> {
    let mut surface = CanvasSurface::attach(canvas)?;
    with_view(|v| surface.resize(v.viewport()));
    SURFACE.with(|s| *s.borrow_mut() = surface);
    Ok(())
}

/// Start (or restart) the animation loop.
#[wasm_bindgen]
pub fn view_start() -> Result<(), JsValue> {
    let Some(token) = with_view(|v| v.start_loop()) else {
        return Ok(());
    };
    let frame_loop = match FrameLoop::start(token, frame) {
        Ok(frame_loop) => frame_loop,
        Err(e) => {
            // Nothing will tick the handle; don't report a running loop.
            with_view(|v| v.stop_loop());
            return Err(e);
        }
    };
    FRAME_LOOP.with(|cell| *cell.borrow_mut() = Some(frame_loop));
    Ok(())
}

#[wasm_bindgen]
pub fn view_stop() {
    VIEW.with(|cell| {
        if let Some(view) = cell.borrow_mut().as_mut() {
            view.stop_loop();
        }
    });
    FRAME_LOOP.with(|cell| cell.borrow_mut().take());
}

#[wasm_bindgen]
pub fn view_resize(width: f32, height: f32, dpr: f32) {
    with_view(|v| {
        v.resize(width, height, dpr);
        SURFACE.with(|s| s.borrow_mut().resize(v.viewport()));
    });
}

// ---- Input ----

#[wasm_bindgen]
pub fn view_pointer_down(x: f32, y: f32) {
    push(InputEvent::PointerDown { x, y });
}

#[wasm_bindgen]
pub fn view_pointer_move(x: f32, y: f32) {
    push(InputEvent::PointerMove { x, y });
}

#[wasm_bindgen]
pub fn view_pointer_up(x: f32, y: f32) {
    push(InputEvent::PointerUp { x, y });
}

#[wasm_bindgen]
pub fn view_touch_start(count: u32, x0: f32, y0: f32, x1: f32, y1: f32) {
    push(InputEvent::TouchStart { touches: touches(count, x0, y0, x1, y1) });
}

#[wasm_bindgen]
pub fn view_touch_move(count: u32, x0: f32, y0: f32, x1: f32, y1: f32) {
    push(InputEvent::TouchMove { touches: touches(count, x0, y0, x1, y1) });
}

/// `count` is the number of contacts still down.
#[wasm_bindgen]
pub fn view_touch_end(count: u32, x0: f32, y0: f32, x1: f32, y1: f32) {
    push(InputEvent::TouchEnd { touches: touches(count, x0, y0, x1, y1) });
}

#[wasm_bindgen]
pub fn view_wheel(delta_y: f32) {
    push(InputEvent::Wheel { delta_y });
}

// ---- Controls ----

#[wasm_bindgen]
pub fn view_set_planet_count(count: u32) {
    with_view(|v| v.set_planet_count(count as usize));
}

#[wasm_bindgen]
pub fn view_set_star_color(hex: &str) -> bool {
    with_view(|v| v.set_star_color(hex)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn view_set_star_size(size: f32) {
    with_view(|v| v.set_star_size(size));
}

#[wasm_bindgen]
pub fn view_set_planet_color(index: u32, hex: &str) -> bool {
    with_view(|v| v.set_planet_color(index as usize, hex)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn view_set_planet_size(index: u32, size: f32) {
    with_view(|v| v.set_planet_size(index as usize, size));
}

#[wasm_bindgen]
pub fn view_set_planet_rings(index: u32, has_rings: bool) {
    with_view(|v| v.set_planet_rings(index as usize, has_rings));
}

#[wasm_bindgen]
pub fn view_set_planet_ring_tilt(index: u32, degrees: f32) {
    with_view(|v| v.set_planet_ring_tilt(index as usize, degrees));
}

#[wasm_bindgen]
pub fn view_set_show_orbits(show: bool) {
    with_view(|v| v.set_show_orbits(show));
}

#[wasm_bindgen]
pub fn view_set_speed(speed: f32) {
    with_view(|v| v.set_speed(speed));
}

#[wasm_bindgen]
pub fn view_set_label(label: &str) {
    with_view(|v| v.set_label(label));
}

#[wasm_bindgen]
pub fn view_randomize(seed: f64) {
    let seed = epoch_ms(seed);
    with_view(|v| v.randomize(seed));
}

#[wasm_bindgen]
pub fn view_reset_camera() {
    with_view(|v| v.reset_camera());
}

// ---- Persistence ----

/// Serialize the scene for the store. Report the outcome with
/// `view_save_finished`.
#[wasm_bindgen]
pub fn view_save(now_ms: f64) -> String {
    with_view(|v| v.save_document(epoch_ms(now_ms))).unwrap_or_default()
}

#[wasm_bindgen]
pub fn view_save_finished(ok: bool) {
    with_view(|v| v.finish_save(ok));
}

/// One of `idle`, `saving`, `saved`, `error`.
#[wasm_bindgen]
pub fn view_status() -> String {
    with_view(|v| v.status().as_str().to_string()).unwrap_or_else(|| "idle".to_string())
}

#[wasm_bindgen]
pub fn view_load(json: &str) {
    with_view(|v| v.load_document(json));
}

// ---- Export ----

/// PNG bytes of the current frame; empty when encoding fails.
#[cfg(feature = "raster")]
#[wasm_bindgen]
pub fn view_export_png() -> Vec<u8> {
    with_view(|v| match v.snapshot_png() {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("snapshot export failed: {}", e);
            Vec::new()
        }
    })
    .unwrap_or_default()
}

#[wasm_bindgen]
pub fn view_export_filename(now_ms: f64) -> String {
    OrreryView::snapshot_filename(epoch_ms(now_ms))
}
