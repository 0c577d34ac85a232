//! `requestAnimationFrame` loop driven by an engine `LoopToken`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use orrery_engine::LoopToken;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A running rAF loop. Each frame calls `on_frame` with the delta since the
/// previous frame in seconds. The loop stops scheduling once its token dies,
/// and dropping the `FrameLoop` cancels the pending frame and frees the
/// callback.
pub struct FrameLoop {
    callback: FrameCallback,
    pending: Rc<Cell<Option<i32>>>,
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

impl FrameLoop {
    pub fn start(token: LoopToken, mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));

        let next = callback.clone();
        let slot = pending.clone();
        let mut last_ms: Option<f64> = None;
        *callback.borrow_mut() = Some(Closure::new(move |now_ms: f64| {
            slot.set(None);
            if !token.is_live() {
                return;
            }
            let dt = last_ms.map_or(0.0, |last| (now_ms - last) / 1000.0);
            last_ms = Some(now_ms);
            on_frame(dt);

            // on_frame may have stopped the loop.
            if !token.is_live() {
                return;
            }
            if let Some(cb) = next.borrow().as_ref() {
                match request_frame(cb) {
                    Ok(id) => slot.set(Some(id)),
                    Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
                }
            }
        }));

        // On error the loop drops here, which frees the callback.
        let frame_loop = Self { callback, pending };
        let first = frame_loop.callback.borrow().as_ref().map(request_frame).transpose()?;
        frame_loop.pending.set(first);
        Ok(frame_loop)
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(id) = self.pending.take() {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.cancel_animation_frame(id) {
                    log::warn!("cancelAnimationFrame failed: {:?}", e);
                }
            }
        }
        // Breaks the callback -> cell reference cycle.
        self.callback.borrow_mut().take();
    }
}
