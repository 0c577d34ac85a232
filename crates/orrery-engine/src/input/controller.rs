//! Camera interaction state machine.
//!
//! Pointer and touch events move the controller between `Idle`, `Dragging`
//! and `Pinching`; wheel events bypass the states. Transitions are a pure
//! function of `(state, event, camera)`, and only the camera is ever changed.

use glam::Vec2;

use crate::api::config::ViewConfig;
use crate::input::event::{InputEvent, Touches};
use crate::renderer::camera::Camera;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        origin: Vec2,
        origin_azimuth: f32,
        origin_elevation: f32,
    },
    Pinching {
        origin_spread: f32,
        origin_distance: f32,
    },
}

impl InteractionState {
    fn drag_from(origin: Vec2, camera: &Camera) -> Self {
        Self::Dragging {
            origin,
            origin_azimuth: camera.azimuth(),
            origin_elevation: camera.elevation(),
        }
    }

    fn pinch_from(touches: &Touches, camera: &Camera) -> Self {
        match touches.spread() {
            Some(spread) => Self::Pinching {
                origin_spread: spread,
                origin_distance: camera.distance(),
            },
            None => Self::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Camera orientation for a drag from `state`'s origin to `pos`.
fn dragged(camera: &Camera, state: &InteractionState, pos: Vec2, config: &ViewConfig) -> Camera {
    let mut next = *camera;
    if let InteractionState::Dragging {
        origin,
        origin_azimuth,
        origin_elevation,
    } = *state
    {
        let delta = pos - origin;
        next.set_azimuth(origin_azimuth + delta.x * config.drag_azimuth_sensitivity);
        next.set_elevation(origin_elevation + delta.y * config.drag_elevation_sensitivity);
    }
    next
}

/// Camera distance for a pinch whose finger spread is now `spread`.
/// Fingers moving together zoom out.
fn pinched(camera: &Camera, state: &InteractionState, spread: f32, config: &ViewConfig) -> Camera {
    let mut next = *camera;
    if let InteractionState::Pinching {
        origin_spread,
        origin_distance,
    } = *state
    {
        next.set_distance(origin_distance + (origin_spread - spread) * config.pinch_sensitivity);
    }
    next
}

/// Apply one event. Returns the next state and the updated camera.
pub fn step(
    state: InteractionState,
    event: &InputEvent,
    camera: &Camera,
    config: &ViewConfig,
) -> (InteractionState, Camera) {
    use InteractionState::*;

    match (*event, state) {
        (InputEvent::Wheel { delta_y }, _) => {
            let mut next = *camera;
            if delta_y.is_finite() {
                next.set_distance(camera.distance() + delta_y * config.wheel_sensitivity);
            }
            (state, next)
        }

        // ── Mouse ──
        (InputEvent::PointerDown { .. }, Pinching { .. }) => (state, *camera),
        (InputEvent::PointerDown { x, y }, _) => {
            (InteractionState::drag_from(Vec2::new(x, y), camera), *camera)
        }
        (InputEvent::PointerMove { x, y }, Dragging { .. }) => {
            (state, dragged(camera, &state, Vec2::new(x, y), config))
        }
        (InputEvent::PointerMove { .. }, _) => (state, *camera),
        (InputEvent::PointerUp { .. }, Pinching { .. }) => (state, *camera),
        (InputEvent::PointerUp { .. }, _) => (Idle, *camera),

        // ── Touch ──
        (InputEvent::TouchStart { touches }, _) if touches.count() >= 2 => {
            (InteractionState::pinch_from(&touches, camera), *camera)
        }
        (InputEvent::TouchStart { touches }, Idle | Dragging { .. }) => match touches.first() {
            Some(p) => (InteractionState::drag_from(p, camera), *camera),
            None => (Idle, *camera),
        },
        (InputEvent::TouchStart { .. }, Pinching { .. }) => (Idle, *camera),

        (InputEvent::TouchMove { touches }, Pinching { .. }) => match touches.spread() {
            Some(spread) => (state, pinched(camera, &state, spread, config)),
            None => (Idle, *camera),
        },
        (InputEvent::TouchMove { touches }, _) if touches.count() >= 2 => {
            (InteractionState::pinch_from(&touches, camera), *camera)
        }
        (InputEvent::TouchMove { touches }, Dragging { .. }) => match touches.first() {
            Some(p) => (state, dragged(camera, &state, p, config)),
            None => (Idle, *camera),
        },
        (InputEvent::TouchMove { .. }, Idle) => (Idle, *camera),

        (InputEvent::TouchEnd { touches }, Pinching { .. }) if touches.count() >= 2 => {
            (state, *camera)
        }
        (InputEvent::TouchEnd { .. }, _) => (Idle, *camera),
    }
}

/// Owns the interaction state and applies events to a camera.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    state: InteractionState,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn handle(&mut self, event: &InputEvent, camera: &mut Camera, config: &ViewConfig) {
        let (next_state, next_camera) = step(self.state, event, camera, config);
        if next_state != self.state {
            log::trace!("interaction {:?} -> {:?}", self.state, next_state);
        }
        self.state = next_state;
        *camera = next_camera;
    }

    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }
}
