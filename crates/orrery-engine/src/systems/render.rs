//! Frame building and painting.
//!
//! Builds every drawable for one frame from the scene, camera and time, sorts
//! bodies back-to-front (painter's algorithm, no z-buffer), and paints them.
//! Orbit paths are painted before any body so bodies always cover them.

use glam::{Vec2, Vec3};

use crate::api::config::ViewConfig;
use crate::api::types::Rgba;
use crate::core::orbit::{orbit_radius, scene_positions};
use crate::core::scene::Scene;
use crate::renderer::camera::{project, Camera, Viewport};
use crate::renderer::traits::{Ellipse, GradientStop, RadialGradient, Surface};
use crate::systems::ring::project_ring_pair;

/// Top-left corner of the label, in logical pixels.
pub const LABEL_POS: Vec2 = Vec2::new(12.0, 12.0);

/// Fraction of the radius the planet highlight sits toward the star.
const PLANET_HIGHLIGHT_OFFSET: f32 = 0.4;
/// Fixed star highlight offset (fraction of radius, up-left).
const STAR_HIGHLIGHT_OFFSET: Vec2 = Vec2::new(-0.3, -0.3);
const HIGHLIGHT_MIX: f32 = 0.85;
const PLANET_EDGE_DARKEN: f32 = 0.25;
const STAR_EDGE_DARKEN: f32 = 0.7;
const RING_FILL_ALPHA: f32 = 0.55;
const RING_STROKE_ALPHA: f32 = 0.8;

/// What a draw item depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Star,
    Planet { orbit_index: usize },
    Ring { orbit_index: usize },
}

/// Screen-space shape of a draw item.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Disc {
        center: Vec2,
        radius: f32,
        gradient: RadialGradient,
    },
    Annulus {
        outer: Ellipse,
        inner: Ellipse,
        fill: Rgba,
        stroke: Rgba,
        stroke_width: f32,
    },
}

/// One depth-sorted body primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub depth: f32,
    pub kind: BodyKind,
    pub shape: Shape,
}

/// Everything painted in one frame, already in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub background: Rgba,
    pub orbit_paths: Vec<Vec<Vec2>>,
    pub orbit_color: Rgba,
    pub orbit_width: f32,
    /// Bodies sorted back-to-front.
    pub items: Vec<DrawItem>,
    pub label: Option<String>,
    pub label_size: f32,
    pub label_color: Rgba,
}

impl Frame {
    pub fn paint(&self, surface: &mut impl Surface) {
        surface.clear(self.background);

        for path in &self.orbit_paths {
            surface.stroke_polyline(path, true, self.orbit_width, self.orbit_color);
        }

        for item in &self.items {
            match &item.shape {
                Shape::Disc {
                    center,
                    radius,
                    gradient,
                } => surface.fill_disc(*center, *radius, gradient),
                Shape::Annulus {
                    outer,
                    inner,
                    fill,
                    stroke,
                    stroke_width,
                } => {
                    surface.fill_annulus(outer, inner, *fill);
                    surface.stroke_ellipse(outer, *stroke_width, *stroke);
                }
            }
        }

        if let Some(label) = &self.label {
            surface.fill_text(label, LABEL_POS, self.label_size, self.label_color);
        }
    }
}

/// Sort back-to-front: larger depth first. Stable, so equal depths keep
/// insertion order.
pub fn sort_back_to_front(items: &mut [DrawItem]) {
    items.sort_by(|a, b| b.depth.partial_cmp(&a.depth).unwrap_or(std::cmp::Ordering::Equal));
}

/// Closed polyline approximating an orbit circle in the y = 0 plane.
pub fn orbit_path(radius: f32, samples: usize, camera: &Camera, viewport: &Viewport) -> Vec<Vec2> {
    let samples = samples.max(3);
    (0..samples)
        .map(|i| {
            let a = i as f32 / samples as f32 * std::f32::consts::TAU;
            let world = Vec3::new(radius * a.cos(), 0.0, radius * a.sin());
            project(world, camera, viewport).pos
        })
        .collect()
}

/// Screen-space light direction for a body: unit vector from the star's
/// projected position to the body's. Zero when they coincide.
pub fn light_direction(star_pos: Vec2, body_pos: Vec2) -> Vec2 {
    (body_pos - star_pos).normalize_or_zero()
}

fn planet_gradient(center: Vec2, radius: f32, light_dir: Vec2, base: Rgba) -> RadialGradient {
    let focus = center - light_dir * radius * PLANET_HIGHLIGHT_OFFSET;
    RadialGradient {
        focus,
        focus_radius: radius * 0.1,
        center,
        radius,
        stops: [
            GradientStop { offset: 0.0, color: base.mix(Rgba::WHITE, HIGHLIGHT_MIX) },
            GradientStop { offset: 0.35, color: base },
            GradientStop { offset: 1.0, color: base.darken(PLANET_EDGE_DARKEN) },
        ],
    }
}

fn star_gradient(center: Vec2, radius: f32, base: Rgba) -> RadialGradient {
    RadialGradient {
        focus: center + STAR_HIGHLIGHT_OFFSET * radius,
        focus_radius: radius * 0.1,
        center,
        radius,
        stops: [
            GradientStop { offset: 0.0, color: base.mix(Rgba::WHITE, HIGHLIGHT_MIX) },
            GradientStop { offset: 0.5, color: base },
            GradientStop { offset: 1.0, color: base.darken(STAR_EDGE_DARKEN) },
        ],
    }
}

/// Build the frame for `scene` at simulation `time`.
pub fn build_frame(
    scene: &Scene,
    camera: &Camera,
    time: f64,
    viewport: &Viewport,
    config: &ViewConfig,
) -> Frame {
    let orbit_paths = if scene.show_orbits {
        (0..scene.planet_count())
            .map(|i| {
                let r = orbit_radius(i, scene.star.size(), config.gap);
                orbit_path(r, config.orbit_samples, camera, viewport)
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut items = Vec::with_capacity(1 + scene.planet_count() * 2);

    let star = project(Vec3::ZERO, camera, viewport);
    let star_radius = scene.star.size() * star.scale;
    items.push(DrawItem {
        depth: star.depth,
        kind: BodyKind::Star,
        shape: Shape::Disc {
            center: star.pos,
            radius: star_radius,
            gradient: star_gradient(star.pos, star_radius, scene.star.color.to_rgba()),
        },
    });

    let positions = scene_positions(scene, config, time);
    for (orbit_index, (planet, world)) in scene.planets().iter().zip(positions).enumerate() {
        let proj = project(world, camera, viewport);
        let radius = planet.size() * proj.scale;
        let base = planet.color.to_rgba();

        // Rings go in before their planet; equal depths keep that order, so
        // the planet paints over its own ring.
        if planet.has_rings {
            let rings = project_ring_pair(
                world,
                planet.size(),
                planet.ring_tilt(),
                config.ring_inner_factor,
                config.ring_outer_factor,
                camera,
                viewport,
            );
            let tint = base.mix(Rgba::WHITE, 0.3);
            items.push(DrawItem {
                depth: proj.depth,
                kind: BodyKind::Ring { orbit_index },
                shape: Shape::Annulus {
                    outer: rings.outer,
                    inner: rings.inner,
                    fill: tint.with_alpha(RING_FILL_ALPHA),
                    stroke: tint.with_alpha(RING_STROKE_ALPHA),
                    stroke_width: config.ring_line_width,
                },
            });
        }

        let light = light_direction(star.pos, proj.pos);
        items.push(DrawItem {
            depth: proj.depth,
            kind: BodyKind::Planet { orbit_index },
            shape: Shape::Disc {
                center: proj.pos,
                radius,
                gradient: planet_gradient(proj.pos, radius, light, base),
            },
        });
    }

    sort_back_to_front(&mut items);

    let label = (!scene.label().is_empty()).then(|| scene.label().to_string());

    Frame {
        background: config.background(),
        orbit_paths,
        orbit_color: config.orbit_color(),
        orbit_width: config.orbit_line_width,
        items,
        label,
        label_size: config.label_size,
        label_color: config.label_color(),
    }
}

/// Build and paint one frame. Does nothing while the surface is not ready.
pub fn render_frame(
    scene: &Scene,
    camera: &Camera,
    time: f64,
    viewport: &Viewport,
    config: &ViewConfig,
    surface: &mut impl Surface,
) {
    if !surface.is_ready() || viewport.is_empty() {
        return;
    }
    build_frame(scene, camera, time, viewport, config).paint(surface);
}
