//! Drawing-surface contract.
//!
//! The renderer only talks to a `Surface`. The web bridge implements it over a
//! Canvas 2D context, and `RasterSurface` implements it on the CPU for export
//! and tests. Coordinates are logical pixels; the surface applies the device
//! pixel ratio.

use glam::Vec2;

use crate::api::types::Rgba;

/// A color stop of a radial gradient, `offset` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

/// Two-circle radial gradient in the Canvas 2D sense: the gradient runs from
/// the inner circle (`focus`, `focus_radius`) to the outer circle (`center`,
/// `radius`).
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub focus: Vec2,
    pub focus_radius: f32,
    pub center: Vec2,
    pub radius: f32,
    pub stops: [GradientStop; 3],
}

impl RadialGradient {
    /// Gradient parameter at point `p`: the largest `t` whose interpolated
    /// circle passes through `p`, clamped to [0, 1].
    pub fn t_at(&self, p: Vec2) -> f32 {
        let cd = self.center - self.focus;
        let pd = p - self.focus;
        let dr = self.radius - self.focus_radius;
        let a = cd.dot(cd) - dr * dr;
        let b = pd.dot(cd) + self.focus_radius * dr;
        let c = pd.dot(pd) - self.focus_radius * self.focus_radius;

        let t = if a.abs() < 1e-6 {
            if b.abs() < 1e-6 {
                return 0.0;
            }
            c / (2.0 * b)
        } else {
            let disc = b * b - a * c;
            if disc < 0.0 {
                return 1.0;
            }
            let root = disc.sqrt();
            let t1 = (b + root) / a;
            let t2 = (b - root) / a;
            let valid = |t: f32| self.focus_radius + t * dr >= 0.0;
            match (valid(t1), valid(t2)) {
                (true, true) => t1.max(t2),
                (true, false) => t1,
                (false, true) => t2,
                (false, false) => 1.0,
            }
        };
        t.clamp(0.0, 1.0)
    }

    /// Color at normalized position `t` along the stops.
    pub fn sample(&self, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let first = self.stops[0];
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = (b.offset - a.offset).max(f32::EPSILON);
                return a.color.mix(b.color, (t - a.offset) / span);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

/// Screen-space ellipse: semi-axes `radii` with the x semi-axis rotated by
/// `rotation` radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Vec2,
    pub radii: Vec2,
    pub rotation: f32,
}

impl Ellipse {
    pub fn major(&self) -> f32 {
        self.radii.x.max(self.radii.y)
    }

    pub fn minor(&self) -> f32 {
        self.radii.x.min(self.radii.y)
    }

    /// Sample `n` points around the ellipse.
    pub fn points(&self, n: usize) -> Vec<Vec2> {
        let (sin_r, cos_r) = self.rotation.sin_cos();
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32 * std::f32::consts::TAU;
                let (s, c) = t.sin_cos();
                let lx = self.radii.x * c;
                let ly = self.radii.y * s;
                self.center + Vec2::new(lx * cos_r - ly * sin_r, lx * sin_r + ly * cos_r)
            })
            .collect()
    }
}

/// Canvas-shaped painting API.
pub trait Surface {
    /// False while the backing surface is missing or zero-sized; the renderer
    /// skips the frame.
    fn is_ready(&self) -> bool;

    /// Fill the whole surface.
    fn clear(&mut self, color: Rgba);

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Rgba);

    /// Fill a disc with a radial gradient.
    fn fill_disc(&mut self, center: Vec2, radius: f32, gradient: &RadialGradient);

    /// Fill the region between `outer` and `inner` (even-odd rule).
    fn fill_annulus(&mut self, outer: &Ellipse, inner: &Ellipse, color: Rgba);

    fn stroke_ellipse(&mut self, ellipse: &Ellipse, width: f32, color: Rgba);

    /// Draw text with its top-left corner at `pos`.
    fn fill_text(&mut self, text: &str, pos: Vec2, size: f32, color: Rgba);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> RadialGradient {
        RadialGradient {
            focus: Vec2::ZERO,
            focus_radius: 0.0,
            center: Vec2::ZERO,
            radius: 10.0,
            stops: [
                GradientStop { offset: 0.0, color: Rgba::WHITE },
                GradientStop { offset: 0.5, color: Rgba::rgb(1.0, 0.0, 0.0) },
                GradientStop { offset: 1.0, color: Rgba::BLACK },
            ],
        }
    }

    #[test]
    fn gradient_sample_hits_stops() {
        let g = gradient();
        assert_eq!(g.sample(0.0), Rgba::WHITE);
        assert_eq!(g.sample(0.5), Rgba::rgb(1.0, 0.0, 0.0));
        assert_eq!(g.sample(1.0), Rgba::BLACK);
        assert_eq!(g.sample(2.0), Rgba::BLACK);
        let mid = g.sample(0.75);
        assert!((mid.r - 0.5).abs() < 1e-5);
    }

    #[test]
    fn concentric_gradient_is_linear_in_radius() {
        let g = gradient();
        assert!(g.t_at(Vec2::ZERO).abs() < 1e-6);
        assert!((g.t_at(Vec2::new(5.0, 0.0)) - 0.5).abs() < 1e-5);
        assert!((g.t_at(Vec2::new(0.0, -10.0)) - 1.0).abs() < 1e-5);
        assert_eq!(g.t_at(Vec2::new(40.0, 0.0)), 1.0);
    }

    #[test]
    fn offset_focus_starts_at_focus() {
        let mut g = gradient();
        g.focus = Vec2::new(-4.0, 0.0);
        assert!(g.t_at(Vec2::new(-4.0, 0.0)).abs() < 1e-5);
        // Points on the outer circle reach the last stop.
        assert!((g.t_at(Vec2::new(10.0, 0.0)) - 1.0).abs() < 1e-4);
        assert!((g.t_at(Vec2::new(-10.0, 0.0)) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ellipse_points_on_axes() {
        let e = Ellipse {
            center: Vec2::new(10.0, 10.0),
            radii: Vec2::new(4.0, 2.0),
            rotation: std::f32::consts::FRAC_PI_2,
        };
        let pts = e.points(4);
        // First point lies along the rotated x semi-axis.
        assert!((pts[0] - Vec2::new(10.0, 14.0)).length() < 1e-4);
        assert_eq!(e.major(), 4.0);
        assert_eq!(e.minor(), 2.0);
    }
}
