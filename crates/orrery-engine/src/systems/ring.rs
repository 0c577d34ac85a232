//! Projected ring ellipses.
//!
//! A ring is a circle in the plane spanned by world X and world Z rotated by
//! the ring tilt about world X. Projecting the planet center plus one offset
//! point along each axis gives two conjugate semi-diameters of the screen
//! ellipse; its axes and rotation follow from their lengths and the angle
//! between them.

use glam::{Vec2, Vec3};

use crate::renderer::camera::{project, rotate_x, Camera, Viewport};
use crate::renderer::traits::Ellipse;

/// Unit axes of the ring plane for a tilt in degrees.
pub fn ring_axes(tilt_degrees: f32) -> (Vec3, Vec3) {
    (Vec3::X, rotate_x(Vec3::Z, tilt_degrees.to_radians()))
}

/// Screen ellipse of a world circle of `radius` around `center`.
pub fn project_ring(
    center: Vec3,
    radius: f32,
    tilt_degrees: f32,
    camera: &Camera,
    viewport: &Viewport,
) -> Ellipse {
    let (u, v) = ring_axes(tilt_degrees);
    let c = project(center, camera, viewport).pos;
    let a = project(center + u * radius, camera, viewport).pos - c;
    let b = project(center + v * radius, camera, viewport).pos - c;
    ellipse_from_conjugates(c, a, b)
}

/// Ellipse whose conjugate semi-diameters are `a` and `b`.
///
/// The axes are the singular values of the 2×2 matrix `[a b]`; the rotation
/// is the direction of the major axis.
pub fn ellipse_from_conjugates(center: Vec2, a: Vec2, b: Vec2) -> Ellipse {
    let s11 = a.x * a.x + b.x * b.x;
    let s22 = a.y * a.y + b.y * b.y;
    let s12 = a.x * a.y + b.x * b.y;

    let mean = (s11 + s22) / 2.0;
    let half_diff = (s11 - s22) / 2.0;
    let spread = (half_diff * half_diff + s12 * s12).sqrt();

    let major = (mean + spread).max(0.0).sqrt();
    let minor = (mean - spread).max(0.0).sqrt();
    let rotation = 0.5 * (2.0 * s12).atan2(s11 - s22);

    Ellipse {
        center,
        radii: Vec2::new(major, minor),
        rotation,
    }
}

/// Inner and outer ring ellipses for one planet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingEllipses {
    pub outer: Ellipse,
    pub inner: Ellipse,
}

pub fn project_ring_pair(
    center: Vec3,
    planet_size: f32,
    tilt_degrees: f32,
    inner_factor: f32,
    outer_factor: f32,
    camera: &Camera,
    viewport: &Viewport,
) -> RingEllipses {
    RingEllipses {
        outer: project_ring(center, planet_size * outer_factor, tilt_degrees, camera, viewport),
        inner: project_ring(center, planet_size * inner_factor, tilt_degrees, camera, viewport),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, 1.0, 60.0)
    }

    #[test]
    fn conjugates_of_a_circle() {
        let e = ellipse_from_conjugates(Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(0.0, 5.0));
        assert!((e.major() - 5.0).abs() < 1e-5);
        assert!((e.minor() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn conjugates_rotated_axes() {
        let dir = Vec2::new(1.0, 1.0).normalize();
        let perp = Vec2::new(-dir.y, dir.x);
        let e = ellipse_from_conjugates(Vec2::ZERO, dir * 6.0, perp * 2.0);
        assert!((e.radii.x - 6.0).abs() < 1e-4);
        assert!((e.radii.y - 2.0).abs() < 1e-4);
        assert!((e.rotation - std::f32::consts::FRAC_PI_4).abs() < 1e-4);
    }

    #[test]
    fn degenerate_conjugates_collapse() {
        let e = ellipse_from_conjugates(Vec2::ZERO, Vec2::new(3.0, 4.0), Vec2::new(6.0, 8.0));
        assert!(e.minor() < 1e-2);
    }

    #[test]
    fn zero_tilt_flattened_by_elevation_only() {
        // Far camera keeps perspective error small.
        let vp = viewport();
        let radius = 19.0;
        for &elev in &[0.2_f32, 0.5, 0.9, 1.2] {
            let cam = Camera::new(0.0, elev, 1600.0);
            let e = project_ring(Vec3::ZERO, radius, 0.0, &cam, &vp);
            let ratio = e.minor() / e.major();
            let expected = elev.sin().abs();
            assert!(
                (ratio - expected).abs() < 0.02,
                "elevation {}: ratio {} expected {}",
                elev,
                ratio,
                expected
            );
        }
    }

    #[test]
    fn edge_on_when_view_lies_in_ring_plane() {
        let vp = viewport();
        let tilt = 60.0_f32;
        let cam = Camera::new(0.0, tilt.to_radians(), 540.0);
        let e = project_ring(Vec3::ZERO, 19.0, tilt, &cam, &vp);
        assert!(e.minor() / e.major() < 1e-3);
    }

    #[test]
    fn tilt_changes_flattening() {
        let vp = viewport();
        let cam = Camera::new(0.0, 0.3, 1600.0);
        let flat = project_ring(Vec3::ZERO, 19.0, 0.0, &cam, &vp);
        let tilted = project_ring(Vec3::ZERO, 19.0, 85.0, &cam, &vp);
        assert!(tilted.minor() / tilted.major() > flat.minor() / flat.major());
    }

    #[test]
    fn ring_pair_inner_smaller() {
        let vp = viewport();
        let cam = Camera::default();
        let pair = project_ring_pair(Vec3::new(88.0, 0.0, 0.0), 10.0, 20.0, 1.3, 1.9, &cam, &vp);
        assert!(pair.inner.major() < pair.outer.major());
        assert_eq!(pair.inner.center, pair.outer.center);
    }
}
