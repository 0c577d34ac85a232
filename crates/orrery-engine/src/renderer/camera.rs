//! Orbit camera and perspective projection.
//!
//! `project` is the only place world coordinates become screen coordinates;
//! orbit paths, bodies, and ring ellipses all go through it.

use glam::{Vec2, Vec3};

use crate::api::config::{clamp_to, DISTANCE_RANGE, ELEVATION_LIMIT};

pub const DEFAULT_AZIMUTH: f32 = 0.0;
pub const DEFAULT_ELEVATION: f32 = 0.45;
pub const DEFAULT_DISTANCE: f32 = 540.0;

/// Smallest depth used for the perspective divide.
pub const MIN_DEPTH: f32 = 1.0;

/// Orbit camera around the world origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Rotation around the vertical axis (radians). Unbounded.
    azimuth: f32,
    /// Rotation around the horizontal axis (radians), clamped.
    elevation: f32,
    /// Distance from the origin in world units, clamped.
    distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            azimuth: DEFAULT_AZIMUTH,
            elevation: DEFAULT_ELEVATION,
            distance: DEFAULT_DISTANCE,
        }
    }
}

impl Camera {
    /// Build a camera, clamping elevation and distance into range.
    pub fn new(azimuth: f32, elevation: f32, distance: f32) -> Self {
        let mut cam = Self::default();
        cam.set_azimuth(azimuth);
        cam.set_elevation(elevation);
        cam.set_distance(distance);
        cam
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Non-finite values are ignored.
    pub fn set_azimuth(&mut self, azimuth: f32) {
        if azimuth.is_finite() {
            self.azimuth = azimuth;
        }
    }

    pub fn set_elevation(&mut self, elevation: f32) {
        if elevation.is_finite() {
            self.elevation = elevation.clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        }
    }

    pub fn set_distance(&mut self, distance: f32) {
        if distance.is_finite() {
            self.distance = clamp_to(distance, &DISTANCE_RANGE);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rotate into view space: yaw by -azimuth, then pitch by -elevation.
    /// The order is fixed.
    pub fn to_view(&self, p: Vec3) -> Vec3 {
        rotate_x(rotate_y(p, -self.azimuth), -self.elevation)
    }
}

/// Rotate around the Y axis.
pub fn rotate_y(p: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(p.x * cos + p.z * sin, p.y, -p.x * sin + p.z * cos)
}

/// Rotate around the X axis.
pub fn rotate_x(p: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(p.x, p.y * cos - p.z * sin, p.y * sin + p.z * cos)
}

/// Drawing-surface dimensions in logical pixels plus the derived focal length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    device_pixel_ratio: f32,
    fov_degrees: f32,
    focal_length: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32, fov_degrees: f32) -> Self {
        let mut vp = Self {
            width: 0.0,
            height: 0.0,
            device_pixel_ratio: 1.0,
            fov_degrees,
            focal_length: 0.0,
        };
        vp.resize(width, height, device_pixel_ratio);
        vp
    }

    /// Update dimensions and re-derive the focal length.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.width = sanitize(width, 0.0);
        self.height = sanitize(height, 0.0);
        self.device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let half_fov = self.fov_degrees.to_radians() / 2.0;
        self.focal_length = 0.5 * self.height / half_fov.tan();
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Physical pixel dimensions (logical × device pixel ratio), rounded.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width * self.device_pixel_ratio).round() as u32,
            (self.height * self.device_pixel_ratio).round() as u32,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }
}

fn sanitize(v: f32, fallback: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        fallback
    }
}

/// Projection result from 3D to 2D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Screen position in logical pixels.
    pub pos: Vec2,
    /// View-space depth (larger = farther), never below `MIN_DEPTH`.
    pub depth: f32,
    /// Pixels per world unit at this depth.
    pub scale: f32,
}

/// Project a world point onto the viewport.
///
/// The camera sits at `(0, 0, -distance)` in view space looking down +z, so
/// `depth = z_view + distance`.
pub fn project(point: Vec3, camera: &Camera, viewport: &Viewport) -> Projection {
    let view = camera.to_view(point);
    let depth = (view.z + camera.distance).max(MIN_DEPTH);
    let scale = viewport.focal_length / depth;
    let center = viewport.center();
    Projection {
        pos: Vec2::new(view.x * scale + center.x, view.y * scale + center.y),
        depth,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, 1.0, 60.0)
    }

    fn identity(distance: f32) -> Camera {
        Camera::new(0.0, 0.0, distance)
    }

    #[test]
    fn focal_length_from_fov() {
        let vp = viewport();
        let expected = 300.0 / (30.0_f32).to_radians().tan();
        assert!((vp.focal_length() - expected).abs() < 1e-3);
    }

    #[test]
    fn resize_rederives_focal_length() {
        let mut vp = viewport();
        let before = vp.focal_length();
        vp.resize(800.0, 1200.0, 2.0);
        assert!((vp.focal_length() - before * 2.0).abs() < 1e-2);
        assert_eq!(vp.pixel_size(), (1600, 2400));
    }

    #[test]
    fn identity_x_axis_projects_right_of_center() {
        let vp = viewport();
        let cam = identity(540.0);
        let a = project(Vec3::new(50.0, 0.0, 0.0), &cam, &vp);
        let b = project(Vec3::new(100.0, 0.0, 0.0), &cam, &vp);
        assert!(a.pos.x > 400.0);
        // Same depth, so screen offset is proportional to r.
        assert!(((b.pos.x - 400.0) - 2.0 * (a.pos.x - 400.0)).abs() < 1e-3);
        assert!((a.pos.y - 300.0).abs() < 1e-4);
    }

    #[test]
    fn identity_z_axis_depth() {
        let vp = viewport();
        let cam = identity(540.0);
        let p = project(Vec3::new(0.0, 0.0, 75.0), &cam, &vp);
        assert!((p.depth - 615.0).abs() < 1e-3);
    }

    #[test]
    fn end_to_end_first_planet() {
        let vp = viewport();
        let cam = identity(540.0);
        let p = project(Vec3::new(88.0, 0.0, 0.0), &cam, &vp);
        assert!(p.pos.x > 400.0);
        assert_eq!(p.pos.y, 300.0);
        assert!((p.scale - vp.focal_length() / 540.0).abs() < 1e-6);
    }

    #[test]
    fn depth_clamped_behind_camera() {
        let vp = viewport();
        let cam = identity(220.0);
        let p = project(Vec3::new(10.0, 0.0, -1000.0), &cam, &vp);
        assert_eq!(p.depth, MIN_DEPTH);
        assert!((p.scale - vp.focal_length()).abs() < 1e-3);
    }

    #[test]
    fn yaw_then_pitch() {
        let cam = Camera::new(std::f32::consts::FRAC_PI_2, 0.0, 540.0);
        // Yaw by -90°: +x moves to +z (away from camera).
        let v = cam.to_view(Vec3::X);
        assert!(v.x.abs() < 1e-6);
        assert!((v.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn camera_clamps() {
        let mut cam = Camera::default();
        cam.set_elevation(3.0);
        assert_eq!(cam.elevation(), ELEVATION_LIMIT);
        cam.set_distance(99999.0);
        assert_eq!(cam.distance(), 1600.0);
        cam.set_distance(0.0);
        assert_eq!(cam.distance(), 220.0);
        cam.set_azimuth(f32::NAN);
        assert_eq!(cam.azimuth(), DEFAULT_AZIMUTH);
    }

    #[test]
    fn azimuth_wraps_via_trig() {
        let vp = viewport();
        let a = project(Vec3::new(88.0, 0.0, 30.0), &Camera::new(0.3, 0.2, 540.0), &vp);
        let b = project(
            Vec3::new(88.0, 0.0, 30.0),
            &Camera::new(0.3 + std::f32::consts::TAU, 0.2, 540.0),
            &vp,
        );
        assert!((a.pos - b.pos).length() < 1e-2);
    }
}
