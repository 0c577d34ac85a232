//! Stylized circular orbits. Deterministic in simulation time; not Keplerian.

use glam::Vec3;

use crate::api::config::ViewConfig;
use crate::core::scene::Scene;

/// Orbit radius of the planet at `orbit_index` around a star of `star_size`.
pub fn orbit_radius(orbit_index: usize, star_size: f32, gap: f32) -> f32 {
    star_size + gap * (orbit_index as f32 + 1.0)
}

/// Angular speed in radians per second. Strictly decreasing in `orbit_index`
/// for any positive `speed`.
pub fn angular_rate(orbit_index: usize, base_rate: f32, speed: f32) -> f64 {
    base_rate as f64 * speed as f64 / ((orbit_index + 1) as f64).sqrt()
}

/// Orbit angle at `time`, with a phase offset of `orbit_index` radians so
/// bodies do not start aligned.
pub fn orbit_angle(orbit_index: usize, time: f64, base_rate: f32, speed: f32) -> f64 {
    time * angular_rate(orbit_index, base_rate, speed) + orbit_index as f64
}

/// World position of a planet in the y = 0 plane.
pub fn position_at(
    orbit_index: usize,
    star_size: f32,
    gap: f32,
    time: f64,
    base_rate: f32,
    speed: f32,
) -> Vec3 {
    let r = orbit_radius(orbit_index, star_size, gap);
    let angle = orbit_angle(orbit_index, time, base_rate, speed);
    Vec3::new(r * angle.cos() as f32, 0.0, r * angle.sin() as f32)
}

/// World positions of every planet in `scene` at `time`, indexed by orbit.
pub fn scene_positions(scene: &Scene, config: &ViewConfig, time: f64) -> Vec<Vec3> {
    (0..scene.planet_count())
        .map(|i| {
            position_at(
                i,
                scene.star.size(),
                config.gap,
                time,
                config.base_angular_rate,
                scene.speed(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_planet_at_time_zero() {
        // Default star (28) + gap 60 × (0 + 1) = 88, phase offset 0.
        let p = position_at(0, 28.0, 60.0, 0.0, 0.6, 1.0);
        assert!((p.x - 88.0).abs() < 1e-4);
        assert_eq!(p.y, 0.0);
        assert!(p.z.abs() < 1e-4);
    }

    #[test]
    fn radius_grows_with_index() {
        assert_eq!(orbit_radius(0, 28.0, 60.0), 88.0);
        assert_eq!(orbit_radius(2, 28.0, 60.0), 208.0);
    }

    #[test]
    fn outer_orbits_are_slower() {
        for &speed in &[0.1_f32, 1.0, 5.0] {
            for i in 0..8 {
                assert!(angular_rate(i + 1, 0.6, speed) < angular_rate(i, 0.6, speed));
            }
        }
    }

    #[test]
    fn angle_advance_matches_rate() {
        let t = 3.0;
        for i in 0..9 {
            let swept = orbit_angle(i, t, 0.6, 2.0) - orbit_angle(i, 0.0, 0.6, 2.0);
            assert!((swept - angular_rate(i, 0.6, 2.0) * t).abs() < 1e-9);
        }
    }

    #[test]
    fn phase_offsets_differ() {
        let a = position_at(0, 28.0, 60.0, 0.0, 0.6, 1.0);
        let b = position_at(1, 28.0, 60.0, 0.0, 0.6, 1.0);
        let angle_a = a.z.atan2(a.x);
        let angle_b = b.z.atan2(b.x);
        assert!((angle_b - angle_a - 1.0).abs() < 1e-4);
    }

    #[test]
    fn positions_stay_on_circle() {
        let scene = Scene::new();
        let cfg = ViewConfig::default();
        for (i, p) in scene_positions(&scene, &cfg, 17.25).iter().enumerate() {
            let r = orbit_radius(i, scene.star.size(), cfg.gap);
            assert!((p.length() - r).abs() < 1e-3);
            assert_eq!(p.y, 0.0);
        }
    }
}
