//! View configuration and the fixed value ranges of the scene model.

use serde::Deserialize;
use std::ops::RangeInclusive;

use crate::api::types::Rgba;

// ── Value ranges ─────────────────────────────────────────────────────

pub const PLANET_COUNT_RANGE: RangeInclusive<usize> = 1..=9;
pub const STAR_SIZE_RANGE: RangeInclusive<f32> = 8.0..=100.0;
pub const PLANET_SIZE_RANGE: RangeInclusive<f32> = 2.0..=30.0;
/// Ring tilt in degrees.
pub const RING_TILT_RANGE: RangeInclusive<f32> = 0.0..=85.0;
pub const SPEED_RANGE: RangeInclusive<f32> = 0.1..=5.0;
/// Elevation is clamped to `[-ELEVATION_LIMIT, ELEVATION_LIMIT]` radians.
pub const ELEVATION_LIMIT: f32 = 1.2;
pub const DISTANCE_RANGE: RangeInclusive<f32> = 220.0..=1600.0;
pub const MAX_LABEL_CHARS: usize = 40;
/// Vertical field of view in degrees; 0 or 180 make the focal length degenerate.
pub const FOV_RANGE: RangeInclusive<f32> = 1.0..=179.0;
pub const ORBIT_SAMPLES_RANGE: RangeInclusive<usize> = 3..=1024;

/// Clamp into an inclusive range.
#[inline]
pub fn clamp_to(v: f32, range: &RangeInclusive<f32>) -> f32 {
    v.clamp(*range.start(), *range.end())
}

// ── Tunables ─────────────────────────────────────────────────────────

/// Tunable constants for projection, animation, input, and painting.
///
/// Every field has a default, so hosts may pass a partial JSON object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// World distance between consecutive orbits.
    pub gap: f32,
    /// Angular speed of orbit 0 at speed multiplier 1, radians per second.
    pub base_angular_rate: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Polyline resolution of each orbit path.
    pub orbit_samples: usize,
    /// Ring radii as multiples of the planet size.
    pub ring_inner_factor: f32,
    pub ring_outer_factor: f32,
    /// Radians of azimuth per pointer pixel.
    pub drag_azimuth_sensitivity: f32,
    /// Radians of elevation per pointer pixel. Kept below the azimuth rate.
    pub drag_elevation_sensitivity: f32,
    /// World units of distance per pixel of finger-distance change.
    pub pinch_sensitivity: f32,
    /// World units of distance per wheel delta unit.
    pub wheel_sensitivity: f32,
    pub background: [f32; 4],
    pub orbit_color: [f32; 4],
    pub orbit_line_width: f32,
    pub ring_line_width: f32,
    pub label_size: f32,
    pub label_color: [f32; 4],
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            gap: 60.0,
            base_angular_rate: 0.6,
            fov_degrees: 60.0,
            orbit_samples: 128,
            ring_inner_factor: 1.3,
            ring_outer_factor: 1.9,
            drag_azimuth_sensitivity: 0.01,
            drag_elevation_sensitivity: 0.006,
            pinch_sensitivity: 2.0,
            wheel_sensitivity: 0.5,
            background: [0.02, 0.02, 0.06, 1.0],
            orbit_color: [1.0, 1.0, 1.0, 0.18],
            orbit_line_width: 1.0,
            ring_line_width: 1.0,
            label_size: 14.0,
            label_color: [1.0, 1.0, 1.0, 0.85],
        }
    }
}

impl ViewConfig {
    /// Parse a (possibly partial) config from JSON. Unusable values are
    /// repaired by [`ViewConfig::sanitized`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Bring every tunable back into a usable range. Scalars that must be
    /// positive fall back to their default; the ring factors fall back as a
    /// pair unless `0 < inner < outer`.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let fov_degrees = if self.fov_degrees.is_finite() {
            clamp_to(self.fov_degrees, &FOV_RANGE)
        } else {
            d.fov_degrees
        };
        let (ring_inner_factor, ring_outer_factor) = if self.ring_inner_factor > 0.0
            && self.ring_inner_factor < self.ring_outer_factor
            && self.ring_outer_factor.is_finite()
        {
            (self.ring_inner_factor, self.ring_outer_factor)
        } else {
            (d.ring_inner_factor, d.ring_outer_factor)
        };
        let sanitized = Self {
            gap: positive_or(self.gap, d.gap),
            base_angular_rate: positive_or(self.base_angular_rate, d.base_angular_rate),
            fov_degrees,
            orbit_samples: self
                .orbit_samples
                .clamp(*ORBIT_SAMPLES_RANGE.start(), *ORBIT_SAMPLES_RANGE.end()),
            ring_inner_factor,
            ring_outer_factor,
            drag_azimuth_sensitivity: positive_or(
                self.drag_azimuth_sensitivity,
                d.drag_azimuth_sensitivity,
            ),
            drag_elevation_sensitivity: positive_or(
                self.drag_elevation_sensitivity,
                d.drag_elevation_sensitivity,
            ),
            pinch_sensitivity: positive_or(self.pinch_sensitivity, d.pinch_sensitivity),
            wheel_sensitivity: positive_or(self.wheel_sensitivity, d.wheel_sensitivity),
            background: unit_color_or(self.background, d.background),
            orbit_color: unit_color_or(self.orbit_color, d.orbit_color),
            orbit_line_width: positive_or(self.orbit_line_width, d.orbit_line_width),
            ring_line_width: positive_or(self.ring_line_width, d.ring_line_width),
            label_size: positive_or(self.label_size, d.label_size),
            label_color: unit_color_or(self.label_color, d.label_color),
        };
        if sanitized != self {
            log::warn!("view config contained unusable values; they were replaced");
        }
        sanitized
    }

    pub fn background(&self) -> Rgba {
        rgba(self.background)
    }

    pub fn orbit_color(&self) -> Rgba {
        rgba(self.orbit_color)
    }

    pub fn label_color(&self) -> Rgba {
        rgba(self.label_color)
    }
}

fn positive_or(v: f32, default: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        default
    }
}

fn unit_color_or(c: [f32; 4], default: [f32; 4]) -> [f32; 4] {
    if c.iter().all(|v| v.is_finite()) {
        c.map(|v| v.clamp(0.0, 1.0))
    } else {
        default
    }
}

fn rgba(c: [f32; 4]) -> Rgba {
    Rgba::new(c[0], c[1], c[2], c[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ViewConfig::from_json(r#"{ "gap": 80.0, "orbit_samples": 64 }"#).unwrap();
        assert_eq!(cfg.gap, 80.0);
        assert_eq!(cfg.orbit_samples, 64);
        assert_eq!(cfg.fov_degrees, 60.0);
        assert_eq!(cfg.ring_outer_factor, 1.9);
    }

    #[test]
    fn elevation_drag_is_slower_than_azimuth() {
        let cfg = ViewConfig::default();
        assert!(cfg.drag_elevation_sensitivity < cfg.drag_azimuth_sensitivity);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(ViewConfig::from_json("{ gap: }").is_err());
    }

    #[test]
    fn zero_fov_is_clamped() {
        let cfg = ViewConfig::from_json(r#"{ "fov_degrees": 0 }"#).unwrap();
        assert_eq!(cfg.fov_degrees, 1.0);
        let cfg = ViewConfig::from_json(r#"{ "fov_degrees": 400 }"#).unwrap();
        assert_eq!(cfg.fov_degrees, 179.0);
    }

    #[test]
    fn negative_scalars_fall_back() {
        let cfg = ViewConfig::from_json(
            r#"{ "gap": -500, "base_angular_rate": 0, "wheel_sensitivity": -1,
                 "orbit_line_width": -2, "label_size": 0 }"#,
        )
        .unwrap();
        let d = ViewConfig::default();
        assert_eq!(cfg.gap, d.gap);
        assert_eq!(cfg.base_angular_rate, d.base_angular_rate);
        assert_eq!(cfg.wheel_sensitivity, d.wheel_sensitivity);
        assert_eq!(cfg.orbit_line_width, d.orbit_line_width);
        assert_eq!(cfg.label_size, d.label_size);
    }

    #[test]
    fn ring_factors_must_be_ordered() {
        let d = ViewConfig::default();
        let cfg = ViewConfig::from_json(r#"{ "ring_outer_factor": -3 }"#).unwrap();
        assert_eq!(
            (cfg.ring_inner_factor, cfg.ring_outer_factor),
            (d.ring_inner_factor, d.ring_outer_factor)
        );
        let cfg = ViewConfig::from_json(r#"{ "ring_inner_factor": 2.5, "ring_outer_factor": 2.0 }"#)
            .unwrap();
        assert_eq!(cfg.ring_inner_factor, d.ring_inner_factor);
        let cfg = ViewConfig::from_json(r#"{ "ring_inner_factor": 1.1, "ring_outer_factor": 3.0 }"#)
            .unwrap();
        assert_eq!((cfg.ring_inner_factor, cfg.ring_outer_factor), (1.1, 3.0));
    }

    #[test]
    fn orbit_samples_are_bounded() {
        let cfg = ViewConfig::from_json(r#"{ "orbit_samples": 4000000000 }"#).unwrap();
        assert_eq!(cfg.orbit_samples, 1024);
        let cfg = ViewConfig::from_json(r#"{ "orbit_samples": 0 }"#).unwrap();
        assert_eq!(cfg.orbit_samples, 3);
    }

    #[test]
    fn colors_clamp_to_unit_range() {
        let cfg = ViewConfig::from_json(r#"{ "background": [2.0, -1.0, 0.5, 1.0] }"#).unwrap();
        assert_eq!(cfg.background, [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn default_is_already_sane() {
        assert_eq!(ViewConfig::default().sanitized(), ViewConfig::default());
    }

    #[test]
    fn clamp_helper() {
        assert_eq!(clamp_to(99999.0, &DISTANCE_RANGE), 1600.0);
        assert_eq!(clamp_to(-5.0, &RING_TILT_RANGE), 0.0);
    }
}
