//! Persisted scene document.
//!
//! The JSON shape is owned by an external store, so loading is lenient: every
//! field is read on its own, out-of-range numbers are clamped and anything
//! missing or mistyped falls back to its default. A document that went through
//! one load/save cycle loads back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

use crate::api::config::{
    DISTANCE_RANGE, ELEVATION_LIMIT, MAX_LABEL_CHARS, PLANET_COUNT_RANGE,
    PLANET_SIZE_RANGE, RING_TILT_RANGE, SPEED_RANGE, STAR_SIZE_RANGE,
};
use crate::api::types::Rgb;
use crate::core::scene::{Planet, Scene, Star, DEFAULT_PLANET_COUNT};
use crate::error::DocumentError;
use crate::renderer::camera::Camera;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarDocument {
    pub color: String,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetDocument {
    pub color: String,
    pub size: f32,
    pub rings: bool,
    pub ring_tilt: f32,
}

impl PlanetDocument {
    fn from_planet(planet: &Planet) -> Self {
        Self {
            color: planet.color.to_hex(),
            size: planet.size(),
            rings: planet.has_rings,
            ring_tilt: planet.ring_tilt(),
        }
    }
}

/// Serialized form of a scene plus its camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    pub count: usize,
    pub star: StarDocument,
    pub planets: Vec<PlanetDocument>,
    pub show_orbits: bool,
    pub speed: f32,
    pub azimuth: f32,
    pub elevation: f32,
    /// Camera distance.
    pub zoom: f32,
    pub label: String,
    /// Epoch milliseconds.
    pub saved_at: u64,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::capture(&Scene::new(), &Camera::default(), 0)
    }
}

impl SceneDocument {
    pub fn capture(scene: &Scene, camera: &Camera, saved_at: u64) -> Self {
        Self {
            count: scene.planet_count(),
            star: StarDocument {
                color: scene.star.color.to_hex(),
                size: scene.star.size(),
            },
            planets: scene.planets().iter().map(PlanetDocument::from_planet).collect(),
            show_orbits: scene.show_orbits,
            speed: scene.speed(),
            azimuth: camera.azimuth(),
            elevation: camera.elevation(),
            zoom: camera.distance(),
            label: scene.label().to_string(),
            saved_at,
        }
    }

    /// Rebuild the scene and camera. Values pass through the clamping setters,
    /// so a hand-built document cannot produce an out-of-range scene.
    pub fn apply(&self) -> (Scene, Camera) {
        let mut scene = Scene::new();

        let star_color = Rgb::from_hex(&self.star.color).unwrap_or(scene.star.color);
        scene.star = Star::new(star_color, self.star.size);

        let planets = self
            .planets
            .iter()
            .take(self.count)
            .enumerate()
            .map(|(i, p)| {
                let fallback = Planet::default_for(i);
                let color = Rgb::from_hex(&p.color).unwrap_or(fallback.color);
                Planet::new(color, p.size, p.rings, p.ring_tilt)
            })
            .collect();
        scene.set_planets(planets);
        scene.set_planet_count(self.count);

        scene.show_orbits = self.show_orbits;
        scene.set_speed(self.speed);
        scene.set_label(&self.label);

        let camera = Camera::new(self.azimuth, self.elevation, self.zoom);
        (scene, camera)
    }

    /// Strict parse: the document must match the schema exactly.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(DocumentError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Parse anything. Unusable input yields the default document.
    pub fn from_json_lenient(json: &str) -> Self {
        let value: Value = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("scene document unreadable, using defaults: {}", e);
                return Self::default();
            }
        };
        match value.as_object() {
            Some(obj) => Self::from_object(obj),
            None => {
                log::warn!("scene document: {}, using defaults", DocumentError::NotAnObject);
                Self::default()
            }
        }
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        let mut r = Reader::default();

        let star = match obj.get("star").and_then(Value::as_object) {
            Some(s) => StarDocument {
                color: r.color(s, "star.color", "color", &defaults.star.color),
                size: r.number(s, "star.size", "size", defaults.star.size, Some(&STAR_SIZE_RANGE)),
            },
            None => {
                r.fallback("star");
                defaults.star.clone()
            }
        };

        let mut planets: Vec<PlanetDocument> = match obj.get("planets").and_then(Value::as_array) {
            Some(list) => list
                .iter()
                .enumerate()
                .map(|(i, v)| r.planet(i, v))
                .collect(),
            None => {
                r.fallback("planets");
                Vec::new()
            }
        };

        let count = r.count(obj, planets.len());
        if planets.len() > count {
            planets.truncate(count);
        }
        let start = planets.len();
        planets.extend((start..count).map(|i| PlanetDocument::from_planet(&Planet::default_for(i))));

        let elevation_range = -ELEVATION_LIMIT..=ELEVATION_LIMIT;
        let doc = Self {
            count,
            star,
            planets,
            show_orbits: r.boolean(obj, "showOrbits", defaults.show_orbits),
            speed: r.number(obj, "speed", "speed", defaults.speed, Some(&SPEED_RANGE)),
            azimuth: r.number(obj, "azimuth", "azimuth", defaults.azimuth, None),
            elevation: r.number(obj, "elevation", "elevation", defaults.elevation, Some(&elevation_range)),
            zoom: r.number(obj, "zoom", "zoom", defaults.zoom, Some(&DISTANCE_RANGE)),
            label: r.label(obj),
            saved_at: r.saved_at(obj),
        };

        if !r.adjusted.is_empty() {
            log::warn!("scene document fields adjusted: {}", r.adjusted.join(", "));
        }
        doc
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ── Lenient field reader ─────────────────────────────────────────────

/// Reads fields one at a time and records which ones it had to adjust.
#[derive(Default)]
struct Reader {
    adjusted: Vec<String>,
}

impl Reader {
    fn fallback(&mut self, path: &str) {
        self.adjusted.push(format!("{} (default)", path));
    }

    fn clamped(&mut self, path: &str) {
        self.adjusted.push(format!("{} (clamped)", path));
    }

    fn number(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
        default: f32,
        range: Option<&RangeInclusive<f32>>,
    ) -> f32 {
        let raw = match obj.get(key).and_then(Value::as_f64) {
            Some(v) if v.is_finite() => v,
            _ => {
                self.fallback(path);
                return default;
            }
        };
        match range {
            // Clamp before narrowing: values past f32::MAX would become infinite.
            Some(range) => {
                let v = raw.clamp(f64::from(*range.start()), f64::from(*range.end())) as f32;
                if v != raw as f32 {
                    self.clamped(path);
                }
                v
            }
            None => {
                let v = raw as f32;
                if !v.is_finite() {
                    self.fallback(path);
                    return default;
                }
                v
            }
        }
    }

    fn boolean(&mut self, obj: &Map<String, Value>, key: &str, default: bool) -> bool {
        obj.get(key).and_then(Value::as_bool).unwrap_or_else(|| {
            self.fallback(key);
            default
        })
    }

    /// Normalized to lowercase `#rrggbb`.
    fn color(&mut self, obj: &Map<String, Value>, path: &str, key: &str, default: &str) -> String {
        match obj.get(key).and_then(Value::as_str).and_then(Rgb::from_hex) {
            Some(c) => c.to_hex(),
            None => {
                self.fallback(path);
                default.to_string()
            }
        }
    }

    fn planet(&mut self, index: usize, value: &Value) -> PlanetDocument {
        let defaults = PlanetDocument::from_planet(&Planet::default_for(index));
        let Some(obj) = value.as_object() else {
            self.fallback(&format!("planets[{}]", index));
            return defaults;
        };
        let path = |field: &str| format!("planets[{}].{}", index, field);
        PlanetDocument {
            color: self.color(obj, &path("color"), "color", &defaults.color),
            size: self.number(obj, &path("size"), "size", defaults.size, Some(&PLANET_SIZE_RANGE)),
            rings: match obj.get("rings").and_then(Value::as_bool) {
                Some(b) => b,
                None => {
                    self.fallback(&path("rings"));
                    defaults.rings
                }
            },
            ring_tilt: self.number(
                obj,
                &path("ringTilt"),
                "ringTilt",
                defaults.ring_tilt,
                Some(&RING_TILT_RANGE),
            ),
        }
    }

    /// Planet count. Missing or non-numeric falls back to the number of
    /// planets present, or the default count when there are none.
    fn count(&mut self, obj: &Map<String, Value>, present: usize) -> usize {
        let (lo, hi) = (*PLANET_COUNT_RANGE.start(), *PLANET_COUNT_RANGE.end());
        match obj.get("count").and_then(Value::as_f64) {
            Some(v) if v.is_finite() => {
                let n = v.round().clamp(lo as f64, hi as f64) as usize;
                if n as f64 != v {
                    self.clamped("count");
                }
                n
            }
            _ => {
                self.fallback("count");
                if present == 0 {
                    DEFAULT_PLANET_COUNT
                } else {
                    present.clamp(lo, hi)
                }
            }
        }
    }

    fn label(&mut self, obj: &Map<String, Value>) -> String {
        match obj.get("label").and_then(Value::as_str) {
            Some(s) => {
                if s.chars().count() > MAX_LABEL_CHARS {
                    self.clamped("label");
                }
                s.chars().take(MAX_LABEL_CHARS).collect()
            }
            None => {
                self.fallback("label");
                String::new()
            }
        }
    }

    fn saved_at(&mut self, obj: &Map<String, Value>) -> u64 {
        match obj.get("savedAt") {
            Some(v) => match v.as_u64() {
                Some(ms) => ms,
                None => match v.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 => f as u64,
                    _ => {
                        self.fallback("savedAt");
                        0
                    }
                },
            },
            None => {
                self.fallback("savedAt");
                0
            }
        }
    }
}

// ── Persistence status ───────────────────────────────────────────────

/// Progress of the last save, for user-visible feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl PersistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistStatus::Idle => "idle",
            PersistStatus::Saving => "saving",
            PersistStatus::Saved => "saved",
            PersistStatus::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r##"{
        "count": 2,
        "star": {"color": "#FFAA00", "size": 30},
        "planets": [
            {"color": "#112233", "size": 12, "rings": true, "ringTilt": 40},
            {"color": "#445566", "size": 8, "rings": false, "ringTilt": 0}
        ],
        "showOrbits": false,
        "speed": 2.5,
        "azimuth": 0.7,
        "elevation": 0.3,
        "zoom": 800,
        "label": "Kepler",
        "savedAt": 1700000000000
    }"##;

    #[test]
    fn full_document_loads() {
        let doc = SceneDocument::from_json_lenient(FULL);
        assert_eq!(doc.count, 2);
        assert_eq!(doc.star.color, "#ffaa00");
        assert_eq!(doc.planets[0].ring_tilt, 40.0);
        assert!(!doc.show_orbits);
        assert_eq!(doc.saved_at, 1_700_000_000_000);

        let (scene, camera) = doc.apply();
        assert_eq!(scene.planet_count(), 2);
        assert_eq!(scene.star.color, Rgb::new(0xff, 0xaa, 0x00));
        assert!(scene.planets()[0].has_rings);
        assert_eq!(scene.label(), "Kepler");
        assert_eq!(camera.distance(), 800.0);
    }

    #[test]
    fn strict_parse_matches_lenient_for_clean_input() {
        let strict = SceneDocument::from_json(FULL).unwrap();
        assert_eq!(strict.planets.len(), 2);
        assert_eq!(strict.zoom, 800.0);
    }

    #[test]
    fn strict_parse_rejects_bad_input() {
        assert!(matches!(
            SceneDocument::from_json("[1,2]"),
            Err(DocumentError::NotAnObject)
        ));
        assert!(matches!(
            SceneDocument::from_json("{nope"),
            Err(DocumentError::InvalidJson(_))
        ));
    }

    #[test]
    fn zoom_and_tilt_are_clamped() {
        let doc = SceneDocument::from_json_lenient(
            r#"{"zoom": 99999, "planets": [{"ringTilt": -5}], "count": 1}"#,
        );
        assert_eq!(doc.zoom, 1600.0);
        assert_eq!(doc.planets[0].ring_tilt, 0.0);
        let (_, camera) = doc.apply();
        assert_eq!(camera.distance(), 1600.0);
    }

    #[test]
    fn reload_is_a_fixed_point() {
        let messy = r#"{
            "count": 42, "zoom": -3, "elevation": 9, "speed": "fast",
            "star": {"color": "not a color", "size": 1000},
            "planets": [{"size": 99, "ringTilt": 200}, 7],
            "label": "a label far longer than the forty characters allowed here"
        }"#;
        let first = SceneDocument::from_json_lenient(messy);
        let second = SceneDocument::from_json_lenient(&first.to_json());
        assert_eq!(first, second);

        let (scene, camera) = first.apply();
        let third = SceneDocument::capture(&scene, &camera, first.saved_at);
        assert_eq!(first, third);
    }

    #[test]
    fn out_of_range_values() {
        let doc = SceneDocument::from_json_lenient(
            r#"{"count": 0, "elevation": -5, "speed": 0, "star": {"size": 1}}"#,
        );
        assert_eq!(doc.count, 1);
        assert_eq!(doc.elevation, -ELEVATION_LIMIT);
        assert_eq!(doc.speed, 0.1);
        assert_eq!(doc.star.size, 8.0);
    }

    #[test]
    fn huge_numbers_clamp_instead_of_defaulting() {
        let doc = SceneDocument::from_json_lenient(
            r#"{"zoom": 1e39, "speed": 1e300, "star": {"size": 1e40},
                "planets": [{"size": -1e50, "ringTilt": 1e45}], "count": 1}"#,
        );
        assert_eq!(doc.zoom, 1600.0);
        assert_eq!(doc.speed, 5.0);
        assert_eq!(doc.star.size, 100.0);
        assert_eq!(doc.planets[0].size, 2.0);
        assert_eq!(doc.planets[0].ring_tilt, 85.0);
    }

    #[test]
    fn unbounded_azimuth_past_f32_falls_back() {
        let doc = SceneDocument::from_json_lenient(r#"{"azimuth": 1e39}"#);
        assert_eq!(doc.azimuth, SceneDocument::default().azimuth);
    }

    #[test]
    fn count_falls_back_to_planet_list() {
        let doc = SceneDocument::from_json_lenient(
            r#"{"planets": [{"size": 5}, {"size": 6}, {"size": 7}, {"size": 8}]}"#,
        );
        assert_eq!(doc.count, 4);
        assert_eq!(doc.planets[3].size, 8.0);
    }

    #[test]
    fn missing_planets_filled_with_defaults() {
        let doc = SceneDocument::from_json_lenient(r#"{"count": 6, "planets": []}"#);
        assert_eq!(doc.planets.len(), 6);
        assert_eq!(doc.planets[5], PlanetDocument::from_planet(&Planet::default_for(5)));
    }

    #[test]
    fn garbage_yields_defaults() {
        for input in ["", "null", "[]", "\"str\"", "{{{{"] {
            assert_eq!(SceneDocument::from_json_lenient(input), SceneDocument::default());
        }
    }

    #[test]
    fn serialized_keys_are_camel_case() {
        let json = SceneDocument::default().to_json();
        assert!(json.contains("\"showOrbits\""));
        assert!(json.contains("\"savedAt\""));
        assert!(json.contains("\"ringTilt\""));
        assert!(!json.contains("ring_tilt"));
    }

    #[test]
    fn status_strings() {
        assert_eq!(PersistStatus::default().as_str(), "idle");
        assert_eq!(PersistStatus::Saving.as_str(), "saving");
        assert_eq!(PersistStatus::Saved.as_str(), "saved");
        assert_eq!(PersistStatus::Error.as_str(), "error");
    }
}
