//! Scene model: one star, an ordered list of planets, and global view flags.
//!
//! A planet's orbit index is its position in `Scene::planets`; resizing keeps
//! existing planets by index and only touches the tail.

use crate::api::config::{
    clamp_to, MAX_LABEL_CHARS, PLANET_COUNT_RANGE, PLANET_SIZE_RANGE, RING_TILT_RANGE,
    SPEED_RANGE, STAR_SIZE_RANGE,
};
use crate::api::types::Rgb;
use crate::core::rng::{random_color, Rng};

// ── Defaults ─────────────────────────────────────────────────────────

pub const DEFAULT_STAR_COLOR: Rgb = Rgb::new(0xff, 0xcc, 0x4d);
pub const DEFAULT_STAR_SIZE: f32 = 28.0;
pub const DEFAULT_RING_TILT: f32 = 20.0;
pub const DEFAULT_SPEED: f32 = 1.0;
pub const DEFAULT_PLANET_COUNT: usize = 3;

const PLANET_PALETTE: [Rgb; 9] = [
    Rgb::new(0x4f, 0x9d, 0xff),
    Rgb::new(0xe0, 0x6c, 0x4a),
    Rgb::new(0x5c, 0xc8, 0x7a),
    Rgb::new(0xc9, 0xa2, 0x6b),
    Rgb::new(0xb3, 0x7b, 0xe8),
    Rgb::new(0xe8, 0xc5, 0x6a),
    Rgb::new(0x6a, 0xd6, 0xd6),
    Rgb::new(0x58, 0x6f, 0xe0),
    Rgb::new(0xa8, 0x9a, 0x8c),
];

const PLANET_SIZES: [f32; 9] = [10.0, 13.0, 12.0, 9.0, 20.0, 17.0, 14.0, 13.0, 6.0];

/// Index of the default ringed planet.
const RINGED_DEFAULT: usize = 5;

// ── Bodies ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub color: Rgb,
    /// World radius.
    size: f32,
}

impl Star {
    pub fn new(color: Rgb, size: f32) -> Self {
        Self {
            color,
            size: clamp_to(size, &STAR_SIZE_RANGE),
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = clamp_to(size, &STAR_SIZE_RANGE);
    }
}

impl Default for Star {
    fn default() -> Self {
        Self::new(DEFAULT_STAR_COLOR, DEFAULT_STAR_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    pub color: Rgb,
    size: f32,
    pub has_rings: bool,
    /// Degrees between the ring plane and the orbital plane.
    ring_tilt: f32,
}

impl Planet {
    pub fn new(color: Rgb, size: f32, has_rings: bool, ring_tilt: f32) -> Self {
        Self {
            color,
            size: clamp_to(size, &PLANET_SIZE_RANGE),
            has_rings,
            ring_tilt: clamp_to(ring_tilt, &RING_TILT_RANGE),
        }
    }

    /// The planet a freshly appended slot at `index` receives.
    pub fn default_for(index: usize) -> Self {
        let slot = index % PLANET_PALETTE.len();
        Self::new(
            PLANET_PALETTE[slot],
            PLANET_SIZES[slot],
            slot == RINGED_DEFAULT,
            DEFAULT_RING_TILT,
        )
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = clamp_to(size, &PLANET_SIZE_RANGE);
    }

    pub fn ring_tilt(&self) -> f32 {
        self.ring_tilt
    }

    pub fn set_ring_tilt(&mut self, degrees: f32) {
        self.ring_tilt = clamp_to(degrees, &RING_TILT_RANGE);
    }
}

// ── Scene ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub star: Star,
    planets: Vec<Planet>,
    pub show_orbits: bool,
    speed: f32,
    label: String,
}

impl Scene {
    pub fn new() -> Self {
        let mut scene = Self {
            star: Star::default(),
            planets: Vec::with_capacity(*PLANET_COUNT_RANGE.end()),
            show_orbits: true,
            speed: DEFAULT_SPEED,
            label: String::new(),
        };
        scene.set_planet_count(DEFAULT_PLANET_COUNT);
        scene
    }

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn planet_mut(&mut self, orbit_index: usize) -> Option<&mut Planet> {
        self.planets.get_mut(orbit_index)
    }

    pub fn planet_count(&self) -> usize {
        self.planets.len()
    }

    /// Resize to `count` planets (clamped to 1..=9). Existing planets keep their
    /// index; new ones are appended with defaults.
    pub fn set_planet_count(&mut self, count: usize) {
        let count = count.clamp(*PLANET_COUNT_RANGE.start(), *PLANET_COUNT_RANGE.end());
        if count < self.planets.len() {
            self.planets.truncate(count);
        } else {
            let start = self.planets.len();
            self.planets.extend((start..count).map(Planet::default_for));
        }
    }

    /// Replace the planet list. Excess entries are dropped and an empty list
    /// is padded to one default planet.
    pub fn set_planets(&mut self, planets: Vec<Planet>) {
        self.planets = planets;
        let count = self.planets.len();
        self.set_planet_count(count);
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = clamp_to(speed, &SPEED_RANGE);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the corner label, truncated to `MAX_LABEL_CHARS` characters.
    pub fn set_label(&mut self, label: &str) {
        self.label = label.chars().take(MAX_LABEL_CHARS).collect();
    }

    /// Randomize colors, sizes and rings of every body. The planet count, the
    /// label, and the view flags are kept.
    pub fn randomize(&mut self, rng: &mut Rng) {
        self.star.color = random_color(rng);
        self.star.set_size(rng.range(18.0, 48.0));
        for planet in &mut self.planets {
            planet.color = random_color(rng);
            planet.set_size(rng.range(*PLANET_SIZE_RANGE.start() + 2.0, 22.0));
            planet.has_rings = rng.chance(0.3);
            planet.set_ring_tilt(rng.range(0.0, *RING_TILT_RANGE.end()));
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene() {
        let scene = Scene::new();
        assert_eq!(scene.planet_count(), DEFAULT_PLANET_COUNT);
        assert_eq!(scene.star.size(), 28.0);
        assert_eq!(scene.planets()[0].size(), 10.0);
        assert!(scene.show_orbits);
    }

    #[test]
    fn resize_preserves_by_index() {
        let mut scene = Scene::new();
        scene.planet_mut(1).unwrap().color = Rgb::new(1, 2, 3);
        scene.set_planet_count(7);
        assert_eq!(scene.planet_count(), 7);
        assert_eq!(scene.planets()[1].color, Rgb::new(1, 2, 3));
        assert_eq!(scene.planets()[6], Planet::default_for(6));

        scene.set_planet_count(2);
        assert_eq!(scene.planet_count(), 2);
        assert_eq!(scene.planets()[1].color, Rgb::new(1, 2, 3));
    }

    #[test]
    fn count_is_clamped() {
        let mut scene = Scene::new();
        scene.set_planet_count(0);
        assert_eq!(scene.planet_count(), 1);
        scene.set_planet_count(42);
        assert_eq!(scene.planet_count(), 9);
    }

    #[test]
    fn setters_clamp() {
        let mut scene = Scene::new();
        scene.star.set_size(500.0);
        assert_eq!(scene.star.size(), 100.0);
        scene.set_speed(0.0);
        assert_eq!(scene.speed(), 0.1);
        let p = scene.planet_mut(0).unwrap();
        p.set_ring_tilt(-5.0);
        assert_eq!(p.ring_tilt(), 0.0);
        p.set_size(1.0);
        assert_eq!(p.size(), 2.0);
    }

    #[test]
    fn label_truncated_by_chars() {
        let mut scene = Scene::new();
        scene.set_label(&"é".repeat(60));
        assert_eq!(scene.label().chars().count(), MAX_LABEL_CHARS);
    }

    #[test]
    fn set_planets_pads_empty_list() {
        let mut scene = Scene::new();
        scene.set_planets(Vec::new());
        assert_eq!(scene.planet_count(), 1);
    }

    #[test]
    fn randomize_is_reproducible() {
        let mut a = Scene::new();
        let mut b = Scene::new();
        a.randomize(&mut Rng::new(1234));
        b.randomize(&mut Rng::new(1234));
        assert_eq!(a, b);
        assert_eq!(a.planet_count(), DEFAULT_PLANET_COUNT);
        for p in a.planets() {
            assert!(PLANET_SIZE_RANGE.contains(&p.size()));
            assert!(RING_TILT_RANGE.contains(&p.ring_tilt()));
        }
    }
}
