use glam::Vec2;

/// Active contact points of a touch event. Only the first two are kept; the
/// controller never needs more.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Touches {
    count: u8,
    points: [Vec2; 2],
}

impl Touches {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn one(p: Vec2) -> Self {
        Self {
            count: 1,
            points: [p, Vec2::ZERO],
        }
    }

    pub fn two(a: Vec2, b: Vec2) -> Self {
        Self {
            count: 2,
            points: [a, b],
        }
    }

    /// From a raw contact count and the first two points (unused points are
    /// ignored).
    pub fn from_raw(count: u32, a: Vec2, b: Vec2) -> Self {
        Self {
            count: count.min(u8::MAX as u32) as u8,
            points: [a, b],
        }
    }

    pub fn count(&self) -> usize {
        self.count as usize
    }

    pub fn first(&self) -> Option<Vec2> {
        (self.count >= 1).then_some(self.points[0])
    }

    /// Distance between the first two contacts.
    pub fn spread(&self) -> Option<f32> {
        (self.count >= 2).then(|| self.points[0].distance(self.points[1]))
    }
}

/// Input events the view understands, in raw device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Mouse button pressed at (x, y).
    PointerDown { x: f32, y: f32 },
    /// Mouse moved to (x, y).
    PointerMove { x: f32, y: f32 },
    /// Mouse button released at (x, y).
    PointerUp { x: f32, y: f32 },
    /// A finger touched down; `touches` lists all active contacts.
    TouchStart { touches: Touches },
    /// Contacts moved; `touches` lists all active contacts.
    TouchMove { touches: Touches },
    /// A finger lifted; `touches` lists the contacts still down.
    TouchEnd { touches: Touches },
    /// Wheel scrolled by `delta_y` (positive = away from the user, zooms out).
    Wheel { delta_y: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touches_spread() {
        let t = Touches::two(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0));
        assert_eq!(t.count(), 2);
        assert_eq!(t.spread(), Some(5.0));
        assert_eq!(Touches::one(Vec2::ONE).spread(), None);
        assert_eq!(Touches::none().first(), None);
    }

    #[test]
    fn raw_count_saturates() {
        let t = Touches::from_raw(1000, Vec2::ZERO, Vec2::X);
        assert_eq!(t.count(), 255);
        assert_eq!(t.spread(), Some(1.0));
    }
}
