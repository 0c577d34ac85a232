use std::cell::Cell;
use std::rc::Rc;

/// Largest frame delta applied in one step, in seconds.
/// A frame arriving after a long stall (hidden tab) advances at most this much.
pub const MAX_FRAME_DT: f64 = 0.25;

/// Monotonic simulation clock read by the orbit animator.
#[derive(Debug, Clone, Default)]
pub struct AnimationClock {
    time: f64,
    paused: bool,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by a frame delta. Negative or non-finite deltas are ignored.
    /// Returns the new time.
    pub fn advance(&mut self, frame_dt: f64) -> f64 {
        if !self.paused && frame_dt.is_finite() && frame_dt > 0.0 {
            self.time += frame_dt.min(MAX_FRAME_DT);
        }
        self.time
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Owning side of a cancellable animation loop.
///
/// The view holds the handle; the platform loop holds a [`LoopToken`] and
/// stops scheduling frames once the token reports dead. Dropping the handle
/// cancels the loop.
#[derive(Debug)]
pub struct LoopHandle {
    live: Rc<Cell<bool>>,
}

/// Observing side of a [`LoopHandle`].
#[derive(Debug, Clone)]
pub struct LoopToken {
    live: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn pair() -> (Self, LoopToken) {
        let live = Rc::new(Cell::new(true));
        let token = LoopToken { live: live.clone() };
        (Self { live }, token)
    }

    pub fn cancel(&self) {
        self.live.set(false);
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.live.set(false);
    }
}

impl LoopToken {
    pub fn is_live(&self) -> bool {
        self.live.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_monotonically() {
        let mut clock = AnimationClock::new();
        clock.advance(1.0 / 60.0);
        clock.advance(1.0 / 60.0);
        assert!((clock.time() - 2.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn ignores_bad_deltas() {
        let mut clock = AnimationClock::new();
        clock.advance(0.1);
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        clock.advance(f64::INFINITY);
        assert!((clock.time() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn caps_large_step() {
        let mut clock = AnimationClock::new();
        clock.advance(30.0);
        assert_eq!(clock.time(), MAX_FRAME_DT);
    }

    #[test]
    fn pause_stops_time() {
        let mut clock = AnimationClock::new();
        clock.pause();
        clock.advance(0.1);
        assert_eq!(clock.time(), 0.0);
        clock.resume();
        clock.advance(0.1);
        assert!(clock.time() > 0.0);
    }

    #[test]
    fn cancel_kills_token() {
        let (handle, token) = LoopHandle::pair();
        assert!(token.is_live());
        handle.cancel();
        assert!(!token.is_live());
    }

    #[test]
    fn drop_kills_token() {
        let (handle, token) = LoopHandle::pair();
        let token2 = token.clone();
        drop(handle);
        assert!(!token.is_live());
        assert!(!token2.is_live());
    }
}
