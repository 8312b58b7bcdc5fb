//! Pointer-event plumbing between the host event loop and the render step.
//!
//! The host owns a [`PointerTracker`], feeds it raw cursor and button events,
//! and pushes the resulting immutable [`PointerSample`]s through a
//! [`PointerFeed`]. The render step drains the feed and keeps the latest
//! sample, so in a multi-threaded host the shader always observes a complete
//! snapshot rather than a half-updated position.

use crossbeam_channel::Sender;

/// Immutable pointer snapshot consumed by the render step.
///
/// The position is in surface pixels with a bottom-left origin; the Y flip is
/// the tracker's job, not the renderer's.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub position: [f32; 2],
    pub pressed: bool,
}

/// Cloneable sender half of the pointer channel.
#[derive(Clone)]
pub struct PointerFeed {
    sender: Sender<PointerSample>,
}

impl PointerFeed {
    pub(crate) fn new(sender: Sender<PointerSample>) -> Self {
        Self { sender }
    }

    /// Pushes a snapshot; dropped silently if the playground is gone.
    pub fn push(&self, sample: PointerSample) {
        let _ = self.sender.send(sample);
    }
}

/// Accumulates raw pointer events and produces bottom-left-origin samples.
///
/// Positions arrive in window coordinates (top-left origin, as delivered by
/// the windowing system); [`PointerTracker::sample`] flips the Y axis against
/// the current surface height.
#[derive(Debug, Default)]
pub struct PointerTracker {
    position: Option<(f64, f64)>,
    pressed: bool,
}

impl PointerTracker {
    /// Records the latest cursor position in window coordinates.
    pub fn handle_moved(&mut self, x: f64, y: f64) {
        self.position = Some((x, y));
    }

    /// Notes a primary-button transition.
    pub fn handle_button(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// Produces a snapshot with the Y axis flipped to a bottom-left origin.
    pub fn sample(&self, surface_height: f32) -> PointerSample {
        let position = match self.position {
            Some((x, y)) => [x as f32, surface_height - y as f32],
            None => [0.0, 0.0],
        };
        PointerSample {
            position,
            pressed: self.pressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_flips_y_against_surface_height() {
        let mut tracker = PointerTracker::default();
        tracker.handle_moved(12.0, 34.0);
        let sample = tracker.sample(240.0);
        assert_eq!(sample.position, [12.0, 206.0]);
    }

    #[test]
    fn button_state_travels_with_the_sample() {
        let mut tracker = PointerTracker::default();
        tracker.handle_button(true);
        assert!(tracker.sample(100.0).pressed);
        tracker.handle_button(false);
        assert!(!tracker.sample(100.0).pressed);
    }

    #[test]
    fn sample_before_any_motion_sits_at_origin() {
        let tracker = PointerTracker::default();
        assert_eq!(tracker.sample(480.0).position, [0.0, 0.0]);
    }

    #[test]
    fn feed_delivers_latest_sample() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let feed = PointerFeed::new(tx);
        let mut tracker = PointerTracker::default();

        tracker.handle_moved(1.0, 1.0);
        feed.push(tracker.sample(100.0));
        tracker.handle_moved(5.0, 10.0);
        feed.push(tracker.sample(100.0));

        let latest = rx.try_iter().last().expect("at least one sample");
        assert_eq!(latest.position, [5.0, 90.0]);
    }
}
