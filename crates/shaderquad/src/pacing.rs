use std::time::{Duration, Instant};

/// Optional FPS cap for the redraw loop.
///
/// Uncapped pacing is always ready; capped pacing reports the next deadline
/// so the event loop can sleep with `ControlFlow::WaitUntil` instead of
/// spinning.
pub struct FramePacing {
    interval: Option<Duration>,
    last_render: Option<Instant>,
}

impl FramePacing {
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            last_render: None,
        }
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_render = Some(now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.interval, self.last_render) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_pacing_is_always_ready() {
        let mut pacing = FramePacing::new(None);
        let now = Instant::now();
        assert!(pacing.ready_for_frame(now));
        pacing.mark_rendered(now);
        assert!(pacing.ready_for_frame(now));
        assert!(pacing.next_deadline().is_none());
    }

    #[test]
    fn capped_pacing_waits_out_the_interval() {
        let mut pacing = FramePacing::new(Some(10.0));
        let start = Instant::now();
        assert!(pacing.ready_for_frame(start));
        pacing.mark_rendered(start);
        assert!(!pacing.ready_for_frame(start + Duration::from_millis(50)));
        assert!(pacing.ready_for_frame(start + Duration::from_millis(100)));
        assert_eq!(
            pacing.next_deadline(),
            Some(start + Duration::from_millis(100))
        );
    }

    #[test]
    fn zero_fps_means_uncapped() {
        let pacing = FramePacing::new(Some(0.0));
        assert!(pacing.next_deadline().is_none());
        assert!(pacing.ready_for_frame(Instant::now()));
    }
}
