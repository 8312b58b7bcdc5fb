use std::time::Instant;

/// Latches a start timestamp on the first sample and reports elapsed time.
///
/// Elapsed time is reported in seconds (`f32`), the unit documented for the
/// `uTime` uniform. Callers pass `now` explicitly so tests can drive
/// synthetic timelines.
pub(crate) struct FrameClock {
    start: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { start: None }
    }

    pub fn elapsed_seconds(&mut self, now: Instant) -> f32 {
        let start = *self.start.get_or_insert(now);
        now.saturating_duration_since(start).as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn first_sample_latches_and_reads_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.elapsed_seconds(Instant::now()), 0.0);
    }

    #[test]
    fn elapsed_time_never_decreases() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        let mut last = clock.elapsed_seconds(start);
        for step in 1..=5 {
            let sample = clock.elapsed_seconds(start + Duration::from_millis(step * 16));
            assert!(sample >= last);
            last = sample;
        }
    }

    #[test]
    fn repeated_now_reads_the_same_elapsed_value() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.elapsed_seconds(start);
        let moment = start + Duration::from_secs(2);
        assert_eq!(clock.elapsed_seconds(moment), clock.elapsed_seconds(moment));
    }

    #[test]
    fn elapsed_reflects_the_latched_origin() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.elapsed_seconds(start);
        let sample = clock.elapsed_seconds(start + Duration::from_millis(1500));
        assert!((sample - 1.5).abs() < 1e-3);
    }
}
