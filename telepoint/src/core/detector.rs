use crate::core::{CursorSample, Point};

/// Movement below this distance (in global screen units) is treated as
/// jitter and does not disturb the current stationary period.
pub const JITTER_THRESHOLD: f64 = 2.0;

/// Cadence at which the cursor is sampled. Fixed; only the trigger
/// threshold depends on the configured save interval.
pub const POLL_INTERVAL: f64 = 0.5;

/// Detects when the cursor has stayed put long enough to be intentional.
///
/// Fed one [`CursorSample`] per poll tick. Accumulates wall-clock time while
/// the cursor remains within [`JITTER_THRESHOLD`] of the anchor sample, and
/// yields the anchor once the accumulated duration reaches the save
/// interval. Large gaps between samples (e.g. system sleep) count as
/// elapsed time, so a trigger may fire immediately on resume.
#[derive(Debug)]
pub struct StationaryDetector {
    save_interval: f64,
    anchor: Option<CursorSample>,
    last_timestamp: f64,
    accumulated: f64,
}

impl StationaryDetector {
    pub fn new(save_interval: f64) -> Self {
        Self {
            save_interval,
            anchor: None,
            last_timestamp: 0.0,
            accumulated: 0.0,
        }
    }

    pub fn save_interval(&self) -> f64 {
        self.save_interval
    }

    /// Accumulated stationary duration, reset on movement and on trigger.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Position of the anchor sample marking the start of the current
    /// stationary period, if tracking has started.
    pub fn anchor_position(&self) -> Option<Point> {
        self.anchor.map(|s| s.position)
    }

    /// Drop all tracking state and start over with the given interval.
    /// Must be called on any reconfiguration so stale accumulated duration
    /// never survives a cadence change.
    pub fn restart(&mut self, save_interval: f64) {
        self.save_interval = save_interval;
        self.anchor = None;
        self.last_timestamp = 0.0;
        self.accumulated = 0.0;
    }

    /// Process one poll tick. Returns the anchor sample when the cursor has
    /// been stationary for at least the save interval; the accumulated
    /// duration resets but the anchor is kept, so the next trigger needs a
    /// full interval again.
    pub fn observe(&mut self, sample: CursorSample) -> Option<CursorSample> {
        let Some(anchor) = self.anchor else {
            self.anchor = Some(sample);
            self.last_timestamp = sample.timestamp;
            self.accumulated = 0.0;
            return None;
        };

        let elapsed = sample.timestamp - self.last_timestamp;
        self.last_timestamp = sample.timestamp;

        if sample.position.distance_to(anchor.position) < JITTER_THRESHOLD {
            self.accumulated += elapsed;
            if self.accumulated >= self.save_interval {
                self.accumulated = 0.0;
                return Some(anchor);
            }
        } else {
            self.accumulated = 0.0;
            self.anchor = Some(sample);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64, t: f64) -> CursorSample {
        CursorSample::new(Point::new(x, y), t)
    }

    /// Feed samples at the fixed poll cadence, all within the jitter radius
    /// of the origin sample.
    fn run_stationary(detector: &mut StationaryDetector, ticks: usize) -> Vec<CursorSample> {
        let mut triggers = Vec::new();
        for i in 0..=ticks {
            let t = i as f64 * POLL_INTERVAL;
            // Wiggle inside the jitter radius
            let dx = if i % 2 == 0 { 0.0 } else { 1.0 };
            if let Some(anchor) = detector.observe(sample(100.0 + dx, 200.0, t)) {
                triggers.push(anchor);
            }
        }
        triggers
    }

    #[test]
    fn test_first_tick_seeds_anchor_without_trigger() {
        let mut detector = StationaryDetector::new(5.0);
        assert!(detector.observe(sample(10.0, 20.0, 0.0)).is_none());
        assert_eq!(detector.anchor_position(), Some(Point::new(10.0, 20.0)));
        assert_eq!(detector.accumulated(), 0.0);
    }

    #[test]
    fn test_trigger_fires_exactly_once_and_carries_anchor() {
        let mut detector = StationaryDetector::new(5.0);

        // Samples at t = 0, 0.5, ..., 5.0, all within the jitter radius of
        // the t = 0 sample: trigger fires at t = 5.0 with the t = 0 anchor.
        let triggers = run_stationary(&mut detector, 10);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].position, Point::new(100.0, 200.0));
        assert_eq!(triggers[0].timestamp, 0.0);
        assert_eq!(detector.accumulated(), 0.0);
    }

    #[test]
    fn test_retrigger_requires_full_interval_again() {
        let mut detector = StationaryDetector::new(5.0);
        // 20 ticks of 0.5s = 10 simulated seconds: two full intervals.
        let triggers = run_stationary(&mut detector, 20);
        assert_eq!(triggers.len(), 2);
        // The anchor survives the first trigger.
        assert_eq!(triggers[1].position, Point::new(100.0, 200.0));
    }

    #[test]
    fn test_movement_resets_accumulation() {
        let mut detector = StationaryDetector::new(5.0);
        detector.observe(sample(100.0, 200.0, 0.0));
        for i in 1..=9 {
            assert!(detector
                .observe(sample(100.0, 200.0, i as f64 * POLL_INTERVAL))
                .is_none());
        }
        assert_eq!(detector.accumulated(), 4.5);

        // A move past the threshold resets the clock and moves the anchor.
        assert!(detector.observe(sample(103.0, 200.0, 5.0)).is_none());
        assert_eq!(detector.accumulated(), 0.0);
        assert_eq!(detector.anchor_position(), Some(Point::new(103.0, 200.0)));
    }

    #[test]
    fn test_sub_jitter_movement_does_not_move_anchor() {
        let mut detector = StationaryDetector::new(5.0);
        detector.observe(sample(100.0, 200.0, 0.0));
        detector.observe(sample(101.0, 200.5, 0.5));
        assert_eq!(detector.anchor_position(), Some(Point::new(100.0, 200.0)));
        assert!(detector.accumulated() > 0.0);
    }

    #[test]
    fn test_boundary_distance_counts_as_movement() {
        let mut detector = StationaryDetector::new(5.0);
        detector.observe(sample(100.0, 200.0, 0.0));
        // Exactly the jitter threshold: movement, not noise.
        detector.observe(sample(102.0, 200.0, 0.5));
        assert_eq!(detector.anchor_position(), Some(Point::new(102.0, 200.0)));
    }

    #[test]
    fn test_restart_discards_accumulated_duration() {
        let mut detector = StationaryDetector::new(5.0);
        detector.observe(sample(100.0, 200.0, 0.0));
        for i in 1..=9 {
            detector.observe(sample(100.0, 200.0, i as f64 * POLL_INTERVAL));
        }
        assert!(detector.accumulated() > 0.0);

        detector.restart(2.0);
        assert_eq!(detector.accumulated(), 0.0);
        assert_eq!(detector.anchor_position(), None);
        assert_eq!(detector.save_interval(), 2.0);

        // First sample after restart seeds, then a full 2.0s is required.
        assert!(detector.observe(sample(100.0, 200.0, 10.0)).is_none());
        assert!(detector.observe(sample(100.0, 200.0, 11.0)).is_none());
        assert!(detector.observe(sample(100.0, 200.0, 12.0)).is_some());
    }

    #[test]
    fn test_clock_gap_counts_as_elapsed_time() {
        // System sleep between ticks: the gap counts toward the stationary
        // duration, so the trigger fires on the first tick after resume.
        let mut detector = StationaryDetector::new(5.0);
        detector.observe(sample(100.0, 200.0, 0.0));
        detector.observe(sample(100.0, 200.0, 0.5));
        let trigger = detector.observe(sample(100.0, 200.0, 3600.0));
        assert!(trigger.is_some());
    }
}
