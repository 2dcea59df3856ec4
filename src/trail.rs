use nalgebra::Vector3;
use std::collections::VecDeque;

pub const DEFAULT_TRAIL_LENGTH: usize = 300;
/// Upper bound accepted from configs.
pub const MAX_TRAIL_LENGTH: usize = 100_000;
/// Samples per second of real time.
pub const SAMPLE_RATE: f64 = 165.0;

/// Recent positions, newest first, spaced evenly in real time by
/// interpolating between frame positions.
#[derive(Debug, Clone)]
pub struct Trail {
    samples: VecDeque<Vector3<f64>>,
    capacity: usize,
    last: Vector3<f64>,
    carry: f64,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            last: Vector3::zeros(),
            carry: 0.0,
        }
    }

    pub fn len(&self) -> usize { self.samples.len() }
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }
    pub fn capacity(&self) -> usize { self.capacity }

    /// Newest first.
    pub fn samples(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.carry = 0.0;
    }

    /// Record the position reached after a frame that took `raw_dt` real seconds.
    pub fn record(&mut self, position: &Vector3<f64>, raw_dt: f64) {
        if self.samples.is_empty() {
            self.samples.push_front(*position);
            self.carry = 0.0;
            self.last = *position;
            return;
        }
        if raw_dt <= 0.0 {
            return;
        }
        let ratio = 1.0 / (SAMPLE_RATE * raw_dt);
        let mut n = self.carry;
        while n < 1.0 {
            self.samples.push_front(self.last.lerp(position, n));
            n += ratio;
        }
        // at most one frame of lag after a tiny step
        self.carry = (n - 1.0).min(1.0);
        self.last = *position;
        self.samples.truncate(self.capacity);
    }

    /// [x, y, z]* newest first.
    pub fn flat(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.samples.len() * 3);
        for p in &self.samples {
            out.extend_from_slice(&[p.x, p.y, p.z]);
        }
        out
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_record_seeds_the_trail() {
        let mut trail = Trail::new(10);
        trail.record(&Vector3::new(1.0, 2.0, 3.0), 0.0);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.flat(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn samples_are_spread_over_the_frame() {
        let mut trail = Trail::new(100);
        trail.record(&Vector3::zeros(), 0.0);
        // 3.5 sample intervals: samples at 0, 2/7, 4/7 and 6/7 of the way
        trail.record(&Vector3::new(4.0, 0.0, 0.0), 3.5 / SAMPLE_RATE);
        assert_eq!(trail.len(), 5);
        let xs: Vec<f64> = trail.samples().map(|p| p.x).collect();
        assert_relative_eq!(xs[0], 24.0 / 7.0, epsilon = 1e-9);
        assert_relative_eq!(xs[3], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn carry_spans_short_frames() {
        let mut trail = Trail::new(100);
        trail.record(&Vector3::zeros(), 0.0);
        // 0.4 sample intervals per frame
        let short = 0.4 / SAMPLE_RATE;
        trail.record(&Vector3::new(1.0, 0.0, 0.0), short);
        assert_eq!(trail.len(), 2);
        trail.record(&Vector3::new(2.0, 0.0, 0.0), short);
        assert_eq!(trail.len(), 2);
        trail.record(&Vector3::new(3.0, 0.0, 0.0), short);
        assert_eq!(trail.len(), 3);
    }

    #[test]
    fn tiny_frame_does_not_stall_sampling() {
        let mut trail = Trail::new(100);
        trail.record(&Vector3::zeros(), 0.0);
        trail.record(&Vector3::new(1e-3, 0.0, 0.0), 1e-9);
        assert_eq!(trail.len(), 2);
        // one frame absorbs the leftover, the next samples normally (2/7 spacing)
        let frame = 3.5 / SAMPLE_RATE;
        trail.record(&Vector3::new(1.0, 0.0, 0.0), frame);
        assert_eq!(trail.len(), 2);
        trail.record(&Vector3::new(2.0, 0.0, 0.0), frame);
        assert_eq!(trail.len(), 6);
    }

    #[test]
    fn zero_length_frames_add_nothing() {
        let mut trail = Trail::new(100);
        trail.record(&Vector3::zeros(), 0.0);
        trail.record(&Vector3::new(1.0, 0.0, 0.0), 0.0);
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut trail = Trail::new(3);
        trail.record(&Vector3::zeros(), 0.0);
        for i in 1..10 {
            trail.record(&Vector3::new(i as f64, 0.0, 0.0), 0.7 / SAMPLE_RATE);
        }
        assert_eq!(trail.len(), 3);
        let newest = trail.samples().next().unwrap().x;
        assert!((8.0..=9.0).contains(&newest));
    }
}
