use crate::error::{Result, SimError};
use serde::Serialize;

/// Real frame gaps above this are treated as a stall.
pub const MAX_FRAME_DT: f64 = 0.02;
/// Replacement for a stalled frame gap.
pub const FALLBACK_FRAME_DT: f64 = 1.0 / 60.0;
pub const DEFAULT_TIME_SLOW_RATE: f64 = 500_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockState {
    /// Seconds, monotonic host time of the previous tick.
    pub last_sample_time: f64,
    /// Divisor from real seconds to simulated seconds. Always > 0.
    pub time_slow_rate: f64,
    pub is_paused: bool,
}

/// Time deltas produced by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    /// Clamped real seconds since the previous tick.
    pub raw_dt: f64,
    /// Seconds handed to the integrator; zero while paused.
    pub sim_dt: f64,
}

/// Maps host frame times to simulation steps. Two states, running and
/// paused, switched only by explicit calls.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    state: ClockState,
    sim_time: f64,
    frames: u64,
}

/// Stall guard: anything above `MAX_FRAME_DT` becomes one 60 Hz frame.
pub fn clamp_frame_dt(raw_dt: f64) -> f64 {
    if raw_dt > MAX_FRAME_DT { FALLBACK_FRAME_DT } else { raw_dt }
}

impl SimulationClock {
    pub fn new(start_time: f64, time_slow_rate: f64) -> Result<Self> {
        if !start_time.is_finite() {
            return Err(SimError::NonFinite { what: "start time" });
        }
        validate_rate(time_slow_rate)?;
        Ok(Self {
            state: ClockState {
                last_sample_time: start_time,
                time_slow_rate,
                is_paused: false,
            },
            sim_time: 0.0,
            frames: 0,
        })
    }

    pub fn state(&self) -> &ClockState { &self.state }
    pub fn is_paused(&self) -> bool { self.state.is_paused }
    pub fn time_slow_rate(&self) -> f64 { self.state.time_slow_rate }
    /// Accumulated simulated seconds.
    pub fn sim_time(&self) -> f64 { self.sim_time }
    pub fn frames(&self) -> u64 { self.frames }

    /// Applies from the next tick on.
    pub fn set_time_slow_rate(&mut self, rate: f64) -> Result<()> {
        validate_rate(rate)?;
        self.state.time_slow_rate = rate;
        log::debug!("time slow rate set to {rate}");
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.state.is_paused != paused {
            self.state.is_paused = paused;
            log::info!("simulation {}", if paused { "paused" } else { "resumed" });
        }
    }

    /// Returns the new paused flag.
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.state.is_paused);
        self.state.is_paused
    }

    /// Sample the host clock. Non-finite or backwards samples yield a zero step.
    pub fn tick(&mut self, now: f64) -> FrameStep {
        let previous = self.state.last_sample_time;
        let mut raw_dt = now - previous;
        if now.is_finite() {
            self.state.last_sample_time = now;
        }
        if !raw_dt.is_finite() || raw_dt < 0.0 {
            log::warn!("discarding clock sample {now} (previous {previous})");
            raw_dt = 0.0;
        }
        let raw_dt = clamp_frame_dt(raw_dt);
        let sim_dt = if self.state.is_paused {
            0.0
        } else {
            raw_dt / self.state.time_slow_rate
        };
        self.sim_time += sim_dt;
        self.frames += 1;
        FrameStep { raw_dt, sim_dt }
    }
}

fn validate_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() {
        return Err(SimError::NonFinite { what: "time slow rate" });
    }
    if rate <= 0.0 {
        return Err(SimError::NonPositiveRate(rate));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn long_gaps_collapse_to_one_frame() {
        let mut clock = SimulationClock::new(0.0, 1.0).unwrap();
        let step = clock.tick(1.0);
        assert_eq!(step.raw_dt, 1.0 / 60.0);
        assert_eq!(step.sim_dt, 1.0 / 60.0);
    }

    #[test]
    fn short_gaps_pass_through_scaled() {
        let mut clock = SimulationClock::new(10.0, 500_000.0).unwrap();
        let step = clock.tick(10.016);
        assert_relative_eq!(step.raw_dt, 0.016, epsilon = 1e-12);
        assert_relative_eq!(step.sim_dt, 0.016 / 500_000.0, max_relative = 1e-9);
        assert_eq!(clock.state().last_sample_time, 10.016);
    }

    #[test]
    fn boundary_gap_is_not_clamped() {
        assert_eq!(clamp_frame_dt(0.02), 0.02);
        assert_eq!(clamp_frame_dt(0.0200001), FALLBACK_FRAME_DT);
    }

    #[test]
    fn paused_ticks_are_zero_length() {
        let mut clock = SimulationClock::new(0.0, 2.0).unwrap();
        assert!(clock.toggle_pause());
        for now in [0.01, 0.5, 0.51] {
            let step = clock.tick(now);
            assert_eq!(step.sim_dt, 0.0);
            assert!(step.raw_dt > 0.0);
        }
        assert_eq!(clock.sim_time(), 0.0);
        assert!(!clock.toggle_pause());
        assert!(clock.tick(0.52).sim_dt > 0.0);
    }

    #[test]
    fn rate_must_be_positive_and_finite() {
        let mut clock = SimulationClock::new(0.0, 1.0).unwrap();
        assert!(matches!(clock.set_time_slow_rate(0.0), Err(SimError::NonPositiveRate(_))));
        assert!(matches!(clock.set_time_slow_rate(-5.0), Err(SimError::NonPositiveRate(_))));
        assert!(matches!(clock.set_time_slow_rate(f64::INFINITY), Err(SimError::NonFinite { .. })));
        assert_eq!(clock.time_slow_rate(), 1.0);
        clock.set_time_slow_rate(250_000.0).unwrap();
        assert_eq!(clock.time_slow_rate(), 250_000.0);
        assert!(SimulationClock::new(0.0, 0.0).is_err());
    }

    #[test]
    fn backwards_or_nan_samples_do_not_step() {
        let mut clock = SimulationClock::new(5.0, 1.0).unwrap();
        assert_eq!(clock.tick(4.0).raw_dt, 0.0);
        assert_eq!(clock.tick(f64::NAN).raw_dt, 0.0);
        assert_eq!(clock.state().last_sample_time, 4.0);
        assert_relative_eq!(clock.tick(4.01).raw_dt, 0.01, epsilon = 1e-12);
    }
}
