use thiserror::Error;

/// Errors raised at the parameter boundary of the simulation.
///
/// The physics itself never fails; these come from setters, config loading
/// and the teaching-mode state machine.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("mass must be positive, got {0}")]
    NonPositiveMass(f64),
    #[error("time slow rate must be positive, got {0}")]
    NonPositiveRate(f64),
    #[error("invalid {axis} bounds: min {min} > max {max}")]
    InvalidBounds { axis: char, min: f64, max: f64 },
    #[error("{what} must be finite")]
    NonFinite { what: &'static str },
    #[error("operation is only allowed while the simulation is paused")]
    NotPaused,
    #[error("the charge must be inside the magnetic field")]
    NotInField,
    #[error("teaching step out of order: expected {expected}, currently {actual}")]
    StepOutOfOrder {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("hand is not aligned with the force yet (angle {angle:.3} rad)")]
    HandMisaligned { angle: f64 },
    #[error("unknown {kind} preset '{id}'")]
    UnknownPreset { kind: &'static str, id: String },
    #[error("trail length must be in 1..={max}, got {len}")]
    InvalidTrailLength { len: usize, max: usize },
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
