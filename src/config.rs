use crate::clock::DEFAULT_TIME_SLOW_RATE;
use crate::error::{Result, SimError};
use crate::field::FieldBounds;
use crate::sim::Scheme;
use crate::trail::{DEFAULT_TRAIL_LENGTH, MAX_TRAIL_LENGTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Proton-ish mass used by the presets, kg.
pub const UNIT_MASS: f64 = 167e-27;
pub const ELEMENTARY_CHARGE: f64 = 1e-19;
pub const DEFAULT_SPEED: f64 = 1e6;
pub const DEFAULT_FIELD_MAGNITUDE: f64 = 1.0;

/// Start-up parameter set. Missing JSON keys fall back to the classroom scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    pub charge: f64,
    pub mass: f64,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub field_magnitude: f64,
    pub bounds: FieldBounds,
    pub time_slow_rate: f64,
    pub paused: bool,
    pub scheme: Scheme,
    pub trail_length: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        // start on the orbit centred at the origin: r = m v / (q B)
        let radius = UNIT_MASS * DEFAULT_SPEED / (ELEMENTARY_CHARGE * DEFAULT_FIELD_MAGNITUDE);
        Self {
            charge: ELEMENTARY_CHARGE,
            mass: UNIT_MASS,
            position: [0.0, 0.0, -radius],
            velocity: [DEFAULT_SPEED, 0.0, 0.0],
            field_magnitude: DEFAULT_FIELD_MAGNITUDE,
            bounds: FieldBounds::default(),
            time_slow_rate: DEFAULT_TIME_SLOW_RATE,
            paused: false,
            scheme: Scheme::Rk4,
            trail_length: DEFAULT_TRAIL_LENGTH,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        validate_mass(self.mass)?;
        finite("charge", self.charge)?;
        finite("field magnitude", self.field_magnitude)?;
        for v in self.position {
            finite("position", v)?;
        }
        for v in self.velocity {
            finite("velocity", v)?;
        }
        validate_bounds(&self.bounds)?;
        if !self.time_slow_rate.is_finite() {
            return Err(SimError::NonFinite { what: "time slow rate" });
        }
        if self.time_slow_rate <= 0.0 {
            return Err(SimError::NonPositiveRate(self.time_slow_rate));
        }
        if self.trail_length == 0 || self.trail_length > MAX_TRAIL_LENGTH {
            return Err(SimError::InvalidTrailLength {
                len: self.trail_length,
                max: MAX_TRAIL_LENGTH,
            });
        }
        Ok(())
    }
}

pub(crate) fn finite(what: &'static str, v: f64) -> Result<()> {
    if v.is_finite() { Ok(()) } else { Err(SimError::NonFinite { what }) }
}

pub(crate) fn validate_mass(mass: f64) -> Result<()> {
    finite("mass", mass)?;
    if mass <= 0.0 {
        return Err(SimError::NonPositiveMass(mass));
    }
    Ok(())
}

pub(crate) fn validate_bounds(bounds: &FieldBounds) -> Result<()> {
    for (axis, min, max) in bounds.axes() {
        finite("field bounds", min)?;
        finite("field bounds", max)?;
        if min > max {
            return Err(SimError::InvalidBounds { axis, min, max });
        }
    }
    Ok(())
}

/// One selectable value in a UI dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub value: f64,
}

const MASS_PRESETS: &[Preset] = &[
    Preset { id: "50amu", label: "50 AMU", value: 0.5 * UNIT_MASS },
    Preset { id: "100amu", label: "100 AMU", value: UNIT_MASS },
    Preset { id: "150amu", label: "150 AMU", value: 1.5 * UNIT_MASS },
];

pub fn mass_presets() -> &'static [Preset] {
    MASS_PRESETS
}

const CHARGE_PRESETS: &[Preset] = &[
    Preset { id: "+2e", label: "+2e", value: 2.0 * ELEMENTARY_CHARGE },
    Preset { id: "+1e", label: "+1e", value: ELEMENTARY_CHARGE },
    Preset { id: "-1e", label: "-1e", value: -ELEMENTARY_CHARGE },
    Preset { id: "-2e", label: "-2e", value: -2.0 * ELEMENTARY_CHARGE },
];

pub fn charge_presets() -> &'static [Preset] {
    CHARGE_PRESETS
}

const SPEED_PRESETS: &[Preset] = &[
    Preset { id: "500k", label: "500,000 m/s", value: 0.5e6 },
    Preset { id: "1m", label: "1,000,000 m/s", value: 1e6 },
];

pub fn speed_presets() -> &'static [Preset] {
    SPEED_PRESETS
}

const FIELD_PRESETS: &[Preset] = &[
    Preset { id: "2up", label: "2 T, up", value: 2.0 },
    Preset { id: "1up", label: "1 T, up", value: 1.0 },
    Preset { id: "1down", label: "1 T, down", value: -1.0 },
    Preset { id: "2down", label: "2 T, down", value: -2.0 },
];

pub fn field_presets() -> &'static [Preset] {
    FIELD_PRESETS
}

const RATE_PRESETS: &[Preset] = &[
    Preset { id: "fast", label: "Fast", value: 250_000.0 },
    Preset { id: "medium", label: "Medium", value: 500_000.0 },
    Preset { id: "slow", label: "Slow", value: 1_000_000.0 },
];

pub fn rate_presets() -> &'static [Preset] {
    RATE_PRESETS
}

pub fn find_preset(kind: &'static str, presets: &[Preset], id: &str) -> Result<f64> {
    presets
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.value)
        .ok_or_else(|| SimError::UnknownPreset { kind, id: id.to_string() })
}
