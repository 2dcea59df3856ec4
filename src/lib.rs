use nalgebra::Vector3;
use serde::Serialize;

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod force;
pub mod handle;
pub mod right_hand;
pub mod sim;
pub mod trail;

pub use clock::{ClockState, FrameStep, SimulationClock};
pub use config::SimConfig;
pub use engine::SimulationContext;
pub use error::SimError;
pub use field::{FieldBounds, MagneticField, UniformMagneticField};
pub use force::ForceLaw;
pub use sim::{Integrator, Scheme};

#[cfg(target_arch = "wasm32")]
pub mod wasm;

/// Charged point body. `speed` and `force` are derived and only change on
/// `refresh` or velocity writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    charge: f64,
    mass: f64,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    speed: f64,
    force: Vector3<f64>,
}

impl Particle {
    /// `mass` must be positive; nothing here checks it.
    pub fn new(charge: f64, mass: f64, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self {
            charge,
            mass,
            position,
            velocity,
            speed: velocity.norm(),
            force: Vector3::zeros(),
        }
    }

    pub fn charge(&self) -> f64 { self.charge }
    pub fn mass(&self) -> f64 { self.mass }
    pub fn position(&self) -> &Vector3<f64> { &self.position }
    pub fn velocity(&self) -> &Vector3<f64> { &self.velocity }
    pub fn speed(&self) -> f64 { self.speed }
    pub fn force(&self) -> &Vector3<f64> { &self.force }

    /// Unit vector along the velocity, zero when at rest.
    pub fn direction(&self) -> Vector3<f64> {
        self.velocity.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
    }

    pub fn set_charge(&mut self, charge: f64) { self.charge = charge; }

    pub fn set_mass(&mut self, mass: f64) { self.mass = mass; }

    pub fn set_position(&mut self, position: Vector3<f64>) { self.position = position; }

    pub fn set_velocity(&mut self, velocity: Vector3<f64>) {
        self.velocity = velocity;
        self.speed = velocity.norm();
    }

    /// Keeps the direction, rescales to `speed`.
    pub fn set_speed(&mut self, speed: f64) {
        let dir = self.direction();
        self.set_velocity(dir * speed);
    }

    /// Relative displacement; the integrator never assigns position outright.
    pub fn translate(&mut self, delta: &Vector3<f64>) {
        self.position += delta;
    }

    pub(crate) fn add_velocity(&mut self, delta: &Vector3<f64>) {
        self.velocity += delta;
    }

    /// Recompute speed and force from the current state.
    pub fn refresh<F: MagneticField + ?Sized>(&mut self, law: &ForceLaw<'_, F>) {
        self.speed = self.velocity.norm();
        self.force = law.force(self.charge, &self.position, &self.velocity);
    }

    /// [x, y, z, vx, vy, vz]
    pub fn state_array(&self) -> [f64; 6] {
        [
            self.position.x, self.position.y, self.position.z,
            self.velocity.x, self.velocity.y, self.velocity.z,
        ]
    }

    pub fn snapshot(&self) -> ParticleSnapshot {
        ParticleSnapshot {
            charge: self.charge,
            mass: self.mass,
            position: [self.position.x, self.position.y, self.position.z],
            velocity: [self.velocity.x, self.velocity.y, self.velocity.z],
            speed: self.speed,
            force: [self.force.x, self.force.y, self.force.z],
        }
    }
}

/// Plain copy of the particle for UI/debug output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleSnapshot {
    pub charge: f64,
    pub mass: f64,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub speed: f64,
    pub force: [f64; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_derives_speed() {
        let p = Particle::new(1e-19, 167e-27, Vector3::zeros(), Vector3::new(3e5, 4e5, 0.0));
        assert_eq!(p.speed(), 5e5);
        assert_eq!(*p.force(), Vector3::zeros());
    }

    #[test]
    fn set_speed_keeps_direction() {
        let mut p = Particle::new(1e-19, 167e-27, Vector3::zeros(), Vector3::new(0.0, 0.0, -2.0));
        p.set_speed(5e5);
        assert_eq!(*p.velocity(), Vector3::new(0.0, 0.0, -5e5));
        assert_eq!(p.speed(), 5e5);
    }

    #[test]
    fn set_speed_at_rest_stays_at_rest() {
        let mut p = Particle::new(1e-19, 167e-27, Vector3::zeros(), Vector3::zeros());
        p.set_speed(1e6);
        assert_eq!(*p.velocity(), Vector3::zeros());
        assert_eq!(p.direction(), Vector3::zeros());
    }

    #[test]
    fn translate_is_relative() {
        let mut p = Particle::new(0.0, 1.0, Vector3::new(1.0, 2.0, 3.0), Vector3::zeros());
        p.translate(&Vector3::new(0.5, 0.0, -1.0));
        assert_eq!(*p.position(), Vector3::new(1.5, 2.0, 2.0));
    }

    #[test]
    fn snapshot_mirrors_state() {
        let p = Particle::new(-1e-19, 2.0, Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 2.0, 0.0));
        let s = p.snapshot();
        assert_eq!(s.position, [1.0, 0.0, 0.0]);
        assert_eq!(s.velocity, [0.0, 2.0, 0.0]);
        assert_eq!(p.state_array(), [1.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
    }
}
