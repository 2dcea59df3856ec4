use crate::field::MagneticField;
use crate::force::ForceLaw;
use crate::handle::VelocityHandle;
use crate::Particle;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Integration scheme used by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Rk4,
    /// Semi-implicit Euler. Cheaper, drifts in energy.
    #[serde(alias = "semi-implicit-euler")]
    Euler,
}

impl Scheme {
    pub fn id(self) -> &'static str {
        match self {
            Scheme::Rk4 => "rk4",
            Scheme::Euler => "euler",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "rk4" => Some(Scheme::Rk4),
            "euler" | "semi-implicit-euler" => Some(Scheme::Euler),
            _ => None,
        }
    }
}

/// One classical RK4 step, then refresh speed/force. `dt = 0` only refreshes.
pub fn advance_rk4<F: MagneticField + ?Sized>(particle: &mut Particle, law: &ForceLaw<'_, F>, dt: f64) {
    step_rk4(particle, law, dt);
    particle.refresh(law);
}

/// One semi-implicit Euler step, then refresh speed/force.
pub fn advance_euler<F: MagneticField + ?Sized>(particle: &mut Particle, law: &ForceLaw<'_, F>, dt: f64) {
    step_euler(particle, law, dt);
    particle.refresh(law);
}

fn step_rk4<F: MagneticField + ?Sized>(particle: &mut Particle, law: &ForceLaw<'_, F>, dt: f64) {
    let charge = particle.charge();
    let mass = particle.mass();
    let accel = |x: &Vector3<f64>, v: &Vector3<f64>| law.force(charge, x, v) / mass;

    let x = *particle.position();
    let v = *particle.velocity();

    // k1
    let k1x = v;
    let k1v = accel(&x, &v);
    let tmp_x = x + 0.5 * dt * k1x;
    let tmp_v = v + 0.5 * dt * k1v;

    // k2
    let k2x = tmp_v;
    let k2v = accel(&tmp_x, &tmp_v);
    let tmp_x = x + 0.5 * dt * k2x;
    let tmp_v = v + 0.5 * dt * k2v;

    // k3
    let k3x = tmp_v;
    let k3v = accel(&tmp_x, &tmp_v);
    let tmp_x = x + dt * k3x;
    let tmp_v = v + dt * k3v;

    // k4
    let k4x = tmp_v;
    let k4v = accel(&tmp_x, &tmp_v);

    particle.translate(&(dt * (k1x + 2.0 * k2x + 2.0 * k3x + k4x) / 6.0));
    particle.add_velocity(&(dt * (k1v + 2.0 * k2v + 2.0 * k3v + k4v) / 6.0));
}

fn step_euler<F: MagneticField + ?Sized>(particle: &mut Particle, law: &ForceLaw<'_, F>, dt: f64) {
    let v = *particle.velocity();
    particle.translate(&(v * dt));
    // force at the moved position, old velocity
    let force = law.force(particle.charge(), particle.position(), &v);
    particle.add_velocity(&(force * (dt / particle.mass())));
}

/// Frame-loop integrator: scheme step, velocity-handle override, derived refresh.
#[derive(Debug, Clone, Default)]
pub struct Integrator {
    scheme: Scheme,
}

impl Integrator {
    pub fn new(scheme: Scheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> Scheme { self.scheme }
    pub fn set_scheme(&mut self, scheme: Scheme) { self.scheme = scheme; }

    /// Advance by `dt` (finite, >= 0). While `paused` a dragged handle
    /// overrides the velocity direction after the kinematic update.
    pub fn advance<F: MagneticField + ?Sized>(
        &self,
        particle: &mut Particle,
        law: &ForceLaw<'_, F>,
        dt: f64,
        handle: &mut VelocityHandle,
        paused: bool,
    ) {
        match self.scheme {
            Scheme::Rk4 => step_rk4(particle, law, dt),
            Scheme::Euler => step_euler(particle, law, dt),
        }
        handle.sync(particle, paused);
        particle.refresh(law);
    }
}
