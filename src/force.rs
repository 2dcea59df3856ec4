//! Net force on a charged body.
//!
//! F = F_g + F_e + q (v × B)
//!
//! Only the magnetic term is physical here; gravity and the electric term are
//! kept in the sum as zero contributions.

use crate::field::MagneticField;
use nalgebra::Vector3;

/// Magnetic part of the Lorentz force: q (v × B).
pub fn lorentz_force(charge: f64, velocity: &Vector3<f64>, b_field: &Vector3<f64>) -> Vector3<f64> {
    charge * velocity.cross(b_field)
}

/// Force law bound to a magnetic field.
#[derive(Debug, Clone, Copy)]
pub struct ForceLaw<'a, F: MagneticField + ?Sized> {
    field: &'a F,
}

impl<'a, F: MagneticField + ?Sized> ForceLaw<'a, F> {
    pub fn new(field: &'a F) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &'a F { self.field }

    pub fn gravitational(&self, _position: &Vector3<f64>) -> Vector3<f64> {
        Vector3::zeros()
    }

    pub fn electric(&self, _charge: f64, _position: &Vector3<f64>) -> Vector3<f64> {
        Vector3::zeros()
    }

    pub fn magnetic(&self, charge: f64, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
        lorentz_force(charge, velocity, &self.field.field_at(position))
    }

    pub fn force(&self, charge: f64, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
        let mut force = Vector3::zeros();
        force += self.gravitational(position);
        force += self.electric(charge, position);
        force += self.magnetic(charge, position, velocity);
        force
    }
}
