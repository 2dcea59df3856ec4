use crate::Particle;
use nalgebra::Vector3;

/// Drawn arrow length per m/s of speed.
pub const ARROW_SCALE: f64 = 1.0e-6;
/// Gap between the arrow tip and the grab point.
pub const ENDPOINT_OFFSET: f64 = 0.09;
/// A dragged endpoint this close (vertically) to the particle is pulled onto its horizontal plane.
pub const PLANE_SNAP: f64 = 0.1;

/// Grab point at the tip of the velocity arrow.
///
/// Normally it trails the velocity. While the simulation is paused and the
/// user is dragging it, it wins over the integrator: the velocity is turned
/// toward it and keeps its previous speed.
#[derive(Debug, Clone, Default)]
pub struct VelocityHandle {
    endpoint: Vector3<f64>,
    dragging: bool,
}

impl VelocityHandle {
    pub fn new(particle: &Particle) -> Self {
        let mut handle = Self::default();
        handle.follow(particle);
        handle
    }

    pub fn endpoint(&self) -> &Vector3<f64> { &self.endpoint }
    pub fn is_dragging(&self) -> bool { self.dragging }

    pub fn begin_drag(&mut self) { self.dragging = true; }
    pub fn end_drag(&mut self) { self.dragging = false; }

    /// Move the grab point. Takes effect on the next `sync`.
    pub fn drag_to(&mut self, target: Vector3<f64>) {
        self.endpoint = target;
    }

    pub fn arrow_length(speed: f64) -> f64 {
        speed * ARROW_SCALE + ENDPOINT_OFFSET
    }

    /// Called right after the velocity update of every step.
    pub fn sync(&mut self, particle: &mut Particle, paused: bool) {
        if paused && self.dragging {
            self.steer(particle);
        } else {
            self.follow(particle);
        }
    }

    fn follow(&mut self, particle: &Particle) {
        self.endpoint = particle.position()
            + particle.direction() * Self::arrow_length(particle.velocity().norm());
    }

    fn steer(&mut self, particle: &mut Particle) {
        let origin = *particle.position();
        if (self.endpoint.y - origin.y).abs() < PLANE_SNAP {
            self.endpoint.y = origin.y;
        }
        // Endpoint on top of the particle: no direction to take.
        let Some(dir) = (self.endpoint - origin).try_normalize(0.0) else {
            self.follow(particle);
            return;
        };
        let speed = particle.velocity().norm();
        self.endpoint = origin + dir * Self::arrow_length(speed);
        particle.set_velocity(dir * speed);
    }
}
