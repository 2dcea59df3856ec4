use crate::clock::{FrameStep, SimulationClock};
use crate::config::{
    self, charge_presets, field_presets, finite, mass_presets, rate_presets, speed_presets,
    validate_bounds, validate_mass, SimConfig,
};
use crate::error::{Result, SimError};
use crate::field::{FieldBounds, UniformMagneticField};
use crate::force::ForceLaw;
use crate::handle::VelocityHandle;
use crate::right_hand::{RightHandGuide, ThumbRule};
use crate::sim::{Integrator, Scheme};
use crate::trail::Trail;
use crate::{Particle, ParticleSnapshot};
use nalgebra::Vector3;

/// Everything one running scene owns. The frame loop calls `tick` once per
/// display frame; UI and drag handlers call the setters between ticks.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    particle: Particle,
    field: UniformMagneticField,
    clock: SimulationClock,
    integrator: Integrator,
    handle: VelocityHandle,
    trail: Trail,
    guide: RightHandGuide,
}

impl SimulationContext {
    /// `start_time` is the host's monotonic clock in seconds.
    pub fn new(config: &SimConfig, start_time: f64) -> Result<Self> {
        config.validate()?;
        let field = UniformMagneticField::new(config.field_magnitude, config.bounds);
        let mut particle = Particle::new(
            config.charge,
            config.mass,
            Vector3::from(config.position),
            Vector3::from(config.velocity),
        );
        particle.refresh(&ForceLaw::new(&field));
        let mut clock = SimulationClock::new(start_time, config.time_slow_rate)?;
        clock.set_paused(config.paused);
        let handle = VelocityHandle::new(&particle);
        log::debug!(
            "scene: q={} m={} B={} scheme={}",
            config.charge,
            config.mass,
            config.field_magnitude,
            config.scheme.id()
        );
        Ok(Self {
            particle,
            field,
            clock,
            integrator: Integrator::new(config.scheme),
            handle,
            trail: Trail::new(config.trail_length),
            guide: RightHandGuide::new(),
        })
    }

    /// Advance one display frame sampled at host time `now`.
    pub fn tick(&mut self, now: f64) -> FrameStep {
        let step = self.clock.tick(now);
        let paused = self.clock.is_paused();
        let law = ForceLaw::new(&self.field);
        self.integrator
            .advance(&mut self.particle, &law, step.sim_dt, &mut self.handle, paused);
        self.guide.update(
            &self.particle,
            self.handle.endpoint(),
            self.field.magnitude(),
            paused,
            step.raw_dt,
        );
        self.trail.record(self.particle.position(), step.raw_dt);
        log::trace!(
            "tick dt={:.3e} pos={:?} speed={:.3e}",
            step.sim_dt,
            self.particle.position(),
            self.particle.speed()
        );
        step
    }

    pub fn particle(&self) -> &Particle { &self.particle }
    pub fn field(&self) -> &UniformMagneticField { &self.field }
    pub fn clock(&self) -> &SimulationClock { &self.clock }
    pub fn integrator(&self) -> &Integrator { &self.integrator }
    pub fn handle(&self) -> &VelocityHandle { &self.handle }
    pub fn trail(&self) -> &Trail { &self.trail }
    pub fn guide(&self) -> &RightHandGuide { &self.guide }
    pub fn guide_mut(&mut self) -> &mut RightHandGuide { &mut self.guide }
    pub fn snapshot(&self) -> ParticleSnapshot { self.particle.snapshot() }
    pub fn is_paused(&self) -> bool { self.clock.is_paused() }

    // Parameter updates. Each takes effect on the next tick.

    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        validate_mass(mass)?;
        self.particle.set_mass(mass);
        log::debug!("mass set to {mass}");
        Ok(())
    }

    pub fn set_charge(&mut self, charge: f64) -> Result<()> {
        finite("charge", charge)?;
        self.particle.set_charge(charge);
        self.refresh();
        log::debug!("charge set to {charge}");
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        finite("speed", speed)?;
        self.particle.set_speed(speed.abs());
        self.refresh();
        log::debug!("speed set to {speed}");
        Ok(())
    }

    pub fn set_velocity(&mut self, velocity: Vector3<f64>) -> Result<()> {
        for v in velocity.iter() {
            finite("velocity", *v)?;
        }
        self.particle.set_velocity(velocity);
        self.refresh();
        Ok(())
    }

    pub fn set_field_magnitude(&mut self, magnitude: f64) -> Result<()> {
        finite("field magnitude", magnitude)?;
        self.field.set_magnitude(magnitude);
        self.refresh();
        log::debug!("field magnitude set to {magnitude}");
        Ok(())
    }

    pub fn set_field_bounds(&mut self, bounds: FieldBounds) -> Result<()> {
        validate_bounds(&bounds)?;
        self.field.set_bounds(bounds);
        self.refresh();
        log::debug!("field bounds set to {bounds:?}");
        Ok(())
    }

    pub fn set_time_slow_rate(&mut self, rate: f64) -> Result<()> {
        self.clock.set_time_slow_rate(rate)
    }

    pub fn set_scheme(&mut self, scheme: Scheme) {
        self.integrator.set_scheme(scheme);
    }

    /// Returns the new paused flag. Resuming ends any drag in progress.
    pub fn toggle_pause(&mut self) -> bool {
        let paused = self.clock.toggle_pause();
        if !paused {
            self.handle.end_drag();
        }
        paused
    }

    pub fn apply_preset(&mut self, kind: &str, id: &str) -> Result<()> {
        match kind {
            "mass" => self.set_mass(config::find_preset("mass", mass_presets(), id)?),
            "charge" => self.set_charge(config::find_preset("charge", charge_presets(), id)?),
            "speed" => self.set_speed(config::find_preset("speed", speed_presets(), id)?),
            "field" => self.set_field_magnitude(config::find_preset("field", field_presets(), id)?),
            "rate" => self.set_time_slow_rate(config::find_preset("rate", rate_presets(), id)?),
            _ => Err(SimError::UnknownPreset {
                kind: "preset kind",
                id: kind.to_string(),
            }),
        }
    }

    // Drag operations, only while paused.

    pub fn move_particle_to(&mut self, position: Vector3<f64>) -> Result<()> {
        self.require_paused()?;
        for v in position.iter() {
            finite("position", *v)?;
        }
        self.particle.set_position(position);
        Ok(())
    }

    pub fn begin_velocity_drag(&mut self) -> Result<()> {
        self.require_paused()?;
        self.handle.begin_drag();
        Ok(())
    }

    pub fn drag_velocity_to(&mut self, endpoint: Vector3<f64>) -> Result<()> {
        self.require_paused()?;
        for v in endpoint.iter() {
            finite("drag endpoint", *v)?;
        }
        self.handle.drag_to(endpoint);
        Ok(())
    }

    pub fn end_velocity_drag(&mut self) {
        self.handle.end_drag();
    }

    pub fn drag_thumb_to(&mut self, target: Vector3<f64>) -> Result<()> {
        self.require_paused()?;
        if !self.guide.thumb_draggable() {
            return Err(SimError::StepOutOfOrder {
                expected: "palm",
                actual: self.guide.stage().name(),
            });
        }
        self.guide.drag_thumb_to(target);
        Ok(())
    }

    // Teaching steps.

    pub fn start_guide(&mut self) -> Result<()> {
        self.guide.start(self.particle.force())
    }

    pub fn guide_point_fingers(&mut self) -> Result<()> {
        self.guide.point_fingers()
    }

    pub fn guide_open_palm(&mut self) -> Result<()> {
        self.guide.open_palm()
    }

    pub fn guide_read_thumb(&mut self) -> Result<Option<ThumbRule>> {
        self.guide.read_thumb(&self.particle)
    }

    fn require_paused(&self) -> Result<()> {
        if self.clock.is_paused() { Ok(()) } else { Err(SimError::NotPaused) }
    }

    fn refresh(&mut self) {
        self.particle.refresh(&ForceLaw::new(&self.field));
    }
}
