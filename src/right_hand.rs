//! Guided three-finger right-hand rule.
//!
//! Fingers along v, B out of the palm, thumb gives the force direction for a
//! positive charge. The guide only keeps the data a presentation layer needs
//! (stage, overlay flags, thumb point, hand roll); it never draws anything.

use crate::error::{Result, SimError};
use crate::Particle;
use nalgebra::Vector3;
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Distance from the charge to the thumb grab point.
pub const THUMB_LENGTH: f64 = 0.42;
/// Hand angles below this count as aligned.
pub const HAND_ANGLE_SNAP: f64 = 0.14;
/// rad/s while the hand spins in the fingers stage.
pub const HAND_ROTATE_RATE: f64 = 2.0;
/// Spinning stops once the accumulated roll is this close past a full turn.
pub const ROTATION_STOP_WINDOW: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    #[default]
    Idle,
    Started,
    Fingers,
    Palm,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Started => "started",
            Stage::Fingers => "fingers",
            Stage::Palm => "palm",
        }
    }
}

/// Which overlays the presentation layer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Overlays {
    pub hand: bool,
    pub velocity: bool,
    pub force: bool,
    pub trail: bool,
}

/// How the force relates to the thumb, reported when the last step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ThumbRule {
    AlongThumb,
    AgainstThumb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    pub anchor: Vector3<f64>,
    /// The fingers point here (tip of the velocity arrow).
    pub look_at: Vector3<f64>,
    /// Roll about the anchor→look_at axis, radians.
    pub roll: f64,
}

#[derive(Debug, Clone)]
pub struct RightHandGuide {
    stage: Stage,
    overlays: Overlays,
    rotating: bool,
    stop_requested: bool,
    rotation: f64,
    thumb: Vector3<f64>,
    hand_angle: f64,
    pose: HandPose,
}

impl Default for RightHandGuide {
    fn default() -> Self {
        Self {
            stage: Stage::Idle,
            overlays: Overlays::default(),
            rotating: false,
            stop_requested: false,
            rotation: 0.0,
            thumb: Vector3::zeros(),
            hand_angle: 0.0,
            pose: HandPose {
                anchor: Vector3::zeros(),
                look_at: Vector3::zeros(),
                roll: 0.0,
            },
        }
    }
}

impl RightHandGuide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage { self.stage }
    pub fn overlays(&self) -> &Overlays { &self.overlays }
    pub fn set_overlays(&mut self, overlays: Overlays) { self.overlays = overlays; }
    pub fn is_rotating(&self) -> bool { self.rotating }
    pub fn thumb(&self) -> &Vector3<f64> { &self.thumb }
    pub fn hand_angle(&self) -> f64 { self.hand_angle }
    pub fn hand_pose(&self) -> &HandPose { &self.pose }

    pub fn hand_visible(&self, force: &Vector3<f64>) -> bool {
        self.overlays.hand && *force != Vector3::zeros()
    }

    pub fn force_visible(&self, force: &Vector3<f64>) -> bool {
        self.overlays.force && *force != Vector3::zeros()
    }

    /// The thumb is only user-placed during the palm stage.
    pub fn thumb_draggable(&self) -> bool {
        self.stage == Stage::Palm
    }

    pub fn can_finish(&self) -> bool {
        self.stage == Stage::Palm && self.hand_angle == 0.0
    }

    /// Show only the velocity arrow and the trail. The charge must feel a force.
    pub fn start(&mut self, force: &Vector3<f64>) -> Result<()> {
        self.expect(Stage::Idle)?;
        if *force == Vector3::zeros() {
            return Err(SimError::NotInField);
        }
        self.overlays = Overlays {
            hand: false,
            velocity: true,
            force: false,
            trail: true,
        };
        self.enter(Stage::Started);
        Ok(())
    }

    /// Fingers along v: the hand appears and spins about the velocity.
    pub fn point_fingers(&mut self) -> Result<()> {
        self.expect(Stage::Started)?;
        self.rotating = true;
        self.overlays.hand = true;
        self.enter(Stage::Fingers);
        Ok(())
    }

    /// B out of the palm: the spin winds down to a whole turn and the thumb is handed to the user.
    pub fn open_palm(&mut self) -> Result<()> {
        self.expect(Stage::Fingers)?;
        self.stop_requested = true;
        self.enter(Stage::Palm);
        Ok(())
    }

    /// The thumb gives the force. Requires the hand to be aligned.
    pub fn read_thumb(&mut self, particle: &Particle) -> Result<Option<ThumbRule>> {
        self.expect(Stage::Palm)?;
        if self.hand_angle != 0.0 {
            return Err(SimError::HandMisaligned { angle: self.hand_angle });
        }
        self.overlays.force = true;
        self.enter(Stage::Idle);
        if *particle.force() == Vector3::zeros() {
            return Ok(None);
        }
        Ok(Some(if particle.charge() > 0.0 {
            ThumbRule::AlongThumb
        } else {
            ThumbRule::AgainstThumb
        }))
    }

    pub fn drag_thumb_to(&mut self, target: Vector3<f64>) {
        self.thumb = target;
    }

    /// Per-frame update, after the particle has been stepped.
    pub fn update(
        &mut self,
        particle: &Particle,
        endpoint: &Vector3<f64>,
        field_magnitude: f64,
        paused: bool,
        raw_dt: f64,
    ) {
        let position = *particle.position();
        let force = *particle.force();

        let mut roll = 0.0;
        if self.rotating {
            roll += self.rotation;
            self.rotation += HAND_ROTATE_RATE * raw_dt;
            if self.stop_requested && self.rotation.rem_euclid(TAU) < ROTATION_STOP_WINDOW {
                self.rotating = false;
                self.stop_requested = false;
            }
        }
        if field_magnitude >= 0.0 {
            roll += PI;
        }

        if paused && self.stage == Stage::Palm {
            let offset = project_on_plane(&(self.thumb - position), particle.velocity());
            let dir = offset.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            self.thumb = position + dir * THUMB_LENGTH;

            let reference = if particle.charge() >= 0.0 { force } else { -force };
            let mut angle = angle_between(&dir, &reference);
            if field_magnitude < 0.0 {
                angle = -angle;
            }
            if angle.abs() < HAND_ANGLE_SNAP {
                angle = 0.0;
            }
            self.hand_angle = angle;
            roll += if self.thumb.y >= position.y { angle } else { -angle };
        } else {
            let sign = if particle.charge() > 0.0 { 1.0 } else { -1.0 };
            let dir = force.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            self.thumb = position + dir * (THUMB_LENGTH * sign);
            self.hand_angle = 0.0;
        }

        self.pose = HandPose {
            anchor: position,
            look_at: *endpoint,
            roll,
        };
    }

    fn expect(&self, stage: Stage) -> Result<()> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(SimError::StepOutOfOrder {
                expected: stage.name(),
                actual: self.stage.name(),
            })
        }
    }

    fn enter(&mut self, stage: Stage) {
        log::info!("right-hand guide: {} -> {}", self.stage.name(), stage.name());
        self.stage = stage;
    }
}

fn project_on_plane(v: &Vector3<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
    let n2 = normal.norm_squared();
    if n2 == 0.0 {
        return *v;
    }
    v - normal * (v.dot(normal) / n2)
}

/// Unsigned angle; a zero-length side counts as perpendicular.
fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = (a.norm_squared() * b.norm_squared()).sqrt();
    if denom == 0.0 {
        return FRAC_PI_2;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldBounds, UniformMagneticField};
    use crate::force::ForceLaw;
    use approx::assert_relative_eq;

    fn particle_in_field(charge: f64, magnitude: f64) -> Particle {
        let field = UniformMagneticField::new(magnitude, FieldBounds::default());
        let mut p = Particle::new(charge, 167e-27, Vector3::new(0.0, 0.0, -1.67), Vector3::new(1e6, 0.0, 0.0));
        p.refresh(&ForceLaw::new(&field));
        p
    }

    fn guide_in_palm(p: &Particle) -> RightHandGuide {
        let mut guide = RightHandGuide::new();
        guide.start(p.force()).unwrap();
        guide.point_fingers().unwrap();
        guide.open_palm().unwrap();
        guide
    }

    #[test]
    fn start_requires_a_force() {
        let p = particle_in_field(1e-19, 0.0);
        let mut guide = RightHandGuide::new();
        assert!(matches!(guide.start(p.force()), Err(SimError::NotInField)));
        assert_eq!(guide.stage(), Stage::Idle);
    }

    #[test]
    fn start_shows_velocity_and_trail_only() {
        let p = particle_in_field(1e-19, 1.0);
        let mut guide = RightHandGuide::new();
        guide.set_overlays(Overlays { hand: true, velocity: false, force: true, trail: false });
        guide.start(p.force()).unwrap();
        assert_eq!(*guide.overlays(), Overlays { hand: false, velocity: true, force: false, trail: true });
    }

    #[test]
    fn steps_must_run_in_order() {
        let mut guide = RightHandGuide::new();
        assert!(matches!(guide.open_palm(), Err(SimError::StepOutOfOrder { expected: "fingers", actual: "idle" })));
        assert!(guide.point_fingers().is_err());
    }

    #[test]
    fn thumb_follows_force_outside_palm_stage() {
        let p = particle_in_field(1e-19, 1.0);
        let mut guide = RightHandGuide::new();
        guide.update(&p, &Vector3::zeros(), 1.0, false, 0.016);
        // force points to +z
        assert_relative_eq!(guide.thumb().z, -1.67 + THUMB_LENGTH, epsilon = 1e-12);

        let n = particle_in_field(-1e-19, 1.0);
        guide.update(&n, &Vector3::zeros(), 1.0, false, 0.016);
        // negative charge: force to -z, thumb drawn opposite, i.e. +z again
        assert_relative_eq!(guide.thumb().z, -1.67 + THUMB_LENGTH, epsilon = 1e-12);
    }

    #[test]
    fn spin_stops_near_a_whole_turn() {
        let p = particle_in_field(1e-19, 1.0);
        let mut guide = RightHandGuide::new();
        guide.start(p.force()).unwrap();
        guide.point_fingers().unwrap();
        for _ in 0..10 {
            guide.update(&p, &Vector3::zeros(), 1.0, false, 0.016);
        }
        guide.open_palm().unwrap();
        let mut frames = 0;
        while guide.is_rotating() && frames < 10_000 {
            guide.update(&p, &Vector3::zeros(), 1.0, false, 0.016);
            frames += 1;
        }
        assert!(!guide.is_rotating());
        assert!(guide.rotation.rem_euclid(TAU) < ROTATION_STOP_WINDOW);
    }

    #[test]
    fn aligned_thumb_snaps_and_finishes() {
        let p = particle_in_field(1e-19, 1.0);
        let mut guide = guide_in_palm(&p);
        // slightly off the force direction (+z), and off the plane orthogonal to v
        guide.drag_thumb_to(Vector3::new(0.3, 0.05, -1.0));
        guide.update(&p, &Vector3::zeros(), 1.0, true, 0.016);
        assert_eq!(guide.hand_angle(), 0.0);
        assert_relative_eq!(guide.thumb().x, 0.0, epsilon = 1e-12);
        assert_relative_eq!((guide.thumb() - p.position()).norm(), THUMB_LENGTH, epsilon = 1e-12);
        assert!(guide.can_finish());
        assert_eq!(guide.read_thumb(&p).unwrap(), Some(ThumbRule::AlongThumb));
        assert!(guide.overlays().force);
        assert_eq!(guide.stage(), Stage::Idle);
    }

    #[test]
    fn misaligned_thumb_blocks_the_last_step() {
        let p = particle_in_field(1e-19, 1.0);
        let mut guide = guide_in_palm(&p);
        guide.drag_thumb_to(Vector3::new(0.0, 1.0, -1.67));
        guide.update(&p, &Vector3::zeros(), 1.0, true, 0.016);
        assert_relative_eq!(guide.hand_angle(), FRAC_PI_2, epsilon = 1e-12);
        assert!(matches!(guide.read_thumb(&p), Err(SimError::HandMisaligned { .. })));
        assert_eq!(guide.stage(), Stage::Palm);
    }

    #[test]
    fn negative_charge_reads_against_thumb() {
        let p = particle_in_field(-1e-19, 1.0);
        let mut guide = guide_in_palm(&p);
        // force is -z, the comparison uses -force = +z
        guide.drag_thumb_to(Vector3::new(0.0, 0.0, 0.0));
        guide.update(&p, &Vector3::zeros(), 1.0, true, 0.016);
        assert_eq!(guide.hand_angle(), 0.0);
        assert_eq!(guide.read_thumb(&p).unwrap(), Some(ThumbRule::AgainstThumb));
    }

    #[test]
    fn downward_field_flips_angle_sign() {
        let p = particle_in_field(1e-19, -1.0);
        let mut guide = guide_in_palm(&p);
        // force is -z now; thumb straight up is a right angle away
        guide.drag_thumb_to(Vector3::new(0.0, 1.0, -1.67));
        guide.update(&p, &Vector3::zeros(), -1.0, true, 0.016);
        assert_relative_eq!(guide.hand_angle(), -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn hidden_overlays_for_zero_force() {
        let p = particle_in_field(1e-19, 0.0);
        let mut guide = RightHandGuide::new();
        guide.set_overlays(Overlays { hand: true, velocity: true, force: true, trail: true });
        assert!(!guide.hand_visible(p.force()));
        assert!(!guide.force_visible(p.force()));
    }
}
