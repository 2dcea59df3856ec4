use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Anything that can answer "what is B at this point".
pub trait MagneticField {
    fn field_at(&self, position: &Vector3<f64>) -> Vector3<f64>;
}

// A closure `Fn(&position) -> B` works as a field too.
impl<F> MagneticField for F
where
    F: Fn(&Vector3<f64>) -> Vector3<f64>,
{
    fn field_at(&self, position: &Vector3<f64>) -> Vector3<f64> {
        (self)(position)
    }
}

/// Axis-aligned box in simulation space. Every face belongs to the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl FieldBounds {
    pub fn new(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Self {
        Self {
            x_min: x.0,
            x_max: x.1,
            y_min: y.0,
            y_max: y.1,
            z_min: z.0,
            z_max: z.1,
        }
    }

    pub fn contains(&self, p: &Vector3<f64>) -> bool {
        !(p.x < self.x_min
            || p.x > self.x_max
            || p.y < self.y_min
            || p.y > self.y_max
            || p.z < self.z_min
            || p.z > self.z_max)
    }

    /// Per-axis (name, min, max), used by validation.
    pub fn axes(&self) -> [(char, f64, f64); 3] {
        [
            ('x', self.x_min, self.x_max),
            ('y', self.y_min, self.y_max),
            ('z', self.z_min, self.z_max),
        ]
    }

    pub fn center(&self) -> Vector3<f64> {
        Vector3::new(
            (self.x_max + self.x_min) / 2.0,
            (self.y_max + self.y_min) / 2.0,
            (self.z_max + self.z_min) / 2.0,
        )
    }

    pub fn size(&self) -> Vector3<f64> {
        Vector3::new(
            self.x_max - self.x_min,
            self.y_max - self.y_min,
            self.z_max - self.z_min,
        )
    }
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self::new((-4.0, 4.0), (-1.0, 1.0), (-4.0, 4.0))
    }
}

/// Uniform field along +y inside `bounds`, zero elsewhere.
/// The sign of `magnitude` selects up or down.
#[derive(Debug, Clone)]
pub struct UniformMagneticField {
    magnitude: f64,
    bounds: FieldBounds,
    revision: u64,
}

impl UniformMagneticField {
    pub fn new(magnitude: f64, bounds: FieldBounds) -> Self {
        Self {
            magnitude,
            bounds,
            revision: 0,
        }
    }

    pub fn magnitude(&self) -> f64 { self.magnitude }
    pub fn bounds(&self) -> &FieldBounds { &self.bounds }

    /// Bumped by every mutation; renderers rebuild field-line geometry when it changes.
    pub fn revision(&self) -> u64 { self.revision }

    pub fn set_magnitude(&mut self, magnitude: f64) {
        self.magnitude = magnitude;
        self.revision += 1;
    }

    pub fn set_bounds(&mut self, bounds: FieldBounds) {
        self.bounds = bounds;
        self.revision += 1;
    }

    pub fn contains(&self, position: &Vector3<f64>) -> bool {
        self.bounds.contains(position)
    }
}

impl MagneticField for UniformMagneticField {
    fn field_at(&self, position: &Vector3<f64>) -> Vector3<f64> {
        if self.bounds.contains(position) {
            Vector3::new(0.0, self.magnitude, 0.0)
        } else {
            Vector3::zeros()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_field() -> UniformMagneticField {
        UniformMagneticField::new(1.0, FieldBounds::default())
    }

    #[test]
    fn inside_points_see_the_field() {
        let field = unit_field();
        assert_eq!(field.field_at(&Vector3::zeros()), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(field.field_at(&Vector3::new(-3.9, 0.5, 2.0)), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn outside_points_are_field_free() {
        let field = unit_field();
        assert_eq!(field.field_at(&Vector3::new(5.0, 0.0, 0.0)), Vector3::zeros());
        assert_eq!(field.field_at(&Vector3::new(0.0, -1.01, 0.0)), Vector3::zeros());
        assert_eq!(field.field_at(&Vector3::new(0.0, 0.0, 4.5)), Vector3::zeros());
    }

    #[test]
    fn faces_are_inclusive() {
        let field = unit_field();
        assert_eq!(field.field_at(&Vector3::new(4.0, 1.0, 4.0)), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(field.field_at(&Vector3::new(-4.0, -1.0, -4.0)), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn negative_magnitude_points_down() {
        let mut field = unit_field();
        field.set_magnitude(-2.0);
        assert_eq!(field.field_at(&Vector3::zeros()), Vector3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn mutations_bump_revision() {
        let mut field = unit_field();
        assert_eq!(field.revision(), 0);
        field.set_magnitude(2.0);
        field.set_bounds(FieldBounds::new((-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0)));
        assert_eq!(field.revision(), 2);
        assert_eq!(field.field_at(&Vector3::new(2.0, 0.0, 0.0)), Vector3::zeros());
    }

    #[test]
    fn closures_are_fields() {
        let along_z = |_: &Vector3<f64>| Vector3::new(0.0, 0.0, 3.0);
        assert_eq!(along_z.field_at(&Vector3::new(100.0, 0.0, 0.0)).z, 3.0);
    }

    #[test]
    fn bounds_geometry_helpers() {
        let b = FieldBounds::new((-2.0, 4.0), (0.0, 2.0), (-1.0, 1.0));
        assert_eq!(b.center(), Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(b.size(), Vector3::new(6.0, 2.0, 2.0));
    }
}
