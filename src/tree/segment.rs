use rand::Rng;
use crate::math::{Quat, Vec3};

/// One cross-sectional ring of points around a branch's centerline
///
/// `points` holds `width - 1` offsets around the local origin; the mesh seam
/// vertex reuses the first point so UVs can wrap. The frame maps local +Y to
/// the centerline tangent at this ring.
#[derive(Debug, Clone)]
pub struct Segment {
    pub points: Vec<Vec3>,
    pub radius: f32,
    pub position: Vec3,
    pub rotation: Quat,
}

impl Segment {
    /// Build a jittered polygon cross-section at the local origin
    pub fn new(width: usize, radius: f32, noise: f32, rng: &mut impl Rng) -> Self {
        let count = width.saturating_sub(1);
        let mut points = Vec::with_capacity(count);

        for i in 0..count {
            let ratio = i as f32 / count as f32;
            let rad = std::f32::consts::TAU * ratio;
            let x = rad.cos() * radius + rng.random_range(-0.5..0.5) * radius * noise;
            let z = rad.sin() * radius + rng.random_range(-0.5..0.5) * radius * noise;
            points.push(Vec3::new(x, 0.0, z));
        }

        Self {
            points,
            radius,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    /// Copy the parent ring verbatim so the joint is seamless
    pub fn weld_to(&mut self, parent: &Segment) {
        self.points = parent.points.clone();
        self.position = parent.position;
        self.rotation = parent.rotation;
        self.radius = parent.radius;
    }

    /// Centerline tangent at this ring
    pub fn direction(&self) -> Vec3 {
        self.rotation * Vec3::UP
    }
}
