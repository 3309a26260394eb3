use std::ops::Mul;
use serde::{Serialize, Deserialize};
use super::Vec3;

/// Unit quaternion for segment orientation frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis`
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalize_or(Vec3::UP);
        let half = angle * 0.5;
        let s = half.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    /// Shortest-arc rotation taking the direction of `from` onto `to`
    pub fn rotation_between(from: Vec3, to: Vec3) -> Self {
        let f = from.normalize_or(Vec3::UP);
        let t = to.normalize_or(Vec3::UP);
        let d = f.dot(&t);

        if d > 1.0 - 1e-6 {
            return Quat::IDENTITY;
        }
        if d < -1.0 + 1e-6 {
            // antiparallel: half turn around any perpendicular axis
            return Quat::from_axis_angle(f.perpendicular(), std::f32::consts::PI);
        }

        let axis = f.cross(&t);
        Quat::new(axis.x, axis.y, axis.z, 1.0 + d).normalize()
    }

    /// Frame whose local +Y points along `direction`, with deterministic roll
    pub fn look_along(direction: Vec3) -> Self {
        Quat::rotation_between(Vec3::UP, direction)
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
                w: self.w / len,
            }
        } else {
            Quat::IDENTITY
        }
    }
}

impl Mul for Quat {
    type Output = Quat;

    /// Hamilton product: `(a * b) * v` applies `b` first, then `a`
    fn mul(self, rhs: Quat) -> Quat {
        Quat {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;

    /// Rotate a vector by this quaternion
    fn mul(self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(&v).scale(2.0);
        v + t.scale(self.w) + q.cross(&t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.distance(&b) < 0.0001, "expected {:?}, got {:?}", b, a);
    }

    #[test]
    fn test_identity_rotation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_close(Quat::IDENTITY * v, v);
    }

    #[test]
    fn test_axis_angle_quarter_turn() {
        let q = Quat::from_axis_angle(Vec3::UP, std::f32::consts::FRAC_PI_2);
        assert_close(q * Vec3::RIGHT, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_rotation_between_maps_from_onto_to() {
        let cases = [
            (Vec3::UP, Vec3::RIGHT),
            (Vec3::RIGHT, Vec3::new(0.0, 0.0, 1.0)),
            (Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 1.0)),
        ];
        for (from, to) in cases {
            let q = Quat::rotation_between(from, to);
            assert_close(q * from.normalize(), to.normalize());
            assert!((q.length() - 1.0).abs() < 0.0001);
        }
    }

    #[test]
    fn test_rotation_between_parallel_is_identity() {
        let q = Quat::rotation_between(Vec3::UP, Vec3::UP.scale(3.0));
        assert_close(q * Vec3::RIGHT, Vec3::RIGHT);
    }

    #[test]
    fn test_rotation_between_antiparallel() {
        let q = Quat::rotation_between(Vec3::UP, -Vec3::UP);
        assert_close(q * Vec3::UP, -Vec3::UP);
        assert!((q.length() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_look_along_maps_up_axis() {
        for dir in [Vec3::RIGHT, Vec3::new(0.3, 0.9, -0.2), -Vec3::UP] {
            let q = Quat::look_along(dir);
            assert_close(q * Vec3::UP, dir.normalize());
        }
    }

    #[test]
    fn test_product_composes_rotations() {
        let a = Quat::from_axis_angle(Vec3::UP, 0.7);
        let b = Quat::from_axis_angle(Vec3::RIGHT, -1.2);
        let v = Vec3::new(0.5, -2.0, 1.5);
        assert_close((a * b) * v, a * (b * v));
    }

    #[test]
    fn test_rotation_preserves_length() {
        let q = Quat::rotation_between(Vec3::new(1.0, 2.0, -1.0), Vec3::new(-2.0, 0.5, 0.3));
        let v = Vec3::new(3.0, -1.0, 2.0);
        assert!(((q * v).length() - v.length()).abs() < 0.001);
    }
}
