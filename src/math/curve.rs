use super::Vec3;

/// Evaluate a cubic Hermite curve between `p0` and `p1` with tangents `m0`/`m1`
///
/// Branch centerlines are bent by sampling this curve; the start tangent is
/// carried over from a parent branch to keep the joint C1-continuous.
pub fn hermite_point(p0: Vec3, p1: Vec3, m0: Vec3, m1: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    p0.scale(h00) + m0.scale(h10) + p1.scale(h01) + m1.scale(h11)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hermite_endpoints() {
        let p0 = Vec3::ZERO;
        let p1 = Vec3::new(1.0, 1.0, 0.0);
        let m0 = Vec3::RIGHT;
        let m1 = Vec3::RIGHT;

        let start = hermite_point(p0, p1, m0, m1, 0.0);
        assert!(start.distance(&p0) < 0.0001);

        let end = hermite_point(p0, p1, m0, m1, 1.0);
        assert!(end.distance(&p1) < 0.0001);
    }

    #[test]
    fn test_hermite_straight_line() {
        let p0 = Vec3::ZERO;
        let p1 = Vec3::new(0.0, 4.0, 0.0);
        let m = Vec3::new(0.0, 4.0, 0.0);

        // matching tangents along the chord keep the curve on the chord
        let mid = hermite_point(p0, p1, m, m, 0.5);
        assert!(mid.distance(&Vec3::new(0.0, 2.0, 0.0)) < 0.0001);
    }

    #[test]
    fn test_hermite_start_tangent_bends_curve() {
        let p0 = Vec3::ZERO;
        let p1 = Vec3::new(0.0, 4.0, 0.0);
        let m0 = Vec3::new(4.0, 0.0, 0.0);
        let m1 = Vec3::new(0.0, 4.0, 0.0);

        let early = hermite_point(p0, p1, m0, m1, 0.1);
        assert!(early.x > 0.0);
    }
}
