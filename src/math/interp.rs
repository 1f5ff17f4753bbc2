//! Spherical interpolation for unit vectors

use crate::core::types::Vec3;

/// Spherically interpolate between two unit vectors.
///
/// Falls back to normalized linear interpolation when the vectors are nearly
/// parallel (the slerp denominator degenerates) or nearly opposite (the
/// rotation axis is undefined).
pub fn slerp(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let dot = from.dot(to).clamp(-1.0, 1.0);

    if dot > 0.9995 || dot < -0.9995 {
        let lerped = from.lerp(to, t);
        if lerped.length_squared() > 1e-12 {
            return lerped.normalize();
        }
        return from;
    }

    let theta = dot.acos();
    let sin_theta = theta.sin();
    let a = ((1.0 - t) * theta).sin() / sin_theta;
    let b = (t * theta).sin() / sin_theta;
    from * a + to * b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slerp_endpoints() {
        let a = Vec3::X;
        let b = Vec3::Y;
        assert!(slerp(a, b, 0.0).abs_diff_eq(a, 1e-5));
        assert!(slerp(a, b, 1.0).abs_diff_eq(b, 1e-5));
    }

    #[test]
    fn test_slerp_midpoint_stays_unit() {
        let a = Vec3::X;
        let b = Vec3::Z;
        let mid = slerp(a, b, 0.5);
        assert!((mid.length() - 1.0).abs() < 1e-5);
        assert!((mid.x - mid.z).abs() < 1e-5);
    }

    #[test]
    fn test_slerp_near_parallel() {
        let a = Vec3::Y;
        let b = Vec3::new(0.001, 1.0, 0.0).normalize();
        let r = slerp(a, b, 0.5);
        assert!((r.length() - 1.0).abs() < 1e-5);
    }
}
