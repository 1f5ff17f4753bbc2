//! Cache fingerprints for generated meshes
//!
//! A fingerprint captures every parameter that affects generated geometry.
//! Float parameters never enter a fingerprint raw: they are snapped to fixed
//! increments here, in one place, so visually identical requests collapse to
//! one cache entry instead of accumulating near-duplicates from
//! floating-point jitter. The quantized values are stored as integer ticks,
//! which also makes the key `Eq + Hash`.

use crate::mesh::MeshAlgorithm;

/// Scale ticks: 0.001 per step
pub fn quantize_scale(scale: f32) -> i32 {
    (scale * 1000.0).round() as i32
}

/// Smoothing strength ticks: 0.1 per step, clamped to [0, 1]
pub fn quantize_strength(strength: f32) -> i32 {
    (strength.clamp(0.0, 1.0) * 10.0).round() as i32
}

/// Smoothing radius ticks: 0.25 per step, clamped to >= 0
pub fn quantize_radius(radius: f32) -> i32 {
    (radius.max(0.0) * 4.0).round() as i32
}

/// Snapped strength as the value actually fed to the smoothing pass
pub fn snap_strength(strength: f32) -> f32 {
    quantize_strength(strength) as f32 * 0.1
}

/// Snapped radius as the value actually fed to the smoothing pass
pub fn snap_radius(radius: f32) -> f32 {
    quantize_radius(radius) as f32 * 0.25
}

/// Composite cache key for one generated mesh
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshFingerprint {
    pub palette: String,
    pub frame: usize,
    pub scale_ticks: i32,
    pub algorithm: MeshAlgorithm,
    pub strength_ticks: i32,
    pub radius_ticks: i32,
}

impl MeshFingerprint {
    /// Build a fingerprint, quantizing the float parameters.
    ///
    /// This constructor is the single point where floats are snapped;
    /// everything downstream compares exact integers.
    pub fn new(
        palette: impl Into<String>,
        frame: usize,
        scale: f32,
        algorithm: MeshAlgorithm,
        smooth_strength: f32,
        smooth_radius: f32,
    ) -> Self {
        Self {
            palette: palette.into(),
            frame,
            scale_ticks: quantize_scale(scale),
            algorithm,
            strength_ticks: quantize_strength(smooth_strength),
            radius_ticks: quantize_radius(smooth_radius),
        }
    }
}
