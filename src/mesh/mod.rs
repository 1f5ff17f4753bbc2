//! Mesh data structures and surface extraction

pub mod cubic;
pub mod marching;
pub mod smoothing;
pub mod tables;

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;
use crate::math::Aabb;
use crate::vox::Rgba;

/// Surface extraction algorithm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshAlgorithm {
    /// One quad per exposed voxel face, hard edges
    #[default]
    Cubic,
    /// Smooth isosurface over a voxel density field
    MarchingCubes,
}

/// How marching cubes picks the color for a cube's vertices
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSelect {
    /// Most frequent non-empty palette index among the cube's corner cells;
    /// ties go to the index seen first in corner-scan order
    #[default]
    Dominant,
    /// First non-empty corner cell in scan order
    FirstNonEmpty,
}

/// Settings driving mesh generation.
///
/// `scale` multiplies voxel units into mesh units. `iso_level` and `padding`
/// apply to marching cubes only. Smoothing runs when `smooth_strength` is
/// positive; `smooth_radius` is in voxel units and converted by `scale`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    pub scale: f32,
    pub algorithm: MeshAlgorithm,
    pub iso_level: f32,
    pub padding: u32,
    pub color_select: ColorSelect,
    pub smooth_strength: f32,
    pub smooth_radius: f32,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            algorithm: MeshAlgorithm::Cubic,
            iso_level: 0.25,
            padding: 1,
            color_select: ColorSelect::Dominant,
            smooth_strength: 1.0,
            smooth_radius: 0.0,
        }
    }
}

/// Generated triangle mesh: positions, per-vertex colors and normals, and a
/// u32 triangle index list (dense volumes overflow 16-bit indices).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Rgba>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Bounding box of all vertex positions; `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Vertex colors viewed as raw RGBA bytes, ready for GPU upload
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Rebuild per-vertex normals from the triangle winding
    pub fn recompute_normals(&mut self) {
        self.normals = face_weighted_normals(&self.positions, &self.indices);
    }
}

/// Per-vertex normals from accumulated triangle cross products.
///
/// Every triangle adds its (area-weighted) face normal to its three vertices;
/// the sums are normalized at the end. Vertices not referenced by any
/// triangle, or whose contributions cancel, fall back to +Y.
pub fn face_weighted_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    for normal in &mut normals {
        if normal.length_squared() > 1e-12 {
            *normal = normal.normalize();
        } else {
            *normal = Vec3::Y;
        }
    }
    normals
}
