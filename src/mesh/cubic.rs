//! Face-culling cubic mesher
//!
//! Emits one quad per voxel face that borders empty space (or the volume
//! edge), so the mesh contains boundary geometry only. Faces never share
//! vertices: each face needs its own flat normal, which rules out index
//! reuse across faces.
//!
//! Coordinate convention: file-space `(x, y, z)` becomes mesh-space
//! `(x, z, -y)` - the container's z axis is "up" in mesh space. The mesh is
//! centered on the local origin via the pivot
//! `(size_x / 2, size_z / 2, -size_y / 2 + 1)`; the one-unit depth
//! correction matches the orientation the parser's fixtures lock in.

use crate::core::types::Vec3;
use crate::mesh::MeshData;
use crate::vox::{Palette, VoxFrame};

/// One of the six cube faces: the file-space neighbor offset it is culled
/// against, and its four mesh-space corners in winding order.
struct Face {
    neighbor: [i32; 3],
    corners: [Vec3; 4],
}

/// Mesh-space +X, -X, +Y, -Y, +Z, -Z faces. Neighbor offsets are in file
/// space (mesh +Y is file +Z, mesh +Z is file -Y).
const FACES: [Face; 6] = [
    Face {
        neighbor: [1, 0, 0],
        corners: [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        ],
    },
    Face {
        neighbor: [-1, 0, 0],
        corners: [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
        ],
    },
    Face {
        neighbor: [0, 0, 1],
        corners: [
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
    },
    Face {
        neighbor: [0, 0, -1],
        corners: [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ],
    },
    Face {
        neighbor: [0, -1, 0],
        corners: [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ],
    },
    Face {
        neighbor: [0, 1, 0],
        corners: [
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
        ],
    },
];

/// Generate a boundary-faces-only mesh for one frame.
///
/// Each exposed face contributes four fresh vertices carrying the voxel's
/// palette color and two triangles. Normals are recomputed from the final
/// winding, giving flat per-face shading.
pub fn generate(frame: &VoxFrame, palette: &Palette, scale: f32) -> MeshData {
    let mut mesh = MeshData::default();

    let size_x = frame.size_x() as i32;
    let size_y = frame.size_y() as i32;
    let size_z = frame.size_z() as i32;
    let center = Vec3::new(
        size_x as f32 / 2.0,
        size_z as f32 / 2.0,
        -(size_y as f32) / 2.0 + 1.0,
    );

    for x in 0..size_x {
        for y in 0..size_y {
            for z in 0..size_z {
                let value = frame.get(x, y, z);
                let Some(color) = palette.color_for_voxel(value) else {
                    continue;
                };

                let base = Vec3::new(x as f32, z as f32, -(y as f32));

                for face in &FACES {
                    let [dx, dy, dz] = face.neighbor;
                    if frame.is_occupied(x + dx, y + dy, z + dz) {
                        continue;
                    }

                    let first = mesh.positions.len() as u32;
                    for corner in &face.corners {
                        mesh.positions.push((base + *corner - center) * scale);
                        mesh.colors.push(color);
                    }
                    mesh.indices.extend_from_slice(&[
                        first,
                        first + 1,
                        first + 2,
                        first,
                        first + 2,
                        first + 3,
                    ]);
                }
            }
        }
    }

    mesh.recompute_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(size: u32) -> VoxFrame {
        let volume = (size * size * size) as usize;
        VoxFrame::new(size, size, size, vec![1; volume])
    }

    #[test]
    fn test_single_voxel_has_six_faces() {
        let mut frame = VoxFrame::empty(1, 1, 1);
        frame.set(0, 0, 0, 1);
        let mesh = generate(&frame, &Palette::default(), 1.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.normals.len(), 24);
        assert_eq!(mesh.colors.len(), 24);
    }

    #[test]
    fn test_enclosed_voxel_emits_nothing() {
        // 3x3x3 solid block: the center voxel's six neighbors are all
        // occupied, so only the 9*6 outer faces appear.
        let mesh = generate(&solid_frame(3), &Palette::default(), 1.0);
        assert_eq!(mesh.vertex_count(), 9 * 6 * 4);
        assert_eq!(mesh.triangle_count(), 9 * 6 * 2);
    }

    #[test]
    fn test_two_by_two_solid_cube_faces() {
        // No coplanar merging: a solid 2x2x2 volume exposes 4 unit faces
        // per side, 24 total.
        let mesh = generate(&solid_frame(2), &Palette::default(), 1.0);
        assert_eq!(mesh.triangle_count(), 24 * 2);
        assert_eq!(mesh.vertex_count(), 24 * 4);
    }

    #[test]
    fn test_empty_frame_empty_mesh() {
        let mesh = generate(&VoxFrame::empty(4, 4, 4), &Palette::default(), 1.0);
        assert!(mesh.is_empty());
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_mesh_centered_on_origin() {
        let mesh = generate(&solid_frame(2), &Palette::default(), 1.0);
        let bounds = mesh.bounds().unwrap();
        let center = bounds.center();
        // The one-unit pivot correction compensates for cells extending
        // toward -Z, so all three axes center on the origin.
        assert!(center.abs().max_element() < 1e-5);
        assert_eq!(bounds.size(), Vec3::splat(2.0));
    }

    #[test]
    fn test_scale_applied_after_centering() {
        let small = generate(&solid_frame(2), &Palette::default(), 1.0);
        let large = generate(&solid_frame(2), &Palette::default(), 2.5);
        assert_eq!(large.vertex_count(), small.vertex_count());
        assert_eq!(large.bounds().unwrap().size(), Vec3::splat(5.0));
    }

    #[test]
    fn test_face_colors_from_palette() {
        let mut frame = VoxFrame::empty(1, 1, 1);
        frame.set(0, 0, 0, 9);
        let palette = Palette::default();
        let mesh = generate(&frame, &palette, 1.0);
        let expected = palette.color(8);
        assert!(mesh.colors.iter().all(|&c| c == expected));
    }

    #[test]
    fn test_normals_point_outward() {
        let mut frame = VoxFrame::empty(1, 1, 1);
        frame.set(0, 0, 0, 1);
        let mesh = generate(&frame, &Palette::default(), 1.0);
        let center = mesh.bounds().unwrap().center();
        for (position, normal) in mesh.positions.iter().zip(&mesh.normals) {
            assert!(
                normal.dot(*position - center) > 0.0,
                "normal {normal} points inward at {position}"
            );
        }
    }

    #[test]
    fn test_file_up_axis_becomes_mesh_y() {
        // Two voxels stacked along file z must stack along mesh y.
        let mut frame = VoxFrame::empty(1, 1, 2);
        frame.set(0, 0, 0, 1);
        frame.set(0, 0, 1, 1);
        let mesh = generate(&frame, &Palette::default(), 1.0);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.size(), Vec3::new(1.0, 2.0, 1.0));
        // Shared interior faces culled: 10 faces, not 12.
        assert_eq!(mesh.triangle_count(), 10 * 2);
    }
}
