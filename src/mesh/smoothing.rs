//! Normal smoothing passes
//!
//! Both passes rebuild canonical winding normals first, then blend each
//! vertex's normal toward an average over a spatial neighborhood. Positions,
//! colors and triangle connectivity are never touched - only `normals` is
//! rewritten, in place, in the mesh's existing vertex order.
//!
//! Two neighborhood definitions exist because the cubic mesher never shares
//! vertices: `smooth_by_radius` gathers everything within a Euclidean
//! radius, while `smooth_shared_positions` treats geometrically coincident
//! (but topologically distinct) vertices as one group.

use std::collections::HashMap;
use std::hash::Hash;

use crate::core::types::Vec3;
use crate::math::slerp;
use crate::mesh::MeshData;

/// Blend each normal toward the average of all normals within `radius`.
///
/// Neighbors are gathered through a uniform hash grid with cell size equal
/// to the radius, so only a vertex's own cell and the 26 surrounding cells
/// need scanning. `strength` 0 keeps the freshly recomputed normals; 1
/// replaces them with the neighborhood average.
pub fn smooth_by_radius(mesh: &mut MeshData, radius: f32, strength: f32) {
    mesh.recompute_normals();
    if mesh.is_empty() || radius <= 0.0 || strength <= 0.0 {
        return;
    }
    let strength = strength.clamp(0.0, 1.0);
    let base = mesh.normals.clone();

    let inv_cell = 1.0 / radius.max(1e-6);
    let cell_of = |p: Vec3| {
        (
            (p.x * inv_cell).floor() as i32,
            (p.y * inv_cell).floor() as i32,
            (p.z * inv_cell).floor() as i32,
        )
    };

    let mut grid: HashMap<(i32, i32, i32), Vec<usize>> = HashMap::new();
    for (index, &position) in mesh.positions.iter().enumerate() {
        grid.entry(cell_of(position)).or_default().push(index);
    }

    let radius_sq = radius * radius;
    for index in 0..mesh.positions.len() {
        let position = mesh.positions[index];
        let (cx, cy, cz) = cell_of(position);

        let mut sum = Vec3::ZERO;
        let mut count = 0u32;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(neighbors) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &neighbor in neighbors {
                        if (mesh.positions[neighbor] - position).length_squared() <= radius_sq {
                            sum += base[neighbor];
                            count += 1;
                        }
                    }
                }
            }
        }

        mesh.normals[index] = blend(base[index], sum, count, strength);
    }
}

/// Blend normals across vertices that occupy the same position.
///
/// Vertices are grouped by position rounded to `epsilon` (exact equality
/// when `epsilon` is zero or negative), each group's normals are averaged,
/// and every member is slerped toward its group average by `strength`.
pub fn smooth_shared_positions(mesh: &mut MeshData, epsilon: f32, strength: f32) {
    mesh.recompute_normals();
    if mesh.is_empty() || strength <= 0.0 {
        return;
    }
    let strength = strength.clamp(0.0, 1.0);

    if epsilon > 0.0 {
        let inv = 1.0 / epsilon;
        let keys: Vec<(i64, i64, i64)> = mesh
            .positions
            .iter()
            .map(|p| {
                (
                    (p.x * inv).round() as i64,
                    (p.y * inv).round() as i64,
                    (p.z * inv).round() as i64,
                )
            })
            .collect();
        blend_groups(mesh, &keys, strength);
    } else {
        let keys: Vec<(u32, u32, u32)> = mesh
            .positions
            .iter()
            .map(|p| (p.x.to_bits(), p.y.to_bits(), p.z.to_bits()))
            .collect();
        blend_groups(mesh, &keys, strength);
    }
}

fn blend_groups<K: Hash + Eq>(mesh: &mut MeshData, keys: &[K], strength: f32) {
    let base = mesh.normals.clone();

    let mut groups: HashMap<&K, (Vec3, u32)> = HashMap::new();
    for (index, key) in keys.iter().enumerate() {
        let entry = groups.entry(key).or_insert((Vec3::ZERO, 0));
        entry.0 += base[index];
        entry.1 += 1;
    }

    for (index, key) in keys.iter().enumerate() {
        let (sum, count) = groups[key];
        mesh.normals[index] = blend(base[index], sum, count, strength);
    }
}

/// Slerp from `original` toward the normalized neighborhood average; keeps
/// the original when the sum degenerates to near-zero.
fn blend(original: Vec3, sum: Vec3, count: u32, strength: f32) -> Vec3 {
    if count == 0 {
        return original;
    }
    let average = sum / count as f32;
    if average.length_squared() <= 1e-12 {
        return original;
    }
    slerp(original, average.normalize(), strength)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cubic;
    use crate::vox::{Palette, VoxFrame};

    fn cube_mesh() -> MeshData {
        let mut frame = VoxFrame::empty(1, 1, 1);
        frame.set(0, 0, 0, 1);
        cubic::generate(&frame, &Palette::default(), 1.0)
    }

    #[test]
    fn test_zero_strength_keeps_recomputed_normals() {
        let mut mesh = cube_mesh();
        // Scribble over the normals; the pass must restore canonical ones.
        for normal in &mut mesh.normals {
            *normal = Vec3::splat(9.0);
        }
        let expected = {
            let mut m = mesh.clone();
            m.recompute_normals();
            m.normals
        };
        smooth_by_radius(&mut mesh, 2.0, 0.0);
        assert_eq!(mesh.normals, expected);
    }

    #[test]
    fn test_zero_radius_keeps_recomputed_normals() {
        let mut mesh = cube_mesh();
        let mut expected = mesh.clone();
        expected.recompute_normals();
        smooth_by_radius(&mut mesh, 0.0, 1.0);
        assert_eq!(mesh.normals, expected.normals);
    }

    #[test]
    fn test_only_normals_change() {
        let mut mesh = cube_mesh();
        let before = mesh.clone();
        smooth_by_radius(&mut mesh, 0.75, 0.8);
        assert_eq!(mesh.positions, before.positions);
        assert_eq!(mesh.colors, before.colors);
        assert_eq!(mesh.indices, before.indices);
        assert_ne!(mesh.normals, before.normals);
        assert_eq!(mesh.normals.len(), before.normals.len());
    }

    #[test]
    fn test_smoothed_normals_stay_unit_length() {
        let mut mesh = cube_mesh();
        smooth_by_radius(&mut mesh, 1.5, 0.5);
        for normal in &mesh.normals {
            assert!((normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_full_strength_unifies_corner_neighborhoods() {
        // Every cube vertex sits on a corner at (+-0.5)^3; distinct corners
        // are at least 1 apart, so a 0.9 radius gathers exactly the three
        // coincident face vertices. Full strength must replace each face
        // normal with their normalized diagonal average.
        let mut mesh = cube_mesh();
        smooth_by_radius(&mut mesh, 0.9, 1.0);
        for (position, normal) in mesh.positions.iter().zip(&mesh.normals) {
            let expected = Vec3::new(
                position.x.signum(),
                position.y.signum(),
                position.z.signum(),
            )
            .normalize();
            assert!(
                normal.abs_diff_eq(expected, 1e-4),
                "normal {normal} at {position}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_radius_covering_everything_degenerates_to_original() {
        // With the whole cube in every neighborhood the 24 face normals sum
        // to zero; the near-zero guard keeps the originals instead of
        // normalizing noise.
        let mut mesh = cube_mesh();
        let mut expected = mesh.clone();
        expected.recompute_normals();
        smooth_by_radius(&mut mesh, 10.0, 1.0);
        assert_eq!(mesh.normals, expected.normals);
    }

    #[test]
    fn test_shared_positions_unifies_coincident_vertices() {
        // The cubic mesher puts three faces' vertices at each cube corner;
        // full-strength shared-position smoothing must give those three the
        // same normal: the normalized corner average.
        let mut mesh = cube_mesh();
        smooth_shared_positions(&mut mesh, 1e-3, 1.0);
        let mut seen: HashMap<(u32, u32, u32), Vec3> = HashMap::new();
        for (position, normal) in mesh.positions.iter().zip(&mesh.normals) {
            let key = (
                position.x.to_bits(),
                position.y.to_bits(),
                position.z.to_bits(),
            );
            if let Some(previous) = seen.insert(key, *normal) {
                assert!(previous.abs_diff_eq(*normal, 1e-5));
            }
        }
        // Corner normals point diagonally outward after averaging.
        let corner = mesh
            .positions
            .iter()
            .position(|p| p.abs_diff_eq(Vec3::splat(0.5), 1e-6))
            .unwrap();
        let expected = Vec3::splat(1.0).normalize();
        assert!(mesh.normals[corner].abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_shared_positions_exact_grouping_when_epsilon_zero() {
        let mut mesh = cube_mesh();
        let mut expected = mesh.clone();
        smooth_shared_positions(&mut mesh, 0.0, 1.0);
        smooth_shared_positions(&mut expected, 1e-6, 1.0);
        // Cubic vertices land on exact integer-derived coordinates, so bit
        // grouping and tiny-epsilon grouping agree.
        assert_eq!(mesh.normals, expected.normals);
    }

    #[test]
    fn test_empty_mesh_is_untouched() {
        let mut mesh = MeshData::default();
        smooth_by_radius(&mut mesh, 1.0, 1.0);
        smooth_shared_positions(&mut mesh, 0.1, 1.0);
        assert!(mesh.is_empty());
    }
}
