//! Table-driven marching cubes mesher
//!
//! Extracts a smooth isosurface from a voxel frame by sampling cell
//! occupancy into a scalar density lattice and triangulating every lattice
//! cube against the classic 256-entry tables. A configurable margin of
//! guaranteed-empty cells is kept around the volume so boundary cubes always
//! see a well-defined outside and the surface closes instead of being
//! clipped at the volume edge.
//!
//! Shares the cubic mesher's coordinate convention - file `(x, y, z)` maps
//! to mesh `(x, z, -y)` - with the pivot `(size_x / 2, size_z / 2,
//! -size_y / 2)`.

use crate::core::types::Vec3;
use crate::mesh::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use crate::mesh::{ColorSelect, MeshData};
use crate::vox::{Palette, Rgba, VoxFrame};

/// Cube color when no corner cell holds a voxel (possible at iso levels
/// low enough to pull the surface into fully-empty cubes)
const FALLBACK_COLOR: Rgba = Rgba::new(200, 200, 200, 255);

/// Density samples on the padded lattice of cube corners
struct DensityField {
    values: Vec<f32>,
    dim_x: i32,
    dim_y: i32,
    pad: i32,
}

impl DensityField {
    /// Sample at lattice coordinates, which run from `-pad` to `size + pad`
    /// on each axis
    fn get(&self, x: i32, y: i32, z: i32) -> f32 {
        let index = (x + self.pad) + (y + self.pad) * self.dim_x + (z + self.pad) * self.dim_x * self.dim_y;
        self.values[index as usize]
    }
}

/// Generate an isosurface mesh for one frame.
///
/// `iso` is clamped to [0, 1]. `padding` is the number of empty cells added
/// around the volume before sampling. Every vertex of a cube carries one
/// color, chosen from the cube's corner cells per `color_select`.
pub fn generate(
    frame: &VoxFrame,
    palette: &Palette,
    scale: f32,
    iso: f32,
    padding: u32,
    color_select: ColorSelect,
) -> MeshData {
    let mut mesh = MeshData::default();

    let size_x = frame.size_x() as i32;
    let size_y = frame.size_y() as i32;
    let size_z = frame.size_z() as i32;
    if size_x == 0 || size_y == 0 || size_z == 0 {
        return mesh;
    }

    let iso = iso.clamp(0.0, 1.0);
    let pad = padding as i32;
    let density = build_density_field(frame, pad);

    let center = Vec3::new(
        size_x as f32 / 2.0,
        size_z as f32 / 2.0,
        -(size_y as f32) / 2.0,
    );

    for z in -pad..size_z + pad {
        for y in -pad..size_y + pad {
            for x in -pad..size_x + pad {
                let mut corner_values = [0.0f32; 8];
                let mut corner_positions = [Vec3::ZERO; 8];
                for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
                    corner_values[corner] = density.get(x + offset[0], y + offset[1], z + offset[2]);
                    // Transform to mesh space: (x, z, -y) plus the same
                    // permutation of the corner offset.
                    let p = Vec3::new(
                        (x + offset[0]) as f32,
                        (z + offset[2]) as f32,
                        -((y + offset[1]) as f32),
                    );
                    corner_positions[corner] = (p - center) * scale;
                }

                let mut cube_index = 0usize;
                for (corner, &value) in corner_values.iter().enumerate() {
                    if value < iso {
                        cube_index |= 1 << corner;
                    }
                }
                let edge_mask = EDGE_TABLE[cube_index];
                if edge_mask == 0 {
                    continue;
                }

                let color = cube_color(frame, palette, x, y, z, color_select);

                // Interpolate the zero crossing on each active edge.
                let mut edge_points = [Vec3::ZERO; 12];
                let mut edge_ready = [false; 12];
                for (edge, corners) in EDGE_CORNERS.iter().enumerate() {
                    if edge_mask & (1 << edge) == 0 {
                        continue;
                    }
                    let value_a = corner_values[corners[0]];
                    let value_b = corner_values[corners[1]];
                    let t = if (value_b - value_a).abs() < 1e-6 {
                        0.5
                    } else {
                        ((iso - value_a) / (value_b - value_a)).clamp(0.0, 1.0)
                    };
                    edge_points[edge] = corner_positions[corners[0]].lerp(corner_positions[corners[1]], t);
                    edge_ready[edge] = true;
                }

                let row = &TRI_TABLE[cube_index];
                for triple in 0..(row.len() / 3) {
                    let a = row[triple * 3];
                    if a < 0 {
                        break;
                    }
                    let b = row[triple * 3 + 1];
                    let c = row[triple * 3 + 2];
                    // A consistent table never references an inactive edge;
                    // skip rather than emit degenerate geometry if one does.
                    let (a, b, c) = (a as usize, b as usize, c as usize);
                    if a >= 12 || b >= 12 || c >= 12 {
                        continue;
                    }
                    if !edge_ready[a] || !edge_ready[b] || !edge_ready[c] {
                        continue;
                    }

                    let first = mesh.positions.len() as u32;
                    for &edge in &[a, b, c] {
                        mesh.positions.push(edge_points[edge]);
                        mesh.colors.push(color);
                    }
                    mesh.indices.extend_from_slice(&[first, first + 1, first + 2]);
                }
            }
        }
    }

    mesh.recompute_normals();
    mesh
}

/// Sample cell occupancy into the padded corner lattice. Each sample is the
/// occupied fraction of the 8 cells meeting at that lattice point; cells
/// outside the volume are always empty, which is what closes the surface
/// over the padding margin.
fn build_density_field(frame: &VoxFrame, pad: i32) -> DensityField {
    let size_x = frame.size_x() as i32;
    let size_y = frame.size_y() as i32;
    let size_z = frame.size_z() as i32;
    let dim_x = size_x + 1 + pad * 2;
    let dim_y = size_y + 1 + pad * 2;
    let dim_z = size_z + 1 + pad * 2;

    let mut values = Vec::with_capacity((dim_x * dim_y * dim_z) as usize);
    for z in -pad..=size_z + pad {
        for y in -pad..=size_y + pad {
            for x in -pad..=size_x + pad {
                let mut occupied = 0;
                for dz in -1..=0 {
                    for dy in -1..=0 {
                        for dx in -1..=0 {
                            if frame.is_occupied(x + dx, y + dy, z + dz) {
                                occupied += 1;
                            }
                        }
                    }
                }
                values.push(occupied as f32 / 8.0);
            }
        }
    }

    debug_assert_eq!(values.len(), (dim_x * dim_y * dim_z) as usize);
    DensityField { values, dim_x, dim_y, pad }
}

/// Pick the color the cube's vertices share. Corner cells are sampled with
/// coordinates clamped into the volume (unlike density sampling, which
/// treats the outside as empty) so surface cubes in the padding ring still
/// inherit a nearby voxel's color.
fn cube_color(
    frame: &VoxFrame,
    palette: &Palette,
    x: i32,
    y: i32,
    z: i32,
    color_select: ColorSelect,
) -> Rgba {
    let size_x = frame.size_x() as i32;
    let size_y = frame.size_y() as i32;
    let size_z = frame.size_z() as i32;

    let mut samples = [0u8; 8];
    for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
        let cx = (x + offset[0]).clamp(0, size_x - 1);
        let cy = (y + offset[1]).clamp(0, size_y - 1);
        let cz = (z + offset[2]).clamp(0, size_z - 1);
        samples[corner] = frame.get(cx, cy, cz);
    }

    let selected = match color_select {
        ColorSelect::Dominant => {
            let mut counts = [0u8; 256];
            for &sample in &samples {
                counts[sample as usize] += 1;
            }
            let best = samples
                .iter()
                .filter(|&&s| s != 0)
                .map(|&s| counts[s as usize])
                .max()
                .unwrap_or(0);
            // Ties resolve to the index seen first in corner-scan order.
            samples
                .iter()
                .copied()
                .find(|&s| s != 0 && counts[s as usize] == best)
                .unwrap_or(0)
        }
        ColorSelect::FirstNonEmpty => samples.iter().copied().find(|&s| s != 0).unwrap_or(0),
    };

    palette.color_for_voxel(selected).unwrap_or(FALLBACK_COLOR)
}
