use criterion::{black_box, criterion_group, criterion_main, Criterion};

use voxmesh::mesh::{cubic, marching, smoothing, ColorSelect};
use voxmesh::vox::{Palette, VoxFrame};

/// Solid sphere with a handful of palette indices, the usual worst-ish case
/// for both meshers
fn create_test_sphere(size: u32, radius: f32) -> VoxFrame {
    let mut frame = VoxFrame::empty(size, size, size);
    let center = (size as f32 - 1.0) / 2.0;
    for x in 0..size as i32 {
        for y in 0..size as i32 {
            for z in 0..size as i32 {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let dz = z as f32 - center;
                if (dx * dx + dy * dy + dz * dz).sqrt() <= radius {
                    let value = 1 + ((x + y + z) % 8) as u8;
                    frame.set(x, y, z, value);
                }
            }
        }
    }
    frame
}

fn bench_cubic_32(c: &mut Criterion) {
    let frame = create_test_sphere(32, 14.0);
    let palette = Palette::default();

    c.bench_function("cubic_mesh_32", |b| {
        b.iter(|| cubic::generate(black_box(&frame), black_box(&palette), 1.0));
    });
}

fn bench_marching_32(c: &mut Criterion) {
    let frame = create_test_sphere(32, 14.0);
    let palette = Palette::default();

    c.bench_function("marching_cubes_32", |b| {
        b.iter(|| {
            marching::generate(
                black_box(&frame),
                black_box(&palette),
                1.0,
                0.25,
                1,
                ColorSelect::Dominant,
            )
        });
    });
}

fn bench_smoothing_radius(c: &mut Criterion) {
    let frame = create_test_sphere(32, 14.0);
    let palette = Palette::default();
    let mesh = cubic::generate(&frame, &palette, 1.0);

    c.bench_function("smooth_by_radius_32", |b| {
        b.iter(|| {
            let mut scratch = mesh.clone();
            smoothing::smooth_by_radius(&mut scratch, 1.0, 1.0);
            scratch
        });
    });
}

fn bench_smoothing_shared(c: &mut Criterion) {
    let frame = create_test_sphere(32, 14.0);
    let palette = Palette::default();
    let mesh = cubic::generate(&frame, &palette, 1.0);

    c.bench_function("smooth_shared_positions_32", |b| {
        b.iter(|| {
            let mut scratch = mesh.clone();
            smoothing::smooth_shared_positions(&mut scratch, 1e-3, 1.0);
            scratch
        });
    });
}

criterion_group!(
    benches,
    bench_cubic_32,
    bench_marching_32,
    bench_smoothing_radius,
    bench_smoothing_shared
);
criterion_main!(benches);
