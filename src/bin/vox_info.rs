//! Vox asset inspector — parses a .vox container and reports mesh statistics.
//!
//! Usage: cargo run --bin vox_info -- <file.vox> [OPTIONS]
//!
//! Options:
//!   --algorithm <A>   cubic | marching (default: cubic)
//!   --scale <S>       Mesh scale factor (default: 1.0)
//!   --iso <I>         Marching cubes iso level (default: 0.25)
//!   --padding <P>     Marching cubes empty padding (default: 1)
//!   --json            Emit a JSON report instead of text

use std::path::PathBuf;
use std::process::ExitCode;

use serde_json::json;

use voxmesh::mesh::{cubic, marching, ColorSelect, MeshAlgorithm, MeshData};
use voxmesh::vox::VoxData;

fn main() -> ExitCode {
    voxmesh::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(path) = args.iter().skip(1).find(|a| !a.starts_with("--")) else {
        eprintln!("usage: vox_info <file.vox> [--algorithm cubic|marching] [--scale S] [--json]");
        return ExitCode::FAILURE;
    };
    let path = PathBuf::from(path);

    let algorithm = match parse_str_arg(&args, "--algorithm").as_deref() {
        Some("marching") => MeshAlgorithm::MarchingCubes,
        Some("cubic") | None => MeshAlgorithm::Cubic,
        Some(other) => {
            eprintln!("unknown algorithm '{}', expected cubic or marching", other);
            return ExitCode::FAILURE;
        }
    };
    let scale = parse_f32_arg(&args, "--scale").unwrap_or(1.0);
    let iso = parse_f32_arg(&args, "--iso").unwrap_or(0.25);
    let padding = parse_u32_arg(&args, "--padding").unwrap_or(1);
    let as_json = args.iter().any(|a| a == "--json");

    let data = match VoxData::load(&path) {
        Ok(data) => data,
        Err(error) => {
            log::error!("failed to load {}: {}", path.display(), error);
            return ExitCode::FAILURE;
        }
    };

    let mut reports = Vec::new();
    for (index, frame) in data.frames().iter().enumerate() {
        let mesh: MeshData = match algorithm {
            MeshAlgorithm::Cubic => cubic::generate(frame, &data.palette, scale),
            MeshAlgorithm::MarchingCubes => marching::generate(
                frame,
                &data.palette,
                scale,
                iso,
                padding,
                ColorSelect::Dominant,
            ),
        };
        reports.push((index, frame, mesh));
    }

    if as_json {
        let frames: Vec<_> = reports
            .iter()
            .map(|(index, frame, mesh)| {
                json!({
                    "frame": index,
                    "size": [frame.size_x(), frame.size_y(), frame.size_z()],
                    "voxels": frame.occupied_count(),
                    "vertices": mesh.vertex_count(),
                    "triangles": mesh.triangle_count(),
                })
            })
            .collect();
        let report = json!({
            "file": path.display().to_string(),
            "algorithm": algorithm,
            "scale": scale,
            "frames": frames,
        });
        println!("{}", serde_json::to_string_pretty(&report).expect("report is valid JSON"));
        return ExitCode::SUCCESS;
    }

    println!("=== {} ===", path.display());
    println!("Frames: {}", data.frame_count());
    for (index, frame, mesh) in &reports {
        println!(
            "  frame {}: {}x{}x{}, {} voxels -> {} vertices, {} triangles",
            index,
            frame.size_x(),
            frame.size_y(),
            frame.size_z(),
            frame.occupied_count(),
            mesh.vertex_count(),
            mesh.triangle_count(),
        );
        if let Some(bounds) = mesh.bounds() {
            println!("    bounds: {:?} .. {:?}", bounds.min, bounds.max);
        }
    }
    ExitCode::SUCCESS
}

fn parse_str_arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_f32_arg(args: &[String], name: &str) -> Option<f32> {
    parse_str_arg(args, name)?.parse().ok()
}

fn parse_u32_arg(args: &[String], name: &str) -> Option<u32> {
    parse_str_arg(args, name)?.parse().ok()
}
