//! Voxmesh - MagicaVoxel volume parsing and mesh generation

pub mod core;
pub mod math;
pub mod vox;
pub mod mesh;
pub mod cache;
pub mod definition;

pub use definition::VoxelDefinition;
