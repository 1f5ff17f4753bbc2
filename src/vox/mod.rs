//! MagicaVoxel container parsing and voxel data structures

pub mod parser;
pub mod frame;
pub mod palette;
pub mod data;

pub use frame::VoxFrame;
pub use palette::{Palette, Rgba, PALETTE_SIZE};
pub use data::VoxData;
