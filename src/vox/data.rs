//! Parsed voxel asset: palette plus ordered frames

use std::path::Path;
use std::sync::Arc;

use crate::core::types::Result;
use crate::vox::frame::VoxFrame;
use crate::vox::palette::Palette;
use crate::vox::parser;

/// Everything parsed from one .vox container.
///
/// Frames are kept behind `Arc` so clones of the data share the (immutable)
/// volumes while each clone owns its palette - a clone can recolor freely
/// without copying voxel storage.
#[derive(Clone, Debug)]
pub struct VoxData {
    pub palette: Palette,
    frames: Vec<Arc<VoxFrame>>,
}

impl VoxData {
    /// Parse raw container bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let (frames, palette) = parser::parse(bytes)?;
        Ok(Self {
            palette,
            frames: frames.into_iter().map(Arc::new).collect(),
        })
    }

    /// Read and parse a .vox file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes)
    }

    /// Build from already-constructed parts (tools and tests)
    pub fn from_parts(palette: Palette, frames: Vec<VoxFrame>) -> Self {
        Self {
            palette,
            frames: frames.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&VoxFrame> {
        self.frames.get(index).map(Arc::as_ref)
    }

    pub fn frames(&self) -> &[Arc<VoxFrame>] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vox::palette::Rgba;
    use crate::vox::parser::test_support::VoxBuilder;
    use std::io::Write;

    fn two_frame_bytes() -> Vec<u8> {
        VoxBuilder::new()
            .size(2, 2, 2)
            .xyzi(&[(0, 0, 0, 1)])
            .size(1, 1, 1)
            .xyzi(&[(0, 0, 0, 2)])
            .build()
    }

    #[test]
    fn test_parse_and_accessors() {
        let data = VoxData::parse(&two_frame_bytes()).unwrap();
        assert_eq!(data.frame_count(), 2);
        assert_eq!(data.frame(0).unwrap().get(0, 0, 0), 1);
        assert_eq!(data.frame(1).unwrap().get(0, 0, 0), 2);
        assert!(data.frame(2).is_none());
    }

    #[test]
    fn test_clone_shares_frames_and_copies_palette() {
        let data = VoxData::parse(&two_frame_bytes()).unwrap();
        let mut copy = data.clone();
        assert!(Arc::ptr_eq(&data.frames()[0], &copy.frames()[0]));

        copy.palette.set_color(0, Rgba::new(1, 2, 3, 4));
        assert_ne!(data.palette.color(0), copy.palette.color(0));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&two_frame_bytes()).unwrap();
        let data = VoxData::load(file.path()).unwrap();
        assert_eq!(data.frame_count(), 2);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = VoxData::load("/nonexistent/path.vox");
        assert!(matches!(result, Err(crate::core::Error::Io(_))));
    }
}
