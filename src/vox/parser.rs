//! Chunked .vox container parsing
//!
//! Decodes the MagicaVoxel container: a 4-byte magic, a version integer,
//! then a flat sequence of chunks (`SIZE`, `XYZI`, `RGBA`, anything else
//! skipped). The cursor is re-synced to the declared chunk length after every
//! chunk, so a malformed or partially-consumed chunk cannot desynchronize
//! the rest of the stream. Recovery policy: bad magic or a truncated stream
//! aborts the whole parse; everything else (out-of-bounds voxels, `XYZI`
//! without a preceding `SIZE`) is skipped at the smallest granularity.

use crate::core::error::Error;
use crate::core::types::Result;
use crate::vox::frame::VoxFrame;
use crate::vox::palette::{PALETTE_SIZE, Palette, Rgba};

/// Expected container magic
pub const VOX_MAGIC: [u8; 4] = *b"VOX ";

/// Upper bound on cells per frame; dimensions multiplying past this are
/// treated as a malformed container rather than an allocation request.
const MAX_FRAME_VOLUME: u64 = 1 << 30;

/// Chunk kinds understood by the parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChunkTag {
    Main,
    Size,
    Xyzi,
    Rgba,
    Other([u8; 4]),
}

impl ChunkTag {
    fn from_bytes(tag: [u8; 4]) -> Self {
        match &tag {
            b"MAIN" => Self::Main,
            b"SIZE" => Self::Size,
            b"XYZI" => Self::Xyzi,
            b"RGBA" => Self::Rgba,
            _ => Self::Other(tag),
        }
    }
}

/// Bounds-checked little-endian reader over a byte slice
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute offset, clamped to the end of the data
    fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::Format(format!(
                "unexpected end of stream at byte {} (wanted {} more)",
                self.pos, count
            )));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_tag(&mut self) -> Result<[u8; 4]> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Volume declared by a `SIZE` chunk, waiting for its `XYZI` payload
struct PendingFrame {
    size_x: u32,
    size_y: u32,
    size_z: u32,
    voxels: Vec<u8>,
}

/// Parse a .vox container into frames and a palette.
///
/// Returns every frame in file order. A container with zero frames parses
/// successfully (with a warning); whether that is an error is the caller's
/// call. Bad magic or a truncated stream is a [`Error::Format`].
pub fn parse(bytes: &[u8]) -> Result<(Vec<VoxFrame>, Palette)> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.read_tag()?;
    if magic != VOX_MAGIC {
        return Err(Error::Format(format!(
            "bad magic {:?}, expected \"VOX \"",
            String::from_utf8_lossy(&magic)
        )));
    }
    let version = reader.read_u32()?;
    log::debug!("vox container version {}", version);

    let mut frames = Vec::new();
    let mut palette = Palette::default();
    let mut pending: Option<PendingFrame> = None;

    while reader.remaining() > 0 {
        let tag = ChunkTag::from_bytes(reader.read_tag()?);
        let content_size = reader.read_u32()? as usize;
        let _children_size = reader.read_u32()?;
        let chunk_start = reader.position();

        match tag {
            // MAIN carries no content of its own; its children are parsed
            // as the chunks that follow.
            ChunkTag::Main => {}

            ChunkTag::Size => {
                let size_x = reader.read_u32()?;
                let size_y = reader.read_u32()?;
                let size_z = reader.read_u32()?;
                let volume = (size_x as u64)
                    .checked_mul(size_y as u64)
                    .and_then(|v| v.checked_mul(size_z as u64))
                    .filter(|&v| v <= MAX_FRAME_VOLUME);
                let Some(volume) = volume else {
                    return Err(Error::Format(format!(
                        "frame dimensions {}x{}x{} exceed supported volume",
                        size_x, size_y, size_z
                    )));
                };
                pending = Some(PendingFrame {
                    size_x,
                    size_y,
                    size_z,
                    voxels: vec![0; volume as usize],
                });
            }

            ChunkTag::Xyzi => match pending.take() {
                Some(mut frame) => {
                    read_xyzi(&mut reader, &mut frame)?;
                    frames.push(VoxFrame::new(
                        frame.size_x,
                        frame.size_y,
                        frame.size_z,
                        frame.voxels,
                    ));
                }
                None => {
                    log::error!("XYZI chunk encountered before SIZE chunk, skipping");
                }
            },

            ChunkTag::Rgba => {
                for slot in 0..PALETTE_SIZE {
                    let rgba = reader.read_bytes(4)?;
                    palette.set_color(slot, Rgba::new(rgba[0], rgba[1], rgba[2], rgba[3]));
                }
            }

            ChunkTag::Other(tag) => {
                log::debug!(
                    "skipping chunk {:?} ({} content bytes)",
                    String::from_utf8_lossy(&tag),
                    content_size
                );
            }
        }

        // Re-sync to the declared content length no matter how much the
        // handler consumed.
        reader.seek(chunk_start + content_size);
    }

    if frames.is_empty() {
        log::warn!("no voxel frames found in container");
    }
    Ok((frames, palette))
}

/// Read an `XYZI` payload into the pending volume. Out-of-bounds voxels are
/// dropped without comment; the format packs coordinates into bytes, so a
/// voxel can only fall outside a volume larger than its declared size.
fn read_xyzi(reader: &mut ByteReader, frame: &mut PendingFrame) -> Result<()> {
    let count = reader.read_u32()?;
    for _ in 0..count {
        let x = reader.read_u8()? as u32;
        let y = reader.read_u8()? as u32;
        let z = reader.read_u8()? as u32;
        let value = reader.read_u8()?;
        if x < frame.size_x && y < frame.size_y && z < frame.size_z {
            let index = x + y * frame.size_x + z * frame.size_x * frame.size_y;
            frame.voxels[index as usize] = value;
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::VoxBuilder;
    use super::*;

    #[test]
    fn test_bad_magic_is_format_error() {
        let mut bytes = VoxBuilder::new().size(1, 1, 1).xyzi(&[(0, 0, 0, 1)]).build();
        bytes[..4].copy_from_slice(b"BAD ");
        let result = parse(&bytes);
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_truncated_stream_is_format_error() {
        let bytes = VoxBuilder::new().size(2, 2, 2).build();
        // Cut into the SIZE payload.
        let result = parse(&bytes[..bytes.len() - 5]);
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_single_frame_roundtrip() {
        let bytes = VoxBuilder::new()
            .size(3, 2, 4)
            .xyzi(&[(0, 0, 0, 1), (2, 1, 3, 5)])
            .build();
        let (frames, _) = parse(&bytes).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].size_x(), 3);
        assert_eq!(frames[0].size_y(), 2);
        assert_eq!(frames[0].size_z(), 4);
        assert_eq!(frames[0].get(0, 0, 0), 1);
        assert_eq!(frames[0].get(2, 1, 3), 5);
        assert_eq!(frames[0].occupied_count(), 2);
    }

    #[test]
    fn test_multiple_frames_in_file_order() {
        let bytes = VoxBuilder::new()
            .size(1, 1, 1)
            .xyzi(&[(0, 0, 0, 1)])
            .size(2, 2, 2)
            .xyzi(&[(1, 1, 1, 2)])
            .size(3, 3, 3)
            .xyzi(&[(2, 2, 2, 3)])
            .build();
        let (frames, _) = parse(&bytes).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].get(0, 0, 0), 1);
        assert_eq!(frames[1].get(1, 1, 1), 2);
        assert_eq!(frames[2].get(2, 2, 2), 3);
    }

    #[test]
    fn test_out_of_bounds_voxels_dropped() {
        let bytes = VoxBuilder::new()
            .size(2, 2, 2)
            .xyzi(&[(0, 0, 0, 1), (5, 0, 0, 2), (0, 3, 0, 3)])
            .build();
        let (frames, _) = parse(&bytes).unwrap();
        assert_eq!(frames[0].occupied_count(), 1);
        assert_eq!(frames[0].get(5, 0, 0), 0);
    }

    #[test]
    fn test_xyzi_without_size_skipped() {
        let bytes = VoxBuilder::new().xyzi(&[(0, 0, 0, 1)]).build();
        let (frames, _) = parse(&bytes).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_size_consumed_by_first_xyzi() {
        // Two XYZI chunks after one SIZE: the second has no pending volume.
        let bytes = VoxBuilder::new()
            .size(1, 1, 1)
            .xyzi(&[(0, 0, 0, 1)])
            .xyzi(&[(0, 0, 0, 2)])
            .build();
        let (frames, _) = parse(&bytes).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].get(0, 0, 0), 1);
    }

    #[test]
    fn test_rgba_chunk_overrides_palette() {
        let mut colors = [[0u8; 4]; 256];
        colors[0] = [10, 20, 30, 40];
        colors[255] = [50, 60, 70, 80];
        let bytes = VoxBuilder::new()
            .size(1, 1, 1)
            .xyzi(&[(0, 0, 0, 1)])
            .rgba(&colors)
            .build();
        let (_, palette) = parse(&bytes).unwrap();
        assert_eq!(palette.color(0), Rgba::new(10, 20, 30, 40));
        assert_eq!(palette.color(255), Rgba::new(50, 60, 70, 80));
    }

    #[test]
    fn test_unknown_chunks_skipped() {
        let bytes = VoxBuilder::new()
            .chunk(b"MAIN", &[])
            .chunk(b"nTRN", &[0xAA; 28])
            .size(1, 1, 1)
            .xyzi(&[(0, 0, 0, 7)])
            .chunk(b"MATL", &[0x55; 12])
            .build();
        let (frames, _) = parse(&bytes).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].get(0, 0, 0), 7);
    }

    #[test]
    fn test_cursor_resync_after_short_consumption() {
        // A SIZE chunk that declares more content than the handler reads;
        // the extra bytes must be skipped, not parsed as a chunk header.
        let mut content = Vec::new();
        content.extend_from_slice(&1u32.to_le_bytes());
        content.extend_from_slice(&1u32.to_le_bytes());
        content.extend_from_slice(&1u32.to_le_bytes());
        content.extend_from_slice(&[0xFF; 8]);
        let bytes = VoxBuilder::new()
            .chunk(b"SIZE", &content)
            .xyzi(&[(0, 0, 0, 9)])
            .build();
        let (frames, _) = parse(&bytes).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].get(0, 0, 0), 9);
    }

    #[test]
    fn test_empty_container_parses_with_no_frames() {
        let bytes = VoxBuilder::new().build();
        let (frames, palette) = parse(&bytes).unwrap();
        assert!(frames.is_empty());
        assert_eq!(palette, Palette::default());
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let bytes = VoxBuilder::new().size(0xFFFF_FFFF, 0xFFFF_FFFF, 2).build();
        assert!(matches!(parse(&bytes), Err(Error::Format(_))));
    }
}
