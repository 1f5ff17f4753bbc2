//! Voxel asset facade
//!
//! [`VoxelDefinition`] owns everything one source asset needs: the parsed
//! frames and palette, any registered alternate palettes, the generation
//! settings, and the mesh cache. It is an explicit object with an explicit
//! lifecycle - create, reload, drop - so tests and multi-asset processes
//! never share hidden state. Dependents that need to notice a reload poll
//! the [`generation`](VoxelDefinition::generation) counter instead of
//! subscribing to callbacks.

use std::collections::HashMap;

use image::RgbaImage;

use crate::cache::fingerprint::{self, MeshFingerprint};
use crate::cache::MeshCache;
use crate::core::types::Result;
use crate::mesh::{cubic, marching, smoothing, MeshAlgorithm, MeshData, MeshSettings};
use crate::vox::{Palette, Rgba, VoxData};

/// Name of the palette parsed from the container itself
pub const DEFAULT_PALETTE_NAME: &str = "default";

/// Smallest usable scale; requests below this are clamped up
const MIN_SCALE: f32 = 1e-4;

/// One voxel asset with its palettes, settings and mesh cache
pub struct VoxelDefinition {
    data: Option<VoxData>,
    settings: MeshSettings,
    palettes: HashMap<String, Palette>,
    cache: MeshCache,
    generation: u64,
}

impl VoxelDefinition {
    /// Create an empty definition; load data with [`reload`](Self::reload)
    pub fn new(settings: MeshSettings) -> Self {
        Self {
            data: None,
            settings,
            palettes: HashMap::new(),
            cache: MeshCache::new(),
            generation: 0,
        }
    }

    /// Parse a container and build a ready definition
    pub fn from_bytes(bytes: &[u8], settings: MeshSettings) -> Result<Self> {
        let mut definition = Self::new(settings);
        definition.reload(bytes)?;
        Ok(definition)
    }

    /// Replace the source asset.
    ///
    /// The whole cache is dropped and the generation counter bumped before
    /// parsing starts, so stale geometry can never be served under a
    /// colliding fingerprint. On a parse error the definition is left
    /// unset (requests fail cleanly) and the error is returned.
    pub fn reload(&mut self, bytes: &[u8]) -> Result<()> {
        self.cache.invalidate_all();
        self.generation += 1;
        self.data = None;
        self.data = Some(VoxData::parse(bytes)?);
        Ok(())
    }

    /// Number of frames in the loaded asset (0 when unset)
    pub fn frame_count(&self) -> usize {
        self.data.as_ref().map_or(0, VoxData::frame_count)
    }

    /// Counter that increments whenever cached meshes become invalid.
    /// Dependents compare it against a remembered value to detect reloads.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn settings(&self) -> &MeshSettings {
        &self.settings
    }

    /// Replace the generation settings, dropping cached meshes built with
    /// the old ones
    pub fn set_settings(&mut self, settings: MeshSettings) {
        if settings != self.settings {
            self.settings = settings;
            self.invalidate_cache();
        }
    }

    /// Drop every cached mesh and bump the generation counter
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate_all();
        self.generation += 1;
    }

    /// Number of meshes currently cached
    pub fn cached_mesh_count(&self) -> usize {
        self.cache.len()
    }

    /// Register a palette built from an RGBA image (typically 16x16).
    ///
    /// Re-registering an existing name replaces its colors and evicts that
    /// palette's cached meshes.
    ///
    /// # Returns
    /// The palette name, usable with [`get_mesh`](Self::get_mesh)
    pub fn register_palette(&mut self, name: &str, image: &RgbaImage) -> String {
        self.insert_palette(name, Palette::from_image(image))
    }

    /// Register a palette derived from the asset's own palette with
    /// per-slot color overrides
    pub fn register_palette_overrides(
        &mut self,
        name: &str,
        overrides: &[(usize, Rgba)],
    ) -> String {
        let base = match &self.data {
            Some(data) => data.palette.clone(),
            None => Palette::default(),
        };
        self.insert_palette(name, base.with_overrides(overrides))
    }

    /// Insert (or replace) a palette under `name`, evicting any meshes
    /// cached under that name so a re-registration serves fresh colors.
    ///
    /// # Returns
    /// The palette name
    fn insert_palette(&mut self, name: &str, palette: Palette) -> String {
        self.cache.invalidate_palette(name);
        self.palettes.insert(name.to_string(), palette);
        name.to_string()
    }

    /// Remove a registered palette and evict its cached meshes
    pub fn remove_palette(&mut self, name: &str) {
        self.palettes.remove(name);
        self.cache.invalidate_palette(name);
    }

    /// Available palette names: "default" when an asset is loaded, plus
    /// every registered palette
    pub fn palette_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.palettes.len() + 1);
        if self.data.is_some() {
            names.push(DEFAULT_PALETTE_NAME.to_string());
        }
        names.extend(self.palettes.keys().cloned());
        names.sort();
        names
    }

    /// Get the mesh for a frame and palette, generating and caching it on
    /// first request.
    ///
    /// `palette_name` of `None` (or `""`) means the asset's own palette. An
    /// unknown palette falls back to the default with a warning. Returns
    /// `None` - leaving cache and data intact for other requests - when no
    /// asset is loaded, the frame index is out of range, or generation
    /// fails.
    pub fn get_mesh(&mut self, frame: usize, palette_name: Option<&str>) -> Option<&MeshData> {
        let name = match palette_name {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_PALETTE_NAME,
        };

        let Some(data) = &self.data else {
            log::error!("no vox data loaded, cannot generate mesh");
            return None;
        };
        let Some(vox_frame) = data.frame(frame) else {
            log::error!(
                "frame {} out of range (asset has {} frames)",
                frame,
                data.frame_count()
            );
            return None;
        };

        let settings = self.settings.clone();
        let scale = settings.scale.max(MIN_SCALE);
        let strength = fingerprint::snap_strength(settings.smooth_strength);
        let radius = fingerprint::snap_radius(settings.smooth_radius);
        let key = MeshFingerprint::new(
            name,
            frame,
            scale,
            settings.algorithm,
            strength,
            radius,
        );

        let palette = if name == DEFAULT_PALETTE_NAME {
            &data.palette
        } else {
            match self.palettes.get(name) {
                Some(palette) => palette,
                None => {
                    log::warn!("palette '{}' not found, falling back to default", name);
                    &data.palette
                }
            }
        };

        let result = self.cache.get_or_create(key, || {
            let mut mesh = match settings.algorithm {
                MeshAlgorithm::Cubic => cubic::generate(vox_frame, palette, scale),
                MeshAlgorithm::MarchingCubes => marching::generate(
                    vox_frame,
                    palette,
                    scale,
                    settings.iso_level,
                    settings.padding,
                    settings.color_select,
                ),
            };
            if strength > 0.0 {
                // Radius is configured in voxel units; the mesh lives in
                // scaled units.
                smoothing::smooth_by_radius(&mut mesh, radius * scale, strength);
            }
            Ok(mesh)
        });

        match result {
            Ok(mesh) => Some(mesh),
            Err(error) => {
                log::error!(
                    "failed to generate mesh for frame {}, palette '{}': {}",
                    frame,
                    name,
                    error
                );
                None
            }
        }
    }
}
