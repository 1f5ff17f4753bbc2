//! Mesh cache keyed by generation fingerprints
//!
//! Owns every generated mesh and guarantees at most one live mesh per
//! fingerprint: a fingerprint already present never runs its generator
//! again. Eviction is either palette-scoped (a palette was removed or
//! recolored) or total (the source asset changed).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::cache::fingerprint::MeshFingerprint;
use crate::core::types::Result;
use crate::mesh::MeshData;

/// Fingerprint -> mesh table
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<MeshFingerprint, MeshData>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached mesh
    pub fn get(&self, fingerprint: &MeshFingerprint) -> Option<&MeshData> {
        self.meshes.get(fingerprint)
    }

    pub fn contains(&self, fingerprint: &MeshFingerprint) -> bool {
        self.meshes.contains_key(fingerprint)
    }

    /// Return the mesh for a fingerprint, running `generate` only on the
    /// first request. A generator error is returned to the caller and
    /// nothing is stored, so the next request retries.
    pub fn get_or_create<F>(&mut self, fingerprint: MeshFingerprint, generate: F) -> Result<&MeshData>
    where
        F: FnOnce() -> Result<MeshData>,
    {
        match self.meshes.entry(fingerprint) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(generate()?)),
        }
    }

    /// Drop every mesh whose fingerprint references the given palette
    ///
    /// # Returns
    /// Number of meshes evicted
    pub fn invalidate_palette(&mut self, palette: &str) -> usize {
        let before = self.meshes.len();
        self.meshes.retain(|fingerprint, _| fingerprint.palette != palette);
        let evicted = before - self.meshes.len();
        if evicted > 0 {
            log::debug!("evicted {} cached meshes for palette '{}'", evicted, palette);
        }
        evicted
    }

    /// Drop every cached mesh
    pub fn invalidate_all(&mut self) {
        self.meshes.clear();
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::core::types::Vec3;
    use crate::mesh::MeshAlgorithm;

    fn fingerprint(palette: &str, frame: usize) -> MeshFingerprint {
        MeshFingerprint::new(palette, frame, 1.0, MeshAlgorithm::Cubic, 0.0, 0.0)
    }

    fn marker_mesh(x: f32) -> MeshData {
        MeshData {
            positions: vec![Vec3::new(x, 0.0, 0.0)],
            ..Default::default()
        }
    }

    #[test]
    fn test_generator_runs_exactly_once() {
        let mut cache = MeshCache::new();
        let mut calls = 0;
        let key = fingerprint("default", 0);

        let first = cache
            .get_or_create(key.clone(), || {
                calls += 1;
                Ok(marker_mesh(1.0))
            })
            .unwrap()
            .clone();
        let mut calls_again = 0;
        let second = cache
            .get_or_create(key, || {
                calls_again += 1;
                Ok(marker_mesh(2.0))
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(calls_again, 0);
        assert_eq!(&first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_generator_error_not_cached() {
        let mut cache = MeshCache::new();
        let key = fingerprint("default", 0);

        let failed = cache
            .get_or_create(key.clone(), || Err(Error::Generation("boom".into())))
            .is_err();
        assert!(failed);
        assert!(cache.is_empty());

        // The next request runs the generator again.
        let mesh = cache.get_or_create(key, || Ok(marker_mesh(3.0))).unwrap();
        assert_eq!(mesh.positions[0].x, 3.0);
    }

    #[test]
    fn test_invalidate_palette_is_scoped() {
        let mut cache = MeshCache::new();
        for frame in 0..3 {
            cache
                .get_or_create(fingerprint("p1", frame), || Ok(marker_mesh(frame as f32)))
                .unwrap();
        }
        cache
            .get_or_create(fingerprint("p2", 0), || Ok(marker_mesh(9.0)))
            .unwrap();

        assert_eq!(cache.invalidate_palette("p1"), 3);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&fingerprint("p2", 0)));
        assert!(!cache.contains(&fingerprint("p1", 0)));
    }

    #[test]
    fn test_invalidate_all() {
        let mut cache = MeshCache::new();
        cache
            .get_or_create(fingerprint("p1", 0), || Ok(marker_mesh(1.0)))
            .unwrap();
        cache
            .get_or_create(fingerprint("p2", 1), || Ok(marker_mesh(2.0)))
            .unwrap();
        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_equivalent_fingerprints_share_one_entry() {
        let mut cache = MeshCache::new();
        let a = MeshFingerprint::new("default", 0, 1.0, MeshAlgorithm::Cubic, 0.5, 0.25);
        let b = MeshFingerprint::new("default", 0, 1.0002, MeshAlgorithm::Cubic, 0.52, 0.26);
        cache.get_or_create(a, || Ok(marker_mesh(1.0))).unwrap();
        let mut regenerated = false;
        cache
            .get_or_create(b, || {
                regenerated = true;
                Ok(marker_mesh(2.0))
            })
            .unwrap();
        assert!(!regenerated);
        assert_eq!(cache.len(), 1);
    }
}
