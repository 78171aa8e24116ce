// cache.rs - Persistent LZ4-compressed cache of structure annotations

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::annotation::traits::{AnnotationSource, GpcrAnnotation, KinaseAnnotation};

pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub version: String,
    pub created: String,
    pub last_modified: String,
    pub user_note: Option<String>,
    pub gpcr_entries: usize,
    pub kinase_entries: usize,
    pub format_version: u32,
}

/// Lookup results keyed by uppercase PDB code; `None` records a confirmed miss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationCache {
    pub gpcr: BTreeMap<String, Option<GpcrAnnotation>>,
    pub kinase: BTreeMap<String, Option<KinaseAnnotation>>,
    pub metadata: CacheMetadata,
}

impl AnnotationCache {
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            gpcr: BTreeMap::new(),
            kinase: BTreeMap::new(),
            metadata: CacheMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                created: now.clone(),
                last_modified: now,
                user_note: None,
                gpcr_entries: 0,
                kinase_entries: 0,
                format_version: CACHE_FORMAT_VERSION,
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let compressed = std::fs::read(path)
            .map_err(|e| format!("Failed to read cache file '{}': {}", path.display(), e))?;
        let decompressed = lz4_flex::decompress_size_prepended(&compressed)
            .map_err(|e| format!("Failed to decompress cache '{}': {}", path.display(), e))?;
        let cache: AnnotationCache = serde_json::from_slice(&decompressed)
            .map_err(|e| format!("Failed to parse cache '{}': {}", path.display(), e))?;

        if cache.metadata.format_version != CACHE_FORMAT_VERSION {
            return Err(format!(
                "Cache format mismatch:\n  Cache: v{}\n  Expected: v{}",
                cache.metadata.format_version, CACHE_FORMAT_VERSION
            ));
        }
        Ok(cache)
    }

    pub fn save(&mut self, path: &Path) -> Result<(), String> {
        self.metadata.last_modified = chrono::Utc::now().to_rfc3339();
        self.metadata.gpcr_entries = self.gpcr.len();
        self.metadata.kinase_entries = self.kinase.len();

        let data = serde_json::to_vec(self).map_err(|e| format!("Failed to serialize cache: {}", e))?;
        let compressed = lz4_flex::compress_prepend_size(&data);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
            }
        }
        std::fs::write(path, &compressed)
            .map_err(|e| format!("Failed to write cache file '{}': {}", path.display(), e))?;

        println!(
            "💾 Annotation cache saved ({} GPCR, {} kinase entries, {} KB)",
            self.gpcr.len(),
            self.kinase.len(),
            compressed.len() / 1024
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.gpcr.len() + self.kinase.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AnnotationCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps another source and answers repeated lookups from the cache
pub struct CachedAnnotations {
    inner: Box<dyn AnnotationSource>,
    cache: AnnotationCache,
    path: PathBuf,
    has_new_entries: bool,
    pub hits: usize,
    pub misses: usize,
}

impl CachedAnnotations {
    /// Open `path` if it exists, otherwise start empty. `force_refresh` ignores stored entries.
    pub fn open(
        inner: Box<dyn AnnotationSource>,
        path: &Path,
        note: Option<String>,
        force_refresh: bool,
    ) -> Result<Self, String> {
        let mut cache = if path.is_file() && !force_refresh {
            let cache = AnnotationCache::load(path)?;
            println!("📂 Loaded annotation cache: {} entries from {}", cache.len(), path.display());
            cache
        } else {
            AnnotationCache::new()
        };
        if note.is_some() {
            cache.metadata.user_note = note;
        }

        Ok(Self {
            inner,
            cache,
            path: path.to_path_buf(),
            has_new_entries: false,
            hits: 0,
            misses: 0,
        })
    }

    pub fn cache(&self) -> &AnnotationCache {
        &self.cache
    }
}

impl AnnotationSource for CachedAnnotations {
    fn name(&self) -> &'static str {
        "cached"
    }

    fn lookup_gpcr(&mut self, pdb_id: &str) -> Result<Option<GpcrAnnotation>, String> {
        let key = pdb_id.to_uppercase();
        if let Some(entry) = self.cache.gpcr.get(&key) {
            self.hits += 1;
            return Ok(entry.clone());
        }
        self.misses += 1;
        let entry = self.inner.lookup_gpcr(&key)?;
        self.cache.gpcr.insert(key, entry.clone());
        self.has_new_entries = true;
        Ok(entry)
    }

    fn lookup_kinase(&mut self, pdb_id: &str) -> Result<Option<KinaseAnnotation>, String> {
        let key = pdb_id.to_uppercase();
        if let Some(entry) = self.cache.kinase.get(&key) {
            self.hits += 1;
            return Ok(entry.clone());
        }
        self.misses += 1;
        let entry = self.inner.lookup_kinase(&key)?;
        self.cache.kinase.insert(key, entry.clone());
        self.has_new_entries = true;
        Ok(entry)
    }

    fn flush(&mut self) -> Result<(), String> {
        if !self.has_new_entries {
            return Ok(());
        }
        self.cache.save(&self.path)?;
        self.has_new_entries = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts calls and answers every GPCR lookup as Active
    struct CountingSource {
        calls: std::rc::Rc<std::cell::Cell<usize>>,
    }

    impl AnnotationSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn lookup_gpcr(&mut self, _pdb_id: &str) -> Result<Option<GpcrAnnotation>, String> {
            self.calls.set(self.calls.get() + 1);
            Ok(Some(GpcrAnnotation {
                state: Some("Active".to_string()),
                signalling_protein: None,
            }))
        }

        fn lookup_kinase(&mut self, _pdb_id: &str) -> Result<Option<KinaseAnnotation>, String> {
            self.calls.set(self.calls.get() + 1);
            Ok(None)
        }
    }

    #[test]
    fn test_cache_round_trip_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.lz4");
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));

        let mut first = CachedAnnotations::open(
            Box::new(CountingSource { calls: calls.clone() }),
            &path,
            Some("b2ar run".to_string()),
            false,
        )
        .unwrap();
        assert!(first.lookup_gpcr("3sn6").unwrap().is_some());
        assert!(first.lookup_gpcr("3SN6").unwrap().is_some());
        assert_eq!(first.lookup_kinase("1atp").unwrap(), None);
        assert_eq!(calls.get(), 2);
        assert_eq!(first.hits, 1);
        first.flush().unwrap();

        let mut second =
            CachedAnnotations::open(Box::new(CountingSource { calls: calls.clone() }), &path, None, false)
                .unwrap();
        assert_eq!(second.cache().metadata.user_note.as_deref(), Some("b2ar run"));
        assert_eq!(second.cache().metadata.gpcr_entries, 1);
        second.lookup_gpcr("3SN6").unwrap();
        second.lookup_kinase("1ATP").unwrap();
        assert_eq!(calls.get(), 2);

        let mut refreshed =
            CachedAnnotations::open(Box::new(CountingSource { calls: calls.clone() }), &path, None, true)
                .unwrap();
        refreshed.lookup_gpcr("3SN6").unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_corrupt_cache_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.lz4");
        std::fs::write(&path, b"not lz4").unwrap();
        assert!(AnnotationCache::load(&path).is_err());
    }
}
