//! Measured per-well production profiles.
//!
//! Each CSV in the profiles folder carries monthly average rates for one
//! well (the file stem is the well name):
//!
//! ```csv
//! month,oil_rate,liquid_rate
//! 1,95.0,140.0
//! 2,88.5,138.0
//! ```
//!
//! Parsing a folder of spreadsheets on every plan compile is wasteful, so
//! results are cached to a JSON sidecar keyed by file mtimes; only added,
//! modified or removed files are reprocessed.

use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::DataError;

/// Monthly average rates for one well, tonnes per day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WellProfile {
    pub oil: Vec<f64>,
    pub liquid: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[allow(dead_code)]
    month: u32,
    oil_rate: f64,
    liquid_rate: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileCache {
    file_mtimes: BTreeMap<String, u64>,
    /// well name -> source file name
    file_map: HashMap<String, String>,
    profiles: HashMap<String, WellProfile>,
}

pub struct ProfileStore {
    folder: PathBuf,
    cache_file: PathBuf,
}

impl ProfileStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        let folder = folder.into();
        let cache_file = cache_path(&folder);
        Self { folder, cache_file }
    }

    /// Load all profiles, refreshing the cache incrementally.
    pub fn load(&self) -> Result<HashMap<String, WellProfile>, DataError> {
        let mut cache = self.load_cache();
        let current = self.scan_mtimes()?;

        let added: Vec<&String> = current
            .keys()
            .filter(|f| !cache.file_mtimes.contains_key(*f))
            .collect();
        let removed: Vec<String> = cache
            .file_mtimes
            .keys()
            .filter(|f| !current.contains_key(*f))
            .cloned()
            .collect();
        let modified: Vec<&String> = current
            .iter()
            .filter(|(f, mtime)| cache.file_mtimes.get(*f).is_some_and(|m| m != *mtime))
            .map(|(f, _)| f)
            .collect();

        info!(
            folder = %self.folder.display(),
            added = added.len(),
            removed = removed.len(),
            modified = modified.len(),
            "refreshing profile cache"
        );

        for file in &removed {
            evict_file(&mut cache, file);
        }
        let to_parse: Vec<String> = added
            .into_iter()
            .chain(modified)
            .cloned()
            .collect();
        for file in &to_parse {
            evict_file(&mut cache, file);
            match self.parse_file(file) {
                Ok((well, profile)) => {
                    cache.file_map.insert(well.clone(), file.clone());
                    cache.profiles.insert(well, profile);
                }
                Err(e) => warn!(file, error = %e, "skipping unreadable profile"),
            }
        }

        cache.file_mtimes = current;
        self.save_cache(&cache);
        Ok(cache.profiles)
    }

    fn scan_mtimes(&self) -> Result<BTreeMap<String, u64>, DataError> {
        let entries = std::fs::read_dir(&self.folder).map_err(|e| DataError::Io {
            path: self.folder.clone(),
            source: e,
        })?;

        let mut out = BTreeMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if !is_csv {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let mtime = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_secs());
            out.insert(name.to_string(), mtime);
        }
        Ok(out)
    }

    fn parse_file(&self, file: &str) -> Result<(String, WellProfile), DataError> {
        let path = self.folder.join(file);
        let well = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file)
            .to_string();

        let mut reader = csv::Reader::from_path(&path).map_err(|e| DataError::Csv {
            path: path.clone(),
            source: e,
        })?;

        let mut profile = WellProfile::default();
        for row in reader.deserialize::<ProfileRow>() {
            let row = row.map_err(|e| DataError::Csv {
                path: path.clone(),
                source: e,
            })?;
            profile.oil.push(row.oil_rate);
            profile.liquid.push(row.liquid_rate);
        }
        Ok((well, profile))
    }

    fn load_cache(&self) -> ProfileCache {
        match std::fs::read(&self.cache_file) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(cache) => {
                    info!(cache = %self.cache_file.display(), "profile cache found");
                    cache
                }
                Err(e) => {
                    warn!(error = %e, "profile cache unreadable, rebuilding");
                    ProfileCache::default()
                }
            },
            Err(_) => ProfileCache::default(),
        }
    }

    fn save_cache(&self, cache: &ProfileCache) {
        let result = serde_json::to_vec(cache)
            .map_err(std::io::Error::other)
            .and_then(|bytes| std::fs::write(&self.cache_file, bytes));
        if let Err(e) = result {
            warn!(error = %e, "failed to persist profile cache");
        }
    }
}

/// Drop every well that came from `file`.
fn evict_file(cache: &mut ProfileCache, file: &str) {
    let wells: Vec<String> = cache
        .file_map
        .iter()
        .filter(|(_, f)| f.as_str() == file)
        .map(|(w, _)| w.clone())
        .collect();
    for well in wells {
        cache.file_map.remove(&well);
        cache.profiles.remove(&well);
    }
    cache.file_mtimes.remove(file);
}

/// Sidecar path, distinct per profile folder.
fn cache_path(folder: &Path) -> PathBuf {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    folder.hash(&mut hasher);
    folder.join(format!(".cache_profiles_{:08x}.json", hasher.finish() as u32))
}
