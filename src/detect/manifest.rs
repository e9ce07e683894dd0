// src/detect/manifest.rs
// =============================================================================
// The persisted digest set for one site.
//
// File format, one line per section in fixed order:
//   FullPage=3b1f...e9
//   Head=EMPTY
//   ...
//
// Loading is lenient: a line without exactly one '=' or with an unknown key
// is skipped. Saving always rewrites the whole file.
// =============================================================================

use super::section::Section;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Section -> digest mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    digests: BTreeMap<Section, String>,
}

impl Manifest {
    pub fn insert(&mut self, section: Section, digest: String) {
        self.digests.insert(section, digest);
    }

    pub fn get(&self, section: Section) -> Option<&str> {
        self.digests.get(&section).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Sections of `current` that are missing here or carry another digest
    pub fn changed_sections(&self, current: &Manifest) -> BTreeSet<Section> {
        current
            .digests
            .iter()
            .filter(|(section, digest)| self.get(**section) != Some(digest.as_str()))
            .map(|(section, _)| *section)
            .collect()
    }

    /// Parses manifest text, skipping malformed lines
    pub fn parse(text: &str) -> Self {
        let mut manifest = Manifest::default();
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            let parts: Vec<&str> = line.split('=').collect();
            let [key, value] = parts.as_slice() else {
                continue;
            };
            match Section::from_key(key.trim()) {
                Some(section) => manifest.insert(section, value.trim().to_string()),
                None => debug!(key = %key, "ignoring unknown manifest key"),
            }
        }
        manifest
    }

    /// Serializes every present section in fixed order
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for section in Section::ALL {
            if let Some(digest) = self.get(section) {
                text.push_str(section.key());
                text.push('=');
                text.push_str(digest);
                text.push('\n');
            }
        }
        text
    }
}

pub fn load(path: &Path) -> Result<Manifest, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Manifest::parse(&text))
}

/// Overwrites the manifest file, creating its directory if needed
pub fn save(path: &Path, manifest: &Manifest) -> Result<(), StoreError> {
    let write_error = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, manifest.to_text()).map_err(write_error)
}
