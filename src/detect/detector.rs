// src/detect/detector.rs
// =============================================================================
// Compares a freshly fetched page against the stored manifest.
//
// Two states, decided by whether the manifest file exists:
//
//   NoBaseline --poll--> Baseline   (save all 12 digests, no report)
//   Baseline   --poll--> Baseline   (diff; report + save only if changed)
//
// Files live in {work_dir}/change_detection/:
//   {host}_hashes.txt                 the manifest
//   {host}_changes_{yyyyMMdd_HHmmss}.txt   one per detected change
//   {host}_snapshot_{yyyyMMdd_HHmmss}.html full body, only when FullPage changed
//
// Rust concepts:
// - BTreeSet: changed sections come out in manifest order
// - Enums with data: PollOutcome::Changed carries its report
// =============================================================================

use super::hasher::compute_digests;
use super::manifest::{self, StoreError};
use super::section::Section;
use crate::dom::ParsedPage;
use crate::mirror::host_slug;
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// Directory, relative to the work dir, holding manifests and reports
pub const STORE_DIR: &str = "change_detection";

#[derive(Debug, Clone)]
pub struct ChangeReport {
    pub timestamp: DateTime<Local>,
    pub url: String,
    pub changed: BTreeSet<Section>,
    pub report_path: PathBuf,
    pub snapshot_path: Option<PathBuf>,
}

impl ChangeReport {
    fn render(&self) -> String {
        let mut text = format!(
            "Change detected at: {}\nURL: {}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.url
        );
        for section in &self.changed {
            text.push_str(&format!("Element modified: {section}\n"));
        }
        if let Some(snapshot) = self.snapshot_path.as_ref().and_then(|p| p.file_name()) {
            text.push_str(&format!("\nFull snapshot saved: {}\n", snapshot.to_string_lossy()));
        }
        text
    }
}

#[derive(Debug)]
pub enum PollOutcome {
    BaselineCreated,
    Unchanged,
    Changed(ChangeReport),
}

/// Change detection state for one site
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    url: Url,
    dir: PathBuf,
    slug: String,
}

impl ChangeDetector {
    pub fn new(url: Url, work_dir: &Path) -> Self {
        let slug = host_slug(&url);
        Self {
            url,
            dir: work_dir.join(STORE_DIR),
            slug,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(format!("{}_hashes.txt", self.slug))
    }

    pub fn has_baseline(&self) -> bool {
        self.manifest_path().is_file()
    }

    /// Hashes `body`, diffs it against the manifest and persists the result
    pub fn observe(&self, body: &str, now: DateTime<Local>) -> Result<PollOutcome, StoreError> {
        // Hash every section of the fresh page
        let current = compute_digests(&ParsedPage::parse(body), body);
        let manifest_path = self.manifest_path();

        // First poll for this site: the current page becomes the reference
        if !self.has_baseline() {
            manifest::save(&manifest_path, &current)?;
            info!(url = %self.url, sections = current.len(), "baseline created");
            return Ok(PollOutcome::BaselineCreated);
        }

        // Compare against what was stored last time. A key missing from the
        // file counts as changed.
        let stored = manifest::load(&manifest_path)?;
        let changed = stored.changed_sections(&current);

        // Nothing differs: no files are touched
        if changed.is_empty() {
            info!(url = %self.url, "no changes");
            return Ok(PollOutcome::Unchanged);
        }

        // One timestamp names both the report and the snapshot
        let stamp = now.format("%Y%m%d_%H%M%S").to_string();

        // Keep the full body only when the page as a whole changed
        let snapshot_path = if changed.contains(&Section::FullPage) {
            let path = self.dir.join(format!("{}_snapshot_{stamp}.html", self.slug));
            write_file(&path, body)?;
            Some(path)
        } else {
            None
        };

        let report = ChangeReport {
            timestamp: now,
            url: self.url.to_string(),
            changed,
            report_path: self.dir.join(format!("{}_changes_{stamp}.txt", self.slug)),
            snapshot_path,
        };
        // Report first, then move the reference forward to the new page
        write_file(&report.report_path, &report.render())?;
        manifest::save(&manifest_path, &current)?;

        info!(
            url = %self.url,
            changed = report.changed.len(),
            report = %report.report_path.display(),
            "changes detected"
        );
        Ok(PollOutcome::Changed(report))
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    fs::write(path, contents).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}
