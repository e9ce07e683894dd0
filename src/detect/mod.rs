// src/detect/mod.rs
// =============================================================================
// Change detection: hash the interesting parts of a page on every poll and
// report which of them differ from the previous poll.
//
// Submodules:
// - section: the fixed set of page sections that get a digest
// - hasher: page -> one SHA-256 digest per section
// - manifest: the persisted `key=digest` file and its comparison
// - detector: baseline/compare logic plus report and snapshot files
// - watch: the polling loop that feeds the detector
//
// Everything is stored under {work-dir}/change_detection/.
// =============================================================================

mod detector;
mod hasher;
mod manifest;
mod section;
mod watch;

pub use detector::ChangeDetector;
pub use watch::watch_site;
