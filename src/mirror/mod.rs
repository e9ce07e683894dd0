// src/mirror/mod.rs
// =============================================================================
// Full-page mirroring: the page HTML plus its CSS, JS and images, rebuilt
// under a local directory named after the host.
//
// Submodules:
// - resolve: asset reference + page URL -> absolute http(s) URL
// - paths: absolute URL -> safe relative file path
// - site: extraction and the sequential download loop
// =============================================================================

mod paths;
mod resolve;
mod site;

pub use paths::host_slug;
pub use resolve::resolve;
pub use site::{mirror_site, MirrorReport};
