// src/mirror/site.rs
// =============================================================================
// Mirrors one page and the assets it references into a local directory.
//
// How it works:
// 1. Fetch the page and save it as {host}/index.html
// 2. Pull three lists out of the markup: stylesheet links, script sources and
//    image sources (blank values dropped, duplicates removed, order kept)
// 3. For each asset, one at a time:
//    resolve -> map to a local path -> create directories -> download -> write
//
// Only step 1 can fail the whole run. Every asset gets exactly one attempt;
// a skip, a 404 or a write error is logged, recorded in the MirrorReport and
// the loop moves on. A half-finished mirror is a normal outcome.
//
// Rust concepts:
// - Result<T, E> per asset: each outcome is kept, not just the successes
// - #[from]: lets `?` turn a ResolveError into AssetError::Skipped
// - Block scoping: the parsed page is dropped before the first `.await`
// =============================================================================

use super::paths::{host_slug, local_path};
use super::resolve::{resolve, ResolveError};
use crate::dom::{attribute_values, DomNode, PageDom, ParsedPage};
use crate::net::{FetchError, HttpClient, RequestOptions};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Stylesheet,
    Script,
    Image,
}

/// One asset reference found in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub source_url: String,
    pub kind: AssetKind,
}

/// An asset that made it to disk
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    pub absolute_url: Url,
    /// Relative to the mirror root
    pub local_path: PathBuf,
}

/// Why one asset did not make it to disk
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("skipped: {0}")]
    Skipped(#[from] ResolveError),
    #[error("download of {url} failed: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: FetchError,
    },
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct AssetOutcome {
    pub reference: AssetReference,
    pub result: Result<ResolvedAsset, AssetError>,
}

/// Everything one mirror run did
#[derive(Debug)]
pub struct MirrorReport {
    pub root: PathBuf,
    /// None when the page came back empty
    pub index: Option<PathBuf>,
    pub outcomes: Vec<AssetOutcome>,
}

impl MirrorReport {
    pub fn saved(&self) -> impl Iterator<Item = &ResolvedAsset> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Err(AssetError::Skipped(_))))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Err(AssetError::Fetch { .. } | AssetError::Io { .. })))
            .count()
    }
}

/// Stylesheets, then scripts, then images; each list deduplicated in order
pub fn extract_assets<D: PageDom>(dom: &D) -> Vec<AssetReference> {
    let stylesheets: Vec<String> = dom
        .select_all("link")
        .iter()
        .filter(|link| {
            link.attribute("rel")
                .is_some_and(|rel| rel.trim().eq_ignore_ascii_case("stylesheet"))
        })
        .filter_map(|link| link.attribute("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect();
    let scripts = attribute_values(dom, "script", "src");
    let images = attribute_values(dom, "img", "src");

    let mut references = Vec::new();
    for (kind, urls) in [
        (AssetKind::Stylesheet, stylesheets),
        (AssetKind::Script, scripts),
        (AssetKind::Image, images),
    ] {
        let mut seen = HashSet::new();
        for source_url in urls {
            if seen.insert(source_url.clone()) {
                references.push(AssetReference { source_url, kind });
            }
        }
    }
    references
}

/// Mirrors `page_url` into `{work_dir}/{host_slug}`
pub async fn mirror_site(
    client: &HttpClient,
    options: &RequestOptions,
    page_url: &Url,
    work_dir: &Path,
) -> Result<MirrorReport> {
    // Everything for this site goes under one directory named after the host
    let root = work_dir.join(host_slug(page_url));
    fs::create_dir_all(&root)
        .await
        .with_context(|| format!("could not create {}", root.display()))?;

    info!(url = %page_url, dir = %root.display(), "starting mirror");

    // Fetch the page itself. This is the only failure that ends the run.
    let html = client
        .fetch_text(page_url, options)
        .await
        .with_context(|| format!("failed to fetch {page_url}"))?;

    let mut report = MirrorReport {
        root: root.clone(),
        index: None,
        outcomes: Vec::new(),
    };

    // Nothing to save and nothing to extract
    if html.is_empty() {
        warn!(url = %page_url, "no HTML content found on the page");
        return Ok(report);
    }

    // Save the HTML as-is; asset links inside it are not rewritten
    let index = root.join("index.html");
    fs::write(&index, &html)
        .await
        .with_context(|| format!("could not write {}", index.display()))?;
    info!(path = %index.display(), "HTML saved");
    report.index = Some(index);

    // The parsed page must be gone before the first download is awaited
    let references = {
        let page = ParsedPage::parse(&html);
        extract_assets(&page)
    };

    // One asset at a time, in extraction order
    for reference in references {
        let result = mirror_asset(client, options, page_url, &root, &reference).await;
        match &result {
            Ok(asset) => info!(path = %asset.local_path.display(), "downloaded"),
            Err(AssetError::Skipped(reason)) => info!(%reason, "skipping asset"),
            Err(error) => warn!(asset = %reference.source_url, %error, "asset failed"),
        }
        // Record the outcome whatever it was, then move on to the next asset
        report.outcomes.push(AssetOutcome { reference, result });
    }

    info!(
        saved = report.saved().count(),
        skipped = report.skipped_count(),
        failed = report.failed_count(),
        "mirror complete"
    );
    Ok(report)
}

async fn mirror_asset(
    client: &HttpClient,
    options: &RequestOptions,
    page_url: &Url,
    root: &Path,
    reference: &AssetReference,
) -> Result<ResolvedAsset, AssetError> {
    // data:, mailto: and the like stop here as Skipped
    let absolute_url = resolve(page_url, &reference.source_url)?;

    // Where the file goes, relative to the mirror root
    let relative = local_path(&absolute_url);
    let target = root.join(&relative);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await.map_err(|source| AssetError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Download. A 404 here is recorded for this asset only.
    let bytes = client
        .fetch_bytes(&absolute_url, options)
        .await
        .map_err(|source| AssetError::Fetch {
            url: absolute_url.clone(),
            source,
        })?;

    fs::write(&target, &bytes).await.map_err(|source| AssetError::Io {
        path: target.clone(),
        source,
    })?;

    Ok(ResolvedAsset {
        absolute_url,
        local_path: relative,
    })
}
