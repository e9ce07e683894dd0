// src/mirror/resolve.rs
// =============================================================================
// Turns an asset reference found in a page into an absolute URL.
//
// References come in three shapes:
//   "https://cdn.example.com/a.js"  -> already absolute, used as-is
//   "//cdn.example.com/a.js"        -> protocol-relative, takes the page scheme
//   "styles/site.css", "/img/a.png" -> relative, joined against the page URL
//
// Only http and https survive. data:, mailto:, javascript:, ftp: and friends
// come back as ResolveError::UnsupportedScheme so the caller can log the skip.
// =============================================================================

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("non-HTTP asset ({scheme}): {url}")]
    UnsupportedScheme { scheme: String, url: String },
    #[error("unresolvable reference: {0}")]
    Invalid(String),
}

/// Resolves `raw` against the page URL `base`
pub fn resolve(base: &Url, raw: &str) -> Result<Url, ResolveError> {
    let raw = raw.trim();
    let invalid = || ResolveError::Invalid(raw.to_string());

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) if raw.starts_with("//") => {
            Url::parse(&format!("{}:{}", base.scheme(), raw)).map_err(|_| invalid())?
        }
        Err(_) => base.join(raw).map_err(|_| invalid())?,
    };

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ResolveError::UnsupportedScheme {
            scheme: scheme.to_string(),
            url: url.to_string(),
        }),
    }
}
