// src/mirror/paths.rs
// =============================================================================
// Maps an absolute asset URL to a relative path inside the mirror directory.
//
//   https://x.com/css/site.css?v=3  -> css/site.css
//   https://x.com/img?v=2           -> asset_{hash}.txt
//   https://x.com/fonts/            -> fonts/asset_{hash}.txt
//
// The mapping is deterministic: the same URL always lands on the same path,
// because the synthesized names hash the URL with SHA-256 rather than a
// per-process random hasher.
// =============================================================================

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use url::Url;

/// What an extension-less asset looks like, judged from its URL text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Css,
    Js,
    Image,
    Other,
}

const IMAGE_MARKERS: [&str; 7] = [".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", "image"];

impl AssetClass {
    pub fn classify(url_text: &str) -> Self {
        let url_text = url_text.to_lowercase();
        if url_text.contains(".css") || url_text.contains("stylesheet") {
            AssetClass::Css
        } else if url_text.contains(".js") || url_text.contains("javascript") {
            AssetClass::Js
        } else if IMAGE_MARKERS.iter().any(|marker| url_text.contains(marker)) {
            AssetClass::Image
        } else {
            AssetClass::Other
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            AssetClass::Css => "css",
            AssetClass::Js => "js",
            AssetClass::Image => "image",
            AssetClass::Other => "asset",
        }
    }

    fn default_extension(self) -> &'static str {
        match self {
            AssetClass::Css => "css",
            AssetClass::Js => "js",
            AssetClass::Image => "jpg",
            AssetClass::Other => "txt",
        }
    }
}

/// Relative local path for an absolute asset URL
pub fn local_path(url: &Url) -> PathBuf {
    // Url::path() never contains the query string or fragment
    let path = url.path();
    let path = path.strip_prefix('/').unwrap_or(path);

    let (directory, file_name) = match path.rsplit_once('/') {
        Some((directory, file_name)) => (directory, file_name),
        None => ("", path),
    };

    let file_name = if has_extension(file_name) {
        file_name.to_string()
    } else {
        let class = AssetClass::classify(url.as_str());
        format!("{}_{}.{}", class.prefix(), stable_hash(url), class.default_extension())
    };

    let mut local = PathBuf::new();
    for segment in directory.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        local.push(sanitize_segment(segment));
    }
    local.push(sanitize_segment(&file_name));
    local
}

/// Directory name for a site: the host with dots replaced by underscores
pub fn host_slug(url: &Url) -> String {
    let host = url.host_str().unwrap_or("site");
    sanitize_segment(&host.replace('.', "_"))
}

/// Replaces characters that are illegal in a file name with '_'
pub fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\\' | '/' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

// A dot-leading name such as ".htaccess" counts: the part after the dot is
// its extension
fn has_extension(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, extension)) => !extension.is_empty(),
        None => false,
    }
}

// First four bytes of the URL's SHA-256, as a decimal number
fn stable_hash(url: &Url) -> u32 {
    let digest = Sha256::digest(url.as_str().as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn map(raw: &str) -> PathBuf {
        local_path(&Url::parse(raw).unwrap())
    }

    #[test]
    fn test_keeps_directory_structure() {
        assert_eq!(map("https://x.com/css/site.css?v=3"), Path::new("css/site.css"));
        assert_eq!(map("https://x.com/a/b/c.min.js"), Path::new("a/b/c.min.js"));
    }

    #[test]
    fn test_extensionless_url_gets_stable_name() {
        let first = map("https://x.com/img?v=2");
        let second = map("https://x.com/img?v=2");
        assert_eq!(first, second);

        let name = first.to_str().unwrap();
        assert!(name.starts_with("asset_"), "{name}");
        assert!(name.ends_with(".txt"), "{name}");
        assert!(!name.contains('?'));
        assert!(name["asset_".len()..name.len() - ".txt".len()]
            .chars()
            .all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_synthesized_name_follows_asset_class() {
        let image = map("https://x.com/static/logo?format=image");
        assert_eq!(image.parent().unwrap(), Path::new("static"));
        let name = image.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("image_") && name.ends_with(".jpg"), "{name}");

        let css = map("https://x.com/fonts/?family=stylesheet");
        let name = css.file_name().unwrap().to_str().unwrap();
        assert_eq!(css.parent().unwrap(), Path::new("fonts"));
        assert!(name.starts_with("css_") && name.ends_with(".css"), "{name}");
    }

    #[test]
    fn test_different_urls_get_different_names() {
        assert_ne!(map("https://x.com/a?v=1"), map("https://x.com/a?v=2"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(AssetClass::classify("https://x.com/theme.CSS"), AssetClass::Css);
        assert_eq!(AssetClass::classify("https://x.com/app.js?x"), AssetClass::Js);
        assert_eq!(AssetClass::classify("https://x.com/p.webp"), AssetClass::Image);
        assert_eq!(AssetClass::classify("https://x.com/blob"), AssetClass::Other);
    }

    #[test]
    fn test_illegal_characters_are_replaced() {
        assert_eq!(sanitize_segment("a:b*c?.css"), "a_b_c_.css");
        assert_eq!(map("https://x.com/dir/we%22ird:name.png"), Path::new("dir/we%22ird_name.png"));
    }

    #[test]
    fn test_host_slug() {
        let url = Url::parse("https://www.example.co.uk/page").unwrap();
        assert_eq!(host_slug(&url), "www_example_co_uk");
    }

    #[test]
    fn test_dot_leading_file_keeps_its_name() {
        assert_eq!(map("https://x.com/conf/.htaccess"), Path::new("conf/.htaccess"));
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("a.css"));
        assert!(!has_extension("img"));
        assert!(has_extension(".hidden"));
        assert!(!has_extension("trailing."));
    }
}
