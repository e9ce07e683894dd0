// src/detect/hasher.rs
// =============================================================================
// Computes one SHA-256 digest per Section of a page.
//
// Section sources:
// - FullPage: the raw response body
// - Head, Body, Title, MainContent, Header, Footer: inner markup of the first
//   matching landmark element, empty when the element is absent
// - Styles / Scripts: non-empty inline <style> / <script> bodies, one per line
// - Images: <img src> values as written, one per line (references, not pixels)
// - MetaTags / LinkTags: full markup of every <meta> / <link>, one per line
//
// Empty input is stored as the sentinel "EMPTY" instead of a digest. A missing
// landmark and an empty one therefore look the same.
// =============================================================================

use super::manifest::Manifest;
use super::section::Section;
use crate::dom::{DomNode, PageDom};
use sha2::{Digest, Sha256};

pub const EMPTY_DIGEST: &str = "EMPTY";

/// Lowercase hex SHA-256 of `content`, or EMPTY_DIGEST for empty input
pub fn digest(content: &str) -> String {
    if content.is_empty() {
        return EMPTY_DIGEST.to_string();
    }
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// All twelve section digests for one page
pub fn compute_digests<D: PageDom>(dom: &D, body: &str) -> Manifest {
    let mut manifest = Manifest::default();
    for section in Section::ALL {
        let source = section_source(dom, body, section);
        manifest.insert(section, digest(&source));
    }
    manifest
}

fn section_source<D: PageDom>(dom: &D, body: &str, section: Section) -> String {
    if let Some(landmark) = section.landmark() {
        return dom
            .select_first(landmark)
            .map(|node| node.inner_markup())
            .unwrap_or_default();
    }

    match section {
        Section::FullPage => body.to_string(),
        Section::Styles => inline_bodies(dom, "style"),
        Section::Scripts => inline_bodies(dom, "script"),
        Section::Images => raw_attribute_values(dom, "img", "src"),
        Section::MetaTags => outer_markup_of(dom, "meta"),
        Section::LinkTags => outer_markup_of(dom, "link"),
        _ => String::new(),
    }
}

fn inline_bodies<D: PageDom>(dom: &D, tag: &str) -> String {
    dom.select_all(tag)
        .iter()
        .map(|node| node.inner_markup())
        .filter(|body| !body.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// Values exactly as written: a blank or re-spaced src is a change too
fn raw_attribute_values<D: PageDom>(dom: &D, tag: &str, attr: &str) -> String {
    dom.select_all(tag)
        .iter()
        .filter_map(|node| node.attribute(attr))
        .collect::<Vec<_>>()
        .join("\n")
}

fn outer_markup_of<D: PageDom>(dom: &D, tag: &str) -> String {
    dom.select_all(tag)
        .iter()
        .map(|node| node.outer_markup())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ParsedPage;

    const PAGE: &str = r#"<html><head><title>Shop</title>
        <meta charset="utf-8"><link rel="stylesheet" href="a.css">
        <style>body { color: red }</style></head>
        <body><header>Top</header><main><h1>Deals</h1></main>
        <img src="a.png"><script src="x.js"></script><script>track()</script>
        </body></html>"#;

    fn digests(html: &str) -> Manifest {
        compute_digests(&ParsedPage::parse(html), html)
    }

    #[test]
    fn test_digest_is_lowercase_sha256_hex() {
        // sha256("abc")
        assert_eq!(
            digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest(""), EMPTY_DIGEST);
    }

    #[test]
    fn test_identical_content_gives_identical_manifest() {
        assert_eq!(digests(PAGE), digests(PAGE));
    }

    #[test]
    fn test_every_section_is_present() {
        let manifest = digests(PAGE);
        for section in Section::ALL {
            assert!(manifest.get(section).is_some(), "{section} missing");
        }
    }

    #[test]
    fn test_section_sources() {
        let page = ParsedPage::parse(PAGE);
        assert_eq!(section_source(&page, PAGE, Section::Title), "Shop");
        assert_eq!(section_source(&page, PAGE, Section::Header), "Top");
        assert_eq!(section_source(&page, PAGE, Section::MainContent), "<h1>Deals</h1>");
        assert_eq!(section_source(&page, PAGE, Section::Styles), "body { color: red }");
        assert_eq!(section_source(&page, PAGE, Section::Scripts), "track()");
        assert_eq!(section_source(&page, PAGE, Section::Images), "a.png");
        assert_eq!(section_source(&page, PAGE, Section::FullPage), PAGE);
    }

    #[test]
    fn test_missing_landmark_hashes_to_sentinel() {
        let manifest = digests(PAGE);
        assert_eq!(manifest.get(Section::Footer), Some(EMPTY_DIGEST));

        let with_empty_footer = PAGE.replace("</body>", "<footer></footer></body>");
        assert_eq!(digests(&with_empty_footer).get(Section::Footer), Some(EMPTY_DIGEST));
    }

    #[test]
    fn test_blank_or_respaced_image_source_changes_images() {
        let before = digests(PAGE);

        let blank_added = PAGE.replace("<img src=\"a.png\">", "<img src=\"a.png\"><img src=\"\">");
        assert!(before.changed_sections(&digests(&blank_added)).contains(&Section::Images));

        let respaced = PAGE.replace("src=\"a.png\"", "src=\" a.png\"");
        assert!(before.changed_sections(&digests(&respaced)).contains(&Section::Images));
    }

    #[test]
    fn test_title_change_only_touches_related_sections() {
        let before = digests(PAGE);
        let after = digests(&PAGE.replace("<title>Shop</title>", "<title>Sale</title>"));
        let changed = before.changed_sections(&after);
        assert!(changed.contains(&Section::Title));
        assert!(changed.contains(&Section::Head));
        assert!(changed.contains(&Section::FullPage));
        assert!(!changed.contains(&Section::Body));
        assert!(!changed.contains(&Section::Images));
    }
}
