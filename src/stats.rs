// src/stats.rs
// =============================================================================
// Content statistics for one page: element counts, title/description and a
// split of links into internal and external.
//
// A link is internal when its href is relative or points at the page's own
// host. Everything else, including anchors with an empty href, is external.
// =============================================================================

use crate::dom::{DomNode, PageDom};
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContentStats {
    pub title: String,
    pub description: String,
    pub images: usize,
    pub links: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub scripts: usize,
    pub stylesheets: usize,
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub html_bytes: usize,
}

pub fn analyze<D: PageDom>(dom: &D, html: &str, page_url: &Url) -> ContentStats {
    let title = dom
        .select_first("title")
        .map(|node| node.text_content().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "No title".to_string());

    let description = dom
        .select_all("meta")
        .iter()
        .find(|meta| meta.attribute("name") == Some("description"))
        .and_then(|meta| meta.attribute("content").map(str::to_string))
        .unwrap_or_else(|| "No description".to_string());

    let anchors = dom.select_all("a");
    let internal_links = anchors
        .iter()
        .filter(|a| is_internal(page_url, a.attribute("href").unwrap_or("")))
        .count();

    let stylesheets = dom
        .select_all("link")
        .iter()
        .filter(|link| {
            link.attribute("rel")
                .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"))
        })
        .count();

    ContentStats {
        title,
        description,
        images: dom.select_all("img").len(),
        links: anchors.len(),
        internal_links,
        external_links: anchors.len() - internal_links,
        scripts: dom.select_all("script").len(),
        stylesheets,
        h1: dom.select_all("h1").len(),
        h2: dom.select_all("h2").len(),
        h3: dom.select_all("h3").len(),
        html_bytes: html.len(),
    }
}

fn is_internal(page_url: &Url, href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return false;
    }
    match Url::parse(href) {
        Ok(url) => url.host_str().is_some() && url.host_str() == page_url.host_str(),
        // Relative references stay on the same site
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ParsedPage;

    const PAGE: &str = r#"<html><head>
        <title> Docs </title>
        <meta name="description" content="All the docs">
        <link rel="stylesheet" href="a.css"><link rel="icon" href="f.ico">
        <script src="a.js"></script>
        </head><body>
        <h1>Docs</h1><h2>A</h2><h2>B</h2>
        <a href="/guide">Guide</a>
        <a href="https://docs.x.com/api">API</a>
        <a href="https://other.org/">Other</a>
        <a href="mailto:me@x.com">Mail</a>
        <a>Empty</a>
        <img src="a.png"><img src="b.png">
        </body></html>"#;

    #[test]
    fn test_analyze_counts_elements() {
        let url = Url::parse("https://docs.x.com/start").unwrap();
        let stats = analyze(&ParsedPage::parse(PAGE), PAGE, &url);

        assert_eq!(stats.title, "Docs");
        assert_eq!(stats.description, "All the docs");
        assert_eq!(stats.images, 2);
        assert_eq!(stats.links, 5);
        assert_eq!(stats.internal_links, 2);
        assert_eq!(stats.external_links, 3);
        assert_eq!(stats.scripts, 1);
        assert_eq!(stats.stylesheets, 1);
        assert_eq!((stats.h1, stats.h2, stats.h3), (1, 2, 0));
        assert_eq!(stats.html_bytes, PAGE.len());
    }

    #[test]
    fn test_defaults_for_bare_page() {
        let html = "<p>hi</p>";
        let url = Url::parse("https://x.com/").unwrap();
        let stats = analyze(&ParsedPage::parse(html), html, &url);
        assert_eq!(stats.title, "No title");
        assert_eq!(stats.description, "No description");
        assert_eq!(stats.links, 0);
    }
}
