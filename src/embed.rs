// src/embed.rs
// =============================================================================
// Builds a social-preview card (the kind chat apps unfurl) for a page.
//
// Metadata lookup, in order of preference:
// - title: og:title, then <title>
// - description: og:description, then <meta name="description">
//   (cut to 197 characters + "..." when longer than 200)
// - image: og:image, then the largest <img> by width*height, then the first
//   <img>, then the favicon; non-absolute fallbacks are resolved
// - site name: og:site_name, then the host
//
// The card is wrapped in a small example page and saved as embed_example.html.
// =============================================================================

use crate::dom::{DomNode, PageDom};
use crate::mirror::resolve;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const EXAMPLE_FILE: &str = "embed_example.html";
const MAX_DESCRIPTION: usize = 200;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmbedPreview {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub site_name: String,
}

pub fn extract_preview<D: PageDom>(dom: &D, page_url: &Url) -> EmbedPreview {
    let title = first_non_empty([
        meta_content(dom, "property", "og:title"),
        dom.select_first("title")
            .map(|node| node.text_content().trim().to_string()),
    ]);
    let description = first_non_empty([
        meta_content(dom, "property", "og:description"),
        meta_content(dom, "name", "description"),
    ]);

    let image = match meta_content(dom, "property", "og:image").filter(|i| !i.is_empty()) {
        Some(image) => image,
        None => {
            let fallback = fallback_image(dom).unwrap_or_default();
            if fallback.is_empty() || fallback.starts_with("http") {
                fallback
            } else {
                resolve(page_url, &fallback)
                    .map(String::from)
                    .unwrap_or(fallback)
            }
        }
    };

    let site_name = first_non_empty([
        meta_content(dom, "property", "og:site_name"),
        page_url.host_str().map(str::to_string),
    ]);

    EmbedPreview {
        url: page_url.to_string(),
        title,
        description: truncate_description(&description),
        image,
        site_name,
    }
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn meta_content<D: PageDom>(dom: &D, key: &str, value: &str) -> Option<String> {
    dom.select_all("meta")
        .iter()
        .find(|meta| meta.attribute(key) == Some(value))
        .and_then(|meta| meta.attribute("content"))
        .map(|content| content.trim().to_string())
}

fn fallback_image<D: PageDom>(dom: &D) -> Option<String> {
    let images = dom.select_all("img");
    let with_src: Vec<_> = images
        .iter()
        .filter(|img| img.attribute("src").is_some_and(|src| !src.is_empty()))
        .collect();

    if with_src.is_empty() {
        let links = dom.select_all("link");
        let with_rel = |wanted: &str| {
            links.iter().find(|link| {
                link.attribute("rel")
                    .is_some_and(|rel| rel.trim().eq_ignore_ascii_case(wanted))
            })
        };
        return with_rel("icon")
            .or_else(|| with_rel("shortcut icon"))
            .and_then(|link| link.attribute("href"))
            .map(str::to_string);
    }

    // Missing width/height count as 0; unparseable ones rule the image out.
    // Ties keep the earliest image.
    let mut largest: Option<(i64, &str)> = None;
    for img in &with_src {
        let dimension = |name| img.attribute(name).unwrap_or("0").trim().parse::<i64>();
        let (Ok(width), Ok(height)) = (dimension("width"), dimension("height")) else {
            continue;
        };
        // Markup can claim any size; saturate instead of overflowing
        let area = width.saturating_mul(height);
        if largest.map_or(true, |(best, _)| area > best) {
            largest = img.attribute("src").map(|src| (area, src));
        }
    }

    largest
        .map(|(_, src)| src)
        .or_else(|| with_src.first().and_then(|img| img.attribute("src")))
        .map(str::to_string)
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > MAX_DESCRIPTION {
        let cut: String = description.chars().take(MAX_DESCRIPTION - 3).collect();
        format!("{cut}...")
    } else {
        description.to_string()
    }
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// The preview card on its own
pub fn render_card(preview: &EmbedPreview) -> String {
    let url = escape_html(&preview.url);
    let title = escape_html(&preview.title);

    let mut card = String::from(
        "<div class=\"embed-container\" style=\"border-left: 4px solid #2f3136; background-color: #2f3136; border-radius: 4px; max-width: 520px; padding: 8px 10px 8px 12px; margin: 5px 0;\">\n",
    );
    card.push_str(&format!(
        "  <div class=\"embed-provider\" style=\"color: #8e9297; font-size: 0.75rem; margin-bottom: 5px;\">{}</div>\n",
        escape_html(&preview.site_name)
    ));
    if !preview.title.is_empty() {
        card.push_str(&format!(
            r#"  <div class="embed-title" style="color: #00aff4; font-size: 1rem; font-weight: 600; margin-bottom: 8px;">
    <a href="{url}" style="color: #00aff4; text-decoration: none;" target="_blank">{title}</a>
  </div>
"#
        ));
    }
    if !preview.description.is_empty() {
        card.push_str(&format!(
            "  <div class=\"embed-description\" style=\"color: #dcddde; font-size: 0.875rem; line-height: 1.3; margin-bottom: 10px;\">{}</div>\n",
            escape_html(&preview.description)
        ));
    }
    if !preview.image.is_empty() {
        card.push_str(&format!(
            r#"  <div class="embed-image" style="max-width: 100%; margin-top: 8px;">
    <a href="{url}" target="_blank">
      <img src="{}" alt="{title}" style="border-radius: 4px; max-width: 100%; max-height: 300px;" />
    </a>
  </div>
"#,
            escape_html(&preview.image)
        ));
    }
    card.push_str("</div>\n");
    card
}

/// A full page showing the card, with the Open Graph tags ready to copy
pub fn render_page(preview: &EmbedPreview) -> String {
    let title = escape_html(&preview.title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <!-- START COPYING HERE -->
    <meta property="og:title" content="{title}" />
    <meta property="og:description" content="{description}" />
    <meta property="og:image" content="{image}" />
    <meta property="og:url" content="{url}" />
    <meta property="og:site_name" content="{site_name}" />
    <!-- END COPYING HERE -->
    <style>
        body {{ font-family: Arial, sans-serif; background-color: #36393f; color: white; padding: 20px; }}
    </style>
</head>
<body>
    <h1>Example Embed</h1>
    <p>This is how the embed will look when added to your webpage:</p>

{card}
    <div style="margin-top: 20px; padding: 15px; background-color: #2f3136; border-radius: 5px;">
        <h3>How to use:</h3>
        <p>Copy the HTML code above and paste it into your webpage where you want the embed to appear.</p>
    </div>
</body>
</html>
"#,
        description = escape_html(&preview.description),
        image = escape_html(&preview.image),
        url = escape_html(&preview.url),
        site_name = escape_html(&preview.site_name),
        card = render_card(preview),
    )
}

/// Writes the example page into `work_dir` and returns its path
pub async fn write_example(preview: &EmbedPreview, work_dir: &Path) -> Result<PathBuf> {
    let path = work_dir.join(EXAMPLE_FILE);
    tokio::fs::write(&path, render_page(preview))
        .await
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ParsedPage;

    fn preview(html: &str) -> EmbedPreview {
        let url = Url::parse("https://blog.x.com/posts/1").unwrap();
        extract_preview(&ParsedPage::parse(html), &url)
    }

    #[test]
    fn test_open_graph_wins() {
        let p = preview(
            r#"<head><title>Plain</title>
            <meta property="og:title" content="OG Title">
            <meta name="description" content="plain desc">
            <meta property="og:image" content="https://cdn.x.com/card.png">
            <meta property="og:site_name" content="X Blog"></head>"#,
        );
        assert_eq!(p.title, "OG Title");
        assert_eq!(p.description, "plain desc");
        assert_eq!(p.image, "https://cdn.x.com/card.png");
        assert_eq!(p.site_name, "X Blog");
    }

    #[test]
    fn test_largest_image_is_resolved() {
        let p = preview(
            r#"<title>T</title><body>
            <img src="/small.png" width="10" height="10">
            <img src="big.png" width="100" height="50">
            <img src="/other.png" width="50" height="100"></body>"#,
        );
        assert_eq!(p.image, "https://blog.x.com/posts/big.png");
        assert_eq!(p.site_name, "blog.x.com");
    }

    #[test]
    fn test_favicon_when_no_images() {
        let p = preview(r#"<head><link rel="shortcut icon" href="/fav.ico"></head>"#);
        assert_eq!(p.image, "https://blog.x.com/fav.ico");
    }

    #[test]
    fn test_huge_image_dimensions_do_not_overflow() {
        let p = preview(
            r#"<body>
            <img src="/normal.png" width="800" height="600">
            <img src="/huge.png" width="9999999999" height="9999999999"></body>"#,
        );
        assert_eq!(p.image, "https://blog.x.com/huge.png");
    }

    #[test]
    fn test_long_description_is_truncated() {
        let long = "a".repeat(250);
        let p = preview(&format!(r#"<meta name="description" content="{long}">"#));
        assert_eq!(p.description.chars().count(), 200);
        assert!(p.description.ends_with("..."));
    }

    #[test]
    fn test_page_escapes_metadata() {
        let p = EmbedPreview {
            url: "https://x.com/?a=1&b=2".to_string(),
            title: "<script>alert(1)</script>".to_string(),
            description: String::new(),
            image: String::new(),
            site_name: "x.com".to_string(),
        };
        let page = render_page(&p);
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("https://x.com/?a=1&amp;b=2"));
        assert!(!page.contains("<script>alert"));
        assert!(!page.contains("embed-description"));
    }

    #[tokio::test]
    async fn test_write_example() {
        let dir = tempfile::tempdir().unwrap();
        let p = preview("<title>Hello</title>");
        let path = write_example(&p, dir.path()).await.unwrap();
        assert!(path.ends_with(EXAMPLE_FILE));
        assert!(std::fs::read_to_string(path).unwrap().contains("Hello"));
    }
}
