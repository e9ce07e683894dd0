// src/dom.rs
// =============================================================================
// The small slice of DOM access every feature needs.
//
// The mirror, the change detector and the reporters only ever ask a parsed
// page four things:
// - parse markup into a tree
// - give me the first element with this tag name (head, title, main, ...)
// - give me every element with this tag name
// - read an attribute from an element
//
// PageDom / DomNode describe exactly that, and ParsedPage implements them on
// top of the `scraper` crate (html5ever underneath).
//
// NOTE: scraper's Html is not Send. Parse, extract what you need into owned
// Strings, and drop the page before the next `.await`.
// =============================================================================

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document that can be queried by tag name.
pub trait PageDom {
    /// Element handle borrowed from the document
    type Node<'a>: DomNode
    where
        Self: 'a;

    /// First element with the given tag name, in document order
    fn select_first(&self, name: &str) -> Option<Self::Node<'_>>;

    /// Every element with the given tag name, in document order
    fn select_all(&self, tag: &str) -> Vec<Self::Node<'_>>;
}

/// One element of a parsed document.
pub trait DomNode {
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Serialized markup of the element's children
    fn inner_markup(&self) -> String;

    /// Serialized markup of the element itself, tags included
    fn outer_markup(&self) -> String;

    /// Concatenated text content
    fn text_content(&self) -> String;
}

/// A document parsed with `scraper`.
pub struct ParsedPage {
    html: Html,
}

impl ParsedPage {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }
}

// An unparseable tag name selects nothing
fn tag_selector(name: &str) -> Option<Selector> {
    Selector::parse(name).ok()
}

impl PageDom for ParsedPage {
    type Node<'a> = ElementRef<'a>;

    fn select_first(&self, name: &str) -> Option<ElementRef<'_>> {
        let selector = tag_selector(name)?;
        self.html.select(&selector).next()
    }

    fn select_all(&self, tag: &str) -> Vec<ElementRef<'_>> {
        match tag_selector(tag) {
            Some(selector) => self.html.select(&selector).collect(),
            None => Vec::new(),
        }
    }
}

impl<'a> DomNode for ElementRef<'a> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn inner_markup(&self) -> String {
        ElementRef::inner_html(self)
    }

    fn outer_markup(&self) -> String {
        ElementRef::html(self)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}

/// Non-blank values of `attr` on every `tag` element, in document order.
pub fn attribute_values<D: PageDom>(dom: &D, tag: &str, attr: &str) -> Vec<String> {
    dom.select_all(tag)
        .iter()
        .filter_map(|node| node.attribute(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
