// src/detect/section.rs
// The twelve page sections that are hashed and compared between polls.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    FullPage,
    Head,
    Body,
    Title,
    MainContent,
    Header,
    Footer,
    Styles,
    Scripts,
    Images,
    MetaTags,
    LinkTags,
}

impl Section {
    /// Every section, in manifest order
    pub const ALL: [Section; 12] = [
        Section::FullPage,
        Section::Head,
        Section::Body,
        Section::Title,
        Section::MainContent,
        Section::Header,
        Section::Footer,
        Section::Styles,
        Section::Scripts,
        Section::Images,
        Section::MetaTags,
        Section::LinkTags,
    ];

    /// Key used in the manifest file and in change reports
    pub fn key(self) -> &'static str {
        match self {
            Section::FullPage => "FullPage",
            Section::Head => "Head",
            Section::Body => "Body",
            Section::Title => "Title",
            Section::MainContent => "MainContent",
            Section::Header => "Header",
            Section::Footer => "Footer",
            Section::Styles => "Styles",
            Section::Scripts => "Scripts",
            Section::Images => "Images",
            Section::MetaTags => "MetaTags",
            Section::LinkTags => "LinkTags",
        }
    }

    pub fn from_key(key: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|section| section.key() == key)
    }

    /// Landmark element whose inner markup feeds this section, if any
    pub fn landmark(self) -> Option<&'static str> {
        match self {
            Section::Head => Some("head"),
            Section::Body => Some("body"),
            Section::Title => Some("title"),
            Section::MainContent => Some("main"),
            Section::Header => Some("header"),
            Section::Footer => Some("footer"),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_key(section.key()), Some(section));
        }
        assert_eq!(Section::from_key("Sidebar"), None);
    }
}
