//! Secondary searches over the raw markup of a page that should have been a
//! PDF. Publishers that gate the file behind a viewer usually leak its
//! location in one of these shapes.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window\.location\.href[ =]+"([^"]+)""#).expect("valid pattern")
});

static PDF_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"type[ =]+"application/pdf"[ ]+href[ =]+"([^"]+)"|name[ =]+"citation_pdf_url"[ ]+content[ =]+"([^"]+)""#,
    )
    .expect("valid pattern")
});

static CUSTOM_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"href="(https://elifesciences\.org/download/[^"]+\.pdf\?[^"]+)"|content[ =]+"([^"]+)"[ ]+name[ =]+"citation_pdf_url""#,
    )
    .expect("valid pattern")
});

/// The first secondary link found, by priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryLink {
    /// `window.location.href = "..."`
    ScriptRedirect(String),
    /// Typed `application/pdf` anchor or `citation_pdf_url` meta
    PdfLink(String),
    /// Hosting-specific download link
    Custom(String),
}

impl SecondaryLink {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::ScriptRedirect(url) | Self::PdfLink(url) | Self::Custom(url) => url,
        }
    }
}

/// Search `markup` for a secondary link, highest priority pattern first
#[must_use]
pub fn find_secondary(markup: &str) -> Option<SecondaryLink> {
    if let Some(url) = first_group(&SCRIPT_REDIRECT, markup) {
        return Some(SecondaryLink::ScriptRedirect(url));
    }
    if let Some(url) = first_group(&PDF_LINK, markup) {
        return Some(SecondaryLink::PdfLink(url));
    }
    first_group(&CUSTOM_LINK, markup).map(SecondaryLink::Custom)
}

/// First participating capture group of the first match
fn first_group(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern.captures(haystack).and_then(|caps| {
        caps.iter()
            .skip(1)
            .flatten()
            .next()
            .map(|m| m.as_str().to_string())
    })
}
