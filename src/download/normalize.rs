use regex::Regex;
use std::sync::LazyLock;

static HTML_OR_XML: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(<!doctype|<\?xml)").expect("valid pattern"));

/// Wiley serves a viewer on `/doi/pdf/`; the bytes live on `/doi/pdfdirect/`.
const WILEY_VIEWER: &str = "onlinelibrary.wiley.com/doi/pdf/";
const WILEY_DIRECT: &str = "onlinelibrary.wiley.com/doi/pdfdirect/";

/// Path segments that name a reader page rather than the PDF itself
const ALIAS_SEGMENTS: &[&str] = &["doi/epdf/", "doi/pdf/"];
const DIRECT_SEGMENT: &str = "doi/pdfdirect/";

/// Prepare a finder candidate for its first fetch
#[must_use]
pub fn normalize_candidate(url: &str) -> String {
    let url = url.trim();
    let url = if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    };
    url.replace(WILEY_VIEWER, WILEY_DIRECT)
}

/// Rewrite reader-page aliases to the direct download path
#[must_use]
pub fn rewrite_alias(url: &str) -> String {
    ALIAS_SEGMENTS
        .iter()
        .fold(url.to_string(), |acc, alias| acc.replace(alias, DIRECT_SEGMENT))
}

/// `scheme://host[:port]` of an absolute URL
#[must_use]
pub fn server_root(url: &str) -> String {
    url.split('/').take(3).collect::<Vec<_>>().join("/")
}

/// PDF signature check, ASCII case-insensitive
#[must_use]
pub fn is_pdf_content(body: &[u8]) -> bool {
    body.len() >= 4 && body[..4].eq_ignore_ascii_case(b"%pdf")
}

/// Whether a body opens like an HTML or XML document
#[must_use]
pub fn is_markup(text: &str) -> bool {
    HTML_OR_XML.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_relative_becomes_https() {
        assert_eq!(
            normalize_candidate("//cdn.example.org/paper.pdf"),
            "https://cdn.example.org/paper.pdf"
        );
        assert_eq!(
            normalize_candidate("http://plain.example.org/a.pdf"),
            "http://plain.example.org/a.pdf"
        );
    }

    #[test]
    fn test_wiley_viewer_becomes_direct() {
        assert_eq!(
            normalize_candidate("https://onlinelibrary.wiley.com/doi/pdf/10.1002/abc"),
            "https://onlinelibrary.wiley.com/doi/pdfdirect/10.1002/abc"
        );
    }

    #[test]
    fn test_alias_rewrite() {
        assert_eq!(
            rewrite_alias("https://pubs.example.org/doi/epdf/10.1/x"),
            "https://pubs.example.org/doi/pdfdirect/10.1/x"
        );
        assert_eq!(
            rewrite_alias("https://pubs.example.org/doi/pdf/10.1/x"),
            "https://pubs.example.org/doi/pdfdirect/10.1/x"
        );
        assert_eq!(
            rewrite_alias("https://pubs.example.org/doi/full/10.1/x"),
            "https://pubs.example.org/doi/full/10.1/x"
        );
    }

    #[test]
    fn test_server_root() {
        assert_eq!(
            server_root("https://www.example.org/a/b?c=d"),
            "https://www.example.org"
        );
        assert_eq!(server_root("http://127.0.0.1:8080/x"), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_pdf_signature() {
        assert!(is_pdf_content(b"%PDF-1.7\n..."));
        assert!(is_pdf_content(b"%pdf"));
        assert!(!is_pdf_content(b"%PD"));
        assert!(!is_pdf_content(b"<!DOCTYPE html>"));
        assert!(!is_pdf_content(b" %PDF"));
    }

    #[test]
    fn test_markup_detection() {
        assert!(is_markup("<!DOCTYPE html><html></html>"));
        assert!(is_markup("  \n<!doctype html>"));
        assert!(is_markup("<?xml version=\"1.0\"?><root/>"));
        assert!(!is_markup("<html><body>no doctype</body></html>"));
        assert!(!is_markup("plain text"));
    }
}
