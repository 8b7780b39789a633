use super::LandingPage;
use crate::download::is_pdf_content;
use tracing::debug;

/// `<meta name="citation_pdf_url">`, which most publishers emit for
/// indexers. Tried first.
#[must_use]
pub fn citation_labelled(page: &LandingPage) -> Option<String> {
    let content = page.document.meta_content("citation_pdf_url")?;
    debug!("Fetching reprint using the 'generic citation labelled' finder");
    page.join(content)
}

/// The landing URL already served the PDF itself
#[must_use]
pub fn direct_pdf_link(page: &LandingPage) -> Option<String> {
    if !is_pdf_content(&page.body) {
        return None;
    }
    debug!("Fetching reprint using the 'direct pdf link' finder");
    Some(page.url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finders::test_support::landing;

    #[test]
    fn test_citation_meta() {
        let page = landing(
            "https://pub.example/article/1",
            r#"<html><head><meta name="citation_pdf_url" content="https://pub.example/paper.pdf"></head></html>"#,
        );
        assert_eq!(
            citation_labelled(&page).as_deref(),
            Some("https://pub.example/paper.pdf")
        );
    }

    #[test]
    fn test_relative_citation_meta_is_joined() {
        let page = landing(
            "https://pub.example/article/1",
            r#"<meta name="citation_pdf_url" content="/content/1.full.pdf">"#,
        );
        assert_eq!(
            citation_labelled(&page).as_deref(),
            Some("https://pub.example/content/1.full.pdf")
        );
    }

    #[test]
    fn test_no_citation_meta() {
        let page = landing(
            "https://pub.example/article/1",
            r#"<meta name="citation_title" content="A paper">"#,
        );
        assert!(citation_labelled(&page).is_none());
    }

    #[test]
    fn test_direct_pdf_sniff() {
        let page = landing("https://pub.example/paper.pdf", "%PDF-1.5 binary");
        assert_eq!(
            direct_pdf_link(&page).as_deref(),
            Some("https://pub.example/paper.pdf")
        );

        let html = landing("https://pub.example/article", "<!DOCTYPE html><p>hi</p>");
        assert!(direct_pdf_link(&html).is_none());
    }
}
