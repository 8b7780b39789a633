use super::LandingPage;
use tracing::debug;

const NCBI_HOST: &str = "www.ncbi.nlm.nih.gov";

/// Anchor into the PubMed Central article repository
#[must_use]
pub fn pubmed_central_v2(page: &LandingPage) -> Option<String> {
    let href = page
        .document
        .anchors()
        .filter_map(super::Tag::href)
        .find(|href| href.contains("/pmc/articles"))?;

    debug!("Fetching reprint using the 'pubmed central' finder");
    if href.contains(NCBI_HOST) {
        Some(href.to_string())
    } else {
        Some(format!("https://{NCBI_HOST}/{}", href.trim_start_matches('/')))
    }
}

/// Anchor with a `pdf` class. Wiley uses the same markup for its reader,
/// which is skipped through the `epdf` title.
#[must_use]
pub fn pubmed_central_v1(page: &LandingPage) -> Option<String> {
    let tag = page.document.anchors().find(|tag| {
        tag.has_class_containing("pdf")
            && !tag
                .attr("title")
                .is_some_and(|title| title.to_lowercase().contains("epdf"))
    })?;

    debug!("Fetching reprint using the 'pubmed central' (class) finder");
    page.join(tag.href()?)
}
