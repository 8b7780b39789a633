//! Finders for publishers whose landing pages do not expose the citation
//! meta tag, each keyed on one markup quirk of that publisher.

use super::{LandingPage, Tag};
use tracing::debug;

fn first_anchor<'a>(page: &'a LandingPage, matches: impl Fn(&Tag) -> bool) -> Option<&'a Tag> {
    page.document.anchors().find(|tag| matches(*tag))
}

fn href_contains(tag: &Tag, needle: &str) -> bool {
    tag.href().is_some_and(|href| href.contains(needle))
}

/// ACS marks its download buttons with a resolution in the title
#[must_use]
pub fn acs_publications(page: &LandingPage) -> Option<String> {
    let tag = first_anchor(page, |tag| {
        tag.attr("title").is_some_and(|title| {
            let title = title.to_lowercase();
            title.contains("high-res pdf") || title.contains("low-res pdf")
        })
    })?;
    debug!("Fetching reprint using the 'acs publications' finder");
    page.join(tag.href()?)
}

#[must_use]
pub fn uchicago_press(page: &LandingPage) -> Option<String> {
    let tag = first_anchor(page, |tag| {
        href_contains(tag, "pdf") && href_contains(tag, ".edu/doi/")
    })?;
    debug!("Fetching reprint using the 'uchicago press' finder");
    page.join(tag.href()?)
}

#[must_use]
pub fn nejm(page: &LandingPage) -> Option<String> {
    let tag = first_anchor(page, |tag| {
        tag.attr("data-download-type")
            .is_some_and(|kind| kind.eq_ignore_ascii_case("article pdf"))
    })?;
    debug!("Fetching reprint using the 'nejm' finder");
    page.join(tag.href()?)
}

#[must_use]
pub fn future_medicine(page: &LandingPage) -> Option<String> {
    let tag = first_anchor(page, |tag| href_contains(tag, "/doi/pdf"))?;
    debug!("Fetching reprint using the 'future medicine' finder");
    page.join(tag.href()?)
}

/// Cell Press routes through the Elsevier linking hub; the href is used as is
#[must_use]
pub fn cell_press(page: &LandingPage) -> Option<String> {
    let tag = first_anchor(page, |tag| {
        href_contains(tag, "https://linkinghub.elsevier.com/")
    })?;
    debug!("Fetching reprint using the 'cell press' finder");
    tag.href().map(str::to_string)
}

#[must_use]
pub fn elife(page: &LandingPage) -> Option<String> {
    let tag = first_anchor(page, |tag| href_contains(tag, "/eLife."))?;
    debug!("Fetching reprint using the 'elife' finder");
    page.join(tag.href()?)
}

#[must_use]
pub fn doi_link(page: &LandingPage) -> Option<String> {
    let tag = first_anchor(page, |tag| href_contains(tag, "//doi.org/"))?;
    debug!("Fetching reprint using the 'doi link' finder");
    page.join(tag.href()?)
}
