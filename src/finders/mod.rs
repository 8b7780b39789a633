//! # Finders
//!
//! Each finder knows one publisher's markup and turns a landing page into a
//! candidate PDF URL. The chain order is the priority order: the first
//! candidate the verifier accepts wins.

pub mod generic;
pub mod page;
pub mod pmc;
pub mod publishers;
pub mod science_direct;

pub use page::{LandingPage, PageDocument, Tag};
pub use science_direct::ScienceDirect;

use crate::client::Transport;
use crate::config::FinderSettings;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A publisher-specific heuristic for locating a PDF URL in a page
#[async_trait]
pub trait Finder: Send + Sync {
    /// Stable name used in logs
    fn name(&self) -> &'static str;

    /// Candidate URL for `page`, or `None` when the page does not match.
    ///
    /// Only finders that need a secondary request use `transport`.
    async fn find(&self, page: &LandingPage, transport: &dyn Transport) -> Result<Option<String>>;
}

/// Signature of a finder that only inspects the page it is given
pub type InspectFn = fn(&LandingPage) -> Option<String>;

/// Finder backed by a plain function
#[derive(Clone, Copy)]
pub struct PageFinder {
    name: &'static str,
    inspect: InspectFn,
}

impl PageFinder {
    #[must_use]
    pub const fn new(name: &'static str, inspect: InspectFn) -> Self {
        Self { name, inspect }
    }
}

#[async_trait]
impl Finder for PageFinder {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn find(&self, page: &LandingPage, _transport: &dyn Transport) -> Result<Option<String>> {
        Ok((self.inspect)(page).filter(|url| !url.trim().is_empty()))
    }
}

const STANDARD: [PageFinder; 6] = [
    PageFinder::new("generic_citation_labelled", generic::citation_labelled),
    PageFinder::new("pubmed_central_v2", pmc::pubmed_central_v2),
    PageFinder::new("acs_publications", publishers::acs_publications),
    PageFinder::new("uchicago_press", publishers::uchicago_press),
    PageFinder::new("nejm", publishers::nejm),
    PageFinder::new("future_medicine", publishers::future_medicine),
];

const DIRECT: PageFinder = PageFinder::new("direct_pdf_link", generic::direct_pdf_link);

const EXTENDED: [PageFinder; 4] = [
    PageFinder::new("pubmed_central_v1", pmc::pubmed_central_v1),
    PageFinder::new("cell_press", publishers::cell_press),
    PageFinder::new("elife", publishers::elife),
    PageFinder::new("doi_link", publishers::doi_link),
];

/// Ordered, fixed sequence of finders
#[derive(Clone)]
pub struct FinderChain {
    finders: Vec<Arc<dyn Finder>>,
}

impl std::fmt::Debug for FinderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl FinderChain {
    /// Build a chain from finders in priority order
    #[must_use]
    pub fn new(finders: Vec<Arc<dyn Finder>>) -> Self {
        Self { finders }
    }

    /// The curated chain: generic citation meta first, raw content sniff last
    #[must_use]
    pub fn standard() -> Self {
        let mut finders: Vec<Arc<dyn Finder>> = STANDARD
            .iter()
            .map(|finder| Arc::new(*finder) as Arc<dyn Finder>)
            .collect();
        finders.push(Arc::new(ScienceDirect));
        finders.push(Arc::new(DIRECT));
        Self::new(finders)
    }

    /// The standard chain followed by the rarely needed publisher finders
    #[must_use]
    pub fn extended() -> Self {
        let mut chain = Self::standard();
        chain.finders.extend(
            EXTENDED
                .iter()
                .map(|finder| Arc::new(*finder) as Arc<dyn Finder>),
        );
        chain
    }

    #[must_use]
    pub fn from_settings(settings: &FinderSettings) -> Self {
        if settings.extended {
            Self::extended()
        } else {
            Self::standard()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Finder>> {
        self.finders.iter()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.finders.iter().map(|finder| finder.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.finders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }
}

impl Default for FinderChain {
    fn default() -> Self {
        Self::standard()
    }
}
