use super::page::join_url;
use super::{Finder, LandingPage, PageDocument, Tag};
use crate::client::Transport;
use crate::Result;
use async_trait::async_trait;
use tracing::debug;

/// ScienceDirect hides the article behind a form whose hidden input carries
/// the real URL. Following it costs two extra requests: the article page for
/// its citation meta, then the download page whose first anchor is the PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScienceDirect;

impl ScienceDirect {
    fn redirect_target(page: &LandingPage) -> Option<String> {
        page.document
            .inputs()
            .filter_map(|tag| tag.attr("value"))
            .filter(|value| !value.is_empty())
            .map(|value| {
                urlencoding::decode(value).map_or_else(|_| value.to_string(), |v| v.into_owned())
            })
            .find(|value| value.contains("http"))
    }
}

#[async_trait]
impl Finder for ScienceDirect {
    fn name(&self) -> &'static str {
        "science_direct"
    }

    async fn find(&self, page: &LandingPage, transport: &dyn Transport) -> Result<Option<String>> {
        let Some(target) = Self::redirect_target(page) else {
            return Ok(None);
        };

        let article = transport.get(&target).await?;
        let document = PageDocument::parse(&article.text());
        let Some(citation) = document
            .meta_content("citation_pdf_url")
            .and_then(|content| join_url(&article.url, content))
        else {
            return Ok(None);
        };

        debug!("Fetching reprint using the 'science direct' finder");
        let download = transport.get(&citation).await?;
        let document = PageDocument::parse(&download.text());
        let pdf_url = document
            .anchors()
            .next()
            .and_then(Tag::href)
            .and_then(|href| join_url(&download.url, href));
        Ok(pdf_url)
    }
}
