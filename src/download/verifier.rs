use super::heuristics::{find_secondary, SecondaryLink};
use super::normalize::{is_markup, is_pdf_content, normalize_candidate, rewrite_alias, server_root};
use crate::client::{FetchedPage, Pmid, Transport};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

const WRITE_CHUNK: usize = 2048;

/// Fetches candidate URLs and keeps only real PDF bytes
#[derive(Debug, Clone)]
pub struct PdfVerifier {
    transport: Arc<dyn Transport>,
    output_directory: PathBuf,
}

impl PdfVerifier {
    pub fn new(transport: Arc<dyn Transport>, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            output_directory: output_directory.into(),
        }
    }

    #[must_use]
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Where the reprint for `pmid` is stored
    #[must_use]
    pub fn output_path(&self, pmid: Pmid) -> PathBuf {
        self.output_directory.join(pmid.file_name())
    }

    fn partial_path(&self, pmid: Pmid) -> PathBuf {
        self.output_path(pmid).with_extension("pdf.part")
    }

    /// Remove the `.part` file an interrupted save left behind, if any
    pub async fn discard_partial(&self, pmid: Pmid) -> Result<()> {
        match tokio::fs::remove_file(self.partial_path(pmid)).await {
            Ok(()) => {
                debug!("Removed partial download for {}", pmid);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch `candidate`, confirm it is a PDF (following the secondary
    /// markup heuristics when it is not) and store it.
    ///
    /// Returns the stored path, or `None` when nothing PDF-shaped was found.
    #[instrument(skip(self, pmid), fields(pmid = %pmid))]
    pub async fn verify_and_save(&self, pmid: Pmid, candidate: &str) -> Result<Option<PathBuf>> {
        let url = normalize_candidate(candidate);
        let page = self.transport.get(&url).await?;

        if page.is_not_found_or_forbidden() {
            debug!("Candidate {} answered {}", url, page.status);
            return Ok(None);
        }

        match self.confirm(page).await? {
            Some(pdf) => {
                let path = self.save(pmid, &pdf.body).await?;
                debug!("Saved {} bytes from {} to {:?}", pdf.body.len(), pdf.url, path);
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    async fn confirm(&self, page: FetchedPage) -> Result<Option<FetchedPage>> {
        if is_pdf_content(&page.body) {
            return Ok(Some(page));
        }

        let markup = page.text();
        if !is_markup(&markup) {
            debug!("{} is neither PDF nor markup", page.url);
            return Ok(None);
        }

        let Some(link) = find_secondary(&markup) else {
            debug!("No secondary link in markup from {}", page.url);
            return Ok(None);
        };
        debug!("Following secondary link {:?}", link);

        match link {
            SecondaryLink::ScriptRedirect(target) => {
                self.fetch_pdf(&rewrite_alias(&normalize_candidate(&target)))
                    .await
            }
            SecondaryLink::PdfLink(target) => {
                let target = if target.contains("http") {
                    normalize_candidate(&target)
                } else {
                    format!("{}{}", server_root(&page.url), target)
                };
                if let Some(pdf) = self.fetch_pdf(&target).await? {
                    return Ok(Some(pdf));
                }
                self.fetch_pdf(&rewrite_alias(&target)).await
            }
            SecondaryLink::Custom(target) => self.fetch_pdf(&normalize_candidate(&target)).await,
        }
    }

    async fn fetch_pdf(&self, url: &str) -> Result<Option<FetchedPage>> {
        let page = self.transport.get(url).await?;
        Ok(is_pdf_content(&page.body).then_some(page))
    }

    /// Write to a `.part` sibling first so an interrupted write never looks
    /// like a finished reprint.
    async fn save(&self, pmid: Pmid, body: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_directory).await?;
        let path = self.output_path(pmid);
        let partial = self.partial_path(pmid);

        let mut file = File::create(&partial).await?;
        for chunk in body.chunks(WRITE_CHUNK) {
            file.write_all(chunk).await?;
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&partial, &path).await?;
        Ok(path)
    }
}
