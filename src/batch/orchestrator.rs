use super::{BatchReport, FetchRecord, FetchState};
use crate::client::{HttpTransport, LandingPageResolver, Pmid, Transport};
use crate::config::Config;
use crate::download::PdfVerifier;
use crate::input;
use crate::finders::FinderChain;
use crate::resilience::{retry_if, RetryConfig};
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Runs the resolve, find and verify pipeline for a batch of identifiers
#[derive(Debug, Clone)]
pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    resolver: LandingPageResolver,
    chain: FinderChain,
    verifier: PdfVerifier,
    retry: RetryConfig,
    hail_mary_url: String,
    concurrency: usize,
}

impl Orchestrator {
    /// Build every collaborator from `config`, sharing one transport
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            resolver: LandingPageResolver::from_config(Arc::clone(&transport), &config.resolver),
            chain: FinderChain::from_settings(&config.finders),
            verifier: PdfVerifier::new(
                Arc::clone(&transport),
                config.download.output_directory.clone(),
            ),
            retry: config.retry_config(),
            hail_mary_url: config.resolver.hail_mary_url.clone(),
            concurrency: config.download.concurrency.max(1),
            transport,
        }
    }

    /// Orchestrator over a real HTTP client
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.http)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Process `pmids` and return one record per distinct identifier, in
    /// first-seen order.
    ///
    /// Cancelling `shutdown` stops identifiers that have not finished; they
    /// are recorded as failed and any partial download is removed.
    pub async fn run(&self, pmids: &[Pmid], shutdown: CancellationToken) -> BatchReport {
        let pmids = input::dedup(pmids.iter().copied());
        info!(
            "Fetching {} reprints with {} workers into {}",
            pmids.len(),
            self.concurrency,
            self.verifier.output_directory().display()
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(pmids.len());

        for pmid in pmids {
            let worker = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let shutdown = shutdown.clone();

            let task = tokio::spawn(async move {
                debug!(%pmid, state = %FetchState::Pending, "Queued");
                let permit = tokio::select! {
                    biased;
                    () = shutdown.cancelled() => None,
                    permit = semaphore.acquire_owned() => permit.ok(),
                };
                let Some(_permit) = permit else {
                    return FetchRecord::failed(pmid, 0, "cancelled before start");
                };

                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => {}
                    record = worker.process_one(pmid) => return record,
                }
                if let Err(e) = worker.verifier.discard_partial(pmid).await {
                    warn!("Could not remove partial download for {}: {}", pmid, e);
                }
                FetchRecord::failed(pmid, 0, "cancelled")
            });
            tasks.push((pmid, task));
        }

        let mut records = Vec::with_capacity(tasks.len());
        for (pmid, task) in tasks {
            match task.await {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!("Task for {} failed: {}", pmid, e);
                    records.push(FetchRecord::failed(pmid, 0, e.to_string()));
                }
            }
        }

        let report = BatchReport::new(records);
        report.log_summary();
        report
    }

    /// Take one identifier to a terminal state
    #[instrument(skip(self, pmid), fields(pmid = %pmid))]
    pub async fn process_one(&self, pmid: Pmid) -> FetchRecord {
        let existing = self.verifier.output_path(pmid);
        if tokio::fs::try_exists(&existing).await.unwrap_or(false) {
            info!("Reprint {} already present, skipping", pmid);
            return FetchRecord::skipped(pmid, existing);
        }

        let attempted = retry_if(
            |attempt| {
                let state = if attempt > 1 {
                    FetchState::Retrying
                } else {
                    FetchState::Pending
                };
                debug!(from = %state, to = %FetchState::Fetching, attempt, "Transition");
                self.fetch_reprint(pmid)
            },
            &self.retry,
            Error::is_retryable,
            "fetch_reprint",
        )
        .await;

        let record = match attempted.result {
            Ok(path) => {
                info!("Fetching of reprint {} succeeded", pmid);
                FetchRecord::saved(pmid, path, attempted.attempts)
            }
            Err(e @ Error::UnsupportedProvider { .. }) => {
                warn!("{}", e);
                FetchRecord::failed(pmid, attempted.attempts, e.to_string())
            }
            Err(e) => {
                info!(
                    "Reprint {} could not be fetched after {} attempt(s): {}",
                    pmid, attempted.attempts, e
                );
                FetchRecord::failed(pmid, attempted.attempts, e.to_string())
            }
        };
        debug!(to = %record.state(), attempts = record.attempts, "Transition");
        record
    }

    /// One pass of the pipeline: landing page, finders in priority order,
    /// then the PMC mirror as a last resort.
    async fn fetch_reprint(&self, pmid: Pmid) -> Result<PathBuf> {
        let page = self.resolver.resolve(pmid).await?;

        for finder in self.chain.iter() {
            debug!("Trying {}", finder.name());
            let Some(candidate) = finder.find(&page, self.transport.as_ref()).await? else {
                continue;
            };
            debug!("{} proposed {}", finder.name(), candidate);
            if let Some(path) = self.verifier.verify_and_save(pmid, &candidate).await? {
                return Ok(path);
            }
        }

        let hail_mary = pmid.fill(&self.hail_mary_url);
        debug!("No finder matched, trying {}", hail_mary);
        if let Some(path) = self.verifier.verify_and_save(pmid, &hail_mary).await? {
            return Ok(path);
        }

        Err(Error::Verification { pmid: pmid.get() })
    }
}
