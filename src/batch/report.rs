use super::{FetchRecord, Outcome};
use crate::client::Pmid;
use crate::Result;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Records of a finished batch, in input order
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    records: Vec<FetchRecord>,
}

impl BatchReport {
    #[must_use]
    pub const fn new(records: Vec<FetchRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[FetchRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for `pmid`, if it was part of the batch
    #[must_use]
    pub fn get(&self, pmid: Pmid) -> Option<&FetchRecord> {
        self.records.iter().find(|record| record.pmid == pmid)
    }

    /// Identifiers without a reprint, in input order
    #[must_use]
    pub fn failed(&self) -> Vec<Pmid> {
        self.records
            .iter()
            .filter_map(|record| match record.outcome {
                Outcome::Failed(pmid) => Some(pmid),
                Outcome::Saved(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.is_success() && !record.skipped)
            .count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.records.iter().filter(|record| record.skipped).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|record| !record.is_success()).count()
    }

    /// Write failed identifiers one per line. The file is written even when
    /// nothing failed, so a stale list never survives a rerun.
    pub async fn write_errors_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut contents = String::new();
        for pmid in self.failed() {
            contents.push_str(&pmid.to_string());
            contents.push('\n');
        }

        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    pub fn log_summary(&self) {
        info!(
            "Batch finished: {} saved, {} already present, {} failed out of {}",
            self.saved_count(),
            self.skipped_count(),
            self.failed_count(),
            self.len()
        );
    }
}
