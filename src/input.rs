//! PMID input: comma separated lists on the command line, and files holding
//! one identifier per line or a CSV table with a `pmid` column.

use crate::client::Pmid;
use crate::Result;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Parse `"123,456, 789"`. Cells that are not identifiers are skipped.
#[must_use]
pub fn parse_pmid_list(list: &str) -> Vec<Pmid> {
    dedup(list.split(',').filter_map(parse_cell))
}

/// Read identifiers from a line-oriented or CSV file.
///
/// A header row is allowed; when it names a `pmid` column that column is
/// used, otherwise the first column.
pub fn read_pmids_file(path: &Path) -> Result<Vec<Pmid>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut column = 0;
    let mut pmids = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if row == 0 {
            if let Some(index) = record
                .iter()
                .position(|cell| cell.eq_ignore_ascii_case("pmid"))
            {
                column = index;
                continue;
            }
        }
        match record.get(column).and_then(parse_cell) {
            Some(pmid) => pmids.push(pmid),
            None => debug!("Skipping row {} of {}", row + 1, path.display()),
        }
    }

    let pmids = dedup(pmids);
    if pmids.is_empty() {
        warn!("No PMIDs found in {}", path.display());
    }
    Ok(pmids)
}

fn parse_cell(cell: &str) -> Option<Pmid> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse().ok()
}

/// Drop repeats, keeping the first occurrence
pub fn dedup(pmids: impl IntoIterator<Item = Pmid>) -> Vec<Pmid> {
    let mut seen = HashSet::new();
    pmids.into_iter().filter(|pmid| seen.insert(*pmid)).collect()
}
