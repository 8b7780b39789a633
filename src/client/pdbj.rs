use super::HttpClientConfig;
use crate::config::PdbjConfig;
use crate::{Error, Result};
use chrono::NaiveDate;
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

const DATE_FORMAT: &str = "%Y-%m-%d";

const BASE_QUERY: &str = r#"SELECT distinct t.pmid FROM (SELECT a.pdbid as pdb_id, a.deposition_date as deposition_date, b."pdbx_database_id_PubMed" as pmid FROM pdbj.brief_summary a left join pdbj.citation b on b.pdbid = a.pdbid) as t"#;

/// Primary-citation PMIDs of PDB entries, optionally bounded by deposition date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PdbjQuery {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl PdbjQuery {
    /// Parse `YYYY-MM-DD` bounds
    pub fn new(min_date: Option<&str>, max_date: Option<&str>) -> Result<Self> {
        let query = Self {
            min_date: min_date.map(|d| parse_date("min_date", d)).transpose()?,
            max_date: max_date.map(|d| parse_date("max_date", d)).transpose()?,
        };
        if let (Some(min), Some(max)) = (query.min_date, query.max_date) {
            if min > max {
                return Err(Error::InvalidInput {
                    field: "min_date".to_string(),
                    reason: format!("{min} is after max_date {max}"),
                });
            }
        }
        Ok(query)
    }

    /// SQL sent to the Mine2 endpoint
    #[must_use]
    pub fn sql(&self) -> String {
        let mut filters = Vec::new();
        if let Some(min) = self.min_date {
            filters.push(format!("deposition_date >= '{}'", min.format(DATE_FORMAT)));
        }
        if let Some(max) = self.max_date {
            filters.push(format!("deposition_date <= '{}'", max.format(DATE_FORMAT)));
        }

        if filters.is_empty() {
            BASE_QUERY.to_string()
        } else {
            format!("{BASE_QUERY} WHERE {}", filters.join(" AND "))
        }
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| Error::InvalidInput {
        field: field.to_string(),
        reason: format!("'{value}' is not a YYYY-MM-DD date: {e}"),
    })
}

/// Client for the PDBj Mine2 SQL REST service
#[derive(Debug, Clone)]
pub struct PdbjClient {
    client: Client,
    endpoint: String,
    cache_file: PathBuf,
}

impl PdbjClient {
    pub fn new(config: &PdbjConfig, http: &HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&http.user_agent)
            .connect_timeout(http.connect_timeout())
            .timeout(http.request_timeout())
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            cache_file: config.cache_file.clone(),
        })
    }

    /// Run `query` and store the CSV result in the cache file.
    ///
    /// With `use_cache`, an existing cache file is returned untouched.
    #[instrument(skip(self))]
    pub async fn fetch_pmids(&self, query: &PdbjQuery, use_cache: bool) -> Result<PathBuf> {
        if use_cache && tokio::fs::try_exists(&self.cache_file).await? {
            info!("Using cached PDBj result {}", self.cache_file.display());
            return Ok(self.cache_file.clone());
        }
        self.fetch_to_file(query, &self.cache_file).await?;
        Ok(self.cache_file.clone())
    }

    /// Stream the CSV answer for `query` into `dest`
    pub async fn fetch_to_file(&self, query: &PdbjQuery, dest: &Path) -> Result<()> {
        let sql = query.sql();
        debug!("Querying PDBj: {}", sql);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", sql.as_str()), ("format", "csv")])
            .send()
            .await
            .map_err(|e| Error::from_request(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                code: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let partial = partial_path(dest);
        let written = match stream_to_file(response, &partial, &self.endpoint).await {
            Ok(written) => written,
            Err(e) => {
                tokio::fs::remove_file(&partial).await.ok();
                return Err(e);
            }
        };
        tokio::fs::rename(&partial, dest).await?;

        info!("Wrote {} bytes of PDBj results to {}", written, dest.display());
        Ok(())
    }
}

/// `results.csv` becomes `results.csv.part`
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn stream_to_file(response: reqwest::Response, path: &Path, url: &str) -> Result<usize> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0usize;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::from_request(url, e))?;
        file.write_all(&chunk).await?;
        written += chunk.len();
    }
    file.flush().await?;
    Ok(written)
}
