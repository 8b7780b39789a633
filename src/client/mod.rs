pub mod pdbj;
pub mod resolver;
pub mod transport;

pub use pdbj::{PdbjClient, PdbjQuery};
pub use resolver::LandingPageResolver;
pub use transport::{FetchedPage, HttpTransport, Transport};

use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Desktop browser agent; several publishers reject library default agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client configuration shared by every request of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// User agent string sent with every request
    pub user_agent: String,
    /// Accept header
    pub accept: String,
    /// Accept-Language header
    pub accept_language: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,application/pdf,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            request_timeout_secs: 60,
            connect_timeout_secs: 15,
            max_redirects: 10,
        }
    }
}

impl HttpClientConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// PubMed identifier wrapper for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pmid(u64);

impl Pmid {
    /// Create a new PMID, rejecting zero
    pub fn new(value: u64) -> Result<Self> {
        if value == 0 {
            return Err(crate::Error::InvalidInput {
                field: "pmid".to_string(),
                reason: "PMID must be a positive integer".to_string(),
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Name of the reprint file for this identifier
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.pdf", self.0)
    }

    /// Substitute this identifier into a `{pmid}` URL template
    #[must_use]
    pub fn fill(self, template: &str) -> String {
        template.replace("{pmid}", &self.0.to_string())
    }
}

impl std::fmt::Display for Pmid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pmid {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let cleaned = s.trim().trim_matches('"');
        let value = cleaned
            .parse::<u64>()
            .map_err(|_| crate::Error::InvalidInput {
                field: "pmid".to_string(),
                reason: format!("'{cleaned}' is not a positive integer"),
            })?;
        Self::new(value)
    }
}
