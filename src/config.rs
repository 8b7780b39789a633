//! # Configuration
//!
//! Layered configuration: built-in defaults, an optional TOML file, then
//! `REPRINT_FETCH__SECTION__KEY` environment variables, then command line
//! overrides.

use crate::client::HttpClientConfig;
use crate::resilience::RetryConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_PREFIX: &str = "REPRINT_FETCH";
pub const DEFAULT_ELINK_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/elink.fcgi?dbfrom=pubmed&id={pmid}&retmode=ref&cmd=prlinks";
pub const DEFAULT_HAIL_MARY_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/articles/pmid/{pmid}/";
pub const DEFAULT_PDBJ_ENDPOINT: &str = "https://pdbj.org/rest/mine2_sql";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// More detailed logging, no behavioral effect
    pub verbose: bool,
    pub download: DownloadConfig,
    pub http: HttpClientConfig,
    pub resolver: ResolverConfig,
    pub retry: RetrySettings,
    pub finders: FinderSettings,
    pub pdbj: PdbjConfig,
}

/// Where reprints go and how hard to try
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub output_directory: PathBuf,
    pub errors_file: PathBuf,
    /// Total attempts per identifier on transient network errors
    pub max_tries: u32,
    /// Identifiers processed at the same time
    pub concurrency: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("reprints"),
            errors_file: PathBuf::from("unfetched_pmids.tsv"),
            max_tries: 3,
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map_or(4, std::num::NonZeroUsize::get)
        .min(8)
}

/// Link resolution endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Landing page link service, `{pmid}` is substituted
    pub elink_url: String,
    /// Last-resort PMC mirror, `{pmid}` is substituted
    pub hail_mary_url: String,
    /// Host fragments whose PDFs cannot be fetched programmatically
    pub unsupported_providers: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            elink_url: DEFAULT_ELINK_URL.to_string(),
            hail_mary_url: DEFAULT_HAIL_MARY_URL.to_string(),
            unsupported_providers: vec!["ovid".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            initial_delay_ms: 250,
            max_delay_ms: 5_000,
            multiplier: defaults.multiplier,
            jitter: defaults.jitter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderSettings {
    /// Append the rarely needed publisher finders to the standard chain
    pub extended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdbjConfig {
    pub endpoint: String,
    pub cache_file: PathBuf,
}

impl Default for PdbjConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PDBJ_ENDPOINT.to_string(),
            cache_file: PathBuf::from("data/pmids.csv"),
        }
    }
}

/// Values supplied on the command line; `None` keeps the layered value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_directory: Option<PathBuf>,
    pub errors_file: Option<PathBuf>,
    pub max_tries: Option<u32>,
    pub concurrency: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub extended_finders: Option<bool>,
    pub verbose: Option<bool>,
}

impl Config {
    /// Load configuration from the layered sources.
    ///
    /// An explicit `path` must exist; otherwise the per-user config file is
    /// read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                builder = builder.add_source(
                    ::config::File::from(path)
                        .format(::config::FileFormat::Toml)
                        .required(true),
                );
            }
            None => {
                if let Some(user_file) = Self::user_config_path() {
                    debug!("Looking for configuration at {}", user_file.display());
                    builder = builder.add_source(
                        ::config::File::from(user_file)
                            .format(::config::FileFormat::Toml)
                            .required(false),
                    );
                }
            }
        }

        let config: Self = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Per-user configuration file location
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reprint-fetch").join("config.toml"))
    }

    /// Apply command line overrides and re-validate
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(dir) = &overrides.output_directory {
            self.download.output_directory.clone_from(dir);
        }
        if let Some(file) = &overrides.errors_file {
            self.download.errors_file.clone_from(file);
        }
        if let Some(max_tries) = overrides.max_tries {
            self.download.max_tries = max_tries;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.download.concurrency = concurrency;
        }
        if let Some(timeout) = overrides.request_timeout_secs {
            self.http.request_timeout_secs = timeout;
        }
        if let Some(agent) = &overrides.user_agent {
            self.http.user_agent.clone_from(agent);
        }
        if let Some(extended) = overrides.extended_finders {
            self.finders.extended = extended;
        }
        if let Some(verbose) = overrides.verbose {
            self.verbose = verbose;
        }
        self.validate()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.download.max_tries == 0 {
            return Err(invalid("download.max_tries", "must be at least 1"));
        }
        if self.download.concurrency == 0 {
            return Err(invalid("download.concurrency", "must be at least 1"));
        }
        if self.download.output_directory.as_os_str().is_empty() {
            return Err(invalid("download.output_directory", "cannot be empty"));
        }
        if self.download.errors_file.as_os_str().is_empty() {
            return Err(invalid("download.errors_file", "cannot be empty"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(invalid("http.user_agent", "cannot be empty"));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(invalid("http.request_timeout_secs", "must be greater than 0"));
        }
        if self.http.connect_timeout_secs == 0 {
            return Err(invalid("http.connect_timeout_secs", "must be greater than 0"));
        }
        for (field, template) in [
            ("resolver.elink_url", &self.resolver.elink_url),
            ("resolver.hail_mary_url", &self.resolver.hail_mary_url),
        ] {
            if !template.contains("{pmid}") {
                return Err(invalid(field, "must contain a {pmid} placeholder"));
            }
        }
        if self.retry.multiplier < 1.0 {
            return Err(invalid("retry.multiplier", "must be at least 1.0"));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter) {
            return Err(invalid("retry.jitter", "must be between 0.0 and 1.0"));
        }
        Ok(())
    }

    /// Retry behaviour for one identifier
    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.download.max_tries,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            multiplier: self.retry.multiplier,
            jitter: self.retry.jitter,
        }
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Parse {
            context: "configuration".to_string(),
            message: e.to_string(),
        })
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::InvalidInput {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.download.max_tries, 3);
        assert!(config.download.concurrency >= 1);
        assert!(!config.verbose);
        assert_eq!(config.resolver.unsupported_providers, vec!["ovid"]);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.download.max_tries = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));

        let mut config = Config::default();
        config.resolver.hail_mary_url = "https://example.org/".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));

        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retry.jitter = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_layers_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "verbose = true\n[download]\nmax_tries = 5\n[finders]\nextended = true"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.verbose);
        assert_eq!(config.download.max_tries, 5);
        assert!(config.finders.extended);
        assert_eq!(config.resolver.elink_url, DEFAULT_ELINK_URL);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            max_tries: Some(7),
            output_directory: Some(PathBuf::from("/tmp/out")),
            verbose: Some(true),
            ..Default::default()
        };
        config.apply_overrides(&overrides).unwrap();
        assert_eq!(config.download.max_tries, 7);
        assert_eq!(config.download.output_directory, PathBuf::from("/tmp/out"));
        assert!(config.verbose);
        assert_eq!(config.retry_config().max_attempts, 7);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            concurrency: Some(0),
            ..Default::default()
        };
        assert!(config.apply_overrides(&overrides).is_err());
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[download]"));
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
