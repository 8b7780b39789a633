//! # reprint-fetch
//!
//! Downloads PDF reprints for PubMed identifiers. Each identifier is
//! resolved to its publisher landing page, a fixed chain of
//! publisher-specific finders proposes candidate PDF URLs, and a verifier
//! keeps the first candidate whose bytes really are a PDF.

pub mod batch;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod finders;
pub mod input;
pub mod logging;
pub mod resilience;

pub use batch::{BatchReport, FetchRecord, FetchState, Orchestrator, Outcome};
pub use client::{
    FetchedPage, HttpClientConfig, HttpTransport, LandingPageResolver, PdbjClient, PdbjQuery,
    Pmid, Transport,
};
pub use config::{Config, ConfigOverrides};
pub use download::PdfVerifier;
pub use error::{Error, ErrorCategory, Result};
pub use finders::{Finder, FinderChain, LandingPage};
pub use resilience::{RetryConfig, TimeoutExt};
