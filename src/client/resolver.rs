use super::{Pmid, Transport};
use crate::config::ResolverConfig;
use crate::finders::LandingPage;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Follows the PubMed link service to the publisher's landing page
#[derive(Debug, Clone)]
pub struct LandingPageResolver {
    transport: Arc<dyn Transport>,
    elink_url: String,
    unsupported_providers: Vec<String>,
}

impl LandingPageResolver {
    pub fn new(
        transport: Arc<dyn Transport>,
        elink_url: impl Into<String>,
        unsupported_providers: Vec<String>,
    ) -> Self {
        Self {
            transport,
            elink_url: elink_url.into(),
            unsupported_providers,
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &ResolverConfig) -> Self {
        Self::new(
            transport,
            config.elink_url.clone(),
            config.unsupported_providers.clone(),
        )
    }

    /// Link service URL for `pmid`
    #[must_use]
    pub fn link_url(&self, pmid: Pmid) -> String {
        pmid.fill(&self.elink_url)
    }

    /// Fetch the landing page, following redirects.
    ///
    /// Fails with [`Error::UnsupportedProvider`] when the final URL belongs
    /// to a provider that cannot be scraped, and with [`Error::HttpStatus`]
    /// when the page answered 404 or 403.
    #[instrument(skip(self, pmid), fields(pmid = %pmid))]
    pub async fn resolve(&self, pmid: Pmid) -> Result<LandingPage> {
        let url = self.link_url(pmid);
        debug!("Resolving landing page via {}", url);
        let fetched = self.transport.get(&url).await?;

        if let Some(provider) = self
            .unsupported_providers
            .iter()
            .find(|provider| fetched.url.contains(provider.as_str()))
        {
            debug!("{} is served by unsupported provider {}", pmid, provider);
            return Err(Error::UnsupportedProvider {
                pmid: pmid.get(),
                url: fetched.url,
            });
        }

        if fetched.is_not_found_or_forbidden() {
            return Err(Error::HttpStatus {
                code: fetched.status,
                url: fetched.url,
            });
        }

        debug!("Landing page for {} is {}", pmid, fetched.url);
        Ok(LandingPage::new(pmid, fetched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HttpClientConfig, HttpTransport};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver(server: &MockServer) -> LandingPageResolver {
        let transport = HttpTransport::new(&HttpClientConfig::default()).unwrap();
        LandingPageResolver::new(
            Arc::new(transport),
            format!("{}/elink?id={{pmid}}", server.uri()),
            vec!["ovid".to_string()],
        )
    }

    #[tokio::test]
    async fn test_follows_redirect_to_landing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/elink"))
            .and(query_param("id", "12345678"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/article/1", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/article/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<meta name="citation_pdf_url" content="/article/1.pdf">"#,
            ))
            .mount(&server)
            .await;

        let page = resolver(&server)
            .resolve(Pmid::new(12_345_678).unwrap())
            .await
            .unwrap();

        assert_eq!(page.url, format!("{}/article/1", server.uri()));
        assert_eq!(page.status, 200);
        assert_eq!(
            page.document.meta_content("citation_pdf_url"),
            Some("/article/1.pdf")
        );
    }

    #[tokio::test]
    async fn test_missing_landing_page_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = resolver(&server)
            .resolve(Pmid::new(99_999_999).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::HttpStatus { code: 404, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unsupported_provider_checked_before_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/elink"))
            .respond_with(ResponseTemplate::new(302).insert_header(
                "Location",
                format!("{}/ovidweb.cgi?T=JS", server.uri()).as_str(),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ovidweb.cgi"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = resolver(&server)
            .resolve(Pmid::new(55_555).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedProvider { pmid: 55_555, .. }));
    }
}
