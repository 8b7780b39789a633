use crate::client::{FetchedPage, Pmid};
use reqwest::header::HeaderMap;
use scraper::{Html, Selector};
use url::Url;

const TAG_SELECTOR: &str = "a, meta, input";

/// One element of interest with its attributes, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    attrs: Vec<(String, String)>,
}

impl Tag {
    /// Attribute value; a missing attribute is simply `None`
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn href(&self) -> Option<&str> {
        self.attr("href")
    }

    /// Whether any whitespace-separated class contains `needle`
    #[must_use]
    pub fn has_class_containing(&self, needle: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c.contains(needle)))
    }
}

/// The anchors, meta tags and form inputs of an HTML document.
///
/// `scraper::Html` cannot cross an await point in a spawned task, so the
/// tree is walked once and the tags the finders look at are kept.
#[derive(Debug, Clone, Default)]
pub struct PageDocument {
    tags: Vec<Tag>,
}

impl PageDocument {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let Ok(selector) = Selector::parse(TAG_SELECTOR) else {
            return Self::default();
        };
        let document = Html::parse_document(html);
        let tags = document
            .select(&selector)
            .map(|element| {
                let value = element.value();
                Tag {
                    name: value.name().to_ascii_lowercase(),
                    attrs: value
                        .attrs()
                        .map(|(key, val)| (key.to_ascii_lowercase(), val.to_string()))
                        .collect(),
                }
            })
            .collect();
        Self { tags }
    }

    pub fn anchors(&self) -> impl Iterator<Item = &Tag> {
        self.named("a")
    }

    pub fn metas(&self) -> impl Iterator<Item = &Tag> {
        self.named("meta")
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Tag> {
        self.named("input")
    }

    /// Content of the first `<meta name="...">` with the given name
    #[must_use]
    pub fn meta_content(&self, name: &str) -> Option<&str> {
        self.metas()
            .find(|tag| tag.attr("name") == Some(name))
            .and_then(|tag| tag.attr("content"))
    }

    fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> {
        self.tags.iter().filter(move |tag| tag.name == name)
    }
}

/// A publisher landing page reached from a PubMed identifier
#[derive(Debug, Clone)]
pub struct LandingPage {
    pub pmid: Pmid,
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub document: PageDocument,
}

impl LandingPage {
    #[must_use]
    pub fn new(pmid: Pmid, fetched: FetchedPage) -> Self {
        let document = PageDocument::parse(&fetched.text());
        Self {
            pmid,
            url: fetched.url,
            status: fetched.status,
            headers: fetched.headers,
            body: fetched.body,
            document,
        }
    }

    /// Resolve an href against the page URL, the way a browser would
    #[must_use]
    pub fn join(&self, href: &str) -> Option<String> {
        join_url(&self.url, href)
    }
}

/// Resolve `href` against `base`; protocol-relative links get `https:`
pub(crate) fn join_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("//") {
        return Some(format!("https:{href}"));
    }
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(String::from)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, html: &str) -> LandingPage {
        LandingPage::new(
            Pmid::new(1).unwrap(),
            FetchedPage {
                url: url.to_string(),
                status: 200,
                headers: HeaderMap::new(),
                body: html.as_bytes().to_vec(),
            },
        )
    }

    #[test]
    fn test_tags_in_document_order() {
        let doc = PageDocument::parse(
            r#"<html><head><meta name="a" content="1"><meta name="citation_pdf_url" content="x.pdf"></head>
            <body><a href="/one">1</a><input value="v"><a href="/two" TITLE="PDF">2</a></body></html>"#,
        );
        let hrefs: Vec<_> = doc.anchors().filter_map(Tag::href).collect();
        assert_eq!(hrefs, vec!["/one", "/two"]);
        assert_eq!(doc.meta_content("citation_pdf_url"), Some("x.pdf"));
        assert_eq!(doc.inputs().count(), 1);
        assert_eq!(doc.anchors().nth(1).unwrap().attr("title"), Some("PDF"));
    }

    #[test]
    fn test_missing_attributes_are_none() {
        let doc = PageDocument::parse("<a>no href</a><meta name=\"citation_pdf_url\">");
        assert!(doc.anchors().next().unwrap().href().is_none());
        assert!(doc.meta_content("citation_pdf_url").is_none());
    }

    #[test]
    fn test_join_relative_forms() {
        let page = page("https://pubs.example.org/doi/10.1/abc", "");
        assert_eq!(
            page.join("/doi/pdf/10.1/abc").as_deref(),
            Some("https://pubs.example.org/doi/pdf/10.1/abc")
        );
        assert_eq!(
            page.join("//cdn.example.org/a.pdf").as_deref(),
            Some("https://cdn.example.org/a.pdf")
        );
        assert_eq!(
            page.join("https://other.example/a.pdf").as_deref(),
            Some("https://other.example/a.pdf")
        );
        assert!(page.join("   ").is_none());
    }
}
