use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reprint_fetch::download::find_secondary;
use reprint_fetch::finders::{generic, pmc, publishers, PageDocument};
use reprint_fetch::{FetchedPage, LandingPage, Pmid};
use reqwest::header::HeaderMap;

fn publisher_page() -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>Article</title>");
    for i in 0..40 {
        html.push_str(&format!(r#"<meta name="dc.meta{i}" content="value {i}">"#));
    }
    html.push_str("</head><body>");
    for i in 0..300 {
        html.push_str(&format!(
            r#"<div class="ref"><a href="/doi/full/10.1000/ref{i}" title="Reference {i}">ref {i}</a></div>"#
        ));
    }
    html.push_str(r#"<a href="/doi/pdf/10.1000/target" title="High-Res PDF">PDF</a></body></html>"#);
    html
}

fn benchmark_page_parse(c: &mut Criterion) {
    let html = publisher_page();
    c.bench_function("page_document_parse", |b| {
        b.iter(|| PageDocument::parse(black_box(&html)));
    });
}

fn benchmark_inspecting_finders(c: &mut Criterion) {
    let html = publisher_page();
    let page = LandingPage::new(
        Pmid::new(12_345_678).unwrap(),
        FetchedPage {
            url: "https://pubs.example.org/doi/10.1000/target".to_string(),
            status: 200,
            headers: HeaderMap::new(),
            body: html.into_bytes(),
        },
    );

    c.bench_function("inspecting_finders_until_acs", |b| {
        b.iter(|| {
            let page = black_box(&page);
            generic::citation_labelled(page)
                .or_else(|| pmc::pubmed_central_v2(page))
                .or_else(|| publishers::acs_publications(page))
        });
    });
}

fn benchmark_secondary_heuristics(c: &mut Criterion) {
    let markup = format!(
        r#"{}<meta content="https://cdn.example.org/a.pdf" name="citation_pdf_url">"#,
        publisher_page()
    );
    c.bench_function("find_secondary_worst_case", |b| {
        b.iter(|| find_secondary(black_box(&markup)));
    });
}

criterion_group!(
    benches,
    benchmark_page_parse,
    benchmark_inspecting_finders,
    benchmark_secondary_heuristics
);
criterion_main!(benches);
