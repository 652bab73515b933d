//! Shared fixtures for the integration tests

use std::path::Path;
use wheel_harvest::config::{parse_config, Config};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A `[[site]]` table using the keyword-search strategy
pub fn keyword_site(name: &str, base_url: &str) -> String {
    format!(
        r#"
[[site]]
name = "{}"
base-url = "{}"
search-strategy = "keyword-search"
"#,
        name, base_url
    )
}

/// Configuration with no request delay and outputs under `dir`
pub fn harvest_config(dir: &Path, sites: &[String]) -> Config {
    let root = dir.display().to_string().replace('\\', "/");
    let toml = format!(
        r#"
[harvest]
request-delay = 0
max-attempts = 2
site-retry-budget = 2
max-empty-pages = 1
request-timeout = 5

[user-agent]
mode = "fixed"
value = "WheelHarvest-Test/1.0"

[output]
checkpoint-dir = "{root}/checkpoints"
ledger-path = "{root}/ledger.db"
export-path = "{root}/processed/wheels.csv"
summary-path = "{root}/processed/summary.md"
split-dir = "{root}/processed/by_site"
{sites}"#,
        root = root,
        sites = sites.concat()
    );
    parse_config(&toml).expect("test config is valid")
}

/// Search results page linking to the given product paths
pub fn listing_page(product_paths: &[&str]) -> String {
    let links: String = product_paths
        .iter()
        .map(|p| format!("<li><a href=\"{}?ref=search\">{}</a></li>\n", p, p))
        .collect();
    format!(
        "<html><head><title>Search results</title></head><body>\
         <nav><a href=\"/\">Home</a> <a href=\"/contact\">Contact</a></nav>\
         <ul class=\"results\">\n{}</ul></body></html>",
        links
    )
}

/// Product page in the generic storefront layout
pub fn product_page(title: &str, sku: &str, price: &str, fitment_rows: &[[&str; 5]]) -> String {
    let rows: String = fitment_rows
        .iter()
        .map(|row| {
            format!(
                "<tr>{}</tr>\n",
                row.iter()
                    .map(|cell| format!("<td>{}</td>", cell))
                    .collect::<String>()
            )
        })
        .collect();
    format!(
        r#"<html><head><title>{title}</title></head><body>
<h1 class="product-title">{title}</h1>
<span itemprop="sku">{sku}</span>
<div class="price-box"><span class="sale-price">${price}</span></div>
<img class="product-image" src="/images/{sku}.jpg">
<div class="description">Genuine OEM part, ships from our warehouse.</div>
<table class="fitment-table">
<tr><th>Year</th><th>Make</th><th>Model</th><th>Trim</th><th>Engine</th></tr>
{rows}</table>
</body></html>"#,
        title = title,
        sku = sku,
        price = price,
        rows = rows
    )
}

/// Serves a one-page keyword search listing and the given product pages
///
/// Each product page mock expects `hits` requests.
pub async fn mount_catalog(server: &MockServer, products: &[(&str, String)], hits: u64) {
    let paths: Vec<&str> = products.iter().map(|(p, _)| *p).collect();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&paths)))
        .expect(hits)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .mount(server)
        .await;

    for (product_path, body) in products {
        Mock::given(method("GET"))
            .and(path(*product_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .expect(hits)
            .mount(server)
            .await;
    }
}
