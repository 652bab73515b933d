//! Listing walks for the category and make/model strategies

use wheel_harvest::config::{HarvestConfig, UserAgentConfig, UserAgentMode};
use wheel_harvest::extract::{CatalogExtractor, ListingLimits, PageProfile, SiteExtractor};
use wheel_harvest::fetch::FetchClient;
use wheel_harvest::model::{ExtractorKind, SearchStrategy, SiteDescriptor};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn client() -> FetchClient {
    let harvest = HarvestConfig {
        request_delay: 0,
        max_attempts: 1,
        request_timeout: 5,
        ..Default::default()
    };
    let user_agent = UserAgentConfig {
        mode: UserAgentMode::Fixed,
        value: Some("WheelHarvest-Test/1.0".to_string()),
    };
    FetchClient::new(&harvest, &user_agent).expect("client builds")
}

fn site(
    base_url: &str,
    strategy: SearchStrategy,
    category_url: &str,
    brands: &[&str],
) -> SiteDescriptor {
    SiteDescriptor {
        name: "listing".to_string(),
        base_url: base_url.to_string(),
        brands: brands.iter().map(|b| b.to_string()).collect(),
        search_strategy: strategy,
        category_url: Some(category_url.to_string()),
        search_term: "wheel".to_string(),
        dynamic_rendering: false,
        extractor: ExtractorKind::Generic,
    }
}

fn extractor(site: SiteDescriptor, max_pages: u32, max_empty_pages: u32) -> CatalogExtractor {
    CatalogExtractor::new(
        site,
        PageProfile::generic(),
        ListingLimits {
            max_pages,
            max_empty_pages,
        },
    )
}

/// Wraps navigation markup in a page long enough to pass the content check
fn page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{title}</title></head><body>\
         <nav><a href=\"/\">Home</a> <a href=\"/contact\">Contact us</a></nav>\
         <h1>{title}</h1>\n{body}\n<footer>Genuine OEM parts catalog</footer></body></html>",
        title = title,
        body = body
    )
}

/// Category page whose every page links one new product and has a next page
struct EndlessCategory;

impl Respond for EndlessCategory {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let page_number: u32 = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(1);
        let body = format!(
            "<ul><li><a href=\"/oem-parts/wheel-{n}\">Wheel {n}</a></li></ul>\
             <a class=\"next\" href=\"/wheels?page={next}\">Next</a>",
            n = page_number,
            next = page_number + 1
        );
        ResponseTemplate::new(200).set_body_string(page("Wheels", &body))
    }
}

/// Category page that repeats page one's products from page two on
struct RepeatingCategory;

impl Respond for RepeatingCategory {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let first = !request.url.query_pairs().any(|(k, _)| k == "page");
        let body = if first {
            "<a href=\"/oem-parts/rim-1\">Rim 1</a> <a href=\"/oem-parts/rim-2\">Rim 2</a>"
        } else {
            "<a href=\"/oem-parts/rim-2\">Rim 2</a> <a href=\"/oem-parts/rim-1?ref=more\">Rim 1</a>"
        };
        ResponseTemplate::new(200).set_body_string(page("Rims", body))
    }
}

#[tokio::test]
async fn test_category_walk_stops_at_page_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wheels"))
        .respond_with(EndlessCategory)
        .mount(&server)
        .await;

    let site = site(&server.uri(), SearchStrategy::CategoryPage, "/wheels", &[]);
    let urls = extractor(site, 7, 2)
        .list_product_urls(&client())
        .await
        .unwrap();

    let expected: Vec<String> = (1..=7)
        .map(|n| format!("{}/oem-parts/wheel-{}", server.uri(), n))
        .collect();
    assert_eq!(urls, expected);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 7);
}

#[tokio::test]
async fn test_category_walk_stops_on_page_without_new_products() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rims"))
        .respond_with(RepeatingCategory)
        .expect(2)
        .mount(&server)
        .await;

    let site = site(&server.uri(), SearchStrategy::CategoryPage, "/rims", &[]);
    let urls = extractor(site, 20, 1)
        .list_product_urls(&client())
        .await
        .unwrap();

    assert_eq!(
        urls,
        vec![
            format!("{}/oem-parts/rim-1", server.uri()),
            format!("{}/oem-parts/rim-2", server.uri()),
        ]
    );
}

#[tokio::test]
async fn test_make_model_browse_honours_brand_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/browse"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(
            "Shop by make",
            "<ul class=\"make-list\">\
             <li><a href=\"/browse/ford\">Ford</a></li>\
             <li><a href=\"/browse/toyota\">Toyota</a></li></ul>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/browse/ford"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(
            "Ford",
            "<ul class=\"model-list\"><li><a href=\"/browse/ford/f-150\">F-150</a></li></ul>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/browse/toyota"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(
            "Toyota",
            "<ul class=\"model-list\"><li><a href=\"/browse/toyota/tundra\">Tundra</a></li></ul>",
        )))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/browse/ford/f-150"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(
            "Ford F-150 wheels",
            "<a href=\"/oem-parts/a?x=1\">Wheel A</a> <a href=\"/oem-parts/b#frag\">Wheel B</a>",
        )))
        .mount(&server)
        .await;

    let site = site(
        &server.uri(),
        SearchStrategy::MakeModelBrowse,
        "/browse",
        &["Ford"],
    );
    let urls = extractor(site, 10, 1)
        .list_product_urls(&client())
        .await
        .unwrap();

    assert_eq!(
        urls,
        vec![
            format!("{}/oem-parts/a", server.uri()),
            format!("{}/oem-parts/b", server.uri()),
        ]
    );

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().contains("toyota")));
}
