//! Fetch client behavior against a mock server

use wheel_harvest::config::{HarvestConfig, UserAgentConfig, UserAgentMode};
use wheel_harvest::fetch::{FetchClient, FetchFailure};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &str = "<html><body><h1>Wheel</h1><p>A page long enough to count as real \
                    content for the fetch client, padded past one hundred bytes.</p></body></html>";

fn client(max_attempts: u32) -> FetchClient {
    let harvest = HarvestConfig {
        request_delay: 0,
        max_attempts,
        request_timeout: 5,
        ..Default::default()
    };
    let user_agent = UserAgentConfig {
        mode: UserAgentMode::Fixed,
        value: Some("WheelHarvest-Test/1.0".to_string()),
    };
    FetchClient::new(&harvest, &user_agent).expect("client builds")
}

#[tokio::test]
async fn test_fetch_success_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oem-parts/wheel"))
        .and(header("user-agent", "WheelHarvest-Test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/oem-parts/wheel", server.uri());
    let page = client(3).fetch(&url, false).await.unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.url, url);
    assert_eq!(page.body, BODY);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(3);
    let page = client
        .fetch(&format!("{}/flaky", server.uri()), false)
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(client.request_count().await, 3);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(3)
        .fetch(&format!("{}/gone", server.uri()), false)
        .await;

    assert_eq!(result.unwrap_err(), FetchFailure::Status(404));
}

#[tokio::test]
async fn test_attempts_are_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let result = client(2)
        .fetch(&format!("{}/down", server.uri()), false)
        .await;

    assert_eq!(result.unwrap_err(), FetchFailure::Status(500));
}

#[tokio::test]
async fn test_short_body_is_empty_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>\n\n</html>"))
        .expect(2)
        .mount(&server)
        .await;

    let result = client(2)
        .fetch(&format!("{}/blank", server.uri()), false)
        .await;

    assert_eq!(result.unwrap_err(), FetchFailure::EmptyContent);
}
