//! Full harvest runs against mock catalogs

use crate::common::{harvest_config, keyword_site, listing_page, mount_catalog, product_page};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wheel_harvest::checkpoint::{CheckpointStore, JsonCheckpointStore};
use wheel_harvest::config::Config;
use wheel_harvest::orchestrator::Orchestrator;
use wheel_harvest::storage::{open_ledger, Ledger, RunStatus};
use wheel_harvest::SiteState;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn orchestrator(config: Config, dir: &TempDir) -> (Orchestrator, Arc<JsonCheckpointStore>) {
    let store = Arc::new(JsonCheckpointStore::new(dir.path().join("checkpoints")).unwrap());
    let ledger = open_ledger(&dir.path().join("ledger.db")).unwrap();
    let orchestrator = Orchestrator::new(config, store.clone(), Box::new(ledger)).unwrap();
    (orchestrator, store)
}

fn wheel_catalog() -> Vec<(&'static str, String)> {
    vec![
        (
            "/oem-parts/wheel-86527277",
            product_page(
                "Wheel, Alloy 24 X 9-Inch",
                "86 527-277 ",
                "612.35",
                &[
                    ["2025", "Cadillac", "ESCALADE IQ", "Luxury 1", "ELECTRIC"],
                    ["2025", "Cadillac", "ESCALADE IQ", "Sport 1", "ELECTRIC"],
                ],
            ),
        ),
        (
            "/oem-parts/steering-wheel-cover-99",
            product_page("Steering Wheel Cover", "SWC-99", "35.00", &[]),
        ),
        (
            "/oem-parts/center-cap-1",
            product_page("Wheel Center Cap", "CC-1", "19.99", &[]),
        ),
    ]
}

#[tokio::test]
async fn test_keyword_search_harvest_end_to_end() {
    let server = MockServer::start().await;
    mount_catalog(&server, &wheel_catalog(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = harvest_config(dir.path(), &[keyword_site("alpha", &server.uri())]);
    let (mut orchestrator, store) = orchestrator(config, &dir);

    let outcome = orchestrator.run().await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(orchestrator.state_of("alpha"), Some(SiteState::Completed));

    let checkpoint = store.load("alpha").unwrap().unwrap();
    assert_eq!(checkpoint.products.len(), 2);

    let wheel = &checkpoint.products[0];
    assert_eq!(wheel.part_number(), "86527277");
    assert_eq!(wheel.price.as_deref(), Some("612.35"));
    assert_eq!(wheel.fitments().len(), 2);
    assert!(wheel
        .image_url
        .as_deref()
        .unwrap()
        .starts_with(&format!("{}/images/", server.uri())));

    let cap = &checkpoint.products[1];
    assert_eq!(cap.part_number(), "CC1");
    assert!(cap.fitments()[0].is_blank());
}

#[tokio::test]
async fn test_completed_site_is_not_fetched_again() {
    let alpha = MockServer::start().await;
    mount_catalog(&alpha, &wheel_catalog(), 1).await;
    let beta = MockServer::start().await;
    mount_catalog(&beta, &wheel_catalog()[..1], 1).await;

    let dir = TempDir::new().unwrap();

    let first = harvest_config(dir.path(), &[keyword_site("alpha", &alpha.uri())]);
    let (mut run1, _) = orchestrator(first, &dir);
    run1.run().await.unwrap();
    drop(run1);

    let second = harvest_config(
        dir.path(),
        &[
            keyword_site("alpha", &alpha.uri()),
            keyword_site("beta", &beta.uri()),
        ],
    );
    let (mut run2, store) = orchestrator(second, &dir);
    let outcome = run2.run().await.unwrap();

    assert_eq!(outcome.reports.len(), 2);
    assert!(outcome.reports[0].resumed);
    assert_eq!(outcome.reports[0].products, 2);
    assert!(!outcome.reports[1].resumed);
    assert_eq!(store.list().unwrap(), vec!["alpha", "beta"]);

    let runs = run2.ledger().recent_runs(5).unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|r| r.status == RunStatus::Completed));
}

#[tokio::test]
async fn test_cancelled_run_writes_no_checkpoint() {
    let server = MockServer::start().await;
    mount_catalog(&server, &wheel_catalog(), 0).await;

    let dir = TempDir::new().unwrap();
    let config = harvest_config(dir.path(), &[keyword_site("alpha", &server.uri())]);
    let (orchestrator, store) = orchestrator(config, &dir);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut orchestrator = orchestrator.with_cancellation(cancel);
    let outcome = orchestrator.run().await.unwrap();

    assert!(outcome.interrupted);
    assert_eq!(outcome.pending, vec!["alpha"]);
    assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_site_exhausting_retry_budget_fails_and_run_continues() {
    let broken = MockServer::start().await;
    let paths = [
        "/oem-parts/wheel-1",
        "/oem-parts/wheel-2",
        "/oem-parts/wheel-3",
        "/oem-parts/wheel-4",
        "/oem-parts/wheel-5",
    ];
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&paths)))
        .mount(&broken)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/oem-parts/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;

    let healthy = MockServer::start().await;
    mount_catalog(&healthy, &wheel_catalog(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = harvest_config(
        dir.path(),
        &[
            keyword_site("broken", &broken.uri()),
            keyword_site("healthy", &healthy.uri()),
        ],
    );
    let (mut orchestrator, store) = orchestrator(config, &dir);

    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(orchestrator.state_of("broken"), Some(SiteState::Failed));
    assert_eq!(orchestrator.state_of("healthy"), Some(SiteState::Completed));
    assert!(outcome.reports[0]
        .reason
        .as_deref()
        .unwrap()
        .contains("retry budget exhausted"));
    assert_eq!(store.list().unwrap(), vec!["healthy"]);

    let failures = orchestrator.ledger().latest_failures().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].outcome.site, "broken");
}
