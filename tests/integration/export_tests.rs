//! Export built from the checkpoints of a finished harvest

use crate::common::{harvest_config, keyword_site, mount_catalog, product_page};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use wheel_harvest::checkpoint::JsonCheckpointStore;
use wheel_harvest::export::{load_site_products, run_export, split_path, ExportTargets, HEADERS};
use wheel_harvest::orchestrator::Orchestrator;
use wheel_harvest::storage::SqliteLedger;
use wiremock::MockServer;

fn data_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .split("\r\n")
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[tokio::test]
async fn test_export_after_harvest() {
    let server = MockServer::start().await;
    let catalog = vec![
        (
            "/oem-parts/wheel-86527277",
            product_page(
                "Wheel, Alloy",
                "86 527-277 ",
                "612.35",
                &[
                    ["2025", "Cadillac", "ESCALADE IQ", "Luxury 1", "ELECTRIC"],
                    ["2025", "Cadillac", "ESCALADE IQ", "Luxury 2", "ELECTRIC"],
                    ["2025", "Cadillac", "ESCALADE IQ", "Sport 1", "ELECTRIC"],
                    ["2025", "Cadillac", "ESCALADE IQ", "Sport 2", "ELECTRIC"],
                ],
            ),
        ),
        (
            "/oem-parts/rim-cap-7",
            product_page("Rim Cap", "RC-7", "12.00", &[]),
        ),
    ];
    mount_catalog(&server, &catalog, 1).await;

    let dir = TempDir::new().unwrap();
    let config = harvest_config(dir.path(), &[keyword_site("alpha", &server.uri())]);
    let sites = config.sites.clone();
    let store = Arc::new(JsonCheckpointStore::new(dir.path().join("checkpoints")).unwrap());
    let ledger = SqliteLedger::open_in_memory().unwrap();
    let mut orchestrator = Orchestrator::new(config, store.clone(), Box::new(ledger)).unwrap();
    orchestrator.run().await.unwrap();

    let targets = ExportTargets {
        table: dir.path().join("processed").join("wheels.csv"),
        summary: dir.path().join("processed").join("summary.md"),
        split_dir: Some(dir.path().join("by_site")),
    };
    let loaded = load_site_products(store.as_ref(), &sites);
    assert!(loaded.unreadable.is_empty());
    let summary = run_export(&loaded.sites, vec![], &targets).unwrap();

    assert_eq!(summary.total_rows, 5);
    assert_eq!(summary.unique_part_numbers, 2);
    assert_eq!(summary.invalid_rows, 0);

    let lines = data_lines(&targets.table);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], HEADERS.join(","));
    assert!(lines[1].contains(",86 527-277,86527277,"));
    assert!(lines[1].contains(",\"Wheel, Alloy\","));
    assert!(lines[1].ends_with(",2025,Cadillac,ESCALADE IQ,Luxury 1,ELECTRIC"));
    assert!(lines[4].ends_with(",Sport 2,ELECTRIC"));
    assert!(lines[5].contains(",RC-7,RC7,"));
    assert!(lines[5].ends_with(",,,,,"));

    let split: PathBuf = split_path(&dir.path().join("by_site"), "alpha");
    assert_eq!(data_lines(&split).len(), 6);

    let markdown = std::fs::read_to_string(&targets.summary).unwrap();
    assert!(markdown.contains("| alpha | 2 | 5 | 2 | 0 | 0 |"));
}

#[tokio::test]
async fn test_corrupt_checkpoint_fails_site_but_export_proceeds() {
    let healthy = MockServer::start().await;
    let catalog = vec![(
        "/oem-parts/rim-cap-7",
        product_page("Rim Cap", "RC-7", "12.00", &[]),
    )];
    mount_catalog(&healthy, &catalog, 1).await;
    let corrupt = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let config = harvest_config(
        dir.path(),
        &[
            keyword_site("alpha", &corrupt.uri()),
            keyword_site("beta", &healthy.uri()),
        ],
    );
    let sites = config.sites.clone();
    let store = Arc::new(JsonCheckpointStore::new(dir.path().join("checkpoints")).unwrap());
    std::fs::write(dir.path().join("checkpoints").join("alpha.json"), "{ truncated").unwrap();

    let ledger = SqliteLedger::open_in_memory().unwrap();
    let mut orchestrator = Orchestrator::new(config, store.clone(), Box::new(ledger)).unwrap();
    let outcome = orchestrator.run().await.unwrap();
    assert_eq!(outcome.failed().count(), 1);
    assert_eq!(outcome.completed().count(), 1);

    let loaded = load_site_products(store.as_ref(), &sites);
    assert_eq!(loaded.sites.len(), 1);
    assert_eq!(loaded.sites[0].site, "beta");
    assert_eq!(loaded.unreadable[0].site, "alpha");

    let targets = ExportTargets {
        table: dir.path().join("wheels.csv"),
        summary: dir.path().join("summary.md"),
        split_dir: None,
    };
    let summary = run_export(&loaded.sites, loaded.unreadable, &targets).unwrap();

    assert_eq!(summary.total_rows, 1);
    assert_eq!(summary.failed[0].site, "alpha");
    assert_eq!(data_lines(&targets.table).len(), 2);
}
