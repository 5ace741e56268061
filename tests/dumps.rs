//! Integration tests for dump downloads and streaming decode
//!
//! These tests serve gzip fixtures from a mock server and verify that dumps
//! are downloaded once, tracked in the marker store, and streamed back as
//! typed records.

mod common;

use chrono::NaiveDate;
use common::{gzip, test_client, test_config};
use nsapi::app::{
    CardSnapshot, DumpConfig, DumpManager, DumpOptions, MarkerStore, NsClient, RegionSnapshot,
};
use nsapi::app::dump::generation_time;
use nsapi::app::resource::FileMarkerStore;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn region(name: &str, nations: &[&str]) -> RegionSnapshot {
    RegionSnapshot {
        name: name.to_string(),
        factbook: format!("Welcome to {name}"),
        num_nations: nations.len() as u32,
        nations: nations.iter().map(|n| n.to_string()).collect(),
        delegate: nations.first().map(|n| n.to_string()).unwrap_or_default(),
        delegate_votes: 1,
        delegate_auth: "X".to_string(),
        founder: "0".to_string(),
        founder_auth: String::new(),
        officers: Vec::new(),
        power: "Low".to_string(),
        flag: String::new(),
        embassies: Vec::new(),
        last_update: 1_700_000_000,
    }
}

fn regions_dump(regions: &[RegionSnapshot]) -> Vec<u8> {
    let records: String = regions.iter().map(|r| r.to_xml().to_xml()).collect();
    gzip(&format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<REGIONS api_version=\"12\">{records}</REGIONS>"
    ))
}

fn card(id: u64, name: &str) -> CardSnapshot {
    CardSnapshot {
        id,
        name: name.to_string(),
        rarity: "common".to_string(),
        classification: "Republic".to_string(),
        motto: "Test".to_string(),
        region: "Testregionia".to_string(),
        government: "Democratic Socialists".to_string(),
        flag: "flag.svg".to_string(),
        description: String::new(),
        badges: vec!["Easter Egg".to_string()],
        trophies: [("cleanliness-1".to_string(), 5)].into_iter().collect(),
    }
}

fn manager(server: &MockServer, directory: &TempDir) -> DumpManager<NsClient> {
    let config = DumpConfig {
        directory: directory.path().to_path_buf(),
        marker_file: None,
        generation_time: generation_time(),
    };
    DumpManager::new(test_client(server), &test_config(server), &config).unwrap()
}

#[tokio::test]
async fn test_daily_dump_is_downloaded_once_and_streamed() {
    let server = MockServer::start().await;
    let regions = vec![
        region("the_pacific", &["a", "b"]),
        region("lazarus", &["c"]),
        region("osiris", &[]),
    ];
    Mock::given(method("GET"))
        .and(path("/pages/regions.xml.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(regions_dump(&regions)))
        .expect(1)
        .mount(&server)
        .await;

    let directory = TempDir::new().unwrap();
    let mut dumps = manager(&server, &directory);

    let first: Vec<RegionSnapshot> = dumps
        .regions(DumpOptions::default())
        .await
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(first, regions);

    // The marker is fresh, so the second pass reads the local copy
    let second = dumps
        .regions(DumpOptions::default())
        .await
        .unwrap()
        .count();
    assert_eq!(second, 3);

    assert!(directory.path().join("regions.xml.gz").exists());
    let mut markers = FileMarkerStore::new(directory.path().join("marker.json"));
    markers.load().await;
    assert!(markers.get("regions.xml.gz").is_some());
}

#[tokio::test]
async fn test_archived_dump_uses_dated_archive_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/archive/regions/2024-01-02-regions-xml.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(regions_dump(&[region("the_north_pacific", &["x"])])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let directory = TempDir::new().unwrap();
    let mut dumps = manager(&server, &directory);
    let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    for _ in 0..2 {
        let names: Vec<String> = dumps
            .regions(DumpOptions::archived(date))
            .await
            .unwrap()
            .map(|record| record.unwrap().name)
            .collect();
        assert_eq!(names, vec!["the_north_pacific"]);
    }
    assert!(directory.path().join("2024-01-02-regions-xml.gz").exists());
}

#[tokio::test]
async fn test_card_list_streams_cards() {
    let server = MockServer::start().await;
    let cards = vec![card(1, "Testlandia"), card(2, "Maxtopia")];
    let records: String = cards.iter().map(|c| c.to_xml().to_xml()).collect();
    let body = gzip(&format!("<CARDS><SET season=\"3\">{records}</SET></CARDS>"));
    Mock::given(method("GET"))
        .and(path("/pages/cardlist_S3.xml.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&server)
        .await;

    let directory = TempDir::new().unwrap();
    let mut dumps = manager(&server, &directory);

    let decoded: Vec<CardSnapshot> = dumps
        .cards(3, None)
        .await
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(decoded, cards);
}

#[tokio::test]
async fn test_no_update_reads_existing_file_without_marker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let directory = TempDir::new().unwrap();
    std::fs::write(
        directory.path().join("regions.xml.gz"),
        regions_dump(&[region("local", &[])]),
    )
    .unwrap();

    let mut dumps = manager(&server, &directory);
    let options = DumpOptions {
        no_update: true,
        ..Default::default()
    };
    let names: Vec<String> = dumps
        .regions(options)
        .await
        .unwrap()
        .map(|record| record.unwrap().name)
        .collect();
    assert_eq!(names, vec!["local"]);
}

#[tokio::test]
async fn test_truncated_dump_surfaces_a_decode_error() {
    let server = MockServer::start().await;
    let mut body = regions_dump(&[region("a", &[]), region("b", &[])]);
    body.truncate(body.len() / 2);
    Mock::given(method("GET"))
        .and(path("/pages/regions.xml.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let directory = TempDir::new().unwrap();
    let mut dumps = manager(&server, &directory);

    let results: Vec<_> = dumps
        .regions(DumpOptions::default())
        .await
        .unwrap()
        .collect();
    assert!(results.last().is_some_and(Result::is_err));
}

#[tokio::test]
async fn test_failed_download_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let directory = TempDir::new().unwrap();
    let mut dumps = manager(&server, &directory);

    let result = dumps.regions(DumpOptions::default()).await;
    assert!(result.is_err());
    assert!(!directory.path().join("regions.xml.gz").exists());
}
