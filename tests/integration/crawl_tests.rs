//! Integration tests for the harvest cycle
//!
//! These tests use wiremock to serve a small listing site and run the
//! crawl, staging and ingest passes end-to-end.

use route_harvest::config::{Config, CrawlerConfig, OutputConfig, RetryConfig, UserAgentConfig};
use route_harvest::output::{StagedArea, StagedRoute, StagedSector, IMAGE_FILE, METADATA_FILE, ROUTES_FILE};
use route_harvest::storage::{load_statistics, RecordStore};
use route_harvest::HarvestContext;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock site
fn create_test_config(base_url: &str, dir: &Path, max_results: Option<usize>) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            batch_size: 1,
            max_results,
            cache_size: 50,
            cache_trim: 10,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            staging_dir: dir.join("staging").display().to_string(),
            checkpoint_path: dir.join("checkpoint.json").display().to_string(),
            database_path: dir.join("harvest.db").display().to_string(),
            images_dir: Some(dir.join("images").display().to_string()),
        },
        retry: RetryConfig {
            attempts: 2,
            delay_ms: 1,
        },
    }
}

fn listing(entries: &[(&str, &str, u32)]) -> String {
    let rows: String = entries
        .iter()
        .map(|(href, name, total)| format!("<dt> <a href=\"{}\">{}</a> ({})</dt>", href, name, total))
        .collect();
    format!("<html><body><dl>{}</dl></body></html>", rows)
}

fn route_row(name: &str, href: &str, grade: &str) -> String {
    format!(
        "<tr><td>1</td><td></td><td><a href=\"{}\">{}</a></td><td class=\"g\">{}</td><td></td></tr>",
        href, name, grade
    )
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves Europe -> Spain -> Catalonia -> Siurana, with one sector under
/// Siurana and an empty region next to Europe
async fn mount_site(server: &MockServer) {
    mount_page(
        server,
        "/routes/",
        listing(&[("Europe/", "Europe", 3), ("Antarctica/", "Antarctica", 0)]),
    )
    .await;
    mount_page(server, "/routes/Europe/", listing(&[("Europe/Spain/", "Spain", 3)])).await;
    mount_page(
        server,
        "/routes/Europe/Spain/",
        listing(&[("Europe/Spain/Catalonia/", "Catalonia", 3)]),
    )
    .await;
    mount_page(
        server,
        "/routes/Europe/Spain/Catalonia/",
        listing(&[("Europe/Spain/Catalonia/Siurana/", "Siurana", 3)]),
    )
    .await;

    let siurana = format!(
        "<h2>Siurana</h2>{}",
        listing(&[("Europe/Spain/Catalonia/Siurana/El_Pati/", "El Pati", 3)])
    );
    mount_page(server, "/routes/Europe/Spain/Catalonia/Siurana/", siurana).await;

    let pati = format!(
        "<h2>El Pati</h2>\
         <a href=\"/cgi-bin/photos/jump.cgi?Detailed=77\">photo</a>\
         <h3 class=\"t\">Routes</h3><table width=\"100%\" class=\"ftable\">{}{}{}</table>",
        route_row("La Rambla", "Europe/Spain/Catalonia/Siurana/El_Pati/r1.html", "9a+"),
        route_row("Project", "Europe/Spain/Catalonia/Siurana/El_Pati/r2.html", "?"),
        route_row("Kalea Borroka", "Europe/Spain/Catalonia/Siurana/El_Pati/r3.html", "6b"),
    );
    mount_page(server, "/routes/Europe/Spain/Catalonia/Siurana/El_Pati/", pati).await;
    mount_page(
        server,
        "/routes/Europe/Spain/Catalonia/Siurana/El_Pati/r1.html",
        "<span class=\"description\">Long and sustained</span>".to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/photos/jump.cgi"))
        .and(query_param("Detailed", "77"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<img src=\"/images/photos/77/largest_pati.jpg\">"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/photos/77/largest_pati.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xd8, 0xff, 0xe0]))
        .mount(server)
        .await;
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    let text = fs::read_to_string(path).expect("Failed to read staged file");
    serde_json::from_str(&text).expect("Failed to parse staged file")
}

#[tokio::test]
async fn test_crawl_stages_area_tree() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let base_url = format!("{}/routes/", mock_server.uri());
    let context = HarvestContext::new(create_test_config(&base_url, dir.path(), None), "test");

    let mut crawler = context.crawler(None).expect("Failed to build crawler");
    let mut writer = context.staging_writer();
    let report = crawler.run(&mut writer).await.expect("Crawl failed");

    assert!(report.complete);
    assert!(!report.capped);
    assert_eq!(report.trees, 1);
    assert_eq!(report.areas, 1);
    assert_eq!(report.sectors, 1);
    assert_eq!(report.routes, 2);
    assert_eq!(writer.total().areas, 1);
    assert_eq!(writer.total().images, 1);

    let area_dir = dir.path().join("staging").join("Siurana");
    let area: StagedArea = read_json(&area_dir.join(METADATA_FILE));
    assert_eq!(area.name, "Siurana");
    assert!(area.id.is_none());

    let sector_dir = area_dir.join("El Pati");
    let sector: StagedSector = read_json(&sector_dir.join(METADATA_FILE));
    assert_eq!(sector.name, "El Pati");
    assert_eq!(sector.tags, "europe,spain,catalonia,siurana,el-pati");

    let routes: Vec<StagedRoute> = read_json(&sector_dir.join(ROUTES_FILE));
    let names: Vec<&str> = routes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["La Rambla", "Kalea Borroka"]);
    assert_eq!(routes[0].description, "Long and sustained.");
    assert_eq!(routes[1].description, "");

    let image = fs::read(sector_dir.join(IMAGE_FILE)).expect("Image not staged");
    assert_eq!(image, vec![0xff, 0xd8, 0xff, 0xe0]);

    // Empty regions are never fetched
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| !r.url.path().contains("Antarctica")));
}

#[tokio::test]
async fn test_completed_crawl_does_not_restart() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let base_url = format!("{}/routes/", mock_server.uri());
    let context = HarvestContext::new(create_test_config(&base_url, dir.path(), None), "test");

    let mut writer = context.staging_writer();
    let first = context
        .crawler(None)
        .expect("Failed to build crawler")
        .run(&mut writer)
        .await
        .expect("First crawl failed");
    assert_eq!(first.areas, 1);

    let checkpoint = context.checkpoint_store().load();
    assert_eq!(checkpoint.regions.current, checkpoint.regions.items.len());
    assert_eq!(checkpoint.config_hash.as_deref(), Some("test"));

    let second = context
        .crawler(None)
        .expect("Failed to build crawler")
        .run(&mut writer)
        .await
        .expect("Second crawl failed");
    assert!(second.complete);
    assert_eq!(second.areas, 0);
}

#[tokio::test]
async fn test_capped_crawl_resumes_after_finished_region() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let base_url = format!("{}/routes/", mock_server.uri());
    let context = HarvestContext::new(create_test_config(&base_url, dir.path(), Some(1)), "test");

    let mut writer = context.staging_writer();
    let report = context
        .crawler(None)
        .expect("Failed to build crawler")
        .run(&mut writer)
        .await
        .expect("Crawl failed");

    assert!(report.capped);
    assert!(!report.complete);
    assert_eq!(report.areas, 1);
    assert_eq!(writer.total().areas, 1);

    // Europe is finished; the empty region after it is still ahead
    let checkpoint = context.checkpoint_store().load();
    assert_eq!(checkpoint.regions.current, 1);

    let rest = context
        .crawler(None)
        .expect("Failed to build crawler")
        .run(&mut writer)
        .await
        .expect("Resumed crawl failed");
    assert!(rest.complete);
    assert_eq!(rest.areas, 0);
}

#[tokio::test]
async fn test_crawl_then_ingest_round_trip() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let base_url = format!("{}/routes/", mock_server.uri());
    let context = HarvestContext::new(create_test_config(&base_url, dir.path(), None), "test");

    let mut writer = context.staging_writer();
    context
        .crawler(None)
        .expect("Failed to build crawler")
        .run(&mut writer)
        .await
        .expect("Crawl failed");

    let mut store = context.record_store().expect("Failed to open store");
    let summary = context
        .ingest_dumper()
        .dump_all(&mut store)
        .expect("Ingest failed");
    assert_eq!(summary.areas, 1);
    assert_eq!(summary.sectors, 1);
    assert_eq!(summary.routes, 2);
    assert_eq!(summary.images, 1);

    let sector_dir = dir.path().join("staging").join("Siurana").join("El Pati");
    let area: StagedArea = read_json(&dir.path().join("staging").join("Siurana").join(METADATA_FILE));
    let sector: StagedSector = read_json(&sector_dir.join(METADATA_FILE));
    let area_id = area.id.expect("Area id not written back");
    let sector_id = sector.id.expect("Sector id not written back");
    assert_eq!(sector.area_id, Some(area_id));

    let routes: Vec<StagedRoute> = read_json(&sector_dir.join(ROUTES_FILE));
    assert!(routes.iter().all(|r| r.id.is_some() && r.sector_id == Some(sector_id)));

    let copied = dir
        .path()
        .join("images")
        .join(sector_id.to_string())
        .join(IMAGE_FILE);
    assert!(copied.exists());

    let stored = store.get_area(area_id).expect("Query failed").expect("Area not stored");
    assert_eq!(stored.place.name, "Siurana");

    // A fresh re-crawl restages the same records under the same identities
    context.checkpoint_store().clear().expect("Failed to clear checkpoint");
    context
        .crawler(None)
        .expect("Failed to build crawler")
        .run(&mut writer)
        .await
        .expect("Re-crawl failed");

    let restaged: StagedArea = read_json(&dir.path().join("staging").join("Siurana").join(METADATA_FILE));
    assert_eq!(restaged.id, Some(area_id));
    let restaged_routes: Vec<StagedRoute> = read_json(&sector_dir.join(ROUTES_FILE));
    assert_eq!(
        restaged_routes.iter().map(|r| r.id).collect::<Vec<_>>(),
        routes.iter().map(|r| r.id).collect::<Vec<_>>()
    );

    let again = context
        .ingest_dumper()
        .dump_all(&mut store)
        .expect("Second ingest failed");
    assert_eq!(again.rewritten, 0);

    let stats = load_statistics(&context.staging_writer(), Some(&store)).expect("Stats failed");
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.stored_areas, Some(1));
    assert_eq!(stats.stored_sectors, Some(1));
    assert_eq!(stats.stored_routes, Some(2));
}
