//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to serve a sitemap and its pages and tempfile
//! for the storage root, then check the files a run leaves behind.

use site_harvester::config::{Config, PageLimit, ResolutionPolicy, RunConfig};
use site_harvester::crawler::{ContentVariant, Coordinator, PageCountPrompt};
use site_harvester::output::FailureKind;
use site_harvester::state::RunState;
use site_harvester::HarvestError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration storing pages under `root`
fn create_test_config(root: &TempDir) -> Config {
    let mut config = Config::default();
    config.output.storage_root = root.path().to_path_buf();
    config
}

fn urlset(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<url><loc>{}</loc></url>", u))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">{}</urlset>",
        entries
    )
}

fn page_urls(base: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{}/page/{}", base, i)).collect()
}

/// Mounts a sitemap listing `urls` and a handler answering every `/page/N`
async fn mount_site(server: &MockServer, urls: &[String]) {
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(urls)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/page/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Page</title></head>\
             <body><article><h1>Heading</h1><p>Article body text</p></article></body></html>",
        ))
        .mount(server)
        .await;
}

/// Directory the mock server's pages are written to
fn site_dir(root: &TempDir) -> PathBuf {
    root.path().join("127.0.0.1")
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read site directory")
        .map(|entry| {
            entry
                .expect("Failed to read directory entry")
                .file_name()
                .to_string_lossy()
                .to_string()
        })
        .collect();
    names.sort();
    names
}

/// File name the harvester derives for a mock server page
fn expected_file(base: &str, page: usize, extension: &str) -> String {
    let host_port = base.trim_start_matches("http://");
    format!("{}-page-{}.{}", host_port, page, extension)
}

#[tokio::test]
async fn test_full_harvest_plain_text() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_site(&server, &page_urls(&base, 3)).await;

    let root = TempDir::new().unwrap();
    let mut coordinator = Coordinator::new(create_test_config(&root)).unwrap();

    let result = coordinator
        .run(&RunConfig::new(base.clone()))
        .await
        .expect("Harvest failed");

    assert_eq!(coordinator.state(), RunState::Done);
    assert_eq!(result.total, 3);
    assert_eq!(result.requested, 3);
    assert_eq!(result.fetched, 3);
    assert_eq!(result.failed, 0);
    assert_eq!(result.skipped(), 0);
    assert_eq!(result.workers, 1);
    assert_eq!(result.directory, site_dir(&root));

    let files = file_names(&site_dir(&root));
    assert_eq!(
        files,
        vec![
            expected_file(&base, 1, "txt"),
            expected_file(&base, 2, "txt"),
            expected_file(&base, 3, "txt"),
        ]
    );

    let content = std::fs::read_to_string(site_dir(&root).join(&files[0])).unwrap();
    assert!(content.contains("Article body text"));
    assert!(!content.contains("<p>"));
}

#[tokio::test]
async fn test_full_harvest_reader_mode() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_site(&server, &page_urls(&base, 2)).await;

    let root = TempDir::new().unwrap();
    let mut run = RunConfig::new(base.clone());
    run.variant = ContentVariant::Reader;
    run.debug = true;

    let result = Coordinator::new(create_test_config(&root))
        .unwrap()
        .run(&run)
        .await
        .expect("Harvest failed");

    assert_eq!(result.fetched, 2);

    let files = file_names(&site_dir(&root));
    assert_eq!(
        files,
        vec![expected_file(&base, 1, "md"), expected_file(&base, 2, "md")]
    );

    let content = std::fs::read_to_string(site_dir(&root).join(&files[0])).unwrap();
    assert!(content.contains("Heading"));
    assert!(content.contains("Article body text"));
}

#[tokio::test]
async fn test_single_page_failure_is_isolated() {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut urls = page_urls(&base, 4);
    urls.insert(2, format!("{}/broken", base));
    mount_site(&server, &urls).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let mut coordinator = Coordinator::new(create_test_config(&root)).unwrap();
    let result = coordinator
        .run(&RunConfig::new(base.clone()))
        .await
        .expect("A single page failure must not fail the run");

    assert_eq!(coordinator.state(), RunState::Done);
    assert_eq!(result.requested, 5);
    assert_eq!(result.fetched, 4);
    assert_eq!(result.failed, 1);
    assert_eq!(result.failures[0].kind, FailureKind::Fetch);
    assert!(result.failures[0].url.ends_with("/broken"));
    assert_eq!(file_names(&site_dir(&root)).len(), 4);
}

#[tokio::test]
async fn test_rerun_overwrites_files() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_site(&server, &page_urls(&base, 3)).await;

    let root = TempDir::new().unwrap();
    let run = RunConfig::new(base.clone());

    let mut coordinator = Coordinator::new(create_test_config(&root)).unwrap();
    coordinator.run(&run).await.expect("First harvest failed");
    let first = file_names(&site_dir(&root));

    coordinator.run(&run).await.expect("Second harvest failed");
    let second = file_names(&site_dir(&root));

    assert_eq!(first, second);
    assert_eq!(second.len(), 3);
}

#[tokio::test]
async fn test_default_cap_on_large_site() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_site(&server, &page_urls(&base, 500)).await;

    let root = TempDir::new().unwrap();
    let result = Coordinator::new(create_test_config(&root))
        .unwrap()
        .run(&RunConfig::new(base.clone()))
        .await
        .expect("Harvest failed");

    assert_eq!(result.total, 500);
    assert_eq!(result.requested, 100);
    assert_eq!(result.skipped(), 400);
    assert_eq!(result.workers, 10);

    // Only the first 100 pages in sitemap order are fetched
    let dir = site_dir(&root);
    assert_eq!(file_names(&dir).len(), 100);
    assert!(dir.join(expected_file(&base, 100, "txt")).exists());
    assert!(!dir.join(expected_file(&base, 101, "txt")).exists());
}

/// Answers the page-count decision with a fixed number
struct FixedPrompt(usize);

impl PageCountPrompt for FixedPrompt {
    fn choose(&self, _total: usize, _requested: usize) -> Option<usize> {
        Some(self.0)
    }
}

#[tokio::test]
async fn test_prompt_overrides_default_cap() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_site(&server, &page_urls(&base, 30)).await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&root);
    config.crawler.default_page_cap = 10;

    let mut run = RunConfig::new(base.clone());
    run.page_limit = PageLimit::Capped(10);

    let result = Coordinator::new(config)
        .unwrap()
        .with_prompt(FixedPrompt(25))
        .run(&run)
        .await
        .expect("Harvest failed");

    assert_eq!(result.requested, 25);
    assert_eq!(result.fetched, 25);
    assert_eq!(result.workers, 3);
    assert_eq!(file_names(&site_dir(&root)).len(), 25);
}

#[tokio::test]
async fn test_prompt_not_consulted_below_default_cap() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_site(&server, &page_urls(&base, 5)).await;

    let root = TempDir::new().unwrap();
    let result = Coordinator::new(create_test_config(&root))
        .unwrap()
        .with_prompt(FixedPrompt(1))
        .run(&RunConfig::new(base.clone()))
        .await
        .expect("Harvest failed");

    assert_eq!(result.requested, 5);
}

#[tokio::test]
async fn test_unlimited_fetches_every_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_site(&server, &page_urls(&base, 15)).await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&root);
    config.crawler.default_page_cap = 10;

    let mut run = RunConfig::new(base.clone());
    run.page_limit = PageLimit::Unlimited;

    let result = Coordinator::new(config)
        .unwrap()
        .with_prompt(FixedPrompt(1))
        .run(&run)
        .await
        .expect("Harvest failed");

    assert_eq!(result.requested, 15);
    assert_eq!(result.fetched, 15);
    assert_eq!(result.skipped(), 0);
}

#[tokio::test]
async fn test_explicit_cap_below_total() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_site(&server, &page_urls(&base, 8)).await;

    let root = TempDir::new().unwrap();
    let mut run = RunConfig::new(base.clone());
    run.page_limit = PageLimit::Capped(3);

    let result = Coordinator::new(create_test_config(&root))
        .unwrap()
        .run(&run)
        .await
        .expect("Harvest failed");

    assert_eq!(result.requested, 3);
    assert_eq!(result.skipped(), 5);
    assert_eq!(
        file_names(&site_dir(&root)),
        vec![
            expected_file(&base, 1, "txt"),
            expected_file(&base, 2, "txt"),
            expected_file(&base, 3, "txt"),
        ]
    );
}

#[tokio::test]
async fn test_resolution_failure_aborts_before_fetching() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // No page may be requested once resolution failed
    Mock::given(method("GET"))
        .and(path_regex(r"^/page/\d+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let mut coordinator = Coordinator::new(create_test_config(&root)).unwrap();
    let result = coordinator.run(&RunConfig::new(server.uri())).await;

    assert!(matches!(result, Err(HarvestError::Sitemap(_))));
    assert_eq!(coordinator.state(), RunState::Aborted);
    assert_eq!(file_names(&site_dir(&root)).len(), 0);
}

#[tokio::test]
async fn test_best_effort_harvests_surviving_subtree() {
    let server = MockServer::start().await;
    let base = server.uri();

    let index = format!(
        "<sitemapindex>\
         <sitemap><loc>{base}/missing.xml</loc></sitemap>\
         <sitemap><loc>{base}/pages.xml</loc></sitemap>\
         </sitemapindex>"
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&page_urls(&base, 2))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/page/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&root);
    config.crawler.resolution_policy = ResolutionPolicy::BestEffort;

    let result = Coordinator::new(config)
        .unwrap()
        .run(&RunConfig::new(base.clone()))
        .await
        .expect("Best-effort harvest failed");

    assert_eq!(result.fetched, 2);
    assert_eq!(result.sitemap_failures.len(), 1);
    assert!(result.sitemap_failures[0].url.ends_with("/missing.xml"));
}

#[tokio::test]
async fn test_reader_mode_skips_empty_pages() {
    let server = MockServer::start().await;
    let base = server.uri();

    let urls = vec![format!("{}/page/1", base), format!("{}/empty", base)];
    mount_site(&server, &urls).await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><script>var x = 1;</script></body></html>"),
        )
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let mut run = RunConfig::new(base.clone());
    run.variant = ContentVariant::Reader;

    let result = Coordinator::new(create_test_config(&root))
        .unwrap()
        .run(&run)
        .await
        .expect("Harvest failed");

    assert_eq!(result.fetched, 1);
    assert_eq!(result.failed, 1);
    assert!(result.failures[0].url.ends_with("/empty"));
    assert_eq!(
        file_names(&site_dir(&root)),
        vec![expected_file(&base, 1, "md")]
    );
}

#[tokio::test]
async fn test_empty_sitemap_completes_with_no_pages() {
    let server = MockServer::start().await;
    mount_site(&server, &[]).await;

    let root = TempDir::new().unwrap();
    let mut coordinator = Coordinator::new(create_test_config(&root)).unwrap();
    let result = coordinator
        .run(&RunConfig::new(server.uri()))
        .await
        .expect("Harvest failed");

    assert_eq!(coordinator.state(), RunState::Done);
    assert_eq!(result.total, 0);
    assert_eq!(result.fetched, 0);
    assert!(site_dir(&root).is_dir());
}
