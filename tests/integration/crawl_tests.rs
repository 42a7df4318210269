//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small wiki and run the full
//! coordinator against it, checking the files left in the output directory.

use std::fs;
use tempfile::TempDir;
use wiki_harvest::config::Config;
use wiki_harvest::crawler::Coordinator;
use wiki_harvest::output::rebuild_index;
use wiki_harvest::storage::{FsStorage, Storage};
use wiki_harvest::PageType;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration rooted at the mock server
fn create_test_config(server: &MockServer, out: &TempDir, max_pages: u32) -> Config {
    let mut config = Config::default();
    config.crawler.start_url = format!("{}/Home", server.uri());
    config.crawler.max_pages = max_pages;
    config.crawler.page_delay_ms = 5; // Very short for testing
    config.crawler.request_timeout_secs = 5;
    config.images.delay_ms = 1;
    config.output.directory = out.path().to_string_lossy().into_owned();
    config
}

fn html_page(title: &str, content: &str) -> ResponseTemplate {
    let body = format!(
        r#"<html><head><title>{}</title></head>
        <body><div id="mw-content-text">{}</div></body></html>"#,
        title, content
    );
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page_path: &str, title: &str, content: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(title, content))
        .mount(server)
        .await;
}

fn load_pages(out: &TempDir) -> Vec<wiki_harvest::PageRecord> {
    FsStorage::new(out.path()).load_pages().unwrap()
}

#[tokio::test]
async fn test_single_page_budget() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/Home",
        "Home",
        r#"<p>Welcome</p><a href="/Limgrave">Limgrave</a>"#,
    )
    .await;
    mount_page(&server, "/Limgrave", "Limgrave", "<p>Region</p>").await;

    let coordinator = Coordinator::new(create_test_config(&server, &out, 1))
        .await
        .unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.pages_processed, 1);

    let pages = load_pages(&out);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].slug, "home");
    assert_eq!(pages[0].title, "Home");
    assert_eq!(pages[0].content_text.as_deref(), Some("Welcome Limgrave"));

    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("index.json")).unwrap()).unwrap();
    assert_eq!(index.as_array().unwrap().len(), 1);
    assert_eq!(index[0]["slug"], "home");

    assert!(out.path().join("by-type.json").exists());
    assert!(out.path().join("manifest.json").exists());
}

#[tokio::test]
async fn test_robots_disallowed_page_never_fetched() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /Special:\n"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/Home",
        "Home",
        r#"<a href="/Special:Random">Random</a><a href="/Caelid">Caelid</a>"#,
    )
    .await;
    mount_page(&server, "/Caelid", "Caelid", "<p>Scarlet rot</p>").await;
    Mock::given(method("GET"))
        .and(path("/Special:Random"))
        .respond_with(html_page("Random", "<p>x</p>"))
        .expect(0)
        .mount(&server)
        .await;

    // Namespace filtering would hide the link before robots is consulted
    let mut config = create_test_config(&server, &out, 10);
    config.crawler.banned_namespaces.clear();

    let stats = Coordinator::new(config).await.unwrap().run().await.unwrap();

    assert_eq!(stats.pages_processed, 2);
    assert_eq!(stats.skipped.robots, 1);

    let slugs: Vec<String> = load_pages(&out).into_iter().map(|p| p.slug).collect();
    assert_eq!(slugs, vec!["caelid", "home"]);
}

#[tokio::test]
async fn test_page_budget_is_a_ceiling() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/Home",
        "Home",
        r#"<a href="/A">A</a><a href="/B">B</a><a href="/C">C</a>"#,
    )
    .await;
    for name in ["A", "B", "C"] {
        mount_page(&server, &format!("/{}", name), name, "<p>page</p>").await;
    }

    let stats = Coordinator::new(create_test_config(&server, &out, 3))
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.pages_processed, 3);
    let slugs: Vec<String> = load_pages(&out).into_iter().map(|p| p.slug).collect();
    assert_eq!(slugs, vec!["a", "b", "home"]);
}

#[tokio::test]
async fn test_no_url_fetched_twice() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/Home"))
        .respond_with(html_page(
            "Home",
            r#"<a href="/Ranni">Ranni</a><a href="/Ranni#Quest">Quest</a><a href="/Home">Home</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Ranni"))
        .respond_with(html_page(
            "Ranni",
            r#"<a href="/Home">Home</a><a href="/Ranni">Ranni</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let stats = Coordinator::new(create_test_config(&server, &out, 10))
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.pages_processed, 2);
    assert_eq!(load_pages(&out).len(), 2);
}

#[tokio::test]
async fn test_images_localized_and_content_rewritten() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/Home",
        "Malenia",
        r#"<p>Boss</p><img src="/images/Malenia_Portrait.png" srcset="/images/Malenia_Portrait.png 1x" alt="Malenia">"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/images/Malenia_Portrait.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"))
        .expect(1)
        .mount(&server)
        .await;

    let stats = Coordinator::new(create_test_config(&server, &out, 1))
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.images.downloaded, 1);

    let storage = FsStorage::new(out.path());
    let manifest = storage.load_manifest().unwrap();
    let remote = format!("{}/images/Malenia_Portrait.png", server.uri());
    let local = manifest.get(&remote).expect("image recorded in manifest");
    assert!(local.starts_with("images/home/"));
    assert!(local.ends_with(".png"));
    assert_eq!(fs::read(out.path().join(local)).unwrap(), vec![0x89, 0x50, 0x4e, 0x47]);

    let pages = load_pages(&out);
    let page = &pages[0];
    assert_eq!(page.images.len(), 1);
    assert_eq!(page.images[0].local_path.as_deref(), Some(local.as_str()));
    assert_eq!(page.images[0].alt.as_deref(), Some("Malenia"));

    let localized = page.content_html_local.as_deref().unwrap();
    assert!(localized.contains(&format!(r#"src="{}""#, local)));
    assert!(!localized.contains("srcset"));
    assert!(page.content_html.as_deref().unwrap().contains("srcset"));

    let index = storage.load_index().unwrap();
    assert_eq!(index[0].primary_image.as_deref(), Some(local.as_str()));
}

#[tokio::test]
async fn test_image_failures_do_not_abort_page() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/Home",
        "Home",
        r#"<img src="/images/missing.png"><img src="/images/notes.png"><img src="/images/tree.png">"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/images/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/notes.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"<html></html>".to_vec(), "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/tree.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1, 2, 3], "image/png"))
        .mount(&server)
        .await;

    let stats = Coordinator::new(create_test_config(&server, &out, 1))
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(stats.pages_processed, 1);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(stats.images.attempted, 3);
    assert_eq!(stats.images.downloaded, 1);

    let pages = load_pages(&out);
    let local: Vec<bool> = pages[0]
        .images
        .iter()
        .map(|i| i.local_path.is_some())
        .collect();
    assert_eq!(local, vec![false, false, true]);
}

#[tokio::test]
async fn test_offline_rebuild_matches_crawl_index() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/Home",
        "Home",
        r#"<a href="/Godrick_the_Grafted">Godrick</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/Godrick_the_Grafted"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html><head><title>Godrick the Grafted</title></head><body>
                <div id="mw-content-text"><p>Lord of Stormveil</p></div>
                <div id="catlinks"><a href="/Category:Bosses">Bosses</a></div>
                </body></html>"#
                    .as_bytes()
                    .to_vec(),
                "text/html",
            ),
        )
        .mount(&server)
        .await;

    Coordinator::new(create_test_config(&server, &out, 5))
        .await
        .unwrap()
        .run()
        .await
        .unwrap();

    let crawled = fs::read_to_string(out.path().join("index.json")).unwrap();
    fs::remove_file(out.path().join("index.json")).unwrap();
    fs::remove_file(out.path().join("by-type.json")).unwrap();

    // The mock server is gone; the rebuild must not need it
    drop(server);

    let mut storage = FsStorage::new(out.path());
    let written = rebuild_index(&mut storage).unwrap();
    assert_eq!(written, 2);

    let rebuilt = fs::read_to_string(out.path().join("index.json")).unwrap();
    assert_eq!(crawled, rebuilt);

    let index = storage.load_index().unwrap();
    assert_eq!(index[0].title, "Godrick the Grafted");
    assert_eq!(index[0].page_type, PageType::Boss);
}
