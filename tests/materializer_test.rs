// tests/materializer_test.rs

use course_dl::{
    client::SessionClient,
    config::AppConfig,
    materializer::FileMaterializer,
    models::{Asset, AssetKind, CrawlSession, MaterialOutcome},
};
use std::fs;
use url::Url;

fn asset(server_url: &str, path: &str, name: &str) -> Asset {
    Asset {
        kind: AssetKind::Material,
        url: Url::parse(&format!("{}{}", server_url, path)).unwrap(),
        name: name.to_string(),
    }
}

fn referer(server_url: &str) -> Url {
    Url::parse(&format!("{}/lesson", server_url)).unwrap()
}

#[tokio::test]
async fn downloads_once_then_skips_without_a_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/files/handout.pdf")
        .with_status(200)
        .with_body("%PDF-1.4 content")
        .expect(1)
        .create_async()
        .await;

    let client = SessionClient::new(&AppConfig::default()).unwrap();
    let materializer = FileMaterializer::new(&client);
    let tmp = tempfile::tempdir().unwrap();
    let mut session = CrawlSession::new();
    let asset = asset(&server.url(), "/files/handout.pdf", "Handout Week 1");
    let referer = referer(&server.url());

    let first = materializer
        .download(&mut session, &asset, tmp.path(), &referer)
        .await;
    let MaterialOutcome::Downloaded(path) = first else {
        panic!("expected a download, got {:?}", first);
    };
    assert_eq!(path, tmp.path().join("Handout Week 1.pdf"));
    assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4 content");

    let second = materializer
        .download(&mut session, &asset, tmp.path(), &referer)
        .await;
    assert!(matches!(second, MaterialOutcome::Skipped(_)));

    // Exactly one hit: the skip decided on file presence alone.
    mock.assert_async().await;
}

#[tokio::test]
async fn http_error_yields_a_failed_outcome_not_a_panic() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/files/gone.pdf")
        .with_status(404)
        .create_async()
        .await;

    let client = SessionClient::new(&AppConfig::default()).unwrap();
    let materializer = FileMaterializer::new(&client);
    let tmp = tempfile::tempdir().unwrap();
    let mut session = CrawlSession::new();
    let asset = asset(&server.url(), "/files/gone.pdf", "Gone");
    let referer = referer(&server.url());

    let outcome = materializer
        .download(&mut session, &asset, tmp.path(), &referer)
        .await;
    assert!(matches!(outcome, MaterialOutcome::Failed(_)));
    // A failed transfer leaves no file for a later run to mistake for done.
    assert!(!tmp.path().join("Gone.pdf").exists());
}

#[tokio::test]
async fn empty_existing_file_is_redownloaded() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/files/notes.pdf")
        .with_status(200)
        .with_body("real content")
        .create_async()
        .await;

    let client = SessionClient::new(&AppConfig::default()).unwrap();
    let materializer = FileMaterializer::new(&client);
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("Notes.pdf"), b"").unwrap();

    let mut session = CrawlSession::new();
    let asset = asset(&server.url(), "/files/notes.pdf", "Notes");
    let referer = referer(&server.url());

    let outcome = materializer
        .download(&mut session, &asset, tmp.path(), &referer)
        .await;
    assert!(matches!(outcome, MaterialOutcome::Downloaded(_)));
    assert_eq!(fs::read(tmp.path().join("Notes.pdf")).unwrap(), b"real content");
}
