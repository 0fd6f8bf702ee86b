// tests/auth_test.rs

use course_dl::{
    auth::Authenticator,
    client::SessionClient,
    config::AppConfig,
    models::CrawlSession,
    profile::PlatformProfile,
};
use mockito::Matcher;

fn profile_json(server_url: &str, success: &str, failure: &str) -> String {
    format!(
        r#"{{
            "platform_name": "mock-platform",
            "login": {{
                "page_url": "{server}/login",
                "action_url": "{server}/do_login",
                "payload_fields": {{ "username": "email", "password": "senha", "remember": "1" }},
                "success_indicators": [{success}],
                "failure_indicators": [{failure}]
            }},
            "selectors": {{
                "module_item": {{ "tag": "div" }},
                "lesson_item": {{ "tag": "li" }}
            }}
        }}"#,
        server = server_url,
        success = success,
        failure = failure,
    )
}

fn client() -> SessionClient {
    SessionClient::new(&AppConfig::default()).unwrap()
}

#[tokio::test]
async fn login_succeeds_on_page_text_and_posts_mapped_fields() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/do_login")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("email".into(), "ana@example.com".into()),
            Matcher::UrlEncoded("senha".into(), "s3cret".into()),
            Matcher::UrlEncoded("remember".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body("<html><body>Welcome back, Ana</body></html>")
        .create_async()
        .await;

    let profile = PlatformProfile::from_json(&profile_json(
        &server.url(),
        r#"{ "kind": "page_text_contains", "value": "Welcome back" }"#,
        r#"{ "kind": "page_text_contains", "value": "Invalid" }"#,
    ))
    .unwrap();

    let client = client();
    let mut session = CrawlSession::new();
    let authenticator = Authenticator::new(&profile, &client);
    let ok = authenticator
        .login(&mut session, "ana@example.com", "s3cret")
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(ok);
    assert!(session.authenticated);
    // The login response seeds the referer chain for the course fetch.
    assert!(session.referer.as_ref().unwrap().as_str().contains("/do_login"));
}

#[tokio::test]
async fn bounce_back_to_login_is_not_success() {
    let mut server = mockito::Server::new_async().await;
    // The server answers on the action URL itself (no redirect away), which
    // a bare inequality check would misread as success.
    server
        .mock("POST", "/do_login")
        .with_status(200)
        .with_body("<html><body>Invalid username or password</body></html>")
        .create_async()
        .await;

    let profile = PlatformProfile::from_json(&profile_json(
        &server.url(),
        r#"{ "kind": "url_is_not", "value": "https://elsewhere.example.com/" }"#,
        r#"{ "kind": "page_text_contains", "value": "Invalid" }"#,
    ))
    .unwrap();

    let client = client();
    let mut session = CrawlSession::new();
    let ok = Authenticator::new(&profile, &client)
        .login(&mut session, "ana@example.com", "wrong")
        .await
        .unwrap();

    assert!(!ok);
    assert!(!session.authenticated);
}

#[tokio::test]
async fn element_exists_indicator_works_over_http() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/do_login")
        .with_status(200)
        .with_body(r#"<html><body><div class="user-menu logged-in"></div></body></html>"#)
        .create_async()
        .await;

    let profile = PlatformProfile::from_json(&profile_json(
        &server.url(),
        r#"{ "kind": "element_exists", "selector": { "tag": "div", "attrs": [{ "match": "exact", "name": "class", "value": "user-menu" }] } }"#,
        r#"{ "kind": "page_text_contains", "value": "Invalid" }"#,
    ))
    .unwrap();

    let client = client();
    let mut session = CrawlSession::new();
    let ok = Authenticator::new(&profile, &client)
        .login(&mut session, "ana@example.com", "s3cret")
        .await
        .unwrap();

    assert!(ok);
}

#[tokio::test]
async fn transport_failure_reports_failed_login_not_an_error() {
    // Nothing listens here; the connection is refused.
    let profile = PlatformProfile::from_json(&profile_json(
        "http://127.0.0.1:1",
        r#"{ "kind": "page_text_contains", "value": "Welcome" }"#,
        r#"{ "kind": "page_text_contains", "value": "Invalid" }"#,
    ))
    .unwrap();

    let client = client();
    let mut session = CrawlSession::new();
    let ok = Authenticator::new(&profile, &client)
        .login(&mut session, "ana@example.com", "s3cret")
        .await
        .unwrap();

    assert!(!ok);
    assert!(!session.authenticated);
}
