use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mockito::{Matcher, Server, ServerGuard};
use newsroom_tui::config::AppConfig;
use newsroom_tui::internal::comments::{FETCH_FAILED_ALERT, POST_FAILED, POST_SUCCEEDED};
use newsroom_tui::internal::models::{Comment, RequestStatus};
use newsroom_tui::internal::notification::NotificationKind;
use newsroom_tui::internal::summary::{DISCLAIMER_NOTE, FAILURE_TEXT, SummaryContent};
use newsroom_tui::internal::ui::app::App;
use serde_json::json;

const HOME: &str = r#"<html>
<head><title>Home</title></head>
<body>
  <div id="loading-wrapper"></div>
  <nav><a href="/">Home</a><a href="/BBC">BBC</a></nav>
  <div id="mySidebar"><a href="/Politics">Politics</a></div>
  <ul>
    <li>
      <a href="https://www.bbc.com/news/a">Storm hits coast</a>
      <button class="summary" data-url="https://www.bbc.com/news/a">Summary</button>
      <button class="discussion" data-article-id="42">Discussion</button>
    </li>
    <li>
      <a href="https://www.bbc.com/news/b">Markets rally</a>
      <button class="summary" data-url="https://www.bbc.com/news/b">Summary</button>
    </li>
  </ul>
</body>
</html>"#;

const BBC: &str = r#"<html>
<head><title>BBC</title></head>
<body>
  <div id="loading-wrapper"></div>
  <nav><a href="/">Home</a></nav>
  <ul>
    <li>
      <a href="https://www.bbc.com/news/c">Elections</a>
      <button class="summary" data-url="https://www.bbc.com/news/c">Summary</button>
    </li>
  </ul>
</body>
</html>"#;

fn press(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn press_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Feed background results into the app until `done` holds.
async fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(app) {
            let action = app.next_action().await.expect("action channel closed");
            app.handle_action(action);
        }
    })
    .await
    .expect("timed out waiting for app state");
}

/// Mock server serving the home page, and an app with that page loaded.
async fn loaded_app() -> (ServerGuard, App) {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(HOME)
        .create_async()
        .await;

    let config = AppConfig {
        base_url: format!("{}/", server.url()),
        ..AppConfig::default()
    };
    let mut app = App::new(config).unwrap();
    app.load_document("/");
    pump_until(&mut app, |app| app.page.is_some()).await;

    (server, app)
}

#[tokio::test]
async fn test_start_page_loads_without_indicator() {
    let (_server, app) = loaded_app().await;

    let page = app.page.as_ref().unwrap();
    assert_eq!(page.title, "Home");
    assert_eq!(page.articles.len(), 2);
    assert!(!app.navigation.indicator_visible());
    assert!(!app.navigation.is_navigating());
}

#[tokio::test]
async fn test_summary_success_shows_text_and_note() {
    let (mut server, mut app) = loaded_app().await;
    let mock = server
        .mock("POST", "/summarize")
        .match_body(Matcher::UrlEncoded(
            "url".into(),
            "https://www.bbc.com/news/a".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"summary": "A storm hit the coast."}"#)
        .create_async()
        .await;

    app.handle_key_event(press('s'));
    assert!(app.summary.is_visible());
    assert!(app.summary.content().is_processing());

    pump_until(&mut app, |app| app.summary.status() != RequestStatus::Pending).await;

    mock.assert_async().await;
    assert_eq!(
        app.summary.content(),
        &SummaryContent::Summary {
            text: "A storm hit the coast.".to_string(),
            note: DISCLAIMER_NOTE,
        }
    );
    assert_eq!(app.summary.status(), RequestStatus::Succeeded);
}

#[tokio::test]
async fn test_summary_failure_shows_fixed_message() {
    let (mut server, mut app) = loaded_app().await;
    server
        .mock("POST", "/summarize")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "could not scrape"}"#)
        .create_async()
        .await;

    app.handle_key_event(press('s'));
    pump_until(&mut app, |app| app.summary.status() != RequestStatus::Pending).await;

    assert!(app.summary.is_visible());
    assert_eq!(app.summary.content(), &SummaryContent::Error(FAILURE_TEXT));
    assert_eq!(app.summary.status(), RequestStatus::Failed);
}

#[tokio::test]
async fn test_summary_payment_required_shows_fixed_message() {
    let (mut server, mut app) = loaded_app().await;
    let mock = server
        .mock("POST", "/summarize")
        .with_status(402)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "No article has been found"}"#)
        .create_async()
        .await;

    app.handle_key_event(press('s'));
    pump_until(&mut app, |app| app.summary.status() != RequestStatus::Pending).await;

    mock.assert_async().await;
    assert!(app.summary.is_visible());
    assert_eq!(app.summary.content(), &SummaryContent::Error(FAILURE_TEXT));
    assert_eq!(app.summary.status(), RequestStatus::Failed);
}

#[tokio::test]
async fn test_latest_summary_trigger_wins() {
    let (mut server, mut app) = loaded_app().await;
    server
        .mock("POST", "/summarize")
        .match_body(Matcher::UrlEncoded(
            "url".into(),
            "https://www.bbc.com/news/a".into(),
        ))
        .with_status(200)
        .with_body(r#"{"summary": "first"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/summarize")
        .match_body(Matcher::UrlEncoded(
            "url".into(),
            "https://www.bbc.com/news/b".into(),
        ))
        .with_status(200)
        .with_body(r#"{"summary": "second"}"#)
        .create_async()
        .await;

    app.handle_key_event(press('s'));
    app.handle_key_event(press('q'));
    app.handle_key_event(press('j'));
    app.handle_key_event(press('s'));

    pump_until(&mut app, |app| app.summary.status() != RequestStatus::Pending).await;

    assert_eq!(
        app.summary.request().unwrap().target_url,
        "https://www.bbc.com/news/b"
    );
    assert_eq!(
        app.summary.content(),
        &SummaryContent::Summary {
            text: "second".to_string(),
            note: DISCLAIMER_NOTE,
        }
    );
}

#[tokio::test]
async fn test_discussion_renders_comments() {
    let (mut server, mut app) = loaded_app().await;
    let mock = server
        .mock("GET", "/articles/42/comments")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"["hi", "there"]"#)
        .create_async()
        .await;

    app.handle_key_event(press('c'));
    assert!(app.comments.is_visible());
    pump_until(&mut app, |app| !app.comments.is_loading()).await;

    mock.assert_async().await;
    assert_eq!(
        app.comments.comments(),
        &[Comment::new("hi"), Comment::new("there")]
    );
    assert!(app.alert.is_none());
}

#[tokio::test]
async fn test_discussion_failure_raises_alert() {
    let (mut server, mut app) = loaded_app().await;
    server
        .mock("GET", "/articles/42/comments")
        .with_status(500)
        .create_async()
        .await;

    app.handle_key_event(press('c'));
    pump_until(&mut app, |app| !app.comments.is_loading()).await;

    assert_eq!(app.alert.as_deref(), Some(FETCH_FAILED_ALERT));
    assert!(app.comments.comments().is_empty());

    // Blocking until acknowledged
    app.handle_key_event(press('x'));
    assert!(app.alert.is_some());
    assert_eq!(app.comments.input(), "");
    app.handle_key_event(press_code(KeyCode::Enter));
    assert!(app.alert.is_none());
}

#[tokio::test]
async fn test_posting_comment_notifies_and_refetches() {
    let (mut server, mut app) = loaded_app().await;
    let list = server
        .mock("GET", "/articles/42/comments")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"["hi"]"#)
        .expect(2)
        .create_async()
        .await;
    let post = server
        .mock("POST", "/comments")
        .match_body(Matcher::Json(json!({
            "content": "nice",
            "article_id": "42"
        })))
        .with_status(201)
        .create_async()
        .await;

    app.handle_key_event(press('c'));
    pump_until(&mut app, |app| !app.comments.is_loading()).await;

    for c in "nice".chars() {
        app.handle_key_event(press(c));
    }
    app.handle_key_event(press_code(KeyCode::Enter));

    pump_until(&mut app, |app| {
        !app.notifications.active().is_empty() && !app.comments.is_loading()
    })
    .await;

    post.assert_async().await;
    list.assert_async().await;

    let notification = &app.notifications.active()[0];
    assert_eq!(notification.message, POST_SUCCEEDED);
    assert_eq!(notification.kind, NotificationKind::Info);
    assert_eq!(app.comments.input(), "");
    assert!(app.comments.is_visible());
}

#[tokio::test]
async fn test_failed_post_keeps_input() {
    let (mut server, mut app) = loaded_app().await;
    server
        .mock("GET", "/articles/42/comments")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"["hi"]"#)
        .create_async()
        .await;
    server
        .mock("POST", "/comments")
        .with_status(400)
        .create_async()
        .await;

    app.handle_key_event(press('c'));
    pump_until(&mut app, |app| !app.comments.is_loading()).await;

    for c in "draft".chars() {
        app.handle_key_event(press(c));
    }
    app.handle_key_event(press_code(KeyCode::Enter));
    pump_until(&mut app, |app| !app.notifications.active().is_empty()).await;

    let notification = &app.notifications.active()[0];
    assert_eq!(notification.message, POST_FAILED);
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(app.comments.input(), "draft");
    assert_eq!(app.comments.comments(), &[Comment::new("hi")]);
}

#[tokio::test]
async fn test_navigation_replaces_document() {
    let (mut server, mut app) = loaded_app().await;
    server
        .mock("GET", "/BBC")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(BBC)
        .create_async()
        .await;

    app.handle_key_event(press('b'));
    assert!(app.sidebar.is_hidden());

    app.navigate("/BBC");
    assert!(app.navigation.indicator_visible());

    pump_until(&mut app, |app| !app.navigation.is_navigating()).await;

    let page = app.page.as_ref().unwrap();
    assert_eq!(page.title, "BBC");
    assert!(page.url.ends_with("/BBC"));
    assert!(!app.navigation.indicator_visible());
    assert!(!app.sidebar.is_hidden());
    assert!(!app.summary.is_visible());
}

#[tokio::test]
async fn test_failed_navigation_keeps_indicator() {
    let (mut server, mut app) = loaded_app().await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    app.navigate("/missing");
    pump_until(&mut app, |app| !app.navigation.is_navigating()).await;

    assert_eq!(app.page.as_ref().unwrap().title, "Home");
    assert!(app.navigation.indicator_visible());

    // Only quit and reload get past the indicator
    app.handle_key_event(press('s'));
    assert!(!app.summary.is_visible());
    app.handle_key_event(press('r'));
    pump_until(&mut app, |app| !app.navigation.is_navigating()).await;
    assert!(!app.navigation.indicator_visible());
}
