use axum::{routing::get, Json, Router};
use quotebook::sync::SyncOutcome;
use quotebook::{Error, QuoteApp, QuotebookConfig, SessionScope};
use serde_json::{json, Value};
use tempfile::TempDir;

fn config_in(dir: &TempDir, endpoint: &str) -> QuotebookConfig {
    let mut config = QuotebookConfig::default();
    config.storage.data_dir = dir.path().to_path_buf();
    config.sync.endpoint = endpoint.to_string();
    config.sync.push_on_add = false;
    config.sync.timeout_secs = 2;
    config
}

async fn spawn_remote(titles: Vec<&'static str>) -> String {
    let body: Vec<Value> = titles
        .into_iter()
        .enumerate()
        .map(|(i, t)| json!({ "id": i + 1, "title": t, "body": "" }))
        .collect();
    let router = Router::new().route(
        "/posts",
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        })
        .post(|Json(v): Json<Value>| async move { Json(v) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/posts", addr)
}

#[tokio::test]
async fn test_fresh_install_starts_from_seed() {
    let dir = TempDir::new().unwrap();
    let app = QuoteApp::from_config(&config_in(&dir, "http://127.0.0.1:9/posts"), SessionScope::Persistent)
        .await
        .unwrap();

    assert_eq!(app.catalog().await.len(), 2);
    assert_eq!(app.categories().await, vec!["Motivation", "Productivity"]);
}

#[tokio::test]
async fn test_added_quote_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, "http://127.0.0.1:9/posts");

    {
        let app = QuoteApp::from_config(&config, SessionScope::Persistent).await.unwrap();
        let commit = app.add_quote("  Stay hungry.  ", "Life").await.unwrap();
        assert!(commit.outcome.is_new);
        assert!(commit.persisted());
        assert_eq!(commit.outcome.quote.text, "Stay hungry.");

        let picked = app.random_quote(Some("Life")).await.unwrap();
        assert_eq!(picked.text, "Stay hungry.");
    }

    let app = QuoteApp::from_config(&config, SessionScope::Persistent).await.unwrap();
    assert_eq!(app.catalog().await.len(), 3);
    assert!(app.categories().await.contains(&"Life".to_string()));

    let session = app.session().await;
    assert_eq!(session.category.as_deref(), Some("Life"));
    assert_eq!(session.quote.as_deref(), Some("Stay hungry."));

    // No category given: falls back to the remembered one
    let picked = app.random_quote(None).await.unwrap();
    assert_eq!(picked.category, "Life");
}

#[tokio::test]
async fn test_process_scope_does_not_persist_session() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, "http://127.0.0.1:9/posts");

    {
        let app = QuoteApp::from_config(&config, SessionScope::Process).await.unwrap();
        app.random_quote(Some("Productivity")).await.unwrap();
        assert_eq!(app.session().await.category.as_deref(), Some("Productivity"));
    }

    let app = QuoteApp::from_config(&config, SessionScope::Process).await.unwrap();
    assert!(app.session().await.category.is_none());
}

#[tokio::test]
async fn test_export_then_import_into_fresh_catalog() {
    let src_dir = TempDir::new().unwrap();
    let src = QuoteApp::from_config(&config_in(&src_dir, "http://127.0.0.1:9/posts"), SessionScope::Process)
        .await
        .unwrap();
    src.add_quote("Less is more.", "Design").await.unwrap();

    let export_path = src_dir.path().join("export.json");
    src.export_to(&export_path).await.unwrap();

    let dst_dir = TempDir::new().unwrap();
    let dst = QuoteApp::from_config(&config_in(&dst_dir, "http://127.0.0.1:9/posts"), SessionScope::Process)
        .await
        .unwrap();
    let commit = dst.import_file(&export_path).await.unwrap();

    assert_eq!(commit.outcome.added, 1);
    assert_eq!(commit.outcome.duplicates, 2);
    assert_eq!(dst.catalog().await, src.catalog().await);
}

#[tokio::test]
async fn test_import_rejects_bad_files_without_changes() {
    let dir = TempDir::new().unwrap();
    let app = QuoteApp::from_config(&config_in(&dir, "http://127.0.0.1:9/posts"), SessionScope::Process)
        .await
        .unwrap();

    let txt = dir.path().join("quotes.txt");
    tokio::fs::write(&txt, "[]").await.unwrap();
    assert!(matches!(app.import_file(&txt).await, Err(Error::Format(_))));

    let object = dir.path().join("object.json");
    tokio::fs::write(&object, r#"{"text":"a","category":"b"}"#).await.unwrap();
    assert!(matches!(app.import_file(&object).await, Err(Error::Import(_))));

    assert_eq!(app.catalog().await.len(), 2);
}

#[tokio::test]
async fn test_sync_merges_remote_titles() {
    let endpoint = spawn_remote(vec!["remote one", "remote two"]).await;
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, &endpoint);
    let app = QuoteApp::from_config(&config, SessionScope::Process).await.unwrap();

    match app.sync_now(false).await {
        SyncOutcome::Merged { pulled, report, storage_error } => {
            assert_eq!(pulled, 2);
            assert_eq!(report.added, 2);
            assert!(storage_error.is_none());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let server = app.quotes_in(Some("Server")).await;
    assert_eq!(server.len(), 2);
    assert_eq!(server[0].text, "remote one");

    // Local quotes stay first
    let catalog = app.catalog().await;
    assert_eq!(catalog.quotes()[0].category, "Motivation");

    // Second sync pulls the same quotes and adds nothing
    match app.sync_now(true).await {
        SyncOutcome::Merged { report, .. } => assert_eq!(report.added, 0),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(app.sync_status().await.last_synced_at.is_some());

    // Persisted for the next process
    let reopened = QuoteApp::from_config(&config, SessionScope::Process).await.unwrap();
    assert_eq!(reopened.catalog().await.len(), 4);
}

#[tokio::test]
async fn test_sync_failure_leaves_catalog_untouched() {
    let dir = TempDir::new().unwrap();
    let app = QuoteApp::from_config(&config_in(&dir, "http://127.0.0.1:9/posts"), SessionScope::Process)
        .await
        .unwrap();

    let outcome = app.sync_now(false).await;
    assert!(matches!(outcome, SyncOutcome::Failed { .. }));
    assert_eq!(app.catalog().await.len(), 2);

    let status = app.sync_status().await;
    assert!(status.last_synced_at.is_none());
    assert!(status.last_error.is_some());
}

#[tokio::test]
async fn test_reset_restores_seed_and_clears_session() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, "http://127.0.0.1:9/posts");
    let app = QuoteApp::from_config(&config, SessionScope::Persistent).await.unwrap();
    app.add_quote("Ship it.", "Work").await.unwrap();
    app.random_quote(Some("Work")).await.unwrap();

    let catalog = app.reset().await.unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(app.session().await.category.is_none());

    let reopened = QuoteApp::from_config(&config, SessionScope::Persistent).await.unwrap();
    assert_eq!(reopened.catalog().await.len(), 2);
}
