//! Fetch tasks racing each other through the event channel

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ffx::api::{FetchError, RecordSource};
use ffx::app::App;
use ffx::clipboard::MemoryClipboard;
use ffx::query::{ListQuery, PageSizes};
use ffx::source::{fetch_into, spawn_fetch};
use ffx::theme::Theme;
use ffx::types::{AppEvent, Page, Record, Resource};
use serde_json::json;
use tokio::sync::mpsc::unbounded_channel;

/// Serves `total` datatypes; pages with a larger skip answer faster
struct ScriptedSource {
    total: u64,
    fail_status: Option<u16>,
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn fetch_page(
        &self,
        _namespace: &str,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<Page<Record>, FetchError> {
        let delay = 150u64.saturating_sub(query.skip() * 5);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if let Some(status) = self.fail_status {
            return Err(FetchError::Status { status, body: "node unavailable".into() });
        }
        let end = (query.skip() + query.page_size as u64).min(self.total);
        let items = (query.skip()..end)
            .map(|i| resource.decode(json!({"id": format!("dt-{i}"), "name": "widget"})))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, total: self.total })
    }
}

fn app() -> App {
    App::new(
        "default",
        Resource::Datatypes,
        PageSizes::default(),
        30,
        Theme::default(),
        Box::new(MemoryClipboard::default()),
    )
}

#[tokio::test]
async fn fetch_into_delivers_the_outcome() {
    let source = ScriptedSource { total: 3, fail_status: None };
    let (tx, mut rx) = unbounded_channel();
    let mut app = app();
    let req = app.take_request().expect("initial load");
    let seq = req.seq;

    fetch_into(&source, req, &tx).await;
    match rx.recv().await {
        Some(AppEvent::PageLoaded { seq: got, result: Ok(page), .. }) => {
            assert_eq!(got, seq);
            assert_eq!(page.items.len(), 3);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn slow_older_page_does_not_overwrite_newer() {
    let source: Arc<dyn RecordSource> = Arc::new(ScriptedSource { total: 40, fail_status: None });
    let (tx, mut rx) = unbounded_channel();
    let mut app = app();

    // load page 1 so paging forward is allowed
    spawn_fetch(source.clone(), app.take_request().unwrap(), tx.clone());
    app.on_event(rx.recv().await.unwrap());
    assert_eq!(app.list().items().len(), 10);

    // page 2 is slower than page 3; both are in flight together
    app.next_page();
    let slow = spawn_fetch(source.clone(), app.take_request().unwrap(), tx.clone());
    app.next_page();
    let fast = spawn_fetch(source.clone(), app.take_request().unwrap(), tx.clone());
    fast.await.unwrap();
    slow.await.unwrap();
    drop(tx);

    while let Some(ev) = rx.recv().await {
        app.on_event(ev);
    }
    assert_eq!(app.list().query().page_index, 2);
    assert_eq!(app.list().items()[0].key(), "dt-20");
    assert!(!app.list().loading());
}

#[tokio::test]
async fn failure_surfaces_once_and_keeps_rows() {
    let ok: Arc<dyn RecordSource> = Arc::new(ScriptedSource { total: 5, fail_status: None });
    let failing: Arc<dyn RecordSource> =
        Arc::new(ScriptedSource { total: 5, fail_status: Some(503) });
    let (tx, mut rx) = unbounded_channel();
    let mut app = app();

    spawn_fetch(ok, app.take_request().unwrap(), tx.clone());
    app.on_event(rx.recv().await.unwrap());
    assert_eq!(app.list().items().len(), 5);

    app.refresh();
    spawn_fetch(failing, app.take_request().unwrap(), tx.clone());
    app.on_event(rx.recv().await.unwrap());

    assert_eq!(app.toasts().errors_reported(), 1);
    assert_eq!(app.list().items().len(), 5, "stale rows stay visible");
    assert!(app.list().last_error().unwrap().contains("503"));
}
