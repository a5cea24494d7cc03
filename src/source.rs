use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::api::RecordSource;
use crate::controller::FetchRequest;
use crate::types::AppEvent;

/// Run one request against `source` and deliver the outcome as an event.
///
/// Errors travel inside the event; nothing here fails on its own. If the UI
/// loop is gone the outcome is dropped.
pub async fn fetch_into(
    source: &dyn RecordSource,
    req: FetchRequest,
    tx: &UnboundedSender<AppEvent>,
) {
    let result = source
        .fetch_page(&req.namespace, req.resource, &req.query)
        .await;
    match &result {
        Ok(page) => log::info!(
            "[source] seq={} {}/{} skip={} -> {} items (total {})",
            req.seq,
            req.namespace,
            req.resource,
            req.query.skip(),
            page.items.len(),
            page.total
        ),
        Err(e) => log::warn!("[source] seq={} {}/{} failed: {e}", req.seq, req.namespace, req.resource),
    }
    let _ = tx.send(AppEvent::PageLoaded { seq: req.seq, query: req.query, result });
}

/// Dispatch without blocking the UI loop. Overlapping requests are fine:
/// the controller only applies the newest one.
pub fn spawn_fetch(
    source: Arc<dyn RecordSource>,
    req: FetchRequest,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move { fetch_into(source.as_ref(), req, &tx).await })
}
