//! Click routing between table rows and identifier popovers

use ffx::app::App;
use ffx::clipboard::MemoryClipboard;
use ffx::disclosure::{dispatch, ClickHandlers, HitTarget};
use ffx::query::PageSizes;
use ffx::theme::Theme;
use ffx::types::{AppEvent, Page, Resource};
use serde_json::json;

/// Row with onClick=spy_a containing a hash widget with onClick=spy_b
#[derive(Default)]
struct Spies {
    row_clicks: Vec<usize>,
    hash_clicks: Vec<(usize, usize)>,
    outside: usize,
}

impl ClickHandlers for Spies {
    fn on_row(&mut self, row: usize) {
        self.row_clicks.push(row);
    }

    fn on_hash(&mut self, row: usize, col: usize) {
        self.hash_clicks.push((row, col));
    }

    fn on_outside(&mut self) {
        self.outside += 1;
    }
}

#[test]
fn hash_click_does_not_reach_row() {
    let mut spies = Spies::default();
    dispatch(HitTarget::Hash { row: 3, col: 1 }, &mut spies);
    assert_eq!(spies.hash_clicks, vec![(3, 1)]);
    assert!(spies.row_clicks.is_empty(), "row handler must not fire");
}

#[test]
fn row_click_does_not_reach_hash() {
    let mut spies = Spies::default();
    dispatch(HitTarget::Row(2), &mut spies);
    dispatch(HitTarget::Outside, &mut spies);
    assert_eq!(spies.row_clicks, vec![2]);
    assert!(spies.hash_clicks.is_empty());
    assert_eq!(spies.outside, 1);
}

fn loaded_app() -> App {
    let mut app = App::new(
        "default",
        Resource::Messages,
        PageSizes::default(),
        30,
        Theme::default(),
        Box::new(MemoryClipboard::default()),
    );
    let req = app.take_request().unwrap();
    let items = (0..3)
        .map(|i| {
            Resource::Messages
                .decode(json!({"header": {
                    "id": format!("m{i}"),
                    "author": format!("0xauthor{i}0000000000000000000000000000000000"),
                    "type": "broadcast"
                }}))
                .unwrap()
        })
        .collect();
    app.on_event(AppEvent::PageLoaded {
        seq: req.seq,
        query: req.query,
        result: Ok(Page { items, total: 3 }),
    });
    app
}

#[test]
fn app_routes_hash_activation_to_popover_only() {
    let mut app = loaded_app();

    // author column of row 1
    app.activate_cell(1, 1);
    assert!(!app.detail().is_open());
    let (_, row, full) = app.open_popover().expect("popover open");
    assert_eq!(row, 1);
    assert_eq!(full, "0xauthor10000000000000000000000000000000000");

    // activating again closes it
    app.activate_cell(1, 1);
    assert!(app.open_popover().is_none());

    // row activation opens details without opening a popover
    app.activate_row(2);
    assert_eq!(app.detail().key(), Some("m2"));
    assert!(app.open_popover().is_none());
}

#[test]
fn copy_does_not_close_popover() {
    let mut app = loaded_app();
    app.activate_cell(0, 0);
    app.copy();
    app.copy();
    let (cell, _, full) = app.open_popover().expect("still open after copy");
    assert_eq!(cell.row_key, "m0");
    assert_eq!(full, "m0");
}
