//! Paging behaviour of the remote list controller

use ffx::api::FetchError;
use ffx::controller::{Applied, ErrorReporter, ListController};
use ffx::query::PageSizes;
use ffx::types::{Datatype, Page, Record, Resource};

#[derive(Default)]
struct SpyReporter {
    errors: Vec<String>,
}

impl ErrorReporter for SpyReporter {
    fn report(&mut self, err: &FetchError) {
        self.errors.push(err.to_string());
    }
}

fn datatypes(range: std::ops::Range<usize>) -> Vec<Record> {
    range
        .map(|i| {
            Record::Datatype(Datatype {
                id: format!("dt-{i}"),
                name: Some(format!("type{i}")),
                hash: None,
                message: None,
                validator: Some("json".into()),
                version: Some("1".into()),
                created: None,
                namespace: Some("default".into()),
                value: None,
            })
        })
        .collect()
}

fn controller(sizes: &[u32]) -> ListController {
    ListController::new(
        "default",
        Resource::Datatypes,
        PageSizes::new(sizes.to_vec()).unwrap(),
        "",
    )
}

#[test]
fn advancing_past_last_page_is_a_noop() {
    for &size in &[10u32, 25] {
        for total in [0u64, 1, 9, 10, 11, 24, 25, 26, 49, 50, 51] {
            let mut c = controller(&[10, 25]);
            let mut spy = SpyReporter::default();
            c.set_page_size(size);
            let req = c.refresh();
            c.apply(req.seq, Ok(Page { items: vec![], total }), &mut spy);

            // walk forward until the guard stops us
            let mut steps = 0;
            while c.next_page().is_some() {
                steps += 1;
                assert!(steps < 100, "runaway paging");
            }
            let idx = c.query().page_index;
            assert!(
                size as u64 * (idx as u64 + 1) >= total,
                "size={size} total={total} stopped early at {idx}"
            );
            assert!(c.next_page().is_none());
            assert_eq!(c.query().page_index, idx, "rejected advance must not move");
        }
    }
}

#[test]
fn page_size_change_always_resets_index() {
    let mut c = controller(&[10, 25, 50]);
    let mut spy = SpyReporter::default();
    let req = c.refresh();
    c.apply(req.seq, Ok(Page { items: datatypes(0..10), total: 500 }), &mut spy);
    for _ in 0..7 {
        c.next_page().unwrap();
    }
    assert_eq!(c.query().page_index, 7);

    for size in [25, 50, 10, 10] {
        let req = c.set_page_size(size).expect("allowed size refetches");
        assert_eq!(req.query.page_index, 0);
        assert_eq!(req.query.page_size, size);
        assert_eq!(req.query.skip(), 0);
        c.apply(req.seq, Ok(Page { items: datatypes(0..10), total: 500 }), &mut spy);
        c.next_page().unwrap();
        c.next_page().unwrap();
    }
}

#[test]
fn empty_state() {
    let mut c = controller(&[10, 25]);
    let mut spy = SpyReporter::default();
    let req = c.refresh();
    assert_eq!(
        c.apply(req.seq, Ok(Page { items: vec![], total: 0 }), &mut spy),
        Applied::Updated
    );
    assert!(c.loaded());
    assert!(c.items().is_empty());
    assert!(!c.can_advance());
    assert!(c.next_page().is_none());
    assert_eq!(c.query().range_label(c.items().len()), "0 - 0");
    assert_eq!(Resource::Datatypes.empty_text(), "No datatypes to display");
}

#[test]
fn two_page_fetch() {
    let mut c = controller(&[10, 25]);
    let mut spy = SpyReporter::default();

    let first = c.refresh();
    assert_eq!(first.query.query_string(), "limit=10&count&skip=0");
    c.apply(first.seq, Ok(Page { items: datatypes(0..10), total: 15 }), &mut spy);
    assert_eq!(c.items().len(), 10);

    let second = c.next_page().expect("15 > 10, second page exists");
    assert_eq!(second.query.page_index, 1);
    assert_eq!(second.query.query_string(), "limit=10&count&skip=10");
    c.apply(second.seq, Ok(Page { items: datatypes(10..15), total: 15 }), &mut spy);
    assert_eq!(c.total(), 15);
    assert_eq!(c.items().len(), 5);
    assert_eq!(c.query().range_label(c.items().len()), "11 - 15");

    // 10 * 2 = 20 >= 15
    assert!(c.next_page().is_none());
    assert_eq!(c.query().page_index, 1);

    // backward is unguarded
    let back = c.prev_page().unwrap();
    assert_eq!(back.query.skip(), 0);
}

#[test]
fn error_keeps_stale_data() {
    let mut c = controller(&[10, 25]);
    let mut spy = SpyReporter::default();

    let req = c.refresh();
    c.apply(req.seq, Ok(Page { items: datatypes(0..5), total: 5 }), &mut spy);

    let req = c.set_filter("&name=missing").unwrap();
    let applied = c.apply(
        req.seq,
        Err(FetchError::Status { status: 500, body: "boom".into() }),
        &mut spy,
    );
    assert_eq!(applied, Applied::Failed);
    assert_eq!(c.items().len(), 5);
    assert_eq!(c.items()[0].key(), "dt-0");
    assert_eq!(c.total(), 5);
    assert_eq!(spy.errors.len(), 1);
    assert!(spy.errors[0].contains("500"));
    assert!(c.last_error().is_some());
    assert!(!c.loading());
}

#[test]
fn every_error_kind_is_reported_once() {
    let errors = [
        FetchError::Transport("connection refused".into()),
        FetchError::Status { status: 404, body: "not found".into() },
        FetchError::Decode("expected object or array".into()),
    ];
    let mut c = controller(&[10]);
    let mut spy = SpyReporter::default();
    for err in errors {
        let req = c.refresh();
        assert_eq!(c.apply(req.seq, Err(err), &mut spy), Applied::Failed);
    }
    assert_eq!(spy.errors.len(), 3);
    assert!(!c.loaded(), "failures never fabricate an empty page");
}

#[test]
fn out_of_order_responses_keep_newest() {
    let mut c = controller(&[10, 25]);
    let mut spy = SpyReporter::default();
    let req = c.refresh();
    c.apply(req.seq, Ok(Page { items: datatypes(0..10), total: 30 }), &mut spy);

    let page2 = c.next_page().unwrap();
    let page3 = c.next_page().unwrap();

    // page 3 lands first, then the older page 2 response
    assert_eq!(
        c.apply(page3.seq, Ok(Page { items: datatypes(20..30), total: 30 }), &mut spy),
        Applied::Updated
    );
    assert_eq!(
        c.apply(page2.seq, Ok(Page { items: datatypes(10..20), total: 30 }), &mut spy),
        Applied::Stale
    );
    assert_eq!(c.items()[0].key(), "dt-20");

    // a stale failure is not reported either
    let newer = c.refresh();
    let _ = c.set_filter("&name=x").unwrap();
    assert_eq!(
        c.apply(newer.seq, Err(FetchError::Transport("late".into())), &mut spy),
        Applied::Stale
    );
    assert!(spy.errors.is_empty());
}
