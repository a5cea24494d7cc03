//! Paging/filter state for one remote list view, and the rules for when it refetches.
//!
//! The controller does no IO itself. Every state change that affects the
//! request returns a [`FetchRequest`]; the caller dispatches it and feeds the
//! outcome back through [`ListController::apply`]. Requests carry a sequence
//! number, and only the outcome of the most recently issued request is
//! applied, so a slow response to an older query can never overwrite the
//! result of a newer one.

use crate::api::FetchError;
use crate::query::{ListQuery, PageSizes};
use crate::types::{Page, Record, Resource};

/// Shared sink for failed fetches (toast, status line, log)
pub trait ErrorReporter {
    fn report(&mut self, err: &FetchError);
}

/// A request the caller should dispatch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub namespace: String,
    pub resource: Resource,
    pub query: ListQuery,
}

/// What happened to a fetch outcome handed to [`ListController::apply`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    Updated,
    Failed,
    /// A newer request was issued in the meantime
    Stale,
}

pub struct ListController {
    namespace: String,
    resource: Resource,
    sizes: PageSizes,
    query: ListQuery,
    page: Option<Page<Record>>,
    next_seq: u64,
    pending: Option<u64>,
    last_error: Option<String>,
}

impl ListController {
    pub fn new(
        namespace: impl Into<String>,
        resource: Resource,
        sizes: PageSizes,
        filter: impl Into<String>,
    ) -> Self {
        let query = ListQuery::new(sizes.default_size(), filter);
        Self {
            namespace: namespace.into(),
            resource,
            sizes,
            query,
            page: None,
            next_seq: 0,
            pending: None,
            last_error: None,
        }
    }

    // ----- getters -----
    pub fn namespace(&self) -> &str { &self.namespace }
    pub fn resource(&self) -> Resource { self.resource }
    pub fn query(&self) -> &ListQuery { &self.query }
    pub fn page_sizes(&self) -> &PageSizes { &self.sizes }
    pub fn loading(&self) -> bool { self.pending.is_some() }
    pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

    /// Whether any page has been received yet
    pub fn loaded(&self) -> bool {
        self.page.is_some()
    }

    pub fn items(&self) -> &[Record] {
        self.page.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    pub fn total(&self) -> u64 {
        self.page.as_ref().map(|p| p.total).unwrap_or(0)
    }

    pub fn find(&self, key: &str) -> Option<&Record> {
        self.items().iter().find(|r| r.key() == key)
    }

    pub fn can_advance(&self) -> bool {
        self.query.can_advance(self.total())
    }

    pub fn can_go_back(&self) -> bool {
        self.query.page_index > 0
    }

    // ----- transitions -----

    /// Issue a request for the current state (initial load, refresh)
    pub fn refresh(&mut self) -> FetchRequest {
        self.next_seq += 1;
        self.pending = Some(self.next_seq);
        log::debug!(
            "[list] issue seq={} {}/{} page={} size={} filter={:?}",
            self.next_seq,
            self.namespace,
            self.resource,
            self.query.page_index,
            self.query.page_size,
            self.query.filter
        );
        FetchRequest {
            seq: self.next_seq,
            namespace: self.namespace.clone(),
            resource: self.resource,
            query: self.query.clone(),
        }
    }

    /// Move one page forward. No-op once the server reported no further data.
    pub fn next_page(&mut self) -> Option<FetchRequest> {
        if !self.can_advance() {
            return None;
        }
        self.query.page_index += 1;
        Some(self.refresh())
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        if self.query.page_index == 0 {
            return None;
        }
        self.query.page_index -= 1;
        Some(self.refresh())
    }

    /// Jump to a page index. Forward jumps are guarded like [`Self::next_page`].
    pub fn set_page(&mut self, page_index: u32) -> Option<FetchRequest> {
        if page_index == self.query.page_index {
            return None;
        }
        if page_index > self.query.page_index
            && self.query.page_size as u64 * page_index as u64 >= self.total()
        {
            return None;
        }
        self.query.page_index = page_index;
        Some(self.refresh())
    }

    /// Change rows per page; always returns to the first page
    pub fn set_page_size(&mut self, page_size: u32) -> Option<FetchRequest> {
        if !self.sizes.contains(page_size) {
            log::warn!("[list] page size {page_size} not in {:?}", self.sizes.as_slice());
            return None;
        }
        self.query.page_index = 0;
        self.query.page_size = page_size;
        Some(self.refresh())
    }

    pub fn cycle_page_size(&mut self) -> Option<FetchRequest> {
        let next = self.sizes.cycle(self.query.page_size);
        self.set_page_size(next)
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) -> Option<FetchRequest> {
        let filter = filter.into();
        if filter == self.query.filter {
            return None;
        }
        self.query.filter = filter;
        self.query.page_index = 0;
        Some(self.refresh())
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) -> Option<FetchRequest> {
        let namespace = namespace.into();
        if namespace == self.namespace {
            return None;
        }
        self.namespace = namespace;
        self.query.page_index = 0;
        Some(self.refresh())
    }

    /// Switch the collection being listed. Held items belong to the old
    /// resource, so they are dropped rather than kept as stale rows.
    pub fn set_resource(&mut self, resource: Resource) -> Option<FetchRequest> {
        if resource == self.resource {
            return None;
        }
        self.resource = resource;
        self.query.page_index = 0;
        self.page = None;
        Some(self.refresh())
    }

    /// Apply the outcome of request `seq`.
    ///
    /// Success replaces items and total together. Failure goes to `reporter`
    /// exactly once and leaves the previous page in place.
    pub fn apply(
        &mut self,
        seq: u64,
        result: Result<Page<Record>, FetchError>,
        reporter: &mut dyn ErrorReporter,
    ) -> Applied {
        if self.pending != Some(seq) {
            log::debug!("[list] discard stale seq={seq} (latest={})", self.next_seq);
            return Applied::Stale;
        }
        self.pending = None;
        match result {
            Ok(page) => {
                log::debug!("[list] apply seq={seq} items={} total={}", page.items.len(), page.total);
                self.page = Some(page);
                self.last_error = None;
                Applied::Updated
            }
            Err(err) => {
                log::error!("[list] fetch seq={seq} failed: {err}");
                self.last_error = Some(err.to_string());
                reporter.report(&err);
                Applied::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Datatype;

    #[derive(Default)]
    struct Errors(Vec<String>);

    impl ErrorReporter for Errors {
        fn report(&mut self, err: &FetchError) {
            self.0.push(err.to_string());
        }
    }

    fn page(n: usize, total: u64) -> Page<Record> {
        let items = (0..n)
            .map(|i| {
                Record::Datatype(Datatype {
                    id: format!("d{i}"),
                    name: None,
                    hash: None,
                    message: None,
                    validator: None,
                    version: None,
                    created: None,
                    namespace: None,
                    value: None,
                })
            })
            .collect();
        Page { items, total }
    }

    fn controller() -> ListController {
        ListController::new("default", Resource::Datatypes, PageSizes::default(), "")
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut c = controller();
        let mut errs = Errors::default();
        let first = c.refresh();
        let second = c.set_filter("&name=x").unwrap();

        assert_eq!(c.apply(first.seq, Ok(page(3, 3)), &mut errs), Applied::Stale);
        assert!(!c.loaded());
        assert!(c.loading());

        assert_eq!(c.apply(second.seq, Ok(page(1, 1)), &mut errs), Applied::Updated);
        assert_eq!(c.items().len(), 1);
        assert!(!c.loading());

        // a late duplicate of the applied request is also ignored
        assert_eq!(c.apply(second.seq, Ok(page(9, 9)), &mut errs), Applied::Stale);
        assert_eq!(c.total(), 1);
    }

    #[test]
    fn namespace_and_filter_reset_page_index() {
        let mut c = controller();
        let mut errs = Errors::default();
        let r = c.refresh();
        c.apply(r.seq, Ok(page(10, 40)), &mut errs);
        c.next_page().unwrap();
        c.next_page().unwrap();
        assert_eq!(c.query().page_index, 2);

        let r = c.set_namespace("other").unwrap();
        assert_eq!(r.query.page_index, 0);
        assert_eq!(r.namespace, "other");

        c.apply(r.seq, Ok(page(10, 40)), &mut errs);
        c.next_page().unwrap();
        let r = c.set_filter("&name=widget").unwrap();
        assert_eq!(r.query.page_index, 0);
        assert_eq!(r.query.filter, "&name=widget");
    }

    #[test]
    fn unchanged_inputs_do_not_refetch() {
        let mut c = controller();
        assert!(c.set_filter("").is_none());
        assert!(c.set_namespace("default").is_none());
        assert!(c.set_resource(Resource::Datatypes).is_none());
        assert!(c.prev_page().is_none());
        assert!(c.set_page_size(33).is_none());
    }

    #[test]
    fn resource_switch_clears_rows() {
        let mut c = controller();
        let mut errs = Errors::default();
        let r = c.refresh();
        c.apply(r.seq, Ok(page(2, 2)), &mut errs);
        let r = c.set_resource(Resource::Messages).unwrap();
        assert_eq!(r.resource, Resource::Messages);
        assert!(c.items().is_empty());
        assert!(!c.loaded());
    }

    #[test]
    fn set_page_guards_forward_jumps() {
        let mut c = controller();
        let mut errs = Errors::default();
        let r = c.refresh();
        c.apply(r.seq, Ok(page(10, 25)), &mut errs);
        assert!(c.set_page(3).is_none());
        let r = c.set_page(2).unwrap();
        assert_eq!(r.query.skip(), 20);
        let r = c.set_page(0).unwrap();
        assert_eq!(r.query.skip(), 0);
    }
}
