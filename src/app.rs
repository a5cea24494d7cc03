use std::time::{Duration, Instant};

use chrono::Utc;
use ratatui::layout::{Position, Rect};
use ratatui::widgets::TableState;

use crate::api::FetchError;
use crate::clipboard::Clipboard;
use crate::controller::{Applied, ErrorReporter, FetchRequest, ListController};
use crate::detail::{detail_body, SelectedDetail, MAX_BODY_BYTES};
use crate::disclosure::{dispatch, CellRef, ClickHandlers, DisclosureSet, HitTarget};
use crate::filter::compile_filter;
use crate::format::{format_record, headers_for, Cell, Row};
use crate::query::PageSizes;
use crate::theme::{ColorScheme, Theme};
use crate::types::{AppEvent, Resource};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode { Normal, Filter, Namespace }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind { Info, Error }

const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Transient notifications; also the error sink for failed fetches
#[derive(Default, Debug)]
pub struct Toasts {
    current: Option<(String, ToastKind, Instant)>,
    errors_reported: usize,
}

impl Toasts {
    pub fn show(&mut self, msg: impl Into<String>, kind: ToastKind) {
        self.current = Some((msg.into(), kind, Instant::now()));
    }

    pub fn current(&self) -> Option<(&str, ToastKind)> {
        self.current.as_ref().and_then(|(msg, kind, at)| {
            (at.elapsed() < TOAST_DURATION).then_some((msg.as_str(), *kind))
        })
    }

    pub fn errors_reported(&self) -> usize {
        self.errors_reported
    }
}

impl ErrorReporter for Toasts {
    fn report(&mut self, err: &FetchError) {
        self.errors_reported += 1;
        self.show(format!("Fetch failed: {err}"), ToastKind::Error);
    }
}

/// Where the table was drawn last frame, for mouse hit-testing
#[derive(Clone, Debug, Default)]
pub struct TableLayout {
    /// First data row on screen (below the header)
    pub body: Rect,
    /// `(x, width)` per column
    pub columns: Vec<(u16, u16)>,
}

impl TableLayout {
    fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.body.x
            && col < self.body.x + self.body.width
            && row >= self.body.y
            && row < self.body.y + self.body.height
    }
}

pub struct App {
    quit: bool,
    fps: u32,
    theme: Theme,

    list: ListController,
    outbox: Option<FetchRequest>,

    // Table cursor
    table_state: TableState,
    sel_col: usize,
    layout: TableLayout,

    disclosures: DisclosureSet,
    detail: SelectedDetail,
    detail_viewport_height: u16,
    /// Overlay rect from the last frame; `None` until drawn
    detail_area: Option<Rect>,

    // Filter / namespace prompts
    input_mode: InputMode,
    input: String,
    filter_query: String,

    toasts: Toasts,
    clipboard: Box<dyn Clipboard + Send>,
}

impl App {
    pub fn new(
        namespace: impl Into<String>,
        resource: Resource,
        sizes: PageSizes,
        fps: u32,
        theme: Theme,
        clipboard: Box<dyn Clipboard + Send>,
    ) -> Self {
        let mut app = Self {
            quit: false,
            fps,
            theme,
            list: ListController::new(namespace, resource, sizes, ""),
            outbox: None,
            table_state: TableState::default(),
            sel_col: 0,
            layout: TableLayout::default(),
            disclosures: DisclosureSet::default(),
            detail: SelectedDetail::default(),
            detail_viewport_height: 20,
            detail_area: None,
            input_mode: InputMode::Normal,
            input: String::new(),
            filter_query: String::new(),
            toasts: Toasts::default(),
            clipboard,
        };
        let req = app.list.refresh();
        app.push_request(Some(req));
        app
    }

    // ----- getters -----
    pub fn quit_flag(&self) -> bool { self.quit }
    pub fn fps(&self) -> u32 { self.fps }
    pub fn theme(&self) -> ColorScheme { self.theme.colors() }
    pub fn list(&self) -> &ListController { &self.list }
    pub fn input_mode(&self) -> InputMode { self.input_mode }
    pub fn input(&self) -> &str { &self.input }
    pub fn filter_query(&self) -> &str { &self.filter_query }
    pub fn detail(&self) -> &SelectedDetail { &self.detail }
    pub fn disclosures(&self) -> &DisclosureSet { &self.disclosures }
    pub fn toasts(&self) -> &Toasts { &self.toasts }
    pub fn sel_col(&self) -> usize { self.sel_col }
    pub fn table_state_mut(&mut self) -> &mut TableState { &mut self.table_state }
    pub fn table_layout(&self) -> &TableLayout { &self.layout }
    pub fn table_offset(&self) -> usize { self.table_state.offset() }
    pub fn detail_area(&self) -> Option<Rect> { self.detail_area }

    pub fn sel_row(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn headers(&self) -> &'static [&'static str] {
        headers_for(self.list.resource())
    }

    /// Display rows for the current page
    pub fn rows(&self) -> Vec<Row> {
        self.list.items().iter().map(format_record).collect()
    }

    /// The open popover's cell and full value, if it is still on screen
    pub fn open_popover(&self) -> Option<(CellRef, usize, String)> {
        let cell = self.disclosures.open_cell()?.clone();
        let row_idx = self.list.items().iter().position(|r| r.key() == cell.row_key)?;
        let row = format_record(&self.list.items()[row_idx]);
        let full = row.cells.get(cell.col)?.full_hash()?.to_string();
        Some((cell, row_idx, full))
    }

    /// Pretty body of the selected record while the overlay is open
    pub fn detail_text(&self) -> Option<String> {
        self.detail
            .resolve(&self.list)
            .map(|r| detail_body(r, MAX_BODY_BYTES))
    }

    pub fn set_table_layout(&mut self, layout: TableLayout) {
        self.layout = layout;
    }

    pub fn set_detail_viewport_height(&mut self, height: u16) {
        self.detail_viewport_height = height;
    }

    pub fn set_detail_area(&mut self, area: Option<Rect>) {
        self.detail_area = area;
    }

    pub fn show_toast(&mut self, msg: impl Into<String>) {
        self.toasts.show(msg, ToastKind::Info);
    }

    /// Request the binary should dispatch, if any. Changes made within one
    /// frame coalesce into the latest request.
    pub fn take_request(&mut self) -> Option<FetchRequest> {
        self.outbox.take()
    }

    fn push_request(&mut self, req: Option<FetchRequest>) {
        if let Some(req) = req {
            if let Some(old) = self.outbox.replace(req) {
                log::debug!("[app] coalesced undispatched seq={}", old.seq);
            }
        }
    }

    // ----- events -----
    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::PageLoaded { seq, query, result } => {
                let applied = self.list.apply(seq, result, &mut self.toasts);
                log::debug!("[app] seq={seq} page={} -> {applied:?}", query.page_index);
                if applied == Applied::Updated {
                    self.after_page_change();
                }
            }
            AppEvent::Quit => self.quit = true,
        }
    }

    fn after_page_change(&mut self) {
        let keys: Vec<String> = self.list.items().iter().map(|r| r.key().to_string()).collect();
        self.disclosures.retain_rows(keys.iter().map(String::as_str));
        self.detail.sync(&self.list);
        let len = keys.len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    // ----- paging -----
    pub fn refresh(&mut self) {
        let req = self.list.refresh();
        self.push_request(Some(req));
    }

    pub fn next_page(&mut self) {
        let req = self.list.next_page();
        if req.is_some() {
            self.table_state.select(Some(0));
        }
        self.push_request(req);
    }

    pub fn prev_page(&mut self) {
        let req = self.list.prev_page();
        if req.is_some() {
            self.table_state.select(Some(0));
        }
        self.push_request(req);
    }

    pub fn cycle_page_size(&mut self) {
        let req = self.list.cycle_page_size();
        self.push_request(req);
        self.show_toast(format!("{} rows per page", self.list.query().page_size));
    }

    pub fn next_resource(&mut self) {
        let next = self.list.resource().next();
        self.disclosures.dismiss_all();
        self.detail.clear();
        self.sel_col = 0;
        self.table_state.select(None);
        let req = self.list.set_resource(next);
        self.push_request(req);
        // field aliases differ per resource
        if !self.filter_query.is_empty() {
            let query = self.filter_query.clone();
            self.apply_filter_text(&query);
        }
    }

    // ----- cursor -----
    pub fn up(&mut self) {
        if self.detail.is_open() {
            self.scroll_detail(-1);
            return;
        }
        self.disclosures.dismiss_all();
        let i = self.table_state.selected().unwrap_or(0);
        if !self.list.items().is_empty() {
            self.table_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn down(&mut self) {
        if self.detail.is_open() {
            self.scroll_detail(1);
            return;
        }
        self.disclosures.dismiss_all();
        let len = self.list.items().len();
        if len == 0 {
            return;
        }
        let i = self.table_state.selected().map(|i| i + 1).unwrap_or(0);
        self.table_state.select(Some(i.min(len - 1)));
    }

    pub fn left(&mut self) {
        self.disclosures.dismiss_all();
        self.sel_col = self.sel_col.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.disclosures.dismiss_all();
        let max = self.headers().len().saturating_sub(1);
        self.sel_col = (self.sel_col + 1).min(max);
    }

    pub fn scroll_detail(&mut self, delta: i32) {
        let max = self
            .detail_text()
            .map(|t| t.lines().count().saturating_sub(self.detail_viewport_height as usize))
            .unwrap_or(0);
        self.detail.scroll_by(delta, max.min(u16::MAX as usize) as u16);
    }

    // ----- activation -----

    /// Row activation: open the detail overlay
    pub fn activate_row(&mut self, row: usize) {
        let Some(key) = self.list.items().get(row).map(|r| r.key().to_string()) else {
            return;
        };
        self.table_state.select(Some(row));
        self.disclosures.dismiss_all();
        self.detail.select(key);
    }

    /// Cell activation: toggle the identifier popover, if the cell has one
    pub fn activate_cell(&mut self, row: usize, col: usize) {
        let Some(record) = self.list.items().get(row) else {
            return;
        };
        let cells = format_record(record).cells;
        if !matches!(cells.get(col), Some(Cell::Hash(_))) {
            return;
        }
        let cell = CellRef::new(record.key(), col);
        self.table_state.select(Some(row));
        self.sel_col = col;
        self.disclosures.activate(&cell);
    }

    pub fn activate_selected_row(&mut self) {
        if let Some(row) = self.table_state.selected() {
            self.activate_row(row);
        }
    }

    pub fn activate_selected_cell(&mut self) {
        if let Some(row) = self.table_state.selected() {
            self.activate_cell(row, self.sel_col);
        }
    }

    /// Map a terminal position onto the last drawn table
    pub fn hit_test(&self, col: u16, row: u16) -> HitTarget {
        if !self.layout.contains(col, row) {
            return HitTarget::Outside;
        }
        let idx = (row - self.layout.body.y) as usize + self.table_offset();
        let Some(record) = self.list.items().get(idx) else {
            return HitTarget::Outside;
        };
        let column = self
            .layout
            .columns
            .iter()
            .position(|&(x, w)| col >= x && col < x + w);
        match column {
            Some(c) if matches!(format_record(record).cells.get(c), Some(Cell::Hash(_))) => {
                HitTarget::Hash { row: idx, col: c }
            }
            _ => HitTarget::Row(idx),
        }
    }

    /// Mouse click. While the detail overlay is open it owns the pointer:
    /// clicks inside it are ignored, anything else dismisses it and stops there.
    pub fn click(&mut self, col: u16, row: u16) {
        if self.detail.is_open() {
            let inside = self
                .detail_area
                .is_some_and(|a| a.contains(Position::new(col, row)));
            if !inside {
                self.detail.clear();
            }
            return;
        }
        let target = self.hit_test(col, row);
        dispatch(target, self);
    }

    /// Esc: innermost layer first
    pub fn dismiss(&mut self) {
        if self.disclosures.open_cell().is_some() {
            self.disclosures.dismiss_all();
        } else if self.detail.is_open() {
            self.detail.clear();
        } else if !self.filter_query.is_empty() {
            self.filter_query.clear();
            let req = self.list.set_filter("");
            self.push_request(req);
        }
    }

    /// `c`: popover value, else detail JSON, else the selected row's id
    pub fn copy(&mut self) {
        let text = if let Some((_, _, full)) = self.open_popover() {
            Some(full)
        } else if let Some(body) = self.detail.resolve(&self.list).map(|r| {
            serde_json::to_string_pretty(&r.to_json()).unwrap_or_default()
        }) {
            Some(body)
        } else {
            self.table_state
                .selected()
                .and_then(|i| self.list.items().get(i))
                .map(|r| r.key().to_string())
        };
        let Some(text) = text else {
            return;
        };
        if self.clipboard.copy(&text) {
            self.show_toast("Copied");
        } else {
            self.toasts.show("Copy failed", ToastKind::Error);
        }
    }

    // ----- prompts -----
    pub fn start_filter(&mut self) {
        self.input_mode = InputMode::Filter;
        self.input = self.filter_query.clone();
    }

    pub fn start_namespace(&mut self) {
        self.input_mode = InputMode::Namespace;
        self.input = self.list.namespace().to_string();
    }

    pub fn input_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn input_backspace(&mut self) {
        self.input.pop();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        match self.input_mode {
            InputMode::Filter => {
                if !self.apply_filter_text(text.trim()) {
                    // keep the prompt open so the query can be fixed
                    self.input = text;
                    return;
                }
            }
            InputMode::Namespace => {
                let ns = text.trim();
                if ns.is_empty() {
                    self.toasts.show("Namespace cannot be empty", ToastKind::Error);
                    self.input = text;
                    return;
                }
                self.detail.clear();
                self.disclosures.dismiss_all();
                let req = self.list.set_namespace(ns);
                self.push_request(req);
            }
            InputMode::Normal => {}
        }
        self.input_mode = InputMode::Normal;
    }

    /// Compile and apply a filter query; false (with a toast) when it doesn't parse
    pub fn apply_filter_text(&mut self, query: &str) -> bool {
        match compile_filter(query, self.list.resource(), Utc::now()) {
            Ok(f) => {
                self.filter_query = query.to_string();
                let req = self.list.set_filter(f.to_fragment());
                self.push_request(req);
                true
            }
            Err(e) => {
                self.toasts.show(format!("Invalid filter: {e}"), ToastKind::Error);
                false
            }
        }
    }
}

impl ClickHandlers for App {
    fn on_row(&mut self, row: usize) {
        self.activate_row(row);
    }

    fn on_hash(&mut self, row: usize, col: usize) {
        self.activate_cell(row, col);
    }

    fn on_outside(&mut self) {
        self.disclosures.dismiss_all();
    }
}
