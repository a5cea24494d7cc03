//! Hash disclosure popovers and click routing for table rows.
//!
//! Identifier cells show a shortened hash. Activating one toggles a popover
//! with the full value and a copy action. Clicks are routed to exactly one
//! handler: a click on an identifier cell never activates its row.

use std::collections::HashMap;

use crate::clipboard::Clipboard;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Disclosure {
    #[default]
    Closed,
    Open,
}

impl Disclosure {
    pub fn is_open(&self) -> bool {
        *self == Disclosure::Open
    }

    pub fn activate(&mut self) {
        *self = match self {
            Disclosure::Closed => Disclosure::Open,
            Disclosure::Open => Disclosure::Closed,
        };
    }

    pub fn dismiss(&mut self) {
        *self = Disclosure::Closed;
    }

    /// Copy the full value. Leaves the popover as it is.
    pub fn copy(&self, full: &str, clipboard: &mut dyn Clipboard) -> bool {
        clipboard.copy(full)
    }
}

/// Identifies one identifier cell: row key and column index
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row_key: String,
    pub col: usize,
}

impl CellRef {
    pub fn new(row_key: impl Into<String>, col: usize) -> Self {
        Self { row_key: row_key.into(), col }
    }
}

/// Popover state for all identifier cells of one table.
///
/// Only one popover is shown at a time: opening one dismisses the others.
#[derive(Default, Debug)]
pub struct DisclosureSet {
    states: HashMap<CellRef, Disclosure>,
}

impl DisclosureSet {
    pub fn state(&self, cell: &CellRef) -> Disclosure {
        self.states.get(cell).copied().unwrap_or_default()
    }

    pub fn open_cell(&self) -> Option<&CellRef> {
        self.states
            .iter()
            .find(|(_, d)| d.is_open())
            .map(|(c, _)| c)
    }

    pub fn activate(&mut self, cell: &CellRef) {
        for (c, d) in self.states.iter_mut() {
            if c != cell {
                d.dismiss();
            }
        }
        self.states.entry(cell.clone()).or_default().activate();
    }

    /// Outside-dismiss: close whatever is open
    pub fn dismiss_all(&mut self) {
        for d in self.states.values_mut() {
            d.dismiss();
        }
    }

    /// Drop widgets whose rows are no longer displayed
    pub fn retain_rows<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        let keep: Vec<&str> = keys.into_iter().collect();
        self.states.retain(|c, _| keep.contains(&c.row_key.as_str()));
    }
}

/// What a click landed on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Row(usize),
    Hash { row: usize, col: usize },
    Outside,
}

/// Click handlers for a table. The innermost handler for a hit is the only one called.
pub trait ClickHandlers {
    fn on_row(&mut self, row: usize);
    fn on_hash(&mut self, row: usize, col: usize);
    fn on_outside(&mut self) {}
}

pub fn dispatch(target: HitTarget, handlers: &mut dyn ClickHandlers) {
    match target {
        HitTarget::Hash { row, col } => handlers.on_hash(row, col),
        HitTarget::Row(row) => handlers.on_row(row),
        HitTarget::Outside => handlers.on_outside(),
    }
}
