//! ffx - terminal explorer for a ledger middleware node
//!
//! Browses the namespace-scoped REST collections of a node (messages,
//! datatypes) as paged tables, with filters, identifier popovers and a
//! detail overlay.
//!
//! ## Architecture
//!
//! - `controller` holds paging/filter state and decides when to refetch.
//!   It does no IO: it hands out [`controller::FetchRequest`]s and applies
//!   their outcomes, discarding any that a newer request superseded.
//! - `api` and `source` perform the HTTP requests on tokio tasks and send
//!   results back to the UI loop as [`types::AppEvent`]s.
//! - `format`, `disclosure` and `detail` turn records into what the table,
//!   popovers and overlay show.
//! - `app` and `ui` are the terminal front end (ratatui).

pub mod api;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod detail;
pub mod disclosure;
pub mod filter;
pub mod format;
pub mod net;
pub mod query;
pub mod source;
pub mod theme;
pub mod types;

pub mod app;
pub mod ui;

pub use app::{App, InputMode};
pub use config::Config;
pub use controller::ListController;
pub use types::{AppEvent, Page, Record, Resource};
