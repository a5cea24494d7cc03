//! Record → table row mapping.
//!
//! Each resource has one [`RecordFormatter`]; [`format_record`] picks the
//! right one for a [`Record`]. Formatting is pure: it only reads the record.

use chrono::{DateTime, Utc};

use crate::types::{Datatype, Message, Record, Resource};

/// Placeholder for absent or unparseable values
pub const PLACEHOLDER: &str = "-";

/// Display format for `created` columns (`01/05/2022 2:30 PM`)
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %-I:%M %p";

/// One display cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    /// Identifier shown short, full value behind a disclosure popover
    Hash(String),
    /// Check mark (e.g. pinned message)
    Check,
    Empty,
}

impl Cell {
    fn text(v: Option<&str>) -> Cell {
        match v {
            Some(s) if !s.is_empty() => Cell::Text(s.to_string()),
            _ => Cell::Empty,
        }
    }

    fn hash(v: Option<&str>) -> Cell {
        match v {
            Some(s) if !s.is_empty() => Cell::Hash(s.to_string()),
            _ => Cell::Empty,
        }
    }

    /// Text as drawn in the table
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Hash(h) => short_hash(h),
            Cell::Check => "✓".to_string(),
            Cell::Empty => PLACEHOLDER.to_string(),
        }
    }

    /// Full identifier, if this cell discloses one
    pub fn full_hash(&self) -> Option<&str> {
        match self {
            Cell::Hash(h) => Some(h),
            _ => None,
        }
    }
}

/// Keyed row of cells, one per header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub key: String,
    pub cells: Vec<Cell>,
}

pub trait RecordFormatter<T> {
    fn headers(&self) -> &'static [&'static str];
    /// Cells in header order
    fn cells(&self, record: &T) -> Vec<Cell>;
}

pub struct DatatypeFormatter;

impl RecordFormatter<Datatype> for DatatypeFormatter {
    fn headers(&self) -> &'static [&'static str] {
        &["ID", "Name", "Data Hash", "Message ID", "Validator", "Version", "Created"]
    }

    fn cells(&self, d: &Datatype) -> Vec<Cell> {
        vec![
            Cell::hash(Some(&d.id)),
            Cell::text(d.name.as_deref()),
            Cell::hash(d.hash.as_deref()),
            Cell::hash(d.message.as_deref()),
            Cell::text(d.validator.as_deref()),
            Cell::text(d.version.as_deref()),
            Cell::Text(format_timestamp(d.created.as_deref())),
        ]
    }
}

pub struct MessageFormatter;

impl RecordFormatter<Message> for MessageFormatter {
    fn headers(&self) -> &'static [&'static str] {
        &["ID", "Author", "Type", "Topic", "Context", "Pinned", "Data Hash", "Created"]
    }

    fn cells(&self, m: &Message) -> Vec<Cell> {
        let h = &m.header;
        vec![
            Cell::hash(Some(&h.id)),
            Cell::hash(h.author.as_deref()),
            Cell::text(h.kind.as_deref()),
            Cell::text(h.topic()),
            Cell::text(h.context()),
            if h.is_pinned() { Cell::Check } else { Cell::Empty },
            Cell::hash(h.datahash.as_deref()),
            Cell::Text(format_timestamp(h.created.as_deref())),
        ]
    }
}

pub fn headers_for(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::Messages => MessageFormatter.headers(),
        Resource::Datatypes => DatatypeFormatter.headers(),
    }
}

pub fn format_record(record: &Record) -> Row {
    let cells = match record {
        Record::Message(m) => MessageFormatter.cells(m),
        Record::Datatype(d) => DatatypeFormatter.cells(d),
    };
    Row { key: record.key().to_string(), cells }
}

/// RFC 3339 instant → `MM/DD/YYYY h:mm A` (UTC); anything else → placeholder
pub fn format_timestamp(ts: Option<&str>) -> String {
    ts.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// `0x1234abcd…9f0e` style shortening for long identifiers
pub fn short_hash(s: &str) -> String {
    const HEAD: usize = 8;
    const TAIL: usize = 4;
    let n = s.chars().count();
    if n <= HEAD + TAIL + 2 {
        return s.to_string();
    }
    let head: String = s.chars().take(HEAD).collect();
    let tail: String = s.chars().skip(n - TAIL).collect();
    format!("{head}…{tail}")
}
