//! Filter bar query language.
//!
//! A query is a whitespace-separated list of `key:value` tokens, e.g.
//! `created:24h topic:orders,payments author:0xab`. Comma-separated values
//! mean "any of" and are sent as repeated parameters. Bare tokens filter on
//! the resource's default field (message topics, datatype name), or on `id`
//! when they look like a UUID.
//!
//! The compiled form is the opaque, URL-encoded fragment appended to list
//! requests (`&created=%3E%3D1641390600&topics=orders`).

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeDelta, Utc};

use crate::types::Resource;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    /// Lower bound on `created`, resolved against the compile-time clock
    pub created_since: Option<DateTime<Utc>>,
    /// Backend field name and raw (unencoded) value, in query order
    pub params: Vec<(String, String)>,
}

impl CompiledFilter {
    pub fn is_empty(&self) -> bool {
        self.created_since.is_none() && self.params.is_empty()
    }

    /// Encoded fragment for `ListQuery::filter`; empty when there is nothing to filter
    pub fn to_fragment(&self) -> String {
        let mut out = String::new();
        if let Some(since) = self.created_since {
            out.push_str("&created=");
            out.push_str(&urlencoding::encode(&format!(">={}", since.timestamp())));
        }
        for (k, v) in &self.params {
            out.push('&');
            out.push_str(&urlencoding::encode(k));
            out.push('=');
            out.push_str(&urlencoding::encode(v));
        }
        out
    }
}

/// Compile a filter bar query for `resource`, resolving relative windows against `now`
pub fn compile_filter(q: &str, resource: Resource, now: DateTime<Utc>) -> Result<CompiledFilter> {
    let mut f = CompiledFilter::default();
    for tok in q.split_whitespace() {
        let mut it = tok.splitn(2, ':');
        match (it.next(), it.next()) {
            (Some(k), Some(v)) if !k.is_empty() => push(&mut f, resource, k, v, now)?,
            _ => {
                let field = if is_likely_uuid(tok) {
                    "id"
                } else {
                    default_field(resource)
                };
                f.params.push((field.to_string(), tok.to_string()));
            }
        }
    }
    Ok(f)
}

fn push(
    f: &mut CompiledFilter,
    resource: Resource,
    k: &str,
    v: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let key = k.to_lowercase();
    if key == "created" || key == "since" {
        let window = parse_window(v)?;
        // windows reaching back before the epoch are not valid `created` bounds
        let since = now
            .checked_sub_signed(window)
            .filter(|t| t.timestamp() >= 0)
            .ok_or_else(|| anyhow!("created window '{v}' is out of range"))?;
        f.created_since = Some(since);
        return Ok(());
    }

    let field = field_for(resource, &key).unwrap_or(key.as_str()).to_string();
    for value in v.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        f.params.push((field.clone(), value.to_string()));
    }
    Ok(())
}

/// Map filter bar aliases onto backend field names
fn field_for(resource: Resource, key: &str) -> Option<&'static str> {
    let field = match (resource, key) {
        (_, "id") => "id",
        (Resource::Messages, "author" | "from") => "author",
        (Resource::Messages, "type") => "type",
        (Resource::Messages, "topic" | "topics") => "topics",
        (Resource::Messages, "tag" | "context") => "tag",
        (Resource::Messages, "tx" | "txtype") => "txtype",
        (Resource::Messages, "group") => "group",
        (Resource::Messages, "hash" | "datahash") => "datahash",
        (Resource::Messages, "state") => "state",
        (Resource::Datatypes, "name") => "name",
        (Resource::Datatypes, "version") => "version",
        (Resource::Datatypes, "validator") => "validator",
        (Resource::Datatypes, "hash") => "hash",
        (Resource::Datatypes, "message" | "msg") => "message",
        _ => return None,
    };
    Some(field)
}

fn default_field(resource: Resource) -> &'static str {
    match resource {
        Resource::Messages => "topics",
        Resource::Datatypes => "name",
    }
}

/// `30m`, `24h`, `7d`
fn parse_window(v: &str) -> Result<TimeDelta> {
    let v = v.trim();
    let split = v.char_indices().last().map(|(i, _)| i).unwrap_or(0);
    let (num, unit) = v.split_at(split);
    let n: i64 = num
        .parse()
        .map_err(|_| anyhow!("invalid created window '{v}' (expected e.g. 24h, 7d, 30d)"))?;
    if n <= 0 {
        return Err(anyhow!("created window must be positive, got '{v}'"));
    }
    let window = match unit {
        "m" => TimeDelta::try_minutes(n),
        "h" => TimeDelta::try_hours(n),
        "d" => TimeDelta::try_days(n),
        _ => return Err(anyhow!("invalid created window unit in '{v}' (use m, h or d)")),
    };
    window.ok_or_else(|| anyhow!("created window '{v}' is out of range"))
}

fn is_likely_uuid(tok: &str) -> bool {
    tok.len() == 36
        && tok.chars().enumerate().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}
