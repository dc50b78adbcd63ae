//! Slug and id policy
//!
//! Ids are `expr-` followed by the base36 creation time in milliseconds.
//! Issuing is serialized within the process: when two ids are requested in the
//! same millisecond the second one is bumped forward, so a single admin process
//! never hands out the same id twice. Separate processes are not coordinated.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Prefix of every generated id
pub const ID_PREFIX: &str = "expr-";

static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Derive a slug from a title: lower-case, runs of anything but `a-z0-9`
/// collapse to one `-`, no leading or trailing `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// An explicit non-empty slug wins verbatim; otherwise derive one from the title.
pub fn resolve_slug(explicit: Option<&str>, title: &str) -> String {
    match explicit {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slugify(title),
    }
}

/// Format a millisecond timestamp as an id
pub fn format_id(millis: i64) -> String {
    format!("{ID_PREFIX}{}", to_base36(millis.unsigned_abs()))
}

/// Issue a fresh id, skipping any the caller reports as taken.
pub fn next_id(is_taken: impl Fn(&str) -> bool) -> String {
    loop {
        let millis = reserve_millis(Utc::now().timestamp_millis());
        let id = format_id(millis);
        if !is_taken(&id) {
            return id;
        }
    }
}

/// Claim a millisecond strictly after every previously claimed one.
fn reserve_millis(now: i64) -> i64 {
    let mut claimed = now;
    let _ = LAST_ISSUED_MILLIS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        claimed = now.max(last + 1);
        Some(claimed)
    });
    claimed
}

/// Current UTC calendar date as `YYYY-MM-DD`
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
