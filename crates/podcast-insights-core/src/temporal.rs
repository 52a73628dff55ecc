//! Recency scoring from a publication date.
//!
//! ```text
//! age   = clamp(now - published_at, 0, max_age_days)      (whole days)
//! score = max(0.5, 1 - age / (2 × max_age_days))
//! ```
//!
//! Fresh content scores `1.0`, anything at or beyond `max_age_days` scores
//! `0.5`, and the score falls linearly in between. Missing or unparsable
//! dates get the neutral `0.5`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Default age window, in days.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 365;

/// Score given to undated content and the floor for old content.
pub const NEUTRAL_SCORE: f64 = 0.5;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

/// Temporal relevance of `published_at` relative to the current time.
pub fn temporal_score(published_at: Option<&str>, max_age_days: i64) -> f64 {
    temporal_score_at(published_at, max_age_days, Utc::now())
}

/// Temporal relevance of `published_at` relative to `now`.
///
/// Never fails: absent dates, unparsable dates, and a non-positive
/// `max_age_days` all yield [`NEUTRAL_SCORE`]. Future dates count as age 0.
pub fn temporal_score_at(published_at: Option<&str>, max_age_days: i64, now: DateTime<Utc>) -> f64 {
    let raw = match published_at.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return NEUTRAL_SCORE,
    };

    if max_age_days <= 0 {
        return NEUTRAL_SCORE;
    }

    let published = match parse_published_at(raw) {
        Some(dt) => dt,
        None => {
            tracing::debug!(published_at = raw, "unparsable publication date, using neutral score");
            return NEUTRAL_SCORE;
        }
    };

    let age_days = (now - published).num_days().clamp(0, max_age_days);
    let score = 1.0 - age_days as f64 / (2.0 * max_age_days as f64);
    score.max(NEUTRAL_SCORE)
}

/// Parse a publication date in any of the formats transcripts carry.
///
/// Accepts RFC 3339, ISO date-times without offset, and plain dates
/// (`YYYY-MM-DD`, `YYYYMMDD`, `YYYY/MM/DD`). Naive values are taken as UTC.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ndt.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
        }
    }

    None
}
