//! Response extraction
//!
//! The analyst stage returns free-form text that usually, but not always,
//! is a bare JSON document. This module is the single place where that
//! untrusted text becomes validated [`PaperRecord`]s.
//!
//! Candidates are tried in order:
//!
//! 1. The whole text, parsed as JSON.
//! 2. Every balanced `[...]` / `{...}` region, in order of its opening
//!    bracket. Brackets inside quoted strings do not count. A region that
//!    parses but has the wrong shape is skipped and the regions nested
//!    inside it are tried next.
//!
//! The first candidate holding paper entries wins. An empty list is only
//! returned when no candidate holds any entries. Individual entries that
//! fail validation are dropped and counted; only a complete absence of a
//! usable candidate is an error.

use serde_json::{Map, Value};

use crate::types::{AppError, PaperRecord, Result, MAX_MATCHING_SCORE};

/// Maximum number of characters of raw output carried in an extraction error.
pub const EXCERPT_CHARS: usize = 200;

/// Keys that mark an object as a paper entry.
const PAPER_KEYS: &[&str] = &[
    "title",
    "pdfLink",
    "pdf_link",
    "matchingScore",
    "matching_score",
];

/// Validated papers plus the number of entries that were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub papers: Vec<PaperRecord>,
    pub dropped: usize,
}

/// Why a single entry was excluded from the result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryRejection {
    #[error("missing or empty title")]
    MissingTitle,
    #[error("missing or empty pdfLink")]
    MissingPdfLink,
    #[error("missing matchingScore")]
    MissingScore,
    #[error("matchingScore {0} is not an integer in 0..=100")]
    InvalidScore(String),
    #[error("field `{0}` has an unexpected type")]
    InvalidField(&'static str),
}

/// Recover the paper list from raw generated text.
pub fn extract(raw: &str) -> Result<Extraction> {
    let mut fallback = None;

    if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
        match classify(&value) {
            Candidate::Papers(entries) => return Ok(validate_entries(entries)),
            Candidate::Empty => fallback = Some(Extraction::default()),
            Candidate::Unusable => {}
        }
    }

    for (start, end) in balanced_regions(raw.as_bytes()) {
        let Ok(value) = serde_json::from_str::<Value>(&raw[start..=end]) else {
            continue;
        };
        match classify(&value) {
            Candidate::Papers(entries) => {
                tracing::debug!(start, end, "Extracted JSON region from generated text");
                return Ok(validate_entries(entries));
            }
            Candidate::Empty => {
                fallback.get_or_insert_with(Extraction::default);
            }
            Candidate::Unusable => {}
        }
    }

    fallback.ok_or_else(|| AppError::Extraction {
        message: "no JSON array or object with paper entries found in generated output"
            .to_string(),
        excerpt: excerpt(raw),
    })
}

/// Bounded prefix of `raw` for diagnostics.
pub fn excerpt(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Byte offsets `(open, close)` of every balanced bracket region, ordered
/// by opening bracket, found in a single pass.
///
/// Quotes only open strings inside a region, so stray quotes in prose do
/// not hide the JSON that follows. A mismatched closer invalidates every
/// region still open.
fn balanced_regions(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut open: Vec<(usize, u8)> = Vec::new();
    let mut regions = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (pos, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' if !open.is_empty() => in_string = true,
            b'[' => open.push((pos, b']')),
            b'{' => open.push((pos, b'}')),
            b']' | b'}' => match open.pop() {
                Some((start, expected)) if expected == b => regions.push((start, pos)),
                Some(_) => open.clear(),
                None => {}
            },
            _ => {}
        }
    }

    regions.sort_unstable_by_key(|&(start, _)| start);
    regions
}

/// How a parsed JSON value relates to the expected paper list.
enum Candidate<'a> {
    /// Holds at least one paper-like entry.
    Papers(&'a [Value]),
    /// The right shape, but with no entries at all.
    Empty,
    Unusable,
}

/// Accepted: an array of paper objects, or an object with exactly one
/// non-empty array field holding paper objects. Empty arrays only count
/// when nothing better turns up.
fn classify(value: &Value) -> Candidate<'_> {
    match value {
        Value::Array(items) if items.is_empty() => Candidate::Empty,
        Value::Array(items) if is_paper_array(items) => Candidate::Papers(items),
        Value::Object(map) => {
            let arrays: Vec<&Vec<Value>> = map.values().filter_map(Value::as_array).collect();
            let filled: Vec<&Vec<Value>> =
                arrays.iter().copied().filter(|items| !items.is_empty()).collect();
            match *filled.as_slice() {
                [] if !arrays.is_empty() => Candidate::Empty,
                [items] if is_paper_array(items) => Candidate::Papers(items.as_slice()),
                _ => Candidate::Unusable,
            }
        }
        _ => Candidate::Unusable,
    }
}

fn is_paper_array(items: &[Value]) -> bool {
    items.iter().all(Value::is_object)
        && items
            .iter()
            .filter_map(Value::as_object)
            .any(|obj| PAPER_KEYS.iter().any(|key| obj.contains_key(*key)))
}

fn validate_entries(entries: &[Value]) -> Extraction {
    let mut papers = Vec::with_capacity(entries.len());
    let mut dropped = 0;

    for (index, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            dropped += 1;
            continue;
        };
        match validate_entry(obj) {
            Ok(paper) => papers.push(paper),
            Err(reason) => {
                dropped += 1;
                tracing::warn!(index, %reason, "Dropping malformed paper entry");
            }
        }
    }

    if dropped > 0 {
        tracing::info!(
            kept = papers.len(),
            dropped,
            "Filtered paper entries from generated output"
        );
    }

    Extraction { papers, dropped }
}

fn field<'a>(obj: &'a Map<String, Value>, camel: &str, snake: &str) -> Option<&'a Value> {
    obj.get(camel)
        .or_else(|| obj.get(snake))
        .filter(|v| !v.is_null())
}

/// Validate one entry. Scores are never clamped.
pub fn validate_entry(
    obj: &Map<String, Value>,
) -> std::result::Result<PaperRecord, EntryRejection> {
    let title = match obj.get("title") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(EntryRejection::MissingTitle),
    };

    let pdf_link = match field(obj, "pdfLink", "pdf_link") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(EntryRejection::MissingPdfLink),
    };

    let matching_score = match field(obj, "matchingScore", "matching_score") {
        None => return Err(EntryRejection::MissingScore),
        Some(value) => match value.as_u64() {
            Some(score) if score <= u64::from(MAX_MATCHING_SCORE) => score as u8,
            _ => return Err(EntryRejection::InvalidScore(value.to_string())),
        },
    };

    let authors = match obj.get("authors") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        Some(_) => return Err(EntryRejection::InvalidField("authors")),
    };

    let summary = match obj.get("summary") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(EntryRejection::InvalidField("summary")),
    };

    Ok(PaperRecord {
        title,
        pdf_link,
        authors,
        summary,
        matching_score,
    })
}
