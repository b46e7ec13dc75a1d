//! The field normalizer: turns a `RawTable` into a typed `Table`.
//!
//! - `Category` and `Type` are trimmed and title-cased.
//! - `Date` is parsed best-effort; an unparseable date becomes `None`.
//! - `Month` is derived from the parsed date as a full English month name.
//! - `Amount` is parsed leniently; an unparseable amount becomes `None`.
//!
//! None of this can fail.

use crate::ingest::RawTable;
use crate::model::{Amount, KnownColumn, Record, Table};
use chrono::{DateTime, Month, NaiveDate, NaiveDateTime};
use tracing::debug;

// `%Y` also accepts one or two digit years, so the US formats with a two digit year come first.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m-%d-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Normalizes every row of `raw`. Columns the digest does not know are passed through untouched.
pub fn normalize(raw: &RawTable) -> Table {
    let mapping = raw.mapping();
    let date_ix = mapping.index_of(KnownColumn::Date);
    let month_ix = mapping.index_of(KnownColumn::Month);
    let category_ix = mapping.index_of(KnownColumn::Category);
    let type_ix = mapping.index_of(KnownColumn::Type);
    let amount_ix = mapping.index_of(KnownColumn::Amount);

    let cell = |row: &[Option<String>], ix: Option<usize>| -> Option<String> {
        ix.and_then(|ix| row.get(ix).cloned().flatten())
    };

    let mut bad_dates = 0usize;
    let records: Vec<Record> = raw
        .rows()
        .iter()
        .map(|row| {
            let date = cell(row, date_ix).and_then(|s| {
                let parsed = parse_date(&s);
                if parsed.is_none() {
                    bad_dates += 1;
                }
                parsed
            });

            // A derived month replaces any Month column the file had
            let month = match date_ix {
                Some(_) => date.map(month_name),
                None => cell(row, month_ix).and_then(|s| normalize_label(&s)),
            };

            let other_fields = mapping
                .headers()
                .iter()
                .enumerate()
                .filter(|(_, h)| KnownColumn::from_header(h).is_none())
                .filter_map(|(ix, h)| cell(row, Some(ix)).map(|v| (h.clone(), v)))
                .collect();

            Record {
                date,
                month,
                category: cell(row, category_ix).and_then(|s| normalize_label(&s)),
                kind: cell(row, type_ix).and_then(|s| normalize_label(&s)),
                amount: cell(row, amount_ix).and_then(|s| Amount::parse_cell(&s)),
                other_fields,
            }
        })
        .collect();

    if bad_dates > 0 {
        debug!("{bad_dates} date values could not be parsed and were left empty");
    }
    debug!("Normalized {} records", records.len());
    Table::new(mapping.clone(), records)
}

/// Trims and title-cases a free-text label. A label that is blank after trimming is `None`.
pub fn normalize_label(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(title_case(trimmed))
    }
}

/// Upper-cases the first letter of every word and lower-cases the rest. A word starts at any
/// letter that does not follow another letter, so `o'neil` becomes `O'Neil`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Parses a date in any of the common formats this tool accepts. Returns `None` instead of an
/// error for anything it does not recognize.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// The full English name of the month of `date`, e.g. `January`.
pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

/// The calendar number (1-12) of a month name such as `January` or `Jan`.
pub fn parse_month_number(name: &str) -> Option<u32> {
    name.trim()
        .parse::<Month>()
        .ok()
        .map(|m| m.number_from_month())
}
