use crate::model::mapping::{Header, KnownColumn, Mapping};
use crate::model::Amount;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One normalized row of an uploaded file. Every field is optional: the column may be missing
/// from the file, or the cell may be empty or unparseable.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Record {
    pub(crate) date: Option<NaiveDate>,
    pub(crate) month: Option<String>,
    pub(crate) category: Option<String>,
    #[serde(rename = "type")]
    pub(crate) kind: Option<String>,
    pub(crate) amount: Option<Amount>,
    /// Non-empty cells from columns the digest does not use, keyed by header.
    pub(crate) other_fields: BTreeMap<Header, String>,
}

impl Record {
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// The full English month name, e.g. `January`.
    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The value of the `Type` column, e.g. `Income` or `Expense` after normalization.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn other(&self, header: &Header) -> Option<&str> {
        self.other_fields.get(header).map(String::as_str)
    }

    /// Returns true if the `Type` of this record is exactly `kind`.
    pub fn is(&self, kind: &str) -> bool {
        self.kind() == Some(kind)
    }
}

/// The normalized contents of one uploaded file. A `Table` is never mutated after it is built;
/// every derivation borrows it.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Table {
    mapping: Mapping,
    records: Vec<Record>,
}

impl Table {
    pub fn new(mapping: Mapping, records: Vec<Record>) -> Self {
        Self { mapping, records }
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the table has `column`. `Month` is present when the file had a `Month` column or
    /// when it was derived from a `Date` column.
    pub fn has(&self, column: KnownColumn) -> bool {
        match column {
            KnownColumn::Month => {
                self.mapping.has(KnownColumn::Month) || self.mapping.has(KnownColumn::Date)
            }
            _ => self.mapping.has(column),
        }
    }

    /// The columns of the normalized table, in order. A derived `Month` column is appended after
    /// the file's own columns.
    pub fn columns(&self) -> Vec<Header> {
        let mut columns = self.mapping.headers().to_vec();
        if self.has(KnownColumn::Month) && !self.mapping.has(KnownColumn::Month) {
            columns.push(KnownColumn::Month.to_string().into());
        }
        columns
    }
}
