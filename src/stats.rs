//! Descriptive statistics for the `stats` command: a preview of the raw rows, the table structure
//! with per-column null counts, a description of every column, and a correlation matrix of the
//! numeric columns.
//!
//! These are for display only. Nothing here feeds the digest or the prompt.

use crate::ingest::RawTable;
use crate::model::{Header, KnownColumn, Table};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

/// The inferred kind of a column.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Date,
    Numeric,
    Text,
}

serde_plain::derive_display_from_serialize!(ColumnKind);

/// One row of the structure report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column: Header,
    pub kind: ColumnKind,
    pub non_null: usize,
    pub nulls: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSummary {
    pub count: usize,
    pub unique: usize,
    /// The most frequent value. Ties go to the value seen first.
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateSummary {
    pub count: usize,
    pub unique: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Description {
    Numeric(NumericSummary),
    Text(TextSummary),
    Date(DateSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub column: Header,
    pub description: Description,
}

/// Pairwise Pearson correlations between numeric columns. Empty unless there are at least two
/// numeric columns. `None` marks a correlation that is undefined.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub columns: Vec<Header>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

impl Correlation {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, a: &Header, b: &Header) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.matrix[i][j]
    }
}

/// Everything the `stats` command shows about a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub rows: usize,
    pub structure: Vec<ColumnInfo>,
    pub describe: Vec<ColumnDescription>,
    pub correlation: Correlation,
}

impl Statistics {
    pub fn new(table: &Table) -> Self {
        let columns: Vec<(Header, Values)> = table
            .columns()
            .into_iter()
            .map(|h| {
                let values = column_values(table, &h);
                (h, values)
            })
            .collect();

        let structure = columns
            .iter()
            .map(|(h, v)| ColumnInfo {
                column: h.clone(),
                kind: v.kind(),
                non_null: v.non_null(),
                nulls: table.len() - v.non_null(),
            })
            .collect();

        let describe = columns
            .iter()
            .map(|(h, v)| ColumnDescription {
                column: h.clone(),
                description: v.describe(),
            })
            .collect();

        let numeric: Vec<(Header, &[Option<f64>])> = columns
            .iter()
            .filter_map(|(h, v)| match v {
                Values::Numeric(n) => Some((h.clone(), n.as_slice())),
                _ => None,
            })
            .collect();

        Self {
            rows: table.len(),
            structure,
            describe,
            correlation: correlation(&numeric),
        }
    }

    /// The number of null cells in `column`, or `None` if there is no such column.
    pub fn nulls(&self, column: &Header) -> Option<usize> {
        self.structure
            .iter()
            .find(|c| &c.column == column)
            .map(|c| c.nulls)
    }

    pub fn description(&self, column: &Header) -> Option<&Description> {
        self.describe
            .iter()
            .find(|c| &c.column == column)
            .map(|c| &c.description)
    }

    /// Renders the structure, description and correlation sections as Markdown tables.
    pub fn render(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "## Data Cleaning & Structure\n");
        let _ = writeln!(s, "{} rows, {} columns\n", self.rows, self.structure.len());
        let structure: Vec<Vec<String>> = self
            .structure
            .iter()
            .map(|c| {
                vec![
                    c.column.to_string(),
                    c.non_null.to_string(),
                    c.nulls.to_string(),
                    c.kind.to_string(),
                ]
            })
            .collect();
        s.push_str(&markdown_table(
            &["Column", "Non-Null", "Nulls", "Kind"],
            &structure,
        ));

        let _ = writeln!(s, "\n## Summary Statistics\n");
        let labels = [
            "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
        ];
        let mut header = vec![String::new()];
        header.extend(self.describe.iter().map(|c| c.column.to_string()));
        let cells: Vec<[String; 11]> = self
            .describe
            .iter()
            .map(|c| description_cells(&c.description))
            .collect();
        let rows: Vec<Vec<String>> = labels
            .iter()
            .enumerate()
            .map(|(ix, label)| {
                let mut row = vec![label.to_string()];
                row.extend(cells.iter().map(|c| c[ix].clone()));
                row
            })
            .collect();
        let header: Vec<&str> = header.iter().map(String::as_str).collect();
        s.push_str(&markdown_table(&header, &rows));

        let _ = writeln!(s, "\n## Correlation (numeric columns)\n");
        if self.correlation.is_empty() {
            let _ = writeln!(s, "Fewer than two numeric columns, nothing to correlate.");
        } else {
            let mut header = vec![String::new()];
            header.extend(self.correlation.columns.iter().map(|c| c.to_string()));
            let header: Vec<&str> = header.iter().map(String::as_str).collect();
            let rows: Vec<Vec<String>> = self
                .correlation
                .columns
                .iter()
                .zip(&self.correlation.matrix)
                .map(|(c, values)| {
                    let mut row = vec![c.to_string()];
                    row.extend(values.iter().map(|v| float(*v, 4)));
                    row
                })
                .collect();
            s.push_str(&markdown_table(&header, &rows));
        }
        s
    }
}

/// Renders the first rows of the raw file as a Markdown table.
pub fn render_preview(raw: &RawTable, n: usize) -> String {
    let header: Vec<&str> = raw.mapping().headers().iter().map(|h| h.as_ref()).collect();
    let rows: Vec<Vec<String>> = raw
        .head(n)
        .iter()
        .map(|row| {
            row.iter()
                .map(|c| c.clone().unwrap_or_else(|| "NaN".to_string()))
                .collect()
        })
        .collect();
    let mut s = String::from("## Preview of Data\n\n");
    s.push_str(&markdown_table(&header, &rows));
    s
}

/// The typed values of one column.
enum Values {
    Date(Vec<Option<NaiveDate>>),
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Values {
    fn kind(&self) -> ColumnKind {
        match self {
            Values::Date(_) => ColumnKind::Date,
            Values::Numeric(_) => ColumnKind::Numeric,
            Values::Text(_) => ColumnKind::Text,
        }
    }

    fn non_null(&self) -> usize {
        match self {
            Values::Date(v) => v.iter().flatten().count(),
            Values::Numeric(v) => v.iter().flatten().count(),
            Values::Text(v) => v.iter().flatten().count(),
        }
    }

    fn describe(&self) -> Description {
        match self {
            Values::Numeric(v) => Description::Numeric(describe_numeric(v)),
            Values::Text(v) => {
                let (unique, top, freq) = frequencies(v.iter().flatten());
                Description::Text(TextSummary {
                    count: self.non_null(),
                    unique,
                    top: top.cloned(),
                    freq,
                })
            }
            Values::Date(v) => {
                let (unique, _, _) = frequencies(v.iter().flatten());
                Description::Date(DateSummary {
                    count: self.non_null(),
                    unique,
                    first: v.iter().flatten().min().copied(),
                    last: v.iter().flatten().max().copied(),
                })
            }
        }
    }
}

fn column_values(table: &Table, header: &Header) -> Values {
    let records = table.records();
    match KnownColumn::from_header(header) {
        Some(KnownColumn::Date) => Values::Date(records.iter().map(|r| r.date()).collect()),
        Some(KnownColumn::Amount) => Values::Numeric(
            records
                .iter()
                .map(|r| r.amount().map(|a| a.to_f64()))
                .collect(),
        ),
        Some(KnownColumn::Month) => Values::Text(
            records
                .iter()
                .map(|r| r.month().map(str::to_string))
                .collect(),
        ),
        Some(KnownColumn::Category) => Values::Text(
            records
                .iter()
                .map(|r| r.category().map(str::to_string))
                .collect(),
        ),
        Some(KnownColumn::Type) => Values::Text(
            records
                .iter()
                .map(|r| r.kind().map(str::to_string))
                .collect(),
        ),
        None => {
            let cells: Vec<Option<&str>> = records.iter().map(|r| r.other(header)).collect();
            let parsed: Vec<Option<f64>> = cells
                .iter()
                .map(|c| c.and_then(|s| s.trim().parse::<f64>().ok()))
                .collect();
            let non_null = cells.iter().flatten().count();
            let numeric = non_null > 0 && parsed.iter().flatten().count() == non_null;
            if numeric {
                Values::Numeric(parsed)
            } else {
                Values::Text(cells.iter().map(|c| c.map(str::to_string)).collect())
            }
        }
    }
}

/// Returns the number of distinct values, the most frequent value and its frequency.
fn frequencies<'a, T>(values: impl Iterator<Item = &'a T>) -> (usize, Option<&'a T>, usize)
where
    T: Eq + std::hash::Hash + 'a,
{
    let mut order: Vec<&T> = Vec::new();
    let mut counts: HashMap<&T, usize> = HashMap::new();
    for v in values {
        let count = counts.entry(v).or_insert(0);
        if *count == 0 {
            order.push(v);
        }
        *count += 1;
    }
    let mut top = None;
    let mut freq = 0;
    for v in &order {
        let count = counts[v];
        if count > freq {
            top = Some(*v);
            freq = count;
        }
    }
    (order.len(), top, freq)
}

fn describe_numeric(values: &[Option<f64>]) -> NumericSummary {
    let mut v: Vec<f64> = values.iter().flatten().copied().filter(|x| !x.is_nan()).collect();
    v.sort_by(|a, b| a.total_cmp(b));
    let n = v.len();
    let mean = (n > 0).then(|| v.iter().sum::<f64>() / n as f64);
    let std = mean.filter(|_| n > 1).map(|m| {
        let ss: f64 = v.iter().map(|x| (x - m).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    });
    NumericSummary {
        count: n,
        mean,
        std,
        min: v.first().copied(),
        q25: quantile(&v, 0.25),
        q50: quantile(&v, 0.5),
        q75: quantile(&v, 0.75),
        max: v.last().copied(),
    }
}

/// Linear-interpolation quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

fn correlation(columns: &[(Header, &[Option<f64>])]) -> Correlation {
    if columns.len() < 2 {
        return Correlation::default();
    }
    let matrix = columns
        .iter()
        .map(|(_, a)| columns.iter().map(|(_, b)| pearson(a, b)).collect())
        .collect();
    Correlation {
        columns: columns.iter().map(|(h, _)| h.clone()).collect(),
        matrix,
    }
}

/// Pearson correlation over the rows where both values are present.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

fn description_cells(d: &Description) -> [String; 11] {
    let na = || "NaN".to_string();
    match d {
        Description::Numeric(n) => [
            n.count.to_string(),
            na(),
            na(),
            na(),
            float(n.mean, 2),
            float(n.std, 2),
            float(n.min, 2),
            float(n.q25, 2),
            float(n.q50, 2),
            float(n.q75, 2),
            float(n.max, 2),
        ],
        Description::Text(t) => [
            t.count.to_string(),
            t.unique.to_string(),
            t.top.clone().unwrap_or_else(na),
            t.freq.to_string(),
            na(),
            na(),
            na(),
            na(),
            na(),
            na(),
            na(),
        ],
        Description::Date(d) => [
            d.count.to_string(),
            d.unique.to_string(),
            na(),
            na(),
            na(),
            na(),
            d.first.map(|x| x.to_string()).unwrap_or_else(na),
            na(),
            na(),
            na(),
            d.last.map(|x| x.to_string()).unwrap_or_else(na),
        ],
    }
}

fn float(v: Option<f64>, precision: usize) -> String {
    match v {
        Some(v) => format!("{v:.precision$}"),
        None => "NaN".to_string(),
    }
}

/// Renders a Markdown table with columns padded to equal width.
fn markdown_table<S: AsRef<str>>(header: &[S], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (ix, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(ix) {
                *w = (*w).max(cell.chars().count()).max(3);
            }
        }
    }
    for w in widths.iter_mut() {
        *w = (*w).max(3);
    }

    let line = |cells: &mut dyn Iterator<Item = &str>| -> String {
        let padded: Vec<String> = cells
            .zip(&widths)
            .map(|(c, w)| format!("{c}{}", " ".repeat(w - c.chars().count())))
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };

    let mut s = line(&mut header.iter().map(|h| h.as_ref()));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(s, "| {} |", rule.join(" | "));
    for row in rows {
        s.push_str(&line(&mut row.iter().map(String::as_str)));
    }
    s
}
