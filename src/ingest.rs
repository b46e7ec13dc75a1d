//! Record ingestion: reads an uploaded CSV file into a `RawTable` of untyped cells.
//!
//! Nothing here interprets cell values. Type coercion and cleanup happen in `normalize`, so that a
//! malformed date or amount never stops a file from loading.

use crate::model::Mapping;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// The cells of a CSV file exactly as read. An empty cell is `None`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RawTable {
    mapping: Mapping,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Reads the CSV file at `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = utils::read_bytes(path).await?;
        Self::from_reader(bytes.as_slice())
            .with_context(|| format!("Unable to read CSV data from {}", path.display()))
    }

    /// Reads CSV data, treating the first row as the header row. Every row is padded with `None`
    /// up to the width of the header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = rdr.records();
        let mapping = match records.next() {
            Some(header_row) => {
                let header_row = header_row.context("Unable to read the header row")?;
                Mapping::new(
                    header_row
                        .iter()
                        .enumerate()
                        .map(|(ix, h)| if ix == 0 { strip_bom(h) } else { h }),
                )?
            }
            None => bail!("The file is empty, a header row is required"),
        };

        let len = mapping.len();
        let mut rows = Vec::new();
        for (row_ix, result) in records.enumerate() {
            let record = result.with_context(|| format!("Unable to read row {}", row_ix + 2))?;
            if record.len() > len {
                bail!(
                    "A row longer than the headers list was encountered at row {}",
                    row_ix + 2
                );
            }
            let mut row: Vec<Option<String>> = record
                .iter()
                .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                .collect();
            row.resize(len, None);
            rows.push(row);
        }

        debug!("Read {} rows with {} columns", rows.len(), len);
        Ok(Self { mapping, rows })
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// The first `n` rows, for previewing a file.
    pub fn head(&self, n: usize) -> &[Vec<Option<String>>] {
        &self.rows[..n.min(self.rows.len())]
    }
}

fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{feff}').unwrap_or(s)
}
