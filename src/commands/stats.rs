use crate::commands::Out;
use crate::session::Session;
use crate::stats::{render_preview, Statistics};
use crate::{Config, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What `smartspend stats` reports about a file.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub file: PathBuf,
    pub headers: Vec<String>,
    pub preview: Vec<Vec<Option<String>>>,
    pub statistics: Statistics,
}

/// Loads the file at `path` and describes it: a preview of the raw rows, the structure of the
/// normalized table, summary statistics and the correlation of its numeric columns.
///
/// Fails before the file is read if no API key is configured.
pub async fn stats(config: &Config, path: &Path) -> Result<Out<StatsReport>> {
    config.api_key()?;
    let session = Session::upload(path, config.currency_symbol()).await?;
    Ok(report(&session, config.preview_rows()))
}

fn report(session: &Session, preview_rows: usize) -> Out<StatsReport> {
    let raw = session.raw();
    let statistics = Statistics::new(session.table());
    let message = format!(
        "{}\n{}",
        render_preview(raw, preview_rows),
        statistics.render()
    );
    let report = StatsReport {
        file: session.path().to_path_buf(),
        headers: raw
            .mapping()
            .headers()
            .iter()
            .map(|h| h.to_string())
            .collect(),
        preview: raw.head(preview_rows).to_vec(),
        statistics,
    };
    Out::new(message.trim_end().to_string(), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::RawTable;
    use crate::test::SCENARIO_CSV;

    #[test]
    fn test_report() {
        let raw = RawTable::from_reader(SCENARIO_CSV.as_bytes()).unwrap();
        let session = Session::from_raw(Path::new("scenario.csv"), raw, "₹");
        let out = report(&session, 2);
        let message = out.message();
        assert!(message.starts_with("## Preview of Data"));
        assert!(message.contains("## Data Cleaning & Structure"));
        assert!(message.contains("## Summary Statistics"));
        assert!(message.contains("## Correlation (numeric columns)"));

        let report = out.structure().unwrap();
        assert_eq!(report.preview.len(), 2);
        assert_eq!(report.headers, vec!["Date", "Category", "Type", "Amount"]);
        assert_eq!(report.statistics.rows, 3);
    }

    #[tokio::test]
    async fn test_stats_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(dir.path(), Some("key".to_string()))
            .await
            .unwrap();
        let err = stats(&config, &dir.path().join("missing.csv"))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("missing.csv"));
    }

    #[tokio::test]
    async fn test_stats_requires_api_key_before_reading() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(dir.path(), None).await.unwrap();
        let err = stats(&config, &dir.path().join("missing.csv"))
            .await
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("GEMINI_API_KEY"));
        assert!(!message.contains("missing.csv"));
    }
}
