//! A `Session` is one uploaded file: its raw cells and its normalized `Table`. Questions asked in
//! a session are answered from a digest that is recomputed for every question.

use crate::digest::Digest;
use crate::ingest::RawTable;
use crate::llm::{ProviderError, TextGenerator};
use crate::model::Table;
use crate::normalize::normalize;
use crate::{prompt, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    raw: RawTable,
    table: Table,
    currency_symbol: String,
}

impl Session {
    /// Reads and normalizes the CSV file at `path`.
    pub async fn upload(path: &Path, currency_symbol: impl Into<String>) -> Result<Self> {
        let raw = RawTable::load(path).await?;
        let session = Self::from_raw(path, raw, currency_symbol);
        info!(
            "Loaded {} rows and {} columns from {}",
            session.table.len(),
            session.raw.mapping().len(),
            path.display()
        );
        Ok(session)
    }

    pub fn from_raw(path: &Path, raw: RawTable, currency_symbol: impl Into<String>) -> Self {
        let table = normalize(&raw);
        Self {
            path: path.to_path_buf(),
            raw,
            table,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw(&self) -> &RawTable {
        &self.raw
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn digest(&self) -> Digest {
        Digest::new(&self.table)
    }

    /// The full text that is sent to the model for `question`.
    pub fn prompt(&self, question: &str) -> String {
        prompt::compose(&self.digest(), question, &self.currency_symbol)
    }

    /// Answers `question`. Nothing from earlier questions is sent along.
    pub async fn ask(
        &self,
        generator: &dyn TextGenerator,
        question: &str,
    ) -> std::result::Result<String, ProviderError> {
        let prompt = self.prompt(question);
        debug!("Prompt:\n{prompt}");
        generator.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{FakeGenerator, SCENARIO_CSV};

    fn session() -> Session {
        let raw = RawTable::from_reader(SCENARIO_CSV.as_bytes()).unwrap();
        Session::from_raw(Path::new("scenario.csv"), raw, "₹")
    }

    #[tokio::test]
    async fn test_ask_sends_digest_and_question() {
        let generator = FakeGenerator::new(vec![Ok("Save more.".to_string())]);
        let answer = session()
            .ask(&generator, "How am I doing?")
            .await
            .unwrap();
        assert_eq!(answer, "Save more.");
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- Net Savings: ₹40.00"));
        assert!(prompts[0].ends_with("How am I doing?\n"));
    }

    #[tokio::test]
    async fn test_questions_do_not_carry_history() {
        let generator = FakeGenerator::default();
        let session = session();
        session.ask(&generator, "first question").await.unwrap();
        session.ask(&generator, "second question").await.unwrap();
        let prompts = generator.prompts();
        assert!(!prompts[1].contains("first question"));
        assert_eq!(
            prompts[0].replace("first question", ""),
            prompts[1].replace("second question", "")
        );
    }

    #[tokio::test]
    async fn test_provider_error_is_returned() {
        let generator = FakeGenerator::new(vec![Err(ProviderError::Timeout)]);
        let result = session().ask(&generator, "hello").await;
        assert!(matches!(result, Err(ProviderError::Timeout)));
    }

    #[tokio::test]
    async fn test_upload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        tokio::fs::write(&path, SCENARIO_CSV).await.unwrap();
        let session = Session::upload(&path, "$").await.unwrap();
        assert_eq!(session.table().len(), 3);
        assert_eq!(session.path(), path.as_path());
        assert_eq!(session.currency_symbol(), "$");
    }
}
