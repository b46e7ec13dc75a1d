//! Shared test utilities.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::ingest::RawTable;
use crate::llm::{ProviderError, TextGenerator};
use crate::model::Table;
use crate::normalize::normalize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Three rows with messy labels: one income, two expenses in two different months.
pub(crate) const SCENARIO_CSV: &str = "Date,Category,Type,Amount\n\
    2023-01-05, food ,income,100\n\
    2023-01-10,food,Expense,40\n\
    2023-02-01,Food,expense,20\n";

/// Reads and normalizes CSV text.
pub(crate) fn table(csv: &str) -> Table {
    normalize(&RawTable::from_reader(csv.as_bytes()).unwrap())
}

/// A `TextGenerator` that records every prompt and replays scripted responses. When the script
/// runs out it answers with `"ok"`.
#[derive(Default)]
pub(crate) struct FakeGenerator {
    prompts: Mutex<Vec<String>>,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
}

impl FakeGenerator {
    pub(crate) fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }
}
