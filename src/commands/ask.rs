use crate::commands::Out;
use crate::llm::TextGenerator;
use crate::session::Session;
use crate::{Config, Result};
use anyhow::{bail, Context};
use serde::Serialize;
use std::path::Path;

/// A question and the model's answer to it.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

/// Loads the file at `path` and asks `generator` one `question` about it.
///
/// Fails before the file is read if no API key is configured.
pub async fn ask(
    config: &Config,
    generator: &dyn TextGenerator,
    path: &Path,
    question: &str,
) -> Result<Out<Answer>> {
    config.api_key()?;
    let question = question.trim();
    if question.is_empty() {
        bail!("The question is empty, there is nothing to ask")
    }
    let session = Session::upload(path, config.currency_symbol()).await?;
    let answer = session
        .ask(generator, question)
        .await
        .context("The model was unable to answer the question")?;
    Ok(Out::new(
        answer.clone(),
        Answer {
            question: question.to_string(),
            answer,
        },
    ))
}
