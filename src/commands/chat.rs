use crate::commands::Out;
use crate::llm::TextGenerator;
use crate::session::Session;
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

/// Words that end a chat.
const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// How a chat went.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ChatSummary {
    pub answered: usize,
    pub failed: usize,
}

/// Loads the file at `path` once and then answers every line of `input` as a question, writing
/// the answers to `output`. Blank lines are skipped. The chat ends at end of input or when a line
/// is `exit` or `quit`.
///
/// A failed answer is reported and the chat goes on, so the same question can be asked again.
/// Fails before the file is read if no API key is configured.
pub async fn chat<R, W>(
    config: &Config,
    generator: &dyn TextGenerator,
    path: &Path,
    input: R,
    output: W,
) -> Result<Out<ChatSummary>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    config.api_key()?;
    let session = Session::upload(path, config.currency_symbol()).await?;
    let summary = converse(&session, generator, input, output).await?;
    Ok(Out::new(
        format!(
            "Answered {} question(s), {} failed",
            summary.answered, summary.failed
        ),
        summary,
    ))
}

async fn converse<R, W>(
    session: &Session,
    generator: &dyn TextGenerator,
    input: R,
    mut output: W,
) -> Result<ChatSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = ChatSummary::default();
    let mut lines = input.lines();
    write(
        &mut output,
        "Ask a question about your data, or type 'exit' to quit.\n",
    )
    .await?;

    while let Some(line) = lines
        .next_line()
        .await
        .context("Unable to read the next question")?
    {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&question.to_lowercase().as_str()) {
            debug!("Chat ended by '{question}'");
            break;
        }
        match session.ask(generator, question).await {
            Ok(answer) => {
                summary.answered += 1;
                write(&mut output, &format!("{}\n\n", answer.trim_end())).await?;
            }
            Err(e) => {
                summary.failed += 1;
                error!("Unable to answer '{question}': {e}");
                write(
                    &mut output,
                    &format!("Error: {e}. You can ask the question again.\n\n"),
                )
                .await?;
            }
        }
    }
    Ok(summary)
}

async fn write<W>(output: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output
        .write_all(text.as_bytes())
        .await
        .context("Unable to write the answer")?;
    output.flush().await.context("Unable to write the answer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::RawTable;
    use crate::llm::ProviderError;
    use crate::test::{FakeGenerator, SCENARIO_CSV};

    fn session() -> Session {
        let raw = RawTable::from_reader(SCENARIO_CSV.as_bytes()).unwrap();
        Session::from_raw(Path::new("scenario.csv"), raw, "₹")
    }

    #[tokio::test]
    async fn test_converse() {
        let generator = FakeGenerator::new(vec![
            Ok("first answer".to_string()),
            Ok("second answer".to_string()),
        ]);
        let input: &[u8] = b"How much did I save?\n\n   \nWhat about food?\nEXIT\nnever asked\n";
        let mut output = Vec::new();
        let summary = converse(&session(), &generator, input, &mut output)
            .await
            .unwrap();

        assert_eq!(
            summary,
            ChatSummary {
                answered: 2,
                failed: 0
            }
        );
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].ends_with("What about food?\n"));
        assert!(!prompts[1].contains("first answer"));
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("first answer\n\n"));
        assert!(output.contains("second answer\n\n"));
    }

    #[tokio::test]
    async fn test_failure_does_not_end_chat() {
        let generator = FakeGenerator::new(vec![
            Err(ProviderError::Timeout),
            Ok("retried".to_string()),
        ]);
        let input: &[u8] = b"Why?\nWhy?\n";
        let mut output = Vec::new();
        let summary = converse(&session(), &generator, input, &mut output)
            .await
            .unwrap();

        assert_eq!(
            summary,
            ChatSummary {
                answered: 1,
                failed: 1
            }
        );
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Error: The request to the model timed out"));
        assert!(output.contains("retried"));
    }

    #[tokio::test]
    async fn test_chat_loads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        tokio::fs::write(&path, SCENARIO_CSV).await.unwrap();
        let config = Config::load(dir.path(), Some("key".to_string()))
            .await
            .unwrap();
        let generator = FakeGenerator::default();
        let input: &[u8] = b"one\ntwo\n";
        let out = chat(&config, &generator, &path, input, Vec::new())
            .await
            .unwrap();
        assert_eq!(out.message(), "Answered 2 question(s), 0 failed");
    }
}
