//! The text-generation collaborator that answers questions about a digest.
//!
//! Everything that talks to a model goes through the `TextGenerator` trait so that tests, and
//! offline runs of the whole program, can swap in a deterministic implementation.

mod gemini;
mod offline;

use crate::{Config, Result};
use thiserror::Error;

pub use gemini::GeminiClient;
pub use offline::OfflineGenerator;

/// When this environment variable is set and non-empty, the program answers questions with the
/// `OfflineGenerator` instead of calling the Gemini API.
pub const TEST_MODE_ENV: &str = "SMARTSPEND_IN_TEST_MODE";

/// Errors from the model provider. These are shown to the user but never end a chat session.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("The request to the model timed out")]
    Timeout,

    #[error("Unable to reach the model provider: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("The model provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("The model returned no usable text: {0}")]
    EmptyResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(e)
        }
    }
}

/// Turns a prompt into a text answer.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError>;
}

/// Selects which `TextGenerator` the program uses.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Gemini,
    Test,
}

impl Mode {
    /// `Mode::Test` when `SMARTSPEND_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Gemini`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Gemini,
        }
    }
}

/// Builds the generator for `mode`. Fails if no API key is configured, in either mode, so that a
/// missing credential is reported before any file is read.
pub fn generator(config: &Config, mode: Mode) -> Result<Box<dyn TextGenerator>> {
    let api_key = config.api_key()?;
    Ok(match mode {
        Mode::Gemini => Box::new(GeminiClient::new(
            api_key,
            config.base_url(),
            config.model(),
            config.timeout(),
        )?),
        Mode::Test => Box::new(OfflineGenerator),
    })
}
