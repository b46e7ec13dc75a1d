//! Command handlers for the smartspend CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod ask;
mod chat;
mod digest;
mod stats;

use crate::args::OutputFormat;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

pub use ask::{ask, Answer};
pub use chat::{chat, ChatSummary};
pub use digest::digest;
pub use stats::{stats, StatsReport};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data that can be printed either as text or as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// The text that `print` writes to stdout for `format`. With `OutputFormat::Json` this is the
    /// structured data as pretty JSON, or the whole `Out` when there is no structured data.
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.message.clone(),
            OutputFormat::Json => {
                let json = match self.structure() {
                    Some(structure) => serde_json::to_string_pretty(structure),
                    None => serde_json::to_string_pretty(self),
                };
                json.unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
            }
        }
    }

    /// Print the output to stdout in the requested `format`.
    pub fn print(&self, format: OutputFormat) {
        if let (OutputFormat::Text, Some(structure)) = (format, self.structure()) {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
        let text = self.render(format);
        if !text.is_empty() {
            println!("{text}");
        }
    }
}
