//! These structs provide the CLI interface for the smartspend CLI.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// smartspend: Ask questions about your spending.
///
/// Give this program a CSV file of your transactions, with columns like Date, Category, Type
/// (Income or Expense) and Amount. It cleans the data up, computes a short financial summary and
/// passes that summary, along with your question, to Google Gemini.
///
/// You will need a Gemini API key for `ask` and `chat`. Put it in the GEMINI_API_KEY environment
/// variable or in $SMARTSPEND_HOME/.secrets/secrets.json.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Preview the file and show its structure, summary statistics and correlations.
    Stats(FileArgs),
    /// Show the financial summary that is sent to the model.
    Digest(FileArgs),
    /// Ask one question about the file.
    Ask(AskArgs),
    /// Ask questions about the file, one per line, until end of input or `exit`.
    ///
    /// Every question is answered from the same summary; earlier questions and answers are not
    /// sent to the model.
    Chat(FileArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where smartspend configuration and secrets are held. Defaults to
    /// ~/smartspend
    #[arg(long, env = "SMARTSPEND_HOME", default_value_t = default_home())]
    home: DisplayPath,

    /// The Gemini API key. A key in $SMARTSPEND_HOME/.secrets/secrets.json takes precedence.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// How to print the output: "text" or "json".
    #[arg(long, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl Common {
    pub fn new(
        log_level: LevelFilter,
        home: PathBuf,
        api_key: Option<String>,
        format: OutputFormat,
    ) -> Self {
        Self {
            log_level,
            home: home.into(),
            api_key,
            format,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// (Not shown): Args for the `stats`, `digest` and `chat` commands.
#[derive(Debug, Parser, Clone)]
pub struct FileArgs {
    /// The CSV file of transactions.
    path: PathBuf,
}

impl FileArgs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// (Not shown): Args for the `ask` command.
#[derive(Debug, Parser, Clone)]
pub struct AskArgs {
    /// The CSV file of transactions.
    path: PathBuf,

    /// The question, e.g. "Where am I overspending?"
    question: String,
}

impl AskArgs {
    pub fn new(path: impl Into<PathBuf>, question: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            question: question.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn question(&self) -> &str {
        &self.question
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("smartspend"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or SMARTSPEND_HOME instead of relying on the default \
                smartspend home directory.",
            );
            PathBuf::from("smartspend")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let args = Args::try_parse_from([
            "smartspend",
            "--home",
            "/tmp/ss",
            "--format",
            "json",
            "ask",
            "data.csv",
            "Where does my money go?",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/ss"));
        assert_eq!(args.common().format(), OutputFormat::Json);
        match args.command() {
            Command::Ask(ask) => {
                assert_eq!(ask.path(), Path::new("data.csv"));
                assert_eq!(ask.question(), "Where does my money go?");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["smartspend", "--home", "x", "stats", "a.csv"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        assert_eq!(args.common().format(), OutputFormat::Text);
    }

    #[test]
    fn test_bad_format() {
        assert!(Args::try_parse_from(["smartspend", "--format", "xml", "digest", "a.csv"]).is_err());
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Args::try_parse_from(["smartspend", "ask", "a.csv"]).is_err());
    }
}
