use clap::Parser;
use smartspend::args::{Args, Command};
use smartspend::{commands, llm, Config, Mode, Result};
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let common = args.common();
    let format = common.format();
    let config = Config::load(common.home().path(), common.api_key().map(String::from)).await?;
    debug!("{config:?}");

    // This allows for running the program without calling the Gemini API. When
    // SMARTSPEND_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Gemini.
    let mode = Mode::from_env();

    // Without an API key the program stops here, before any file is read.
    config.api_key()?;

    let _: () = match args.command() {
        Command::Stats(file_args) => commands::stats(&config, file_args.path())
            .await?
            .print(format),

        Command::Digest(file_args) => commands::digest(&config, file_args.path())
            .await?
            .print(format),

        Command::Ask(ask_args) => {
            let generator = llm::generator(&config, mode)?;
            commands::ask(
                &config,
                generator.as_ref(),
                ask_args.path(),
                ask_args.question(),
            )
            .await?
            .print(format)
        }

        Command::Chat(file_args) => {
            let generator = llm::generator(&config, mode)?;
            commands::chat(
                &config,
                generator.as_ref(),
                file_args.path(),
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await?
            .print(format)
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
