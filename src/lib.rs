pub mod args;
pub mod commands;
mod config;
pub mod digest;
mod error;
pub mod ingest;
pub mod llm;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod session;
pub mod stats;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use llm::Mode;
