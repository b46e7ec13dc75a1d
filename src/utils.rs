use crate::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a whole file, e.g. an uploaded CSV, into memory.
pub async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Deserialize a JSON file, such as `config.json`, into type `T`.
pub async fn deserialize<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let bytes = read_bytes(path).await?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}
