use crate::commands::Out;
use crate::digest::Digest;
use crate::session::Session;
use crate::{Config, Result};
use std::path::Path;

/// Loads the file at `path` and shows the financial summary that `ask` would send to the model.
/// Fails before the file is read if no API key is configured.
pub async fn digest(config: &Config, path: &Path) -> Result<Out<Digest>> {
    config.api_key()?;
    let session = Session::upload(path, config.currency_symbol()).await?;
    let digest = session.digest();
    Ok(Out::new(digest.render(config.currency_symbol()), digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use crate::test::SCENARIO_CSV;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        tokio::fs::write(&path, SCENARIO_CSV).await.unwrap();
        let config = Config::load(dir.path(), Some("key".to_string()))
            .await
            .unwrap();

        let out = digest(&config, &path).await.unwrap();
        assert!(out.message().starts_with("Here is the financial summary:"));
        assert!(out.message().contains("- Total Expense: ₹60.00"));
        let digest = out.structure().unwrap();
        assert_eq!(digest.net_savings(), Amount::new(Decimal::new(40, 0)));
    }

    #[tokio::test]
    async fn test_digest_requires_api_key_before_reading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        tokio::fs::write(&path, SCENARIO_CSV).await.unwrap();
        let config = Config::load(dir.path(), Some(" ".to_string()))
            .await
            .unwrap();

        let err = digest(&config, &path).await.unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));

        let err = digest(&config, &dir.path().join("nope.csv"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
