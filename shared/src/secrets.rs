//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Hosted upload service credentials from Secrets Manager.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCredentials {
    pub api_key: String,
    #[serde(default)]
    pub app_id: Option<String>,
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Get the hosted upload service credentials from Secrets Manager.
pub async fn get_upload_credentials(
    client: &SecretsClient,
    secret_arn: &str,
) -> Result<UploadCredentials> {
    let secret_string = get_secret(client, secret_arn).await?;
    parse_upload_credentials(&secret_string)
}

fn parse_upload_credentials(secret_string: &str) -> Result<UploadCredentials> {
    serde_json::from_str(secret_string)
        .map_err(|e| Error::Aws(format!("Failed to parse upload credentials: {}", e)))
}

/// Clear the secrets cache (useful for testing or credential rotation).
pub async fn clear_cache() {
    let mut cache = get_cache().write().await;
    cache.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        let json = r#"{"apiKey":"sk_live_abc","appId":"app-1"}"#;
        let creds = parse_upload_credentials(json).unwrap();
        assert_eq!(creds.api_key, "sk_live_abc");
        assert_eq!(creds.app_id, Some("app-1".to_string()));
    }

    #[test]
    fn test_parse_credentials_without_app_id() {
        let creds = parse_upload_credentials(r#"{"apiKey":"sk_live_abc"}"#).unwrap();
        assert!(creds.app_id.is_none());
    }

    #[test]
    fn test_parse_credentials_missing_key() {
        let err = parse_upload_credentials(r#"{"appId":"app-1"}"#).unwrap_err();
        assert!(matches!(err, Error::Aws(_)));
    }

    #[tokio::test]
    async fn test_cached_secret_skips_secrets_manager() {
        use aws_sdk_secretsmanager::config::{BehaviorVersion, Region};

        let conf = aws_sdk_secretsmanager::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        let client = SecretsClient::from_conf(conf);
        let arn = "arn:aws:secretsmanager:us-east-1:000000000000:secret:cached-upload";

        get_cache()
            .write()
            .await
            .insert(arn.to_string(), r#"{"apiKey":"cached"}"#.to_string());

        let creds = get_upload_credentials(&client, arn).await.unwrap();
        assert_eq!(creds.api_key, "cached");

        clear_cache().await;
        assert!(get_cache().read().await.get(arn).is_none());
    }
}
