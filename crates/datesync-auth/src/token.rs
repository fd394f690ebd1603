use anyhow::{Context, Result};

use crate::google::GoogleOAuth2Provider;
use crate::storage::SecureStorage;

/// Storage key for Google tokens.
pub const GOOGLE_SERVICE: &str = "google";

/// Environment variable that supplies a ready-made access token.
pub const ACCESS_TOKEN_ENV: &str = "DATESYNC_ACCESS_TOKEN";

/// Access token for this run: `DATESYNC_ACCESS_TOKEN` if set, otherwise the
/// stored Google token (refreshed when close to expiry).
pub async fn resolve_access_token(
    storage: &SecureStorage,
    provider: Option<&GoogleOAuth2Provider>,
) -> Result<String> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        if !token.trim().is_empty() {
            tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
            return Ok(token.trim().to_string());
        }
    }

    valid_access_token(storage, provider).await
}

/// Stored Google access token, refreshed and re-stored if it needs it.
pub async fn valid_access_token(
    storage: &SecureStorage,
    provider: Option<&GoogleOAuth2Provider>,
) -> Result<String> {
    let tokens = storage
        .retrieve_token(GOOGLE_SERVICE)
        .context("Not authenticated with Google; run `datesync auth` first")?;

    if !tokens.needs_refresh() {
        return Ok(tokens.access_token);
    }

    let (Some(provider), Some(refresh_token)) = (provider, tokens.refresh_token.clone()) else {
        if tokens.is_expired() {
            anyhow::bail!("Google access token expired; run `datesync auth` again");
        }
        tracing::warn!("Google access token expires soon and cannot be refreshed");
        return Ok(tokens.access_token);
    };

    tracing::info!("Refreshing Google access token");
    let refreshed = provider
        .refresh_token(&refresh_token)
        .await?
        .into_token_set(Some(refresh_token));
    storage.store_token(GOOGLE_SERVICE, &refreshed)?;

    Ok(refreshed.access_token)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::storage::TokenSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stored(storage: &SecureStorage, expires_in: i64, refresh: Option<&str>) {
        let tokens = TokenSet {
            access_token: "stored".to_string(),
            refresh_token: refresh.map(|s| s.to_string()),
            expires_at: chrono::Utc::now().timestamp() + expires_in,
            scopes: vec![],
        };
        storage.store_token(GOOGLE_SERVICE, &tokens).unwrap();
    }

    #[tokio::test]
    async fn test_fresh_token_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SecureStorage::new(dir.path());
        stored(&storage, 3600, Some("r"));

        assert_eq!(valid_access_token(&storage, None).await.unwrap(), "stored");
    }

    #[tokio::test]
    async fn test_missing_token_asks_for_auth() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SecureStorage::new(dir.path());

        let err = valid_access_token(&storage, None).await.unwrap_err();
        assert!(err.to_string().contains("datesync auth"));
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SecureStorage::new(dir.path());
        stored(&storage, -60, None);

        assert!(valid_access_token(&storage, None).await.is_err());
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed_and_stored() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "refreshed",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let storage = SecureStorage::new(dir.path());
        stored(&storage, 60, Some("keep-me"));

        let provider = GoogleOAuth2Provider::new("id".to_string(), "secret".to_string())
            .with_token_url(format!("{}/token", mock_server.uri()));

        let token = valid_access_token(&storage, Some(&provider)).await.unwrap();
        assert_eq!(token, "refreshed");

        let saved = storage.retrieve_token(GOOGLE_SERVICE).unwrap();
        assert_eq!(saved.access_token, "refreshed");
        assert_eq!(saved.refresh_token.as_deref(), Some("keep-me"));
    }
}
