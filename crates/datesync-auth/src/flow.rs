//! Interactive browser consent with a loopback callback server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{oneshot, Mutex};
use warp::Filter;

use crate::google::GoogleOAuth2Provider;
use crate::storage::{SecureStorage, TokenSet};
use crate::token::GOOGLE_SERVICE;

pub const CALLBACK_PORT: u16 = 8085;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

#[derive(Debug, Clone, PartialEq)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl CallbackParams {
    fn from_query(params: &HashMap<String, String>) -> Self {
        Self {
            code: params.get("code").cloned(),
            state: params.get("state").cloned(),
            error: params.get("error").cloned(),
        }
    }

    /// The authorization code, once the provider error and state are checked.
    fn into_code(self, expected_state: &str) -> Result<String> {
        if let Some(error) = self.error {
            anyhow::bail!("Authorization was denied: {}", error);
        }
        if self.state.as_deref() != Some(expected_state) {
            anyhow::bail!("OAuth state mismatch");
        }
        self.code
            .filter(|c| !c.is_empty())
            .context("Callback did not include an authorization code")
    }
}

/// Run the full consent flow and persist the resulting tokens.
pub async fn authenticate(
    provider: &GoogleOAuth2Provider,
    storage: &SecureStorage,
) -> Result<TokenSet> {
    let (auth_url, state) = provider.authorization_url(CALLBACK_PORT);

    let (tx, rx) = oneshot::channel();
    let tx: CallbackSender = Arc::new(Mutex::new(Some(tx)));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let routes = warp::get()
        .and(warp::path("callback"))
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::any().map(move || tx.clone()))
        .and_then(|params: HashMap<String, String>, tx: CallbackSender| async move {
            if let Some(sender) = tx.lock().await.take() {
                let _ = sender.send(CallbackParams::from_query(&params));
            }

            Ok::<_, warp::Rejection>(warp::reply::html(
                "<html><body><h1>Authorization complete</h1>\
                 <p>You can close this window and return to the terminal.</p></body></html>",
            ))
        });

    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(([127, 0, 0, 1], CALLBACK_PORT), async move {
            let _ = shutdown_rx.await;
        })
        .with_context(|| {
            format!("Failed to bind callback server on port {}", CALLBACK_PORT)
        })?;
    let server = tokio::spawn(server);
    tracing::debug!("Callback server listening on {}", addr);

    tracing::info!("Opening browser for Google authorization...");
    if let Err(e) = webbrowser::open(&auth_url) {
        tracing::warn!("Could not open browser: {}", e);
        println!("Open this URL to authorize datesync:\n\n{}\n", auth_url);
    }

    let received = tokio::time::timeout(CALLBACK_TIMEOUT, rx).await;

    let _ = shutdown_tx.send(());
    let _ = server.await;

    let params = received
        .context("Timed out waiting for the OAuth callback")?
        .context("Callback server closed before receiving a response")?;
    let code = params.into_code(&state)?;

    let tokens = provider
        .exchange_code(&code, CALLBACK_PORT)
        .await?
        .into_token_set(None);

    if tokens.refresh_token.is_none() {
        tracing::warn!(
            "Google did not return a refresh token; \
             re-run `datesync auth` when the access token expires"
        );
    }

    storage.store_token(GOOGLE_SERVICE, &tokens)?;
    tracing::info!("Google authorization completed");
    Ok(tokens)
}
