use crate::catalog::client::segment_url;
use crate::catalog::credentials::TokenStore;
use crate::catalog::traits::{LoginHandler, MessageSigner};
use crate::catalog::transport::{CatalogRequest, HttpTransport};
use crate::error::CatalogError;
use crate::model::{login_message, AuthRequest, AuthResponse, NonceResponse};
use log::{info, warn};

/// Nonce-based login: fetch a nonce, have the wallet sign it, exchange the
/// signature for an access token.
///
/// These requests go straight to the transport, never through the client's
/// retry path.
pub struct NonceLogin<T: HttpTransport, S: MessageSigner> {
    transport: T,
    base_url: String,
    signer: S,
    tokens: TokenStore,
}

impl<T: HttpTransport, S: MessageSigner> NonceLogin<T, S> {
    pub fn new(transport: T, base_url: impl Into<String>, signer: S, tokens: TokenStore) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            signer,
            tokens,
        }
    }

    /// Runs the full exchange. `Ok(false)` means the service refused the signature.
    pub async fn login(&self) -> Result<bool, CatalogError> {
        let address = self.signer.address();
        if address.trim().is_empty() {
            return Err(CatalogError::InvalidInput("Signer has no address".to_string()));
        }

        let response = self
            .transport
            .execute(&CatalogRequest::get(segment_url(
                &self.base_url,
                &["nonce", address.as_str()],
            )?))
            .await?;
        if !response.is_success() {
            return Err(CatalogError::Status {
                name: format!("nonce/{}", address),
                status: response.status.as_u16(),
            });
        }
        let NonceResponse { nonce } = response.json("nonce")?;

        let message = login_message(&nonce);
        let signature = self
            .signer
            .sign(&message)
            .await
            .map_err(|e| CatalogError::Signing(e.to_string()))?;

        let body = serde_json::to_value(AuthRequest {
            address: address.clone(),
            signature,
            message,
        })
        .map_err(|e| CatalogError::InvalidInput(e.to_string()))?;

        let response = self
            .transport
            .execute(&CatalogRequest::post_json(segment_url(&self.base_url, &["auth"])?, body))
            .await?;
        if !response.is_success() {
            warn!("Authentication for {} rejected: HTTP {}", address, response.status);
            return Ok(false);
        }

        let auth: AuthResponse = response.json("auth")?;
        match auth.access_token.filter(|token| !token.trim().is_empty()) {
            Some(token) => {
                self.tokens.set(token);
                info!("Authenticated as {}", address);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl<T: HttpTransport, S: MessageSigner> LoginHandler for NonceLogin<T, S> {
    async fn attempt_login(&self) -> bool {
        match self.login().await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                warn!("Login failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::ScriptedTransport;
    use std::sync::Arc;

    struct EchoSigner;

    #[async_trait::async_trait]
    impl MessageSigner for EchoSigner {
        fn address(&self) -> String {
            "0xabc".to_string()
        }

        async fn sign(&self, message: &str) -> anyhow::Result<String> {
            Ok(format!("signed:{}", message))
        }
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            (200, r#"{"nonce":"42"}"#),
            (200, r#"{"access_token":"tok"}"#),
        ]));
        let tokens = TokenStore::new();
        let login = NonceLogin::new(transport.clone(), "http://catalog", EchoSigner, tokens.clone());

        assert!(login.attempt_login().await);
        assert_eq!(tokens.get(), Some("tok".to_string()));

        let sent = transport.requests();
        assert_eq!(sent[0].url, "http://catalog/nonce/0xabc");
        assert_eq!(sent[1].url, "http://catalog/auth");
        assert_eq!(
            sent[1].body,
            Some(serde_json::json!({
                "address": "0xabc",
                "signature": "signed:Login nonce: 42",
                "message": "Login nonce: 42"
            }))
        );
    }

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            (200, r#"{"nonce":"42"}"#),
            (200, r#"{}"#),
        ]));
        let tokens = TokenStore::new();
        let login = NonceLogin::new(transport, "http://catalog", EchoSigner, tokens.clone());

        assert!(!login.attempt_login().await);
        assert!(!tokens.is_present());
    }

    #[tokio::test]
    async fn test_login_nonce_failure_is_false() {
        let transport = Arc::new(ScriptedTransport::new(vec![(500, "")]));
        let login = NonceLogin::new(transport.clone(), "http://catalog", EchoSigner, TokenStore::new());

        assert!(!login.attempt_login().await);
        assert_eq!(transport.requests().len(), 1);
    }
}
