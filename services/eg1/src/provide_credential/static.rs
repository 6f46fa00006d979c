use crate::config::validate_host;
use crate::Credential;
use async_trait::async_trait;
use edgegrid_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider provides a fixed EdgeGrid credential.
///
/// This provider is used when the client tokens are already at hand and no
/// `.edgerc` or environment lookup is wanted.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider from the three client tokens.
    pub fn new(client_token: &str, client_secret: &str, access_token: &str) -> Self {
        Self {
            credential: Credential::new(client_token, client_secret, access_token),
        }
    }

    /// Set the API base host.
    pub fn with_host(mut self, host: &str) -> Self {
        self.credential.host = Some(host.to_string());
        self
    }

    /// Set the account switch key.
    pub fn with_account_key(mut self, account_key: &str) -> Self {
        self.credential.account_key = Some(account_key.to_string());
        self
    }

    /// Set the header names covered by the signature.
    pub fn with_headers_to_sign(mut self, headers: &[&str]) -> Self {
        self.credential.headers_to_sign = headers.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Set the body hashing cap.
    pub fn with_max_body(mut self, max_body: usize) -> Self {
        self.credential = self.credential.with_max_body(max_body);
        self
    }
}

impl From<Credential> for StaticCredentialProvider {
    fn from(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        if let Some(host) = &self.credential.host {
            validate_host(host)?;
        }
        Ok(Some(self.credential.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgegrid_core::ErrorKind;

    #[tokio::test]
    async fn test_static_credential_provider() -> anyhow::Result<()> {
        let provider = StaticCredentialProvider::new("ct", "cs", "at")
            .with_host("akaa-baseurl.luna.akamaiapis.net")
            .with_headers_to_sign(&["X-Test1"])
            .with_max_body(2048);

        let cred = provider
            .provide_credential(&Context::new())
            .await?
            .expect("credential must be provided");
        assert_eq!(cred.client_token, "ct");
        assert_eq!(cred.client_secret, "cs");
        assert_eq!(cred.access_token, "at");
        assert_eq!(cred.host.as_deref(), Some("akaa-baseurl.luna.akamaiapis.net"));
        assert_eq!(cred.headers_to_sign, vec!["X-Test1"]);
        assert_eq!(cred.max_body, 2048);
        assert!(cred.account_key.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_static_credential_provider_rejects_trailing_slash() {
        let provider =
            StaticCredentialProvider::new("ct", "cs", "at").with_host("akaa-baseurl.net/");

        let err = provider
            .provide_credential(&Context::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
