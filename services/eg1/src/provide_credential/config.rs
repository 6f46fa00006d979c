use crate::provide_credential::EdgercCredentialProvider;
use crate::{Config, Credential};
use async_trait::async_trait;
use edgegrid_core::{Context, ProvideCredential, Result};
use std::sync::Arc;

/// ConfigCredentialProvider builds a credential from an explicit [`Config`].
///
/// Fields left unset are filled from the environment first. If the three
/// tokens are still incomplete, the credential is loaded from the edgerc file
/// and section named by the config, and the config's `account_key`,
/// `headers_to_sign` and `max_body` take precedence over the file.
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new ConfigCredentialProvider.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = self.config.as_ref().clone().from_env(ctx);
        if let Some(cred) = config.to_credential()? {
            return Ok(Some(cred));
        }

        let Some(mut cred) = EdgercCredentialProvider::new()
            .with_path(config.edgerc_path())
            .with_section(config.section())
            .provide_credential(ctx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(v) = &config.account_key {
            cred.account_key = Some(v.clone());
        }
        if let Some(v) = &config.headers_to_sign {
            cred.headers_to_sign = v.clone();
        }
        if let Some(v) = config.max_body {
            cred = cred.with_max_body(v);
        }
        Ok(Some(cred))
    }
}
