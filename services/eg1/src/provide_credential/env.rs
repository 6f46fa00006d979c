use crate::config::{env_key, parse_env_max_body, validate_host};
use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use edgegrid_core::{Context, ProvideCredential, Result};
use log::debug;

/// EnvCredentialProvider loads EdgeGrid credentials from environment variables.
///
/// For the `default` section this provider looks for:
/// - `AKAMAI_HOST`
/// - `AKAMAI_CLIENT_TOKEN`
/// - `AKAMAI_CLIENT_SECRET`
/// - `AKAMAI_ACCESS_TOKEN`
/// - `AKAMAI_ACCOUNT_KEY` (optional)
/// - `AKAMAI_MAX_BODY` (optional)
///
/// Any other section inserts its upper-cased name after the prefix, e.g.
/// `AKAMAI_CCU_HOST` for section `ccu`.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider {
    section: Option<String>,
}

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the section, overriding `AKAMAI_EDGERC_SECTION`.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let section = self
            .section
            .clone()
            .or_else(|| ctx.env_var(AKAMAI_EDGERC_SECTION))
            .unwrap_or_else(|| DEFAULT_SECTION.to_string());

        let var = |key: &str| {
            let name = env_key(&section, key);
            let v = ctx.env_var(&name);
            if v.is_none() {
                debug!("required env {name} is not set");
            }
            v
        };
        let (Some(host), Some(client_token), Some(client_secret), Some(access_token)) = (
            var(ENV_HOST),
            var(ENV_CLIENT_TOKEN),
            var(ENV_CLIENT_SECRET),
            var(ENV_ACCESS_TOKEN),
        ) else {
            return Ok(None);
        };

        validate_host(&host)?;

        let mut cred = Credential::new(client_token, client_secret, access_token).with_host(host);
        cred.account_key = ctx.env_var(&env_key(&section, ENV_ACCOUNT_KEY));
        if let Some(v) = ctx.env_var(&env_key(&section, ENV_MAX_BODY)) {
            cred = cred.with_max_body(parse_env_max_body(&v));
        }

        Ok(Some(cred))
    }
}
