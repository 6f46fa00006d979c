use crate::constants::*;
use crate::Credential;
use edgegrid_core::utils::Redact;
use edgegrid_core::{Context, Error, Result};
use log::warn;
use std::fmt::{Debug, Formatter};

/// Config for EdgeGrid credential loading.
///
/// Every field is optional. Values set explicitly always win over values
/// loaded by [`Config::from_env`].
#[derive(Clone, Default)]
pub struct Config {
    /// `edgerc_path` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AKAMAI_EDGERC`]
    /// - default to `~/.edgerc`
    pub edgerc_path: Option<String>,
    /// `section` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AKAMAI_EDGERC_SECTION`]
    /// - default to `default`
    pub section: Option<String>,
    /// `host` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AKAMAI_{SECTION}_HOST`
    pub host: Option<String>,
    /// `client_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AKAMAI_{SECTION}_CLIENT_TOKEN`
    pub client_token: Option<String>,
    /// `client_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AKAMAI_{SECTION}_CLIENT_SECRET`
    pub client_secret: Option<String>,
    /// `access_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AKAMAI_{SECTION}_ACCESS_TOKEN`
    pub access_token: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AKAMAI_{SECTION}_ACCOUNT_KEY`
    pub account_key: Option<String>,
    /// Header names covered by the signature.
    pub headers_to_sign: Option<Vec<String>>,
    /// `max_body` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AKAMAI_{SECTION}_MAX_BODY`
    /// - default to 131072
    pub max_body: Option<usize>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("edgerc_path", &self.edgerc_path)
            .field("section", &self.section)
            .field("host", &self.host)
            .field("client_token", &Redact::from(&self.client_token))
            .field("client_secret", &Redact::from(&self.client_secret))
            .field("access_token", &Redact::from(&self.access_token))
            .field("account_key", &Redact::from(&self.account_key))
            .field("headers_to_sign", &self.headers_to_sign)
            .field("max_body", &self.max_body)
            .finish()
    }
}

impl Config {
    /// Set the edgerc file path.
    pub fn with_edgerc_path(mut self, path: impl Into<String>) -> Self {
        self.edgerc_path = Some(path.into());
        self
    }

    /// Set the edgerc section.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Set the API base host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the client token.
    pub fn with_client_token(mut self, v: impl Into<String>) -> Self {
        self.client_token = Some(v.into());
        self
    }

    /// Set the client secret.
    pub fn with_client_secret(mut self, v: impl Into<String>) -> Self {
        self.client_secret = Some(v.into());
        self
    }

    /// Set the access token.
    pub fn with_access_token(mut self, v: impl Into<String>) -> Self {
        self.access_token = Some(v.into());
        self
    }

    /// Set the account switch key.
    pub fn with_account_key(mut self, v: impl Into<String>) -> Self {
        self.account_key = Some(v.into());
        self
    }

    /// Set the header names covered by the signature.
    pub fn with_headers_to_sign<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers_to_sign = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Set the body hashing cap.
    pub fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = Some(max_body);
        self
    }

    /// The edgerc section in use.
    pub fn section(&self) -> &str {
        self.section.as_deref().unwrap_or(DEFAULT_SECTION)
    }

    /// The edgerc path in use, `~` not yet expanded.
    pub fn edgerc_path(&self) -> &str {
        self.edgerc_path.as_deref().unwrap_or(DEFAULT_EDGERC_PATH)
    }

    /// Load config from env.
    ///
    /// The edgerc location is resolved first, so the section picked by
    /// `AKAMAI_EDGERC_SECTION` also decides which env prefix is read.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(AKAMAI_EDGERC) {
            self.edgerc_path.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(AKAMAI_EDGERC_SECTION) {
            self.section.get_or_insert(v);
        }

        let section = self.section().to_string();
        if let Some(v) = ctx.env_var(&env_key(&section, ENV_HOST)) {
            self.host.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(&env_key(&section, ENV_CLIENT_TOKEN)) {
            self.client_token.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(&env_key(&section, ENV_CLIENT_SECRET)) {
            self.client_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(&env_key(&section, ENV_ACCESS_TOKEN)) {
            self.access_token.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(&env_key(&section, ENV_ACCOUNT_KEY)) {
            self.account_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(&env_key(&section, ENV_MAX_BODY)) {
            self.max_body.get_or_insert(parse_env_max_body(&v));
        }

        self
    }

    /// Build a credential from the explicit tokens.
    ///
    /// Returns `Ok(None)` if any of the three tokens is missing.
    pub fn to_credential(&self) -> Result<Option<Credential>> {
        let (Some(ct), Some(cs), Some(at)) =
            (&self.client_token, &self.client_secret, &self.access_token)
        else {
            return Ok(None);
        };

        let mut cred = Credential::new(ct, cs, at).with_max_body(self.max_body.unwrap_or_default());
        if let Some(host) = &self.host {
            validate_host(host)?;
            cred.host = Some(host.clone());
        }
        cred.account_key = self.account_key.clone();
        if let Some(headers) = &self.headers_to_sign {
            cred.headers_to_sign = headers.clone();
        }

        Ok(Some(cred))
    }
}

/// Build the env key for a section: `AKAMAI_HOST` for the default section,
/// `AKAMAI_{SECTION}_HOST` otherwise.
pub(crate) fn env_key(section: &str, key: &str) -> String {
    if section.eq_ignore_ascii_case(DEFAULT_SECTION) {
        format!("{ENV_PREFIX}_{key}")
    } else {
        format!("{ENV_PREFIX}_{}_{key}", section.to_uppercase())
    }
}

/// Parse `MAX_BODY` from env. Anything unparsable or not positive means the default.
pub(crate) fn parse_env_max_body(v: &str) -> usize {
    match v.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            warn!("ignoring invalid max_body {v:?} from env, using {DEFAULT_MAX_BODY}");
            DEFAULT_MAX_BODY
        }
    }
}

/// Host must be a bare authority, a trailing slash breaks the signed URL.
pub(crate) fn validate_host(host: &str) -> Result<()> {
    if host.ends_with('/') {
        return Err(Error::config_invalid(format!(
            "host {host:?} must not end with a slash"
        )));
    }
    Ok(())
}
