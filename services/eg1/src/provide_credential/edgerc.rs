use crate::config::validate_host;
use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use edgegrid_core::{Context, Error, ProvideCredential, Result};
use ini::Ini;
use log::debug;

/// EdgercCredentialProvider loads EdgeGrid credentials from an `.edgerc` file.
///
/// The file is looked up in order from:
/// 1. The path set via `with_path()`
/// 2. The `AKAMAI_EDGERC` environment variable
/// 3. `~/.edgerc`
///
/// The section is picked the same way from `with_section()`,
/// `AKAMAI_EDGERC_SECTION` and finally `default`.
///
/// A missing file or section means there is nothing to load. A section that
/// exists but lacks `host`, `client_token`, `client_secret` or
/// `access_token` is a configuration error.
#[derive(Debug, Default, Clone)]
pub struct EdgercCredentialProvider {
    path: Option<String>,
    section: Option<String>,
}

impl EdgercCredentialProvider {
    /// Create a new EdgercCredentialProvider with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path to the edgerc file.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the section to read.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for EdgercCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let path = self
            .path
            .clone()
            .or_else(|| ctx.env_var(AKAMAI_EDGERC))
            .unwrap_or_else(|| DEFAULT_EDGERC_PATH.to_string());
        let section = self
            .section
            .clone()
            .or_else(|| ctx.env_var(AKAMAI_EDGERC_SECTION))
            .unwrap_or_else(|| DEFAULT_SECTION.to_string());

        let Some(expanded_path) = ctx.expand_home_dir(&path) else {
            debug!("failed to expand homedir for path: {path}");
            return Ok(None);
        };

        let content = match ctx.file_read(&expanded_path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read edgerc file {expanded_path}: {err:?}");
                return Ok(None);
            }
        };

        let conf = Ini::load_from_str(&String::from_utf8_lossy(&content)).map_err(|e| {
            Error::config_invalid(format!("failed to parse edgerc file {expanded_path}"))
                .with_source(anyhow::Error::new(e))
        })?;

        let Some(props) = conf.section(Some(section.as_str())) else {
            debug!("section {section} not found in edgerc file {expanded_path}");
            return Ok(None);
        };

        let required = |key: &str| {
            props.get(key).ok_or_else(|| {
                Error::config_invalid(format!(
                    "required option {key:?} is missing from section {section:?} of {expanded_path}"
                ))
            })
        };
        let host = required(EDGERC_HOST)?;
        let client_token = required(EDGERC_CLIENT_TOKEN)?;
        let client_secret = required(EDGERC_CLIENT_SECRET)?;
        let access_token = required(EDGERC_ACCESS_TOKEN)?;

        validate_host(host)?;

        let mut cred = Credential::new(client_token, client_secret, access_token).with_host(host);
        cred.account_key = props.get(EDGERC_ACCOUNT_KEY).map(|v| v.to_string());
        if let Some(v) = props.get(EDGERC_HEADERS_TO_SIGN) {
            cred.headers_to_sign = v
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = props.get(EDGERC_MAX_BODY) {
            let max_body = v.trim().parse::<usize>().map_err(|e| {
                Error::config_invalid(format!(
                    "max_body {v:?} in section {section:?} is not a valid size"
                ))
                .with_source(e)
            })?;
            cred = cred.with_max_body(max_body);
        }

        Ok(Some(cred))
    }
}
