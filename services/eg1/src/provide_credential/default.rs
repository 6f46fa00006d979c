use crate::provide_credential::{EdgercCredentialProvider, EnvCredentialProvider};
use crate::Credential;
use async_trait::async_trait;
use edgegrid_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider tries the usual credential sources in order:
///
/// 1. Environment variables (`AKAMAI_HOST`, `AKAMAI_CLIENT_TOKEN`, ...)
/// 2. The `.edgerc` file
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(EdgercCredentialProvider::new());

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }

    /// Add a credential provider in front of the default chain.
    pub fn push_front(mut self, provider: impl ProvideCredential<Credential = Credential>) -> Self {
        self.chain = self.chain.push_front(provider);
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AKAMAI_EDGERC, AKAMAI_EDGERC_SECTION};
    use crate::{RequestSigner, StaticCredentialProvider};
    use edgegrid_core::{ErrorKind, Signer, StaticEnv};
    use edgegrid_file_read_tokio::TokioFileRead;
    use std::collections::HashMap;

    fn ctx(envs: HashMap<String, String>) -> Context {
        Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: None,
                envs,
            })
    }

    fn fixture() -> String {
        format!("{}/tests/edgerc", env!("CARGO_MANIFEST_DIR"))
    }

    #[tokio::test]
    async fn test_default_provider_without_sources() {
        let _ = env_logger::builder().is_test(true).try_init();

        let x = DefaultCredentialProvider::new()
            .provide_credential(&ctx(HashMap::new()))
            .await
            .expect("load must succeed");
        assert!(x.is_none());
    }

    #[tokio::test]
    async fn test_default_provider_prefers_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        let envs = HashMap::from_iter([
            (AKAMAI_EDGERC.to_string(), fixture()),
            ("AKAMAI_HOST".to_string(), "env-host".to_string()),
            ("AKAMAI_CLIENT_TOKEN".to_string(), "env-client-token".to_string()),
            ("AKAMAI_CLIENT_SECRET".to_string(), "env-client-secret".to_string()),
            ("AKAMAI_ACCESS_TOKEN".to_string(), "env-access-token".to_string()),
        ]);

        let x = DefaultCredentialProvider::new()
            .provide_credential(&ctx(envs))
            .await
            .expect("load must succeed")
            .expect("credential must exist");
        assert_eq!(x.client_token, "env-client-token");
    }

    #[tokio::test]
    async fn test_default_provider_falls_back_to_edgerc() {
        let envs = HashMap::from_iter([(AKAMAI_EDGERC.to_string(), fixture())]);

        let x = DefaultCredentialProvider::new()
            .provide_credential(&ctx(envs))
            .await
            .expect("load must succeed")
            .expect("credential must exist");
        assert_eq!(x.client_token, "akab-client-token-xxx-xxxxxxxxxxxxxxxx");
    }

    #[tokio::test]
    async fn test_default_provider_push_front() {
        let envs = HashMap::from_iter([(AKAMAI_EDGERC.to_string(), fixture())]);

        let x = DefaultCredentialProvider::new()
            .push_front(StaticCredentialProvider::new("static-ct", "static-cs", "static-at"))
            .provide_credential(&ctx(envs))
            .await
            .expect("load must succeed")
            .expect("credential must exist");
        assert_eq!(x.client_token, "static-ct");
    }

    #[tokio::test]
    async fn test_default_provider_reports_broken_edgerc() {
        let _ = env_logger::builder().is_test(true).try_init();

        let envs = HashMap::from_iter([
            (AKAMAI_EDGERC.to_string(), fixture()),
            (
                AKAMAI_EDGERC_SECTION.to_string(),
                "missing-client-secret".to_string(),
            ),
        ]);

        let err = DefaultCredentialProvider::new()
            .provide_credential(&ctx(envs))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.to_string().contains("client_secret"));
    }

    #[tokio::test]
    async fn test_signer_surfaces_broken_edgerc() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(".edgerc");
        std::fs::write(
            &path,
            "[default]\n\
             host = akaa-baseurl.luna.akamaiapis.net\n\
             client_token = akab-client-token\n\
             access_token = akab-access-token\n",
        )?;

        let envs = HashMap::from_iter([(
            AKAMAI_EDGERC.to_string(),
            path.to_string_lossy().to_string(),
        )]);
        let signer = Signer::new(
            ctx(envs),
            DefaultCredentialProvider::new(),
            RequestSigner::new(),
        );

        let mut req = http::Request::get("https://akaa-baseurl.luna.akamaiapis.net/")
            .body(Vec::<u8>::new())?;
        let err = signer.sign_request(&mut req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(req.headers().is_empty());
        Ok(())
    }
}
