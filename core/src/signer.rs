use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use bytes::Bytes;
use std::io::Read;
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// It owns the [`Context`], a credential provider and a request signer. The
/// loaded credential is cached and only reloaded once it turns invalid.
/// Signers are cheap to clone and can be shared between tasks; every clone
/// shares the same cached credential.
#[derive(Clone, Debug)]
pub struct Signer<C: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = C>>,
    builder: Arc<dyn SignRequest<Credential = C>>,
    credential: Arc<Mutex<Option<C>>>,
}

impl<C: SigningCredential> Signer<C> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = C>,
        builder: impl SignRequest<Credential = C>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the context, keeping the provider and request signer.
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    /// Replace the credential provider and drop the cached credential.
    pub fn with_credential_provider(
        mut self,
        loader: impl ProvideCredential<Credential = C>,
    ) -> Self {
        self.loader = Arc::new(loader);
        self.credential = Arc::new(Mutex::new(None));
        self
    }

    /// Replace the request signer.
    pub fn with_request_signer(mut self, builder: impl SignRequest<Credential = C>) -> Self {
        self.builder = Arc::new(builder);
        self
    }

    /// The context used by this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    async fn credential(&self) -> Result<Option<C>> {
        let cred = self.credential.lock().expect("lock poisoned").clone();
        if cred.is_valid() {
            return Ok(cred);
        }

        let cred = self.loader.provide_credential(&self.ctx).await?;
        *self.credential.lock().expect("lock poisoned") = cred.clone();
        Ok(cred)
    }

    /// Sign request parts with the given body.
    ///
    /// The body is only read, never consumed.
    pub async fn sign(&self, req: &mut http::request::Parts, body: &[u8]) -> Result<()> {
        let cred = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, body, cred.as_ref())
            .await
    }

    /// Sign a whole request whose body is already in memory.
    pub async fn sign_request<B: AsRef<[u8]>>(&self, req: &mut http::Request<B>) -> Result<()> {
        let (mut parts, _) = http::Request::new(()).into_parts();
        parts.method = req.method().clone();
        parts.uri = req.uri().clone();
        parts.version = req.version();
        parts.headers = req.headers().clone();

        self.sign(&mut parts, req.body().as_ref()).await?;

        *req.method_mut() = parts.method;
        *req.uri_mut() = parts.uri;
        *req.headers_mut() = parts.headers;
        Ok(())
    }

    /// Sign a request whose body is a reader.
    ///
    /// The body is buffered before signing and handed back in the returned
    /// request, so it can still be sent in full. A read failure aborts signing.
    pub async fn sign_reader<R: Read>(&self, req: http::Request<R>) -> Result<http::Request<Bytes>> {
        let (mut parts, mut reader) = req.into_parts();
        let body = {
            let mut buf = Vec::new();
            reader
                .read_to_end(&mut buf)
                .map_err(|e| Error::unexpected("failed to read request body").with_source(e))?;
            Bytes::from(buf)
        };
        drop(reader);

        self.sign(&mut parts, &body).await?;
        Ok(http::Request::from_parts(parts, body))
    }
}
