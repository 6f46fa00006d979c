use crate::eg1::DefaultSigner;
use bytes::Bytes;
use edgegrid_core::{Context, Error, Result};
use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderValue, Method};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Session client that signs requests and sends them through the context.
///
/// The client holds no global state. Build one per set of credentials and
/// share it by cloning.
///
/// ```no_run
/// use edgegrid::{default_context, default_signer, Client};
///
/// # async fn example() -> edgegrid::Result<()> {
/// let client = Client::new(default_context(), default_signer());
/// let contracts: serde_json::Value = client.get_json("/papi/v1/contracts").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    ctx: Context,
    signer: DefaultSigner,
    user_agent: String,
}

impl Client {
    /// Create a new client.
    ///
    /// `ctx` is used to send requests and must carry an `HttpSend`
    /// implementation. The signer keeps its own context for credential loading.
    pub fn new(ctx: Context, signer: DefaultSigner) -> Self {
        Self {
            ctx,
            signer,
            user_agent: format!("edgegrid-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the `User-Agent` sent when a request has none.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sign and send a request.
    ///
    /// Relative URIs are resolved against the credential host while signing.
    pub async fn send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (mut parts, body) = req.into_parts();
        if !parts.headers.contains_key(USER_AGENT) {
            parts
                .headers
                .insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        }

        self.signer.sign(&mut parts, &body).await?;

        debug!("sending request: {} {}", parts.method, parts.uri);
        let resp = self
            .ctx
            .http_send(http::Request::from_parts(parts, body))
            .await?;
        debug!("got response: {}", resp.status());
        Ok(resp)
    }

    /// Send a JSON request and decode the JSON response.
    ///
    /// Responses outside of 2xx fail with [`ErrorKind::Unexpected`](crate::ErrorKind::Unexpected),
    /// the message carries the status and the response body. An empty 2xx body
    /// decodes as JSON `null`.
    pub async fn exec_json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = match body {
            Some(v) => Bytes::from(serde_json::to_vec(v).map_err(|e| {
                Error::request_invalid("failed to serialize request body").with_source(e)
            })?),
            None => Bytes::new(),
        };

        let req = http::Request::builder()
            .method(method.clone())
            .uri(path)
            .header(ACCEPT, "application/json")
            .body(body)?;
        let resp = self.send(req).await?;

        let status = resp.status();
        let body = resp.into_body();
        if !status.is_success() {
            return Err(Error::unexpected(format!(
                "{method} {path} failed with status {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }

        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        serde_json::from_slice(body).map_err(|e| {
            Error::unexpected(format!("failed to decode response of {method} {path}")).with_source(e)
        })
    }

    /// Send a `GET` request and decode the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.exec_json::<T, ()>(Method::GET, path, None).await
    }
}
