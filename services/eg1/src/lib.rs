//! Akamai EdgeGrid `EG1-HMAC-SHA256` signer.
//!
//! This crate signs HTTP requests for Akamai `{OPEN}` APIs. It plugs into
//! [`edgegrid_core::Signer`] through [`RequestSigner`] and a set of
//! credential providers.
//!
//! ## Example
//!
//! ```no_run
//! use edgegrid_core::{Context, OsEnv, Result, Signer};
//! use edgegrid_eg1::{DefaultCredentialProvider, RequestSigner};
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! // The context needs a file reader for `.edgerc` and `OsEnv` for `AKAMAI_*`.
//! let ctx = ctx.with_env(OsEnv);
//! let signer = Signer::new(ctx, DefaultCredentialProvider::new(), RequestSigner::new());
//!
//! let mut req = http::Request::post("https://akab-xxx.luna.akamaiapis.net/papi/v1/search/find-by-value")
//!     .body(br#"{"propertyName":"example"}"#.to_vec())
//!     .unwrap();
//! signer.sign_request(&mut req).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Credential Sources
//!
//! ### Environment Variables
//!
//! ```bash
//! export AKAMAI_HOST=akab-xxx.luna.akamaiapis.net
//! export AKAMAI_CLIENT_TOKEN=akab-client-token
//! export AKAMAI_CLIENT_SECRET=client-secret
//! export AKAMAI_ACCESS_TOKEN=akab-access-token
//! ```
//!
//! ### `.edgerc`
//!
//! ```ini
//! [default]
//! host = akab-xxx.luna.akamaiapis.net
//! client_token = akab-client-token
//! client_secret = client-secret
//! access_token = akab-access-token
//! headers_to_sign = X-Test1, X-Test2
//! max_body = 131072
//! ```

mod constants;
pub use constants::DEFAULT_MAX_BODY;
pub use constants::EG1_HMAC_SHA256;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;
