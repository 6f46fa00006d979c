// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! EdgeGrid `EG1-HMAC-SHA256` support with convenience APIs.

pub use edgegrid_eg1::*;

#[cfg(feature = "default-context")]
use crate::{default_context, Signer};

/// Default EdgeGrid signer type.
pub type DefaultSigner = edgegrid_core::Signer<Credential>;

/// Create a default EdgeGrid signer.
///
/// This function creates a signer with:
/// - Default context (tokio file reader, reqwest HTTP client, OS environment)
/// - Default credential provider (`AKAMAI_*` env values, then `~/.edgerc`)
/// - The `EG1-HMAC-SHA256` request signer
///
/// # Example
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> edgegrid_core::Result<()> {
/// let signer = edgegrid::eg1::default_signer();
///
/// let mut req = http::Request::get("https://akab-xxx.luna.akamaiapis.net/papi/v1/contracts")
///     .body(Vec::<u8>::new())
///     .unwrap();
/// signer.sign_request(&mut req).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Customization
///
/// ```no_run
/// use edgegrid::eg1::{default_signer, EdgercCredentialProvider};
///
/// let signer = default_signer()
///     .with_credential_provider(EdgercCredentialProvider::new().with_section("ccu"));
/// ```
#[cfg(feature = "default-context")]
pub fn default_signer() -> DefaultSigner {
    Signer::new(
        default_context(),
        DefaultCredentialProvider::new(),
        RequestSigner::new(),
    )
}
