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

use crate::constants::DEFAULT_MAX_BODY;
use edgegrid_core::utils::Redact;
use edgegrid_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credential that holds the EdgeGrid API client tokens.
///
/// A credential is immutable once loaded and can be shared freely between
/// concurrent signing calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// API base host, used when a request carries no authority.
    pub host: Option<String>,
    /// Client token of the API client.
    pub client_token: String,
    /// Client secret of the API client.
    pub client_secret: String,
    /// Access token of the API client.
    pub access_token: String,
    /// Account switch key, sent as the `accountSwitchKey` query parameter.
    pub account_key: Option<String>,
    /// Header names covered by the signature, in configuration order.
    pub headers_to_sign: Vec<String>,
    /// Maximum number of body bytes covered by the content hash.
    pub max_body: usize,
}

impl Default for Credential {
    fn default() -> Self {
        Self {
            host: None,
            client_token: String::new(),
            client_secret: String::new(),
            access_token: String::new(),
            account_key: None,
            headers_to_sign: Vec::new(),
            max_body: DEFAULT_MAX_BODY,
        }
    }
}

impl Credential {
    /// Create a credential from the three client tokens.
    pub fn new(
        client_token: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client_token: client_token.into(),
            client_secret: client_secret.into(),
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    /// Set the API base host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the account switch key.
    pub fn with_account_key(mut self, account_key: impl Into<String>) -> Self {
        self.account_key = Some(account_key.into());
        self
    }

    /// Set the header names covered by the signature.
    pub fn with_headers_to_sign<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers_to_sign = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the body hashing cap. Zero falls back to the default of 131072 bytes.
    pub fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = if max_body == 0 {
            DEFAULT_MAX_BODY
        } else {
            max_body
        };
        self
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
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

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.client_token.is_empty()
            && !self.client_secret.is_empty()
            && !self.access_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_builder() {
        let cred = Credential::new("ct", "cs", "at")
            .with_host("akaa-baseurl.luna.akamaiapis.net")
            .with_account_key("1-ABCDE")
            .with_headers_to_sign(["X-Test1", "X-Test2"])
            .with_max_body(2048);

        assert_eq!(cred.host.as_deref(), Some("akaa-baseurl.luna.akamaiapis.net"));
        assert_eq!(cred.account_key.as_deref(), Some("1-ABCDE"));
        assert_eq!(cred.headers_to_sign, vec!["X-Test1", "X-Test2"]);
        assert_eq!(cred.max_body, 2048);
        assert!(cred.is_valid());
    }

    #[test]
    fn test_zero_max_body_uses_default() {
        let cred = Credential::new("ct", "cs", "at").with_max_body(0);
        assert_eq!(cred.max_body, DEFAULT_MAX_BODY);
    }

    #[test]
    fn test_is_valid() {
        assert!(!Credential::default().is_valid());
        assert!(!Credential::new("ct", "", "at").is_valid());
        assert!(!Credential::new("", "cs", "at").is_valid());
        assert!(!Credential::new("ct", "cs", "").is_valid());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = Credential::new(
            "akab-client-token-xxx-xxxxxxxxxxxxxxxx",
            "very-secret-client-secret-value=",
            "akab-access-token-xxx-xxxxxxxxxxxxxxxx",
        );

        let s = format!("{cred:?}");
        assert!(!s.contains("very-secret-client-secret-value="));
        assert!(!s.contains("akab-client-token-xxx-xxxxxxxxxxxxxxxx"));
        assert!(!s.contains("akab-access-token-xxx-xxxxxxxxxxxxxxxx"));
    }
}
