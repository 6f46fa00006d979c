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

use crate::config::validate_host;
use crate::constants::{ACCOUNT_SWITCH_KEY, EG1_HMAC_SHA256};
use crate::Credential;
use async_trait::async_trait;
use edgegrid_core::hash::{base64_hmac_sha256, base64_sha256};
use edgegrid_core::time::{format_edgegrid_timestamp, now, DateTime};
use edgegrid_core::{Context, Error, Result, SignRequest, SigningCredential, SigningRequest};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::request::Parts;
use http::uri::Scheme;
use http::{HeaderValue, Method};
use log::debug;

/// RequestSigner that implements EdgeGrid `EG1-HMAC-SHA256` signing.
///
/// Every call draws a fresh timestamp and nonce, so the signer itself holds
/// no state and can be shared between tasks.
///
/// - [Authenticate with EdgeGrid](https://techdocs.akamai.com/developer/docs/authenticate-with-edgegrid)
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
    nonce: Option<String>,
}

impl RequestSigner {
    /// Create a new EdgeGrid request signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Specify the nonce.
    ///
    /// # Note
    ///
    /// A nonce must never be reused against the real API.
    /// Only use this function for testing.
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        body: &[u8],
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid(
                "credential is required for edgegrid signing",
            ));
        };
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "client_token, client_secret and access_token must not be empty",
            ));
        }

        let mut signed_req = SigningRequest::build(req)?;

        if signed_req.authority.is_none() {
            let Some(host) = cred.host.as_deref() else {
                return Err(Error::request_invalid(
                    "request has no host and credential has no host configured",
                ));
            };
            validate_host(host)?;
            signed_req.set_host(Scheme::HTTPS, host)?;
        }

        if let Some(key) = &cred.account_key {
            if !signed_req.query_contains(ACCOUNT_SWITCH_KEY) {
                signed_req.query_push(ACCOUNT_SWITCH_KEY, key);
            }
        }

        // EdgeGrid APIs only speak JSON.
        signed_req
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let timestamp = format_edgegrid_timestamp(self.time.unwrap_or_else(now));
        let nonce = self.nonce.clone().unwrap_or_else(make_nonce);

        let auth_header = format!(
            "{EG1_HMAC_SHA256} client_token={};access_token={};timestamp={timestamp};nonce={nonce};",
            cred.client_token, cred.access_token
        );

        let canonical_headers = canonicalize_headers(&signed_req, &cred.headers_to_sign);
        let content_hash = content_hash(&signed_req.method, body, cred.max_body);
        let string_to_sign =
            string_to_sign(&signed_req, &canonical_headers, &content_hash, &auth_header)?;
        debug!("calculated string to sign: {string_to_sign:?}");

        let signing_key = signing_key(&cred.client_secret, &timestamp);
        let signature = base64_hmac_sha256(signing_key.as_bytes(), string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!("{auth_header}signature={signature}"))
            .map_err(|e| {
                Error::credential_invalid("credential contains characters not allowed in a header")
                    .with_source(e)
            })?;
        authorization.set_sensitive(true);
        signed_req.headers.insert(AUTHORIZATION, authorization);

        signed_req.apply(req)
    }
}

fn make_nonce() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Collapse every run of whitespace into a single space and trim both ends.
fn minify(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case char by char, keeping only the first char of each mapping so
/// `İ` becomes `i` and the length in chars never changes.
fn lowercase(value: &str) -> String {
    value
        .chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Canonical form of the headers covered by the signature.
///
/// Names come out of `http` lower-cased, so allow-list entries are compared
/// ignoring ASCII case. Pairs are emitted in byte order of the name.
fn canonicalize_headers(req: &SigningRequest, headers_to_sign: &[String]) -> String {
    req.header_name_to_vec_sorted()
        .into_iter()
        .filter(|name| headers_to_sign.iter().any(|h| h.eq_ignore_ascii_case(name)))
        .filter_map(|name| {
            let value = req.headers.get(name)?;
            let value = lowercase(&minify(&String::from_utf8_lossy(value.as_bytes())));
            Some(format!("{name}:{value}"))
        })
        .collect::<Vec<_>>()
        .join("\t")
}

/// Content hash is only computed for non-empty POST bodies, capped at `max_body` bytes.
fn content_hash(method: &Method, body: &[u8], max_body: usize) -> String {
    if method != Method::POST || body.is_empty() {
        return String::new();
    }

    let end = body.len().min(max_body);
    if end < body.len() {
        debug!("body is {} bytes, hashing the first {end}", body.len());
    }
    base64_sha256(&body[..end])
}

fn string_to_sign(
    req: &SigningRequest,
    canonical_headers: &str,
    content_hash: &str,
    auth_header: &str,
) -> Result<String> {
    let path_and_query = req.path_and_query();
    Ok([
        req.method.as_str(),
        req.scheme.as_str(),
        req.authority_str()?,
        path_and_query.as_str(),
        canonical_headers,
        content_hash,
        auth_header,
    ]
    .join("\t"))
}

/// Signing key is derived per timestamp and never cached.
fn signing_key(client_secret: &str, timestamp: &str) -> String {
    base64_hmac_sha256(client_secret.as_bytes(), timestamp.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgegrid_core::time::parse_edgegrid_timestamp;
    use edgegrid_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    const HOST: &str = "akaa-baseurl-xxxxxxxxxxx-xxxxxxxxxxxxx.luna.akamaiapis.net";
    const TIMESTAMP: &str = "20140321T19:34:21+0000";
    const NONCE: &str = "nonce-xx-xxxx-xxxx-xxxx-xxxxxxxxxxxx";

    fn test_credential() -> Credential {
        Credential::new(
            "akab-client-token-xxx-xxxxxxxxxxxxxxxx",
            "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx=",
            "akab-access-token-xxx-xxxxxxxxxxxxxxxx",
        )
        .with_headers_to_sign(["X-Test1", "X-Test2", "X-Test3"])
        .with_max_body(2048)
    }

    fn fixed_signer() -> RequestSigner {
        RequestSigner::new()
            .with_time(parse_edgegrid_timestamp(TIMESTAMP).expect("timestamp must be valid"))
            .with_nonce(NONCE)
    }

    fn parts(method: &str, uri: &str) -> Parts {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    fn authorization(parts: &Parts) -> &str {
        parts.headers[AUTHORIZATION]
            .to_str()
            .expect("authorization must be ascii")
    }

    fn field<'a>(auth: &'a str, key: &str) -> &'a str {
        auth.trim_start_matches("EG1-HMAC-SHA256 ")
            .split(';')
            .find_map(|kv| kv.strip_prefix(key)?.strip_prefix('='))
            .expect("field must exist")
    }

    #[tokio::test]
    async fn test_sign_simple_get() -> Result<()> {
        let mut req = parts("GET", &format!("https://{HOST}/"));
        fixed_signer()
            .sign_request(&Context::new(), &mut req, &[], Some(&test_credential()))
            .await?;

        assert_eq!(
            authorization(&req),
            "EG1-HMAC-SHA256 client_token=akab-client-token-xxx-xxxxxxxxxxxxxxxx;\
             access_token=akab-access-token-xxx-xxxxxxxxxxxxxxxx;\
             timestamp=20140321T19:34:21+0000;\
             nonce=nonce-xx-xxxx-xxxx-xxxx-xxxxxxxxxxxx;\
             signature=tL+y4hxyHxgWVD30X3pWnGKHcPzmrIF+LThiAOhMxYU="
        );
        assert!(req.headers[AUTHORIZATION].is_sensitive());
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_is_deterministic() -> Result<()> {
        let signer = fixed_signer();
        let cred = test_credential();

        let mut a = parts("POST", &format!("https://{HOST}/testapi/v1/t3"));
        let mut b = parts("POST", &format!("https://{HOST}/testapi/v1/t3"));
        signer
            .sign_request(&Context::new(), &mut a, b"data", Some(&cred))
            .await?;
        signer
            .sign_request(&Context::new(), &mut b, b"data", Some(&cred))
            .await?;

        assert_eq!(authorization(&a), authorization(&b));
        Ok(())
    }

    #[tokio::test]
    async fn test_nonce_is_unique_per_call() -> Result<()> {
        let signer = RequestSigner::new();
        let cred = test_credential();

        let mut nonces = HashSet::new();
        for _ in 0..128 {
            let mut req = parts("GET", &format!("https://{HOST}/"));
            signer
                .sign_request(&Context::new(), &mut req, &[], Some(&cred))
                .await?;
            nonces.insert(field(authorization(&req), "nonce").to_string());
        }

        assert_eq!(nonces.len(), 128);
        Ok(())
    }

    #[tokio::test]
    async fn test_timestamp_format() -> Result<()> {
        let mut req = parts("GET", &format!("https://{HOST}/"));
        RequestSigner::new()
            .sign_request(&Context::new(), &mut req, &[], Some(&test_credential()))
            .await?;

        let ts = field(authorization(&req), "timestamp");
        let bytes = ts.as_bytes();
        assert_eq!(ts.len(), 22);
        assert_eq!(bytes[8], b'T');
        assert_eq!(bytes[11], b':');
        assert_eq!(bytes[14], b':');
        assert!(ts.ends_with("+0000"));
        assert!(parse_edgegrid_timestamp(ts).is_ok());
        Ok(())
    }

    #[test]
    fn test_minify() {
        assert_eq!(minify("  first-thing \t\n second-thing  "), "first-thing second-thing");
        assert_eq!(minify(""), "");
        assert_eq!(minify("   "), "");
    }

    #[test]
    fn test_canonicalize_headers() -> Result<()> {
        let req = http::Request::get(format!("https://{HOST}/"))
            .header("X-Test2", "b")
            .header("X-Extra", "ignored")
            .header("X-Test1", " a  b ")
            .body(())?
            .into_parts()
            .0;
        let req = SigningRequest::build(&req)?;

        let allow = vec!["X-Test1".to_string(), "X-Test2".to_string()];
        assert_eq!(canonicalize_headers(&req, &allow), "x-test1:a b\tx-test2:b");
        assert_eq!(canonicalize_headers(&req, &[]), "");
        Ok(())
    }

    #[test]
    fn test_lowercase_maps_each_char_once() {
        assert_eq!(lowercase("Mixed CASE Value"), "mixed case value");
        assert_eq!(lowercase("\u{130}STANBUL"), "istanbul");
        assert_eq!(lowercase("ÄÖÜ"), "äöü");
    }

    #[test]
    fn test_canonicalize_non_ascii_value() -> Result<()> {
        let req = http::Request::get(format!("https://{HOST}/"))
            .header("X-Test1", HeaderValue::from_bytes("\u{130}d".as_bytes())?)
            .body(())?
            .into_parts()
            .0;
        let req = SigningRequest::build(&req)?;

        let allow = vec!["X-Test1".to_string()];
        assert_eq!(canonicalize_headers(&req, &allow), "x-test1:id");
        Ok(())
    }

    #[test]
    fn test_content_hash() {
        let cred = test_credential();

        assert_eq!(content_hash(&Method::GET, b"data", cred.max_body), "");
        assert_eq!(content_hash(&Method::PUT, b"data", cred.max_body), "");
        assert_eq!(content_hash(&Method::POST, b"", cred.max_body), "");
        assert_eq!(
            content_hash(&Method::POST, b"data", cred.max_body),
            base64_sha256(b"data")
        );

        let body = vec![b'd'; 4096];
        assert_eq!(
            content_hash(&Method::POST, &body, cred.max_body),
            base64_sha256(&body[..2048])
        );
    }

    #[test]
    fn test_signing_key() {
        assert_eq!(
            signing_key("xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx=", TIMESTAMP),
            base64_hmac_sha256(
                b"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx=",
                TIMESTAMP.as_bytes()
            )
        );
    }

    #[test]
    fn test_string_to_sign_has_seven_fields() -> Result<()> {
        let req = SigningRequest::build(&parts("GET", &format!("https://{HOST}/a?b=1")))?;
        let s = string_to_sign(&req, "", "", "EG1-HMAC-SHA256 x;")?;

        assert_eq!(
            s,
            format!("GET\thttps\t{HOST}\t/a?b=1\t\t\tEG1-HMAC-SHA256 x;")
        );
        assert_eq!(s.split('\t').count(), 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_content_type_is_forced() -> Result<()> {
        let mut req = http::Request::post(format!("https://{HOST}/testapi/v1/t3"))
            .header(CONTENT_TYPE, "text/plain")
            .body(())?
            .into_parts()
            .0;
        fixed_signer()
            .sign_request(&Context::new(), &mut req, b"data", Some(&test_credential()))
            .await?;

        assert_eq!(req.headers[CONTENT_TYPE], "application/json");
        Ok(())
    }

    #[tokio::test]
    async fn test_content_type_is_signed_when_allowed() -> Result<()> {
        let cred = test_credential().with_headers_to_sign(["Content-Type"]);

        let mut plain = http::Request::get(format!("https://{HOST}/"))
            .header(CONTENT_TYPE, "text/plain")
            .body(())?
            .into_parts()
            .0;
        let mut json = parts("GET", &format!("https://{HOST}/"));
        fixed_signer()
            .sign_request(&Context::new(), &mut plain, &[], Some(&cred))
            .await?;
        fixed_signer()
            .sign_request(&Context::new(), &mut json, &[], Some(&cred))
            .await?;

        assert_eq!(authorization(&plain), authorization(&json));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_credential_leaves_request_untouched() -> Result<()> {
        let mut req = parts("GET", &format!("https://{HOST}/"));
        let err = fixed_signer()
            .sign_request(&Context::new(), &mut req, &[], None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(req.headers.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_incomplete_credential_is_rejected() -> Result<()> {
        let mut cred = test_credential();
        cred.client_secret = String::new();

        let mut req = parts("GET", &format!("https://{HOST}/"));
        let err = fixed_signer()
            .sign_request(&Context::new(), &mut req, &[], Some(&cred))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(req.headers.get(AUTHORIZATION).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_relative_uri_uses_credential_host() -> Result<()> {
        let cred = test_credential().with_host(HOST);

        let mut relative = parts("GET", "/testapi/v1/t1?p1=1&p2=2");
        let mut absolute = parts("GET", &format!("https://{HOST}/testapi/v1/t1?p1=1&p2=2"));
        fixed_signer()
            .sign_request(&Context::new(), &mut relative, &[], Some(&cred))
            .await?;
        fixed_signer()
            .sign_request(&Context::new(), &mut absolute, &[], Some(&cred))
            .await?;

        assert_eq!(relative.uri, absolute.uri);
        assert_eq!(authorization(&relative), authorization(&absolute));
        Ok(())
    }

    #[tokio::test]
    async fn test_relative_uri_without_host_fails() -> Result<()> {
        let mut req = parts("GET", "/testapi/v1/t1");
        let err = fixed_signer()
            .sign_request(&Context::new(), &mut req, &[], Some(&test_credential()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert_eq!(req.uri, "/testapi/v1/t1");
        assert!(req.headers.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_account_switch_key() -> Result<()> {
        let cred = test_credential().with_account_key("1-ABCDE:1-2FGHI");

        let mut req = parts("GET", &format!("https://{HOST}/papi/v1/contracts"));
        fixed_signer()
            .sign_request(&Context::new(), &mut req, &[], Some(&cred))
            .await?;
        assert_eq!(
            req.uri.path_and_query().map(|v| v.as_str()),
            Some("/papi/v1/contracts?accountSwitchKey=1-ABCDE%3A1-2FGHI")
        );

        let mut req = parts(
            "GET",
            &format!("https://{HOST}/papi/v1/contracts?accountSwitchKey=other"),
        );
        fixed_signer()
            .sign_request(&Context::new(), &mut req, &[], Some(&cred))
            .await?;
        assert_eq!(req.uri.query(), Some("accountSwitchKey=other"));
        Ok(())
    }
}
