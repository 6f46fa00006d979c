use std::str::FromStr;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
///
/// It is built from a borrowed copy of the request parts, so a signer can
/// fail at any point without leaving a half-signed request behind. Changes
/// only reach the request through [`SigningRequest::apply`].
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Option<Authority>,
    /// HTTP path.
    pub path: String,
    /// Raw (still encoded) query string without the leading `?`.
    pub query: Option<String>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &http::request::Parts) -> Result<Self> {
        let uri = parts.uri.clone().into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority,
            path: paq.path().to_string(),
            query: paq.query().map(|v| v.to_string()),
            headers: parts.headers.clone(),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(self, parts: &mut http::request::Parts) -> Result<()> {
        let authority = self
            .authority
            .ok_or_else(|| Error::request_invalid("request without authority is invalid for signing"))?;

        let mut uri_parts = http::uri::Parts::default();
        uri_parts.scheme = Some(self.scheme);
        uri_parts.authority = Some(authority);
        uri_parts.path_and_query = Some(PathAndQuery::from_str(&Self::join_path_and_query(
            &self.path,
            self.query.as_deref(),
        ))?);

        parts.uri = Uri::from_parts(uri_parts)?;
        parts.method = self.method;
        parts.headers = self.headers;

        Ok(())
    }

    /// Get the authority as `&str`, failing if the request has none.
    pub fn authority_str(&self) -> Result<&str> {
        self.authority
            .as_ref()
            .map(|v| v.as_str())
            .ok_or_else(|| Error::request_invalid("request without authority is invalid for signing"))
    }

    /// Replace scheme and authority, keeping path and query.
    pub fn set_host(&mut self, scheme: Scheme, host: &str) -> Result<()> {
        self.scheme = scheme;
        self.authority = Some(Authority::from_str(host)?);
        Ok(())
    }

    /// The request target as it goes over the wire: path, then `?` and the
    /// raw query when one exists.
    pub fn path_and_query(&self) -> String {
        Self::join_path_and_query(&self.path, self.query.as_deref())
    }

    fn join_path_and_query(path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) => {
                let mut s = String::with_capacity(path.len() + q.len() + 1);
                s.push_str(path);
                s.push('?');
                s.push_str(q);
                s
            }
            None => path.to_string(),
        }
    }

    /// Append a form-urlencoded query pair after the existing raw query.
    pub fn query_push(&mut self, key: &str, value: &str) {
        let pair = form_urlencoded::Serializer::new(String::new())
            .append_pair(key, value)
            .finish();

        match &mut self.query {
            Some(q) if !q.is_empty() => {
                q.push('&');
                q.push_str(&pair);
            }
            _ => self.query = Some(pair),
        }
    }

    /// Check whether the raw query already carries the given key.
    pub fn query_contains(&self, key: &str) -> bool {
        self.query
            .as_deref()
            .map(|q| form_urlencoded::parse(q.as_bytes()).any(|(k, _)| k == key))
            .unwrap_or_default()
    }

    /// Get header names as sorted vector.
    pub fn header_name_to_vec_sorted(&self) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }
}
