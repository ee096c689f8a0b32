//! HTTP transport boundary. The client never opens sockets itself; it talks
//! to an [`HttpTransport`], which keeps the request plumbing testable with a
//! recording mock and keeps reqwest at the edge of the crate.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiResult;

/// A raw HTTP response: status, headers in wire order, body bytes, the
/// encoding declared by the server and the time the request took. Treated as
/// opaque data by the client and interpreted by the response checks.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub encoding: Option<String>,
    pub elapsed: Duration,
}

impl HttpResponse {
    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// The HTTP capability the client consumes: a single-attempt GET and a
/// form-encoded POST. Network failures and non-2xx statuses are passed
/// through untouched; no retries at this layer or above.
pub trait HttpTransport {
    fn get(&self, url: &str) -> ApiResult<HttpResponse>;

    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> ApiResult<HttpResponse>;
}

/// Blocking reqwest-backed transport with the library's default timeouts.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn convert(resp: reqwest::blocking::Response, elapsed: Duration) -> ApiResult<HttpResponse> {
        let status = resp.status().as_u16();
        let headers: Vec<(String, String)> = resp
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let encoding = declared_encoding(&headers);
        let body = resp.bytes()?.to_vec();
        Ok(HttpResponse {
            status,
            headers,
            body,
            encoding,
            elapsed,
        })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> ApiResult<HttpResponse> {
        debug!(url, "GET");
        let started = Instant::now();
        let resp = self.client.get(url).send()?;
        Self::convert(resp, started.elapsed())
    }

    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> ApiResult<HttpResponse> {
        debug!(url, "POST");
        let mut req = self.client.post(url);
        for (name, value) in headers {
            req = req.header(name.as_str(), value.as_str());
        }
        let started = Instant::now();
        let resp = req.form(form).send()?;
        Self::convert(resp, started.elapsed())
    }
}

/// Encoding declared by the Content-Type charset parameter. JSON without an
/// explicit charset is utf-8 on the wire, so that is the fallback, matching
/// how the original harness's HTTP stack reported it.
fn declared_encoding(headers: &[(String, String)]) -> Option<String> {
    let content_type = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .map(|(_, v)| v.as_str())?;
    for part in content_type.split(';').skip(1) {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            return Some(charset.trim_matches('"').to_ascii_lowercase());
        }
    }
    if content_type.trim().starts_with("application/json") {
        return Some("utf-8".into());
    }
    None
}
