// http.rs - Blocking HTTP transport shared by all remote services

use std::time::Duration;
use serde::de::DeserializeOwned;

/// Raw response: status code plus body bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with the URL and status code unless the response is 2xx
    pub fn into_success(self, url: &str) -> Result<Vec<u8>, String> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(format!("Request to '{}' failed with HTTP {}", url, self.status))
        }
    }
}

/// Transport used by the MMseqs2, template, GPCRdb and KLIFS clients
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, String>;

    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<HttpResponse, String>;
}

/// Production transport backed by `reqwest::blocking`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("af2state/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self { client })
    }

    fn collect(url: &str, response: reqwest::blocking::Response) -> Result<HttpResponse, String> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| format!("Failed to read response body from '{}': {}", url, e))?
            .to_vec();
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, String> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| format!("GET '{}' failed: {}", url, e))?;
        Self::collect(url, response)
    }

    fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<HttpResponse, String> {
        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .map_err(|e| format!("POST '{}' failed: {}", url, e))?;
        Self::collect(url, response)
    }
}

/// Decode a JSON body, naming the URL on failure
pub fn parse_json<T: DeserializeOwned>(body: &[u8], url: &str) -> Result<T, String> {
    serde_json::from_slice(body).map_err(|e| format!("Invalid JSON from '{}': {}", url, e))
}
