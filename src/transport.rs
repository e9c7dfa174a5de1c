//! HTTP transport collaborator.
//!
//! One request in, one body out. Retry policy lives with the callers
//! (the readiness controller loops; pairing never retries).

use std::time::Duration;

use async_trait::async_trait;

use crate::credential::Credential;
use crate::error::{Result, TvError};

/// Fixed per-request timeout. The TV either answers quickly or is asleep.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A single HTTP exchange with the TV: body on HTTP 200, typed failure
/// otherwise.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET, optionally authenticated with basic auth.
    async fn get(&self, url: &str, auth: Option<&Credential>) -> Result<String>;

    /// Issue a POST with a JSON body, optionally authenticated.
    async fn post(&self, url: &str, body: String, auth: Option<&Credential>) -> Result<String>;
}

/// Production transport over `reqwest`.
///
/// TLS verification is disabled: Android-family sets present a self-signed
/// certificate on port 1926, so there is nothing to verify against.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the shared client with the fixed timeout and TLS bypass.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::OK {
            Ok(body)
        } else {
            Err(TvError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn apply_auth(
        request: reqwest::RequestBuilder,
        auth: Option<&Credential>,
    ) -> reqwest::RequestBuilder {
        match auth {
            Some(cred) => request.basic_auth(&cred.user, Some(&cred.pass)),
            None => request,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, auth: Option<&Credential>) -> Result<String> {
        let request = Self::apply_auth(self.client.get(url), auth);
        self.execute(request).await
    }

    async fn post(&self, url: &str, body: String, auth: Option<&Credential>) -> Result<String> {
        let request = Self::apply_auth(self.client.post(url), auth)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        self.execute(request).await
    }
}
