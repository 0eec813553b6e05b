use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{GateError, GateResult};

const RECAPTCHA_ENDPOINT: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Decides whether a request came from a human.
#[async_trait]
pub trait BotVerifier: Send + Sync {
    /// Returns `Ok(true)` when `code` proves a human submitted the request.
    async fn verify(&self, code: &str) -> GateResult<bool>;
}

/// Google reCAPTCHA verification.
///
/// With an empty secret every code is accepted, which is how development
/// deployments run without a reCAPTCHA key.
#[derive(Clone, Debug)]
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

impl RecaptchaVerifier {
    pub fn new(secret: impl Into<String>) -> GateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GateError::Verifier(e.to_string()))?;
        Ok(Self {
            client,
            secret: secret.into(),
            endpoint: RECAPTCHA_ENDPOINT.to_string(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.secret.is_empty()
    }
}

#[async_trait]
impl BotVerifier for RecaptchaVerifier {
    async fn verify(&self, code: &str) -> GateResult<bool> {
        if !self.is_enabled() {
            return Ok(true);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("secret", self.secret.as_str()), ("response", code)])
            .send()
            .await
            .map_err(|e| GateError::Verifier(e.to_string()))?;

        let body: SiteVerifyResponse = response
            .json()
            .await
            .map_err(|e| GateError::Verifier(e.to_string()))?;

        if !body.success {
            tracing::warn!(errors = ?body.error_codes, "recaptcha rejected request");
        }
        Ok(body.success)
    }
}

/// A verifier with a fixed answer.
#[derive(Clone, Copy, Debug)]
pub struct FixedVerifier {
    answer: bool,
}

impl FixedVerifier {
    pub fn accept_all() -> Self {
        Self { answer: true }
    }

    pub fn reject_all() -> Self {
        Self { answer: false }
    }
}

#[async_trait]
impl BotVerifier for FixedVerifier {
    async fn verify(&self, _code: &str) -> GateResult<bool> {
        Ok(self.answer)
    }
}
