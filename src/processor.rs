//! Client side of the payment processor's REST API.
//!
//! Every call resolves to one of three things: the processor completed the
//! request, the processor rejected it with a business error (its body is kept
//! verbatim for the caller), or the call failed outright.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    config::ProcessorConfig,
    models::{AccessToken, NewPayment, Payment, PaymentExecution},
};

const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorOutcome<T> {
    Completed(T),
    Rejected(Value),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("request to payment processor failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment processor refused our credentials: {0}")]
    Authentication(String),

    #[error("payment processor answered {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("could not decode payment processor response: {0}")]
    Decode(String),

    #[error("cannot build processor url from {0}")]
    InvalidUrl(String),
}

pub type ProcessorResult<T> = Result<ProcessorOutcome<T>, ProcessorError>;

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_payment(&self, payment: &NewPayment) -> ProcessorResult<Payment>;

    async fn find_payment(&self, payment_id: &str) -> ProcessorResult<Payment>;

    async fn execute_payment(
        &self,
        payment_id: &str,
        execution: &PaymentExecution,
    ) -> ProcessorResult<Payment>;
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct PayPalClient {
    http: Client,
    api_base: Url,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl PayPalClient {
    pub fn new(config: &ProcessorConfig) -> Result<Self, ProcessorError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(PayPalClient {
            http,
            api_base: config.api_base.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProcessorError> {
        let mut url = self.api_base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ProcessorError::InvalidUrl(self.api_base.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, ProcessorError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        tracing::debug!("requesting processor access token");
        let response = self
            .http
            .post(self.endpoint(&["v1", "oauth2", "token"])?)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(ACCEPT, "application/json")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProcessorError::Authentication(format!("{status}: {body}")));
        }

        let token: AccessToken = response
            .json()
            .await
            .map_err(|err| ProcessorError::Decode(err.to_string()))?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(0))
            .min(MAX_TOKEN_LIFETIME)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Instant::now()
            .checked_add(lifetime)
            .map(|expires_at| CachedToken {
                value: token.access_token.clone(),
                expires_at,
            });
        Ok(token.access_token)
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> ProcessorResult<T> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text)
                .map(ProcessorOutcome::Completed)
                .map_err(|err| ProcessorError::Decode(err.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
            return Err(ProcessorError::Authentication(text));
        }
        if status.is_client_error() {
            let detail = serde_json::from_str::<Value>(&text)
                .unwrap_or_else(|_| json!({ "message": text }));
            return Ok(ProcessorOutcome::Rejected(detail));
        }
        Err(ProcessorError::UnexpectedStatus {
            status: status.as_u16(),
            body: text,
        })
    }
}

#[async_trait]
impl PaymentProcessor for PayPalClient {
    async fn create_payment(&self, payment: &NewPayment) -> ProcessorResult<Payment> {
        let url = self.endpoint(&["v1", "payments", "payment"])?;
        self.call(self.http.post(url).json(payment)).await
    }

    async fn find_payment(&self, payment_id: &str) -> ProcessorResult<Payment> {
        let url = self.endpoint(&["v1", "payments", "payment", payment_id])?;
        self.call(self.http.get(url)).await
    }

    async fn execute_payment(
        &self,
        payment_id: &str,
        execution: &PaymentExecution,
    ) -> ProcessorResult<Payment> {
        let url = self.endpoint(&["v1", "payments", "payment", payment_id, "execute"])?;
        self.call(self.http.post(url).json(execution)).await
    }
}
