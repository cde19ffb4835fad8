use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::config::PaymentConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{CommerceError, CommerceResult};
use crate::model::GenericError;

/// Transaction initialisation payload. `amount` is in the currency's minor unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub email: String,
    pub amount: i64,
    pub currency: String,
    pub reference: String,
    pub callback_url: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub reference: String,
    pub status: String,
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl PaymentVerification {
    pub fn is_successful(&self) -> bool {
        self.status == "success"
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: &PaymentRequest) -> CommerceResult<PaymentSession>;

    async fn verify(&self, reference: &str) -> CommerceResult<PaymentVerification>;
}

#[derive(Debug, Deserialize)]
struct PaystackEnvelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

/// Client for Paystack's transaction API.
#[derive(Clone)]
pub struct PaystackClient {
    http: reqwest::Client,
    base_url: Url,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(config: &PaymentConfig) -> Result<Self, GenericError> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        if config.secret_key.is_empty() {
            warn!("Paystack secret key is empty, payment calls will be rejected");
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            secret_key: config.secret_key.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> CommerceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CommerceError::Gateway("payment base URL cannot carry a path".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> CommerceResult<T> {
        let status = response.status();
        let envelope: PaystackEnvelope<T> = response.json().await.map_err(|e| {
            CommerceError::Gateway(format!("unreadable response ({}): {}", status, e))
        })?;

        if !status.is_success() || !envelope.status {
            return Err(CommerceError::Gateway(if envelope.message.is_empty() {
                format!("request failed with {}", status)
            } else {
                envelope.message
            }));
        }
        envelope
            .data
            .ok_or_else(|| CommerceError::Gateway("response carried no data".to_string()))
    }
}

fn transport_error(error: reqwest::Error) -> CommerceError {
    CommerceError::Gateway(format!("transport failure: {}", error))
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, request: &PaymentRequest) -> CommerceResult<PaymentSession> {
        let url = self.endpoint(&["transaction", "initialize"])?;
        debug!(
            reference = %request.reference,
            amount = request.amount,
            "Initialising Paystack transaction"
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        Self::decode(response).await
    }

    async fn verify(&self, reference: &str) -> CommerceResult<PaymentVerification> {
        let url = self.endpoint(&["transaction", "verify", reference])?;
        debug!(reference, "Verifying Paystack transaction");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(transport_error)?;

        Self::decode(response).await
    }
}
