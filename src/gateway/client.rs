use bigdecimal::BigDecimal;
use chrono::{Duration as ChronoDuration, Utc};
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// PIX charges expire 24 hours after creation.
pub const CHARGE_EXPIRY_HOURS: i64 = 24;

/// Gateway status meaning the charge has been paid.
pub const STATUS_RECEIVED: &str = "RECEIVED";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("charge not found: {0}")]
    ChargeNotFound(String),
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("invalid response from gateway: {0}")]
    InvalidResponse(String),
    #[error("circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
}

/// A freshly created PIX charge together with its QR code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixCharge {
    pub charge_id: String,
    /// Copy-and-paste PIX payload.
    pub qr_payload: String,
    /// Base64-encoded PNG of the QR code.
    pub qr_image: String,
    pub expires_at: String,
}

/// Point-in-time status of a charge. A still-pending charge is a legitimate
/// answer, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub status: String,
    pub value: Option<BigDecimal>,
    pub paid_at: Option<String>,
}

impl PaymentStatus {
    pub fn is_received(&self) -> bool {
        self.status == STATUS_RECEIVED
    }
}

#[derive(Debug, Deserialize)]
struct CreatedCharge {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QrCodeResponse {
    payload: String,
    encoded_image: String,
    expiration_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChargeStatusResponse {
    status: String,
    value: Option<BigDecimal>,
    payment_date: Option<String>,
}

/// HTTP client for the Asaas PIX payment API.
#[derive(Clone)]
pub struct AsaasClient {
    client: Client,
    base_url: String,
    api_key: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(err.to_string())
    } else {
        GatewayError::Request(err)
    }
}

async fn upstream_error(response: reqwest::Response, fallback: &str) -> GatewayError {
    let status = response.status().as_u16();
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| fallback.to_string());

    GatewayError::Upstream { status, message }
}

impl AsaasClient {
    /// Creates a client with an explicit request timeout. The circuit
    /// breaker trips after 3 consecutive failures and probes again after
    /// roughly a minute.
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(Duration::from_secs(60), Duration::from_secs(120));
        let policy = failure_policy::consecutive_failures(3, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        AsaasClient {
            client,
            base_url,
            api_key,
            circuit_breaker,
        }
    }

    /// Returns the current state of the circuit breaker.
    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Creates a PIX charge due in 24 hours, then fetches its QR code.
    ///
    /// Two upstream calls; if the second fails the charge exists upstream but
    /// is never written to the ledger, so the caller sees a clean failure.
    pub async fn create_pix_charge(
        &self,
        value: &BigDecimal,
        description: &str,
    ) -> Result<PixCharge, GatewayError> {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let payments_url = self.url("/payments");
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let due_date = (Utc::now() + ChronoDuration::hours(CHARGE_EXPIRY_HOURS))
            .date_naive()
            .to_string();
        let body = json!({
            "billingType": "PIX",
            "value": value,
            "description": description,
            "dueDate": due_date,
        });

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client
                    .post(&payments_url)
                    .header("access_token", &api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(map_reqwest_error)?;

                if !response.status().is_success() {
                    return Err(upstream_error(response, "failed to create PIX charge").await);
                }

                let charge = response
                    .json::<CreatedCharge>()
                    .await
                    .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

                let qr_response = client
                    .get(format!("{}/payments/{}/pixQrCode", base_url, charge.id))
                    .header("access_token", &api_key)
                    .send()
                    .await
                    .map_err(map_reqwest_error)?;

                if !qr_response.status().is_success() {
                    return Err(upstream_error(qr_response, "failed to fetch PIX QR code").await);
                }

                let qr = qr_response
                    .json::<QrCodeResponse>()
                    .await
                    .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

                Ok(PixCharge {
                    charge_id: charge.id,
                    qr_payload: qr.payload,
                    qr_image: qr.encoded_image,
                    expires_at: qr.expiration_date,
                })
            })
            .await;

        match result {
            Ok(charge) => Ok(charge),
            Err(FailsafeError::Rejected) => Err(GatewayError::CircuitBreakerOpen(
                "payment gateway circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }

    /// Polls the status of a charge. Callers decide what to do with a
    /// still-pending answer; only transport and upstream failures error.
    pub async fn get_payment_status(
        &self,
        charge_id: &str,
    ) -> Result<PaymentStatus, GatewayError> {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let url = self.url(&format!("/payments/{}", charge_id));
        let id = charge_id.to_string();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client
                    .get(&url)
                    .header("access_token", &api_key)
                    .send()
                    .await
                    .map_err(map_reqwest_error)?;

                if response.status() == 404 {
                    return Err(GatewayError::ChargeNotFound(id));
                }

                if !response.status().is_success() {
                    return Err(upstream_error(response, "failed to check payment status").await);
                }

                let status = response
                    .json::<ChargeStatusResponse>()
                    .await
                    .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

                Ok(PaymentStatus {
                    status: status.status,
                    value: status.value,
                    paid_at: status.payment_date,
                })
            })
            .await;

        match result {
            Ok(status) => Ok(status),
            Err(FailsafeError::Rejected) => Err(GatewayError::CircuitBreakerOpen(
                "payment gateway circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}
