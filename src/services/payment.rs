// src/services/payment.rs
//! Payment gateway client
//!
//! Talks to a YooKassa-shaped REST API: one-stage (captured) payments created
//! with an idempotence key, then polled by payment id. The caller owns the
//! order row; this service only speaks to the gateway.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::common::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment gateway is not configured: {0}")]
    NotConfigured(String),

    #[error("payment gateway request failed: {0}")]
    RequestFailed(String),

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct AmountBody {
    value: String,
    currency: &'static str,
}

#[derive(Debug, Serialize)]
struct ConfirmationBody {
    #[serde(rename = "type")]
    kind: &'static str,
    return_url: String,
}

#[derive(Debug, Serialize)]
struct MetadataBody {
    order_id: String,
}

#[derive(Debug, Serialize)]
struct CreatePaymentBody {
    amount: AmountBody,
    confirmation: ConfirmationBody,
    capture: bool,
    description: String,
    metadata: MetadataBody,
}

#[derive(Debug, Deserialize)]
struct ConfirmationResponse {
    confirmation_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: String,
    status: String,
    confirmation: Option<ConfirmationResponse>,
}

/// A payment created at the gateway, ready for the user to be redirected to
#[derive(Debug, Clone)]
pub struct CreatedPayment {
    pub order_id: String,
    pub payment_id: String,
    pub payment_url: String,
}

pub struct PaymentService {
    http: Client,
    account_id: Option<String>,
    secret_key: Option<String>,
    api_url: String,
    return_url: String,
}

impl PaymentService {
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            account_id: config.payment_account_id.clone(),
            secret_key: config.payment_secret_key.clone(),
            api_url: config.payment_api_url.clone(),
            return_url: config.payment_return_url.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), PaymentError> {
        match (&self.account_id, &self.secret_key) {
            (Some(account_id), Some(secret_key)) => Ok((account_id, secret_key)),
            _ => Err(PaymentError::NotConfigured(
                "PAYMENT_ACCOUNT_ID / PAYMENT_SECRET_KEY are not set".to_string(),
            )),
        }
    }

    /// Create a one-stage payment at the gateway
    ///
    /// The generated order id ties the return URL, the stored order row and
    /// later webhook deliveries together.
    pub async fn create_payment(
        &self,
        amount: &str,
        description: &str,
    ) -> Result<CreatedPayment, PaymentError> {
        let (account_id, secret_key) = self.credentials()?;

        let order_id = Uuid::new_v4().to_string();
        let idempotence_key = Uuid::new_v4().to_string();

        let body = CreatePaymentBody {
            amount: AmountBody {
                value: amount.to_string(),
                currency: "RUB",
            },
            confirmation: ConfirmationBody {
                kind: "redirect",
                return_url: format!("{}?order_id={}", self.return_url, order_id),
            },
            capture: true,
            description: description.to_string(),
            // Webhook deliveries echo the metadata back, which is how an
            // incoming notification is tied to the stored order row
            metadata: MetadataBody {
                order_id: order_id.clone(),
            },
        };

        let response = self
            .http
            .post(format!("{}/payments", self.api_url))
            .basic_auth(account_id, Some(secret_key))
            .header("Idempotence-Key", &idempotence_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP error contacting payment gateway");
                PaymentError::RequestFailed(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(http_status = %status, "Payment gateway rejected create request");
            return Err(PaymentError::RequestFailed(format!(
                "gateway returned {}",
                status
            )));
        }

        let payment: PaymentResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        let payment_url = payment
            .confirmation
            .and_then(|c| c.confirmation_url)
            .ok_or_else(|| {
                PaymentError::InvalidResponse("missing confirmation_url".to_string())
            })?;

        info!(
            order_id = %order_id,
            payment_id = %payment.id,
            "Payment created at gateway"
        );

        Ok(CreatedPayment {
            order_id,
            payment_id: payment.id,
            payment_url,
        })
    }

    /// Current gateway-side status of a payment
    pub async fn check_status(&self, payment_id: &str) -> Result<String, PaymentError> {
        let (account_id, secret_key) = self.credentials()?;

        let response = self
            .http
            .get(format!("{}/payments/{}", self.api_url, payment_id))
            .basic_auth(account_id, Some(secret_key))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, payment_id = %payment_id, "HTTP error checking payment status");
                PaymentError::RequestFailed(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(PaymentError::RequestFailed(format!(
                "gateway returned {}",
                response.status()
            )));
        }

        let payment: PaymentResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        Ok(payment.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payment_body_shape() {
        let body = CreatePaymentBody {
            amount: AmountBody {
                value: "499.00".to_string(),
                currency: "RUB",
            },
            confirmation: ConfirmationBody {
                kind: "redirect",
                return_url: "http://localhost:3000/payment-return?order_id=abc".to_string(),
            },
            capture: true,
            description: "paid for user@example.com".to_string(),
            metadata: MetadataBody {
                order_id: "abc".to_string(),
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"]["value"], "499.00");
        assert_eq!(json["amount"]["currency"], "RUB");
        assert_eq!(json["confirmation"]["type"], "redirect");
        assert_eq!(json["capture"], true);
        assert_eq!(json["metadata"]["order_id"], "abc");
    }

    #[tokio::test]
    async fn test_unconfigured_gateway_is_rejected() {
        let service = PaymentService::new(Client::new(), &AppConfig::default());
        let result = service.create_payment("100.00", "test").await;
        assert!(matches!(result, Err(PaymentError::NotConfigured(_))));
    }
}
