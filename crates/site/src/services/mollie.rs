//! Mollie API client for payment sessions.
//!
//! Covers the two calls this flow needs: creating a payment (which yields
//! the hosted checkout URL the customer is redirected to) and fetching a
//! payment's current status when the webhook fires. The order id rides
//! along in the payment's metadata so the webhook can find its order.

use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lemongrass_core::{OrderId, format_eur};

/// Mollie API base URL.
const BASE_URL: &str = "https://api.mollie.com/v2";

/// Payment methods offered at checkout.
const PAYMENT_METHODS: &[&str] = &["bancontact", "creditcard"];

/// Errors that can occur when interacting with the Mollie API.
#[derive(Debug, Error)]
pub enum MollieError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The created payment has no checkout link to redirect to.
    #[error("payment {0} has no checkout URL")]
    MissingCheckoutUrl(String),
}

/// Lifecycle status of a Mollie payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Open,
    Pending,
    Authorized,
    Paid,
    Canceled,
    Expired,
    Failed,
}

/// Request body for creating a payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentRequest {
    amount: PaymentAmount,
    description: String,
    redirect_url: String,
    webhook_url: String,
    metadata: PaymentMetadata,
    method: Vec<String>,
}

/// Amount as Mollie wants it: currency code plus a 2-decimal string value.
#[derive(Debug, Serialize, Deserialize)]
struct PaymentAmount {
    currency: String,
    value: String,
}

/// Metadata round-tripped through the provider.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentMetadata {
    order_id: OrderId,
}

/// A payment as returned by the Mollie API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResource {
    id: String,
    status: PaymentStatus,
    metadata: Option<PaymentMetadata>,
    #[serde(default, rename = "_links")]
    links: PaymentLinks,
}

#[derive(Debug, Default, Deserialize)]
struct PaymentLinks {
    checkout: Option<PaymentLink>,
}

#[derive(Debug, Deserialize)]
struct PaymentLink {
    href: String,
}

/// A freshly created payment session.
#[derive(Debug, Clone)]
pub struct CreatedPayment {
    /// Provider payment id, stored on the order as its payment reference.
    pub id: String,
    /// Hosted checkout page the customer is redirected to.
    pub checkout_url: String,
}

/// A payment's state as reported by the provider.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: String,
    pub status: PaymentStatus,
    /// The order this payment was created for, from its metadata.
    pub order_id: Option<OrderId>,
}

/// Mollie API client.
#[derive(Clone)]
pub struct MollieClient {
    client: reqwest::Client,
    base_url: String,
}

impl MollieClient {
    /// Create a new Mollie API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(api_key: &SecretString) -> Result<Self, MollieError> {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Create a client against a non-default API endpoint (tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_base_url(api_key: &SecretString, base_url: &str) -> Result<Self, MollieError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| MollieError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Create a payment session for an order total.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or the
    /// response carries no checkout URL.
    pub async fn create_payment(
        &self,
        order_id: OrderId,
        total: Decimal,
        description: &str,
        redirect_url: &str,
        webhook_url: &str,
    ) -> Result<CreatedPayment, MollieError> {
        let url = format!("{}/payments", self.base_url);
        let body = CreatePaymentRequest {
            amount: PaymentAmount {
                currency: "EUR".to_owned(),
                value: format_eur(total),
            },
            description: description.to_owned(),
            redirect_url: redirect_url.to_owned(),
            webhook_url: webhook_url.to_owned(),
            metadata: PaymentMetadata { order_id },
            method: PAYMENT_METHODS.iter().map(ToString::to_string).collect(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MollieError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payment: PaymentResource = response
            .json()
            .await
            .map_err(|e| MollieError::Parse(e.to_string()))?;

        let checkout_url = payment
            .links
            .checkout
            .map(|link| link.href)
            .ok_or(MollieError::MissingCheckoutUrl(payment.id.clone()))?;

        Ok(CreatedPayment {
            id: payment.id,
            checkout_url,
        })
    }

    /// Fetch a payment's current state from the provider.
    ///
    /// This is also how webhook notifications are verified: the
    /// notification body only names a payment id, and the status acted on
    /// is always the one the provider reports over the authenticated API,
    /// never anything in the notification itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn get_payment(&self, payment_id: &str) -> Result<Payment, MollieError> {
        let url = format!("{}/payments/{payment_id}", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MollieError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payment: PaymentResource = response
            .json()
            .await
            .map_err(|e| MollieError::Parse(e.to_string()))?;

        Ok(Payment {
            id: payment.id,
            status: payment.status,
            order_id: payment.metadata.map(|m| m.order_id),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_parses_provider_values() {
        let status: PaymentStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(status, PaymentStatus::Paid);
        let status: PaymentStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(status, PaymentStatus::Canceled);
    }

    #[test]
    fn create_request_serializes_mollie_shape() {
        let order_id = OrderId::generate();
        let body = CreatePaymentRequest {
            amount: PaymentAmount {
                currency: "EUR".to_owned(),
                value: format_eur("33.00".parse().unwrap()),
            },
            description: "Lemongrass - online order".to_owned(),
            redirect_url: "https://lemongrass-thai.be/order/confirmation?order=abc".to_owned(),
            webhook_url: "https://lemongrass-thai.be/api/orders/webhook".to_owned(),
            metadata: PaymentMetadata { order_id },
            method: PAYMENT_METHODS.iter().map(ToString::to_string).collect(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"]["currency"], "EUR");
        assert_eq!(json["amount"]["value"], "33.00");
        assert_eq!(json["metadata"]["orderId"], order_id.to_string());
        assert_eq!(json["method"][0], "bancontact");
        assert!(json["redirectUrl"].as_str().unwrap().contains("confirmation"));
        assert!(json["webhookUrl"].as_str().unwrap().ends_with("/webhook"));
    }

    #[test]
    fn payment_resource_reads_checkout_link() {
        let raw = r#"{
            "id": "tr_WDqYK6vllg",
            "status": "open",
            "metadata": {"orderId": "7f8a24f1-5bfb-4d54-9f1c-2b2f63d1a2f0"},
            "_links": {"checkout": {"href": "https://www.mollie.com/checkout/select-method/WDqYK6vllg"}}
        }"#;

        let payment: PaymentResource = serde_json::from_str(raw).unwrap();
        assert_eq!(payment.id, "tr_WDqYK6vllg");
        assert_eq!(payment.status, PaymentStatus::Open);
        assert!(payment.metadata.is_some());
        assert!(payment.links.checkout.is_some());
    }

    #[test]
    fn payment_resource_tolerates_missing_links() {
        let raw = r#"{"id": "tr_x", "status": "paid"}"#;
        let payment: PaymentResource = serde_json::from_str(raw).unwrap();
        assert!(payment.links.checkout.is_none());
        assert!(payment.metadata.is_none());
    }
}
