use rocket::http::Status;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};

pub mod stripe;

pub use stripe::StripeGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway isn't configured")]
    NotConfigured,
    #[error("payment gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payment gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("payment gateway response had no client secret")]
    MissingClientSecret,
}

impl From<GatewayError> for Problem {
    fn from(e: GatewayError) -> Self {
        tracing::error!("payment gateway error: {}", e);

        match e {
            GatewayError::NotConfigured => Problem::new_untyped(
                Status::ServiceUnavailable,
                "Payments are currently unavailable.",
            ),
            GatewayError::Rejected { message, .. } => {
                Problem::new_untyped(Status::BadGateway, "Payment gateway rejected the request.")
                    .detail(message)
                    .clone()
            }
            _ => Problem::new_untyped(Status::BadGateway, "Payment gateway failed."),
        }
    }
}

/// Charge request passed to the gateway, in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRequest {
    pub amount: i64,
    pub currency: String,
    pub payment_method_types: Vec<String>,
}

impl IntentRequest {
    pub fn card(amount: i64, currency: impl ToString) -> IntentRequest {
        IntentRequest {
            amount,
            currency: currency.to_string(),
            payment_method_types: vec!["card".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[rocket::async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, request: IntentRequest) -> Result<PaymentIntent, GatewayError>;
}

/// Gateway handle kept in rocket managed state.
pub type Gateway = Box<dyn PaymentGateway>;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IntentCreateData {
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntentCreatedResponse {
    pub client_secret: String,
}

/// Converts a decimal price into whole cents, rounding away float noise (49.99 -> 4999).
pub fn price_to_cents(price: f64) -> Result<i64, Problem> {
    if !price.is_finite() || price <= 0.0 {
        return Err(problems::bad_field("price", "Price must be a positive number."));
    }

    let cents = (price * 100.0).round();
    if cents < 1.0 || cents > i64::MAX as f64 {
        return Err(problems::bad_field("price", "Price is out of range."));
    }

    Ok(cents as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_convert_to_whole_cents() {
        assert_eq!(price_to_cents(49.99).unwrap(), 4999);
        assert_eq!(price_to_cents(0.29).unwrap(), 29);
        assert_eq!(price_to_cents(100.0).unwrap(), 10000);
        assert_eq!(price_to_cents(19.999).unwrap(), 2000);
    }

    #[test]
    fn unusable_prices_are_rejected() {
        assert!(price_to_cents(0.0).is_err());
        assert!(price_to_cents(-5.0).is_err());
        assert!(price_to_cents(f64::NAN).is_err());
        assert!(price_to_cents(f64::INFINITY).is_err());
        assert!(price_to_cents(0.001).is_err());
    }

    #[test]
    fn unconfigured_gateway_is_unavailable() {
        let problem = Problem::from(GatewayError::NotConfigured);
        assert_eq!(problem.status, Status::ServiceUnavailable);
    }
}
