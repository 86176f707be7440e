use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, instrument};

use super::{GatewayError, IntentRequest, PaymentGateway, PaymentIntent};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Stripe's PaymentIntents API.
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret: Option<String>,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StripeGateway({})", self.api_base)
    }
}

#[derive(Debug, Deserialize)]
struct StripeIntent {
    id: String,
    client_secret: Option<String>,
}

impl StripeGateway {
    pub fn new(api_base: impl ToString, secret: Option<String>) -> Result<StripeGateway, reqwest::Error> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(StripeGateway {
            client,
            api_base: api_base.to_string().trim_end_matches('/').to_string(),
            secret,
        })
    }

    fn form(request: &IntentRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.clone()),
        ];
        for method in &request.payment_method_types {
            form.push(("payment_method_types[]".to_string(), method.clone()));
        }
        form
    }
}

#[rocket::async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self))]
    async fn create_payment_intent(&self, request: IntentRequest) -> Result<PaymentIntent, GatewayError> {
        let secret = self.secret.as_ref().ok_or(GatewayError::NotConfigured)?;

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(secret)
            .form(&StripeGateway::form(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let json_response: Value = response.json().await.unwrap_or_default();

            let message = json_response["error"]["message"]
                .as_str()
                .unwrap_or_default()
                .to_string();

            error!("Failed to create payment intent: {}", message);

            return Err(GatewayError::Rejected { status, message });
        }

        let intent: StripeIntent = response.json().await?;
        let client_secret = intent
            .client_secret
            .ok_or(GatewayError::MissingClientSecret)?;

        tracing::info!("created payment intent {}", intent.id);

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_intent_form_matches_stripe_fields() {
        let form = StripeGateway::form(&IntentRequest::card(4999, "usd"));

        assert_eq!(
            form,
            vec![
                ("amount".to_string(), "4999".to_string()),
                ("currency".to_string(), "usd".to_string()),
                ("payment_method_types[]".to_string(), "card".to_string()),
            ]
        );
    }

    #[rocket::async_test]
    async fn missing_secret_fails_without_request() {
        let gateway = StripeGateway::new("http://127.0.0.1:9", None).unwrap();
        let result = gateway
            .create_payment_intent(IntentRequest::card(100, "usd"))
            .await;

        assert!(matches!(result, Err(GatewayError::NotConfigured)));
    }
}
