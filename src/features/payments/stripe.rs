//! Stripe confirmation over its REST API, authenticated with the publishable
//! key the way Stripe's browser library does it.

use crate::{
    client::{AppConfig, AppError, APP_USER_AGENT},
    features::payments::{
        processor::{ConfirmRequest, IntentStatus, PaymentProcessor, ProcessorError, ProcessorIntent},
        types::payment_intent_id,
    },
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub struct StripeProcessor {
    http: Client,
    base_url: String,
    publishable_key: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct StripeIntent {
    id: String,
    status: IntentStatus,
    #[serde(default)]
    next_action: Option<NextAction>,
    #[serde(default)]
    last_payment_error: Option<StripeErrorBody>,
}

#[derive(Deserialize)]
struct NextAction {
    #[serde(default)]
    redirect_to_url: Option<RedirectToUrl>,
}

#[derive(Deserialize)]
struct RedirectToUrl {
    url: String,
}

#[derive(Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl StripeProcessor {
    /// # Errors
    /// Returns `AppError::Config` when no publishable key is configured or the
    /// HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let publishable_key = config.stripe_publishable_key.trim().to_string();
        if publishable_key.is_empty() {
            return Err(AppError::Config(
                "Missing Stripe publishable key (--stripe-key or COURSEHUB_STRIPE_KEY)".to_string(),
            ));
        }

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.stripe_api_base_url.trim_end_matches('/').to_string(),
            publishable_key,
            timeout: config.payment_timeout,
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    #[instrument(skip(self, request))]
    async fn confirm(&self, request: ConfirmRequest<'_>) -> Result<ProcessorIntent, ProcessorError> {
        let intent_id = payment_intent_id(request.client_secret)
            .ok_or_else(|| ProcessorError::new("Invalid payment session"))?;
        let url = format!("{}/v1/payment_intents/{intent_id}/confirm", self.base_url);

        let params = [
            ("client_secret", request.client_secret),
            ("payment_method", request.payment_method.id()),
            ("return_url", request.return_url),
        ];

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.publishable_key)
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                warn!("stripe request failed: {err}");
                if err.is_timeout() {
                    ProcessorError::new("Payment timed out. Please try again.")
                } else {
                    ProcessorError::new("Unable to reach the payment processor.")
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), intent_id, "stripe confirm");

        if !status.is_success() {
            return Err(match serde_json::from_str::<StripeErrorEnvelope>(&body) {
                Ok(envelope) => ProcessorError {
                    message: envelope
                        .error
                        .message
                        .unwrap_or_else(|| "Payment failed".to_string()),
                    code: envelope.error.code,
                },
                Err(_) => ProcessorError::new("Payment failed"),
            });
        }

        let intent: StripeIntent = serde_json::from_str(&body)
            .map_err(|_| ProcessorError::new("Unexpected response from the payment processor."))?;

        if intent.status == IntentStatus::RequiresPaymentMethod {
            if let Some(error) = intent.last_payment_error {
                return Err(ProcessorError {
                    message: error.message.unwrap_or_else(|| "Payment failed".to_string()),
                    code: error.code,
                });
            }
        }

        Ok(ProcessorIntent {
            id: intent.id,
            status: intent.status,
            redirect_url: intent
                .next_action
                .and_then(|action| action.redirect_to_url)
                .map(|redirect| redirect.url),
        })
    }
}
