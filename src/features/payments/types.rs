//! Backend payment payloads. Client secrets are credentials and must never be
//! logged; only the payment intent id derived from them is.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest<'a> {
    pub amount: f64,
    pub currency: &'a str,
    pub course_id: &'a str,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest<'a> {
    pub payment_intent_id: &'a str,
    pub course_id: &'a str,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfirmPaymentResponse {
    #[serde(default)]
    pub enrolled: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Extracts `pi_123` from a client secret shaped like `pi_123_secret_abc`.
#[must_use]
pub fn payment_intent_id(client_secret: &str) -> Option<&str> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
}
