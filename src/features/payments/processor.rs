//! Payment processor seam. The checkout flow only talks to the processor
//! through this trait, so tests and alternative processors can stand in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Processor-side payment method reference, e.g. `pm_card_visa`.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PaymentMethod(..)")
    }
}

/// Confirmation parameters. Redirects happen only if the card requires it.
pub struct ConfirmRequest<'a> {
    pub client_secret: &'a str,
    pub payment_method: &'a PaymentMethod,
    pub return_url: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntentStatus {
    Succeeded,
    Processing,
    RequiresAction,
    RequiresPaymentMethod,
    RequiresConfirmation,
    Canceled,
    Other(String),
}

impl IntentStatus {
    /// Money has moved or will settle without further input.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Processing)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Processing => "processing",
            Self::RequiresAction => "requires_action",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::Canceled => "canceled",
            Self::Other(status) => status,
        }
    }
}

impl From<String> for IntentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "succeeded" => Self::Succeeded,
            "processing" => Self::Processing,
            "requires_action" => Self::RequiresAction,
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            "canceled" => Self::Canceled,
            _ => Self::Other(value),
        }
    }
}

impl From<IntentStatus> for String {
    fn from(status: IntentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment intent as reported back by the processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorIntent {
    pub id: String,
    pub status: IntentStatus,
    /// Set when the customer must finish authentication elsewhere.
    pub redirect_url: Option<String>,
}

/// Processor failure; the message is meant for the customer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ProcessorError {
    pub message: String,
    pub code: Option<String>,
}

impl ProcessorError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Confirms the intent behind `client_secret` with the given payment method.
    async fn confirm(&self, request: ConfirmRequest<'_>) -> Result<ProcessorIntent, ProcessorError>;
}
