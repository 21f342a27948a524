//! Token access over client storage. The bearer token is the only shared
//! mutable credential: the session store writes it, every other component
//! reads it at call time and never keeps a copy past a single request.

use super::{errors::AppError, storage::KeyValueStore};
use std::sync::Arc;

pub const BEARER_TOKEN_KEY: &str = "token";
pub const ACTIVATION_TOKEN_KEY: &str = "activationToken";
pub const BRIDGE_COURSE_ID_KEY: &str = "courseId";
pub const BRIDGE_PAYMENT_INTENT_KEY: &str = "paymentIntentId";

/// Reader/writer for the bearer and activation tokens in durable storage.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn KeyValueStore>,
}

impl Credentials {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current bearer token, re-read from storage on every call.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.store
            .get(BEARER_TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    #[must_use]
    pub fn activation_token(&self) -> Option<String> {
        self.store
            .get(ACTIVATION_TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    pub(crate) fn persist_bearer(&self, token: &str) -> Result<(), AppError> {
        self.store.set(BEARER_TOKEN_KEY, token)
    }

    pub(crate) fn clear_bearer(&self) -> Result<(), AppError> {
        self.store.remove(BEARER_TOKEN_KEY)
    }

    pub(crate) fn persist_activation_token(&self, token: &str) -> Result<(), AppError> {
        self.store.set(ACTIVATION_TOKEN_KEY, token)
    }

    pub(crate) fn clear_activation_token(&self) -> Result<(), AppError> {
        self.store.remove(ACTIVATION_TOKEN_KEY)
    }
}

/// Correlation ids persisted before handing control to the payment
/// processor, so the return screen can finish the flow in a fresh instance.
#[derive(Clone)]
pub struct CheckoutBridge {
    store: Arc<dyn KeyValueStore>,
}

impl CheckoutBridge {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub(crate) fn save(&self, course_id: &str, payment_intent_id: &str) -> Result<(), AppError> {
        self.store.set(BRIDGE_COURSE_ID_KEY, course_id)?;
        self.store.set(BRIDGE_PAYMENT_INTENT_KEY, payment_intent_id)
    }

    #[must_use]
    pub fn course_id(&self) -> Option<String> {
        self.store
            .get(BRIDGE_COURSE_ID_KEY)
            .filter(|value| !value.is_empty())
    }

    #[must_use]
    pub fn payment_intent_id(&self) -> Option<String> {
        self.store
            .get(BRIDGE_PAYMENT_INTENT_KEY)
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn clear(&self) -> Result<(), AppError> {
        self.store.remove(BRIDGE_COURSE_ID_KEY)?;
        self.store.remove(BRIDGE_PAYMENT_INTENT_KEY)
    }
}
