//! Return screen: finishes a checkout after the processor redirects back,
//! possibly in a process that never saw the checkout screen.

use crate::{
    client::AppError,
    features::payments::checkout::{confirm_enrollment, CheckoutState, PaymentDeps},
    routes::Route,
};
use tracing::{info, instrument, warn};
use url::Url;

/// Query parameters the processor appends to the return URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReturnParams {
    pub payment_intent: Option<String>,
    pub course_id: Option<String>,
    pub redirect_status: Option<String>,
}

impl ReturnParams {
    /// Parses a full return URL, a path with a query, or a bare query string.
    ///
    /// # Errors
    /// Returns `AppError::Validation` when the input is not a URL at all.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let input = input.trim();
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(_) => {
                let base = Url::parse("http://localhost/payment-success")
                    .map_err(|err| AppError::Validation(err.to_string()))?;
                let relative = if input.starts_with('/') || input.starts_with('?') {
                    input.to_string()
                } else {
                    format!("?{input}")
                };
                base.join(&relative)
                    .map_err(|err| AppError::Validation(format!("Invalid return URL: {err}")))?
            }
        };

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "payment_intent" => params.payment_intent = Some(value.to_string()),
                "courseId" => params.course_id = Some(value.to_string()),
                "redirect_status" => params.redirect_status = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(params)
    }
}

/// Outcome shown by the return screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnOutcome {
    pub state: CheckoutState,
    pub route: Option<Route>,
}

pub struct PaymentReturn {
    deps: PaymentDeps,
}

impl PaymentReturn {
    #[must_use]
    pub fn new(deps: PaymentDeps) -> Self {
        Self { deps }
    }

    /// Confirms enrollment for the intent named in `params`, falling back to
    /// the ids the checkout screen left in the bridge.
    #[instrument(skip(self))]
    pub async fn resume(&self, params: &ReturnParams) -> ReturnOutcome {
        let bridge = &self.deps.bridge;
        let Some(payment_intent) = params
            .payment_intent
            .clone()
            .or_else(|| bridge.payment_intent_id())
        else {
            return failed("Invalid payment session");
        };

        if params.redirect_status.as_deref() == Some("failed") {
            warn!(payment_intent = %payment_intent, "processor reported a failed authentication");
            return failed("Payment was not completed. Please try again.");
        }

        let course_id = params
            .course_id
            .clone()
            .or_else(|| bridge.course_id())
            .unwrap_or_default();

        info!(payment_intent = %payment_intent, course_id = %course_id, "resuming checkout");
        let (route, notice) = confirm_enrollment(&self.deps, &payment_intent, &course_id).await;
        ReturnOutcome {
            state: CheckoutState::Succeeded { notice },
            route: Some(route),
        }
    }
}

fn failed(message: &str) -> ReturnOutcome {
    ReturnOutcome {
        state: CheckoutState::Failed {
            message: message.to_string(),
        },
        route: None,
    }
}
