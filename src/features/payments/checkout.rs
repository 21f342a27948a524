//! Checkout flow for one course: intent creation, processor confirmation and
//! backend enrollment.
//!
//! ```text
//! Idle -> CreatingIntent -> AwaitingPayment -> ConfirmingWithBackend -> Succeeded
//!              |                 |    ^
//!              v                 |    | processor error
//!            Failed              +----+
//!                                |
//!                                v
//!                           Redirecting (finished by the return screen)
//! ```
//!
//! The correlating ids are written to the checkout bridge before the
//! processor is called, so a return screen in a fresh process can finish.

use crate::{
    client::{ApiClient, AppError, CheckoutBridge},
    features::{
        auth::SessionStore,
        courses::{CatalogStore, Course},
        payments::{
            client,
            processor::{ConfirmRequest, PaymentMethod, PaymentProcessor},
            types::{payment_intent_id, ConfirmPaymentRequest, CreateIntentRequest},
        },
    },
    routes::Route,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

pub const SUPPORT_NOTICE: &str =
    "Payment received, but we could not confirm your enrollment. Please contact support.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    CreatingIntent,
    /// Waiting for the customer's payment details. Holds the last processor error.
    AwaitingPayment { error: Option<String> },
    /// The processor needs the customer to authenticate at `url`.
    Redirecting { url: String },
    ConfirmingWithBackend,
    /// Paid. `notice` is set when the backend could not confirm access.
    Succeeded { notice: Option<String> },
    Failed { message: String },
}

/// Result of a payment submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Hand the customer to the processor; the return screen resumes the flow.
    Redirect { url: String },
    Completed { route: Route, notice: Option<String> },
}

/// Everything a checkout or return screen needs, built once by the app.
#[derive(Clone)]
pub struct PaymentDeps {
    pub api: ApiClient,
    pub session: SessionStore,
    pub catalog: CatalogStore,
    pub bridge: CheckoutBridge,
    pub processor: Arc<dyn PaymentProcessor>,
}

pub struct CheckoutFlow {
    deps: PaymentDeps,
    course_id: String,
    state: watch::Sender<CheckoutState>,
    client_secret: Mutex<Option<String>>,
    submitted: AtomicBool,
}

impl CheckoutFlow {
    #[must_use]
    pub fn new(deps: PaymentDeps, course_id: impl Into<String>) -> Self {
        let (state, _) = watch::channel(CheckoutState::Idle);
        Self {
            deps,
            course_id: course_id.into(),
            state,
            client_secret: Mutex::new(None),
            submitted: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }

    /// Starts (or restarts) checkout. Returns where to navigate when the flow
    /// leaves the payment screen; `None` means payment details are awaited.
    #[instrument(skip(self), fields(course_id = %self.course_id))]
    pub async fn begin(&self) -> Option<Route> {
        let session = self.deps.session.snapshot();
        if self.deps.api.credentials().bearer().is_none() || !session.is_authenticated {
            debug!("checkout without a session");
            return Some(Route::Login);
        }
        if session.is_admin() {
            return Some(Route::Lectures(self.course_id.clone()));
        }

        let Some(course) = self.find_course().await else {
            self.state.send_replace(CheckoutState::Failed {
                message: "Course not found".to_string(),
            });
            return Some(Route::Courses);
        };

        if course.is_free() {
            return match self.deps.catalog.enroll(&course.id).await {
                Ok(_) => Some(Route::Lectures(course.id)),
                Err(err) => {
                    self.state.send_replace(CheckoutState::Failed {
                        message: err.user_message("Enrollment failed"),
                    });
                    Some(Route::Courses)
                }
            };
        }

        self.create_intent(&course).await
    }

    async fn find_course(&self) -> Option<Course> {
        if let Some(course) = self.deps.catalog.course(&self.course_id) {
            return Some(course);
        }
        if let Err(err) = self.deps.catalog.fetch_all_courses().await {
            debug!("catalog refresh failed: {err}");
        }
        self.deps.catalog.course(&self.course_id)
    }

    async fn create_intent(&self, course: &Course) -> Option<Route> {
        let Some(amount) = course.amount() else {
            warn!(price = ?course.price, "course price cannot be charged");
            self.state.send_replace(CheckoutState::Failed {
                message: "This course has an invalid price.".to_string(),
            });
            return Some(Route::Courses);
        };

        self.state.send_replace(CheckoutState::CreatingIntent);
        self.submitted.store(false, Ordering::SeqCst);

        let request = CreateIntentRequest {
            amount,
            currency: &self.deps.api.config().currency,
            course_id: &course.id,
        };

        match client::create_intent(&self.deps.api, &request).await {
            Ok(response) => {
                *self
                    .client_secret
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(response.client_secret);
                self.state
                    .send_replace(CheckoutState::AwaitingPayment { error: None });
                info!("payment intent created");
                None
            }
            Err(err) => {
                warn!("failed to create payment intent: {err}");
                if err.is_unauthorized() {
                    self.deps.session.expire();
                }
                self.state.send_replace(CheckoutState::Failed {
                    message: err.backend_message("Failed to create payment"),
                });
                Some(Route::Courses)
            }
        }
    }

    /// Confirms the payment with the processor, then with the backend.
    ///
    /// # Errors
    /// - `Validation` when no intent is awaiting payment.
    /// - `Busy` when a submission is already in flight.
    /// - `Payment` with the processor's message; the flow accepts a new submission.
    #[instrument(skip(self, payment_method), fields(course_id = %self.course_id))]
    pub async fn submit(&self, payment_method: &PaymentMethod) -> Result<SubmitOutcome, AppError> {
        if !matches!(self.state(), CheckoutState::AwaitingPayment { .. }) {
            return Err(AppError::Validation(
                "No payment is awaiting confirmation.".to_string(),
            ));
        }
        let client_secret = self
            .client_secret
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| AppError::Validation("Invalid payment session".to_string()))?;

        if self.submitted.swap(true, Ordering::SeqCst) {
            return Err(AppError::Busy("Payment is already being processed.".to_string()));
        }

        let intent_id = payment_intent_id(&client_secret).unwrap_or_default();
        if let Err(err) = self.deps.bridge.save(&self.course_id, intent_id) {
            self.submitted.store(false, Ordering::SeqCst);
            return Err(err);
        }

        let return_url = self.deps.api.config().payment_return_url(&self.course_id);
        let result = self
            .deps
            .processor
            .confirm(ConfirmRequest {
                client_secret: &client_secret,
                payment_method,
                return_url: &return_url,
            })
            .await;

        let intent = match result {
            Ok(intent) => intent,
            Err(err) => return Err(self.retryable(err.message)),
        };

        if intent.status.is_settled() {
            info!(payment_intent = %intent.id, status = %intent.status, "processor confirmed payment");
            self.state.send_replace(CheckoutState::ConfirmingWithBackend);
            let (route, notice) = confirm_enrollment(&self.deps, &intent.id, &self.course_id).await;
            self.state.send_replace(CheckoutState::Succeeded {
                notice: notice.clone(),
            });
            return Ok(SubmitOutcome::Completed { route, notice });
        }

        if let Some(url) = intent.redirect_url {
            info!(payment_intent = %intent.id, "processor requires customer authentication");
            self.state
                .send_replace(CheckoutState::Redirecting { url: url.clone() });
            return Ok(SubmitOutcome::Redirect { url });
        }

        Err(self.retryable(format!("Payment status: {}", intent.status)))
    }

    /// Records a processor failure and re-arms the submission guard.
    fn retryable(&self, message: String) -> AppError {
        warn!("payment not completed: {message}");
        self.submitted.store(false, Ordering::SeqCst);
        self.state.send_replace(CheckoutState::AwaitingPayment {
            error: Some(message.clone()),
        });
        AppError::Payment(message)
    }
}

/// Tells the backend about a settled intent and refreshes the enrolled list.
/// Failures here are soft: the customer already paid, so they get a notice
/// instead of an error. The bridge is cleared only once access is confirmed.
pub(crate) async fn confirm_enrollment(
    deps: &PaymentDeps,
    payment_intent_id: &str,
    course_id: &str,
) -> (Route, Option<String>) {
    let request = ConfirmPaymentRequest {
        payment_intent_id,
        course_id,
    };

    let notice = match client::confirm(&deps.api, &request).await {
        Ok(response) if response.enrolled => {
            if let Err(err) = deps.bridge.clear() {
                warn!("failed to clear checkout bridge: {err}");
            }
            deps.catalog.fetch_my_courses().await;
            info!(course_id, "enrollment confirmed");
            None
        }
        Ok(response) => {
            warn!(
                course_id,
                message = response.message.as_deref().unwrap_or_default(),
                "backend did not confirm enrollment"
            );
            Some(SUPPORT_NOTICE.to_string())
        }
        Err(err) => {
            warn!(course_id, "backend confirmation failed: {err}");
            if err.is_unauthorized() {
                deps.session.expire();
            }
            Some(SUPPORT_NOTICE.to_string())
        }
    };

    let route = if notice.is_none() && !course_id.is_empty() {
        Route::Lectures(course_id.to_string())
    } else {
        Route::PaymentSuccess
    };
    (route, notice)
}
