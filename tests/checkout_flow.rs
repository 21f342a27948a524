#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{course, Harness, ScriptedProcessor};
use coursehub::{
    client::{AppError, KeyValueStore},
    features::payments::{
        CheckoutState, IntentStatus, PaymentMethod, ProcessorError, ProcessorIntent, ReturnParams,
        SubmitOutcome, SUPPORT_NOTICE,
    },
    Route,
};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, ResponseTemplate,
};

fn settled(id: &str) -> Result<ProcessorIntent, ProcessorError> {
    Ok(ProcessorIntent {
        id: id.to_string(),
        status: IntentStatus::Succeeded,
        redirect_url: None,
    })
}

/// Signed-in student looking at paid course `c1`, not yet enrolled.
async fn paid_checkout(processor: Arc<ScriptedProcessor>) -> Harness {
    let harness = Harness::with_processor(processor).await;
    harness.sign_in("student").await;
    harness.serve_catalog(json!([course("c1", json!(25))])).await;
    Mock::given(method("GET"))
        .and(path("/api/mycourse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "courses": [] })))
        .up_to_n_times(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mycourse"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "courses": [course("c1", json!(25))] })),
        )
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payment/create-intent"))
        .and(body_partial_json(json!({ "currency": "usd", "courseId": "c1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "clientSecret": "pi_1_secret_abc" })),
        )
        .expect(1)
        .mount(&harness.server)
        .await;

    harness.app.bootstrap().await;
    assert!(!harness.app.catalog.is_enrolled("c1"));
    harness
}

async fn backend_confirms(harness: &Harness, enrolled: bool) {
    let message = if enrolled { "Enrolled" } else { "Pending" };
    Mock::given(method("POST"))
        .and(path("/api/payment/confirm"))
        .and(body_partial_json(json!({ "paymentIntentId": "pi_1", "courseId": "c1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enrolled": enrolled,
            "message": message
        })))
        .mount(&harness.server)
        .await;
}

#[tokio::test]
async fn payment_happy_path_enrolls() {
    let processor = Arc::new(ScriptedProcessor::new(vec![settled("pi_1")]));
    let harness = paid_checkout(processor.clone()).await;
    backend_confirms(&harness, true).await;

    let flow = harness.app.checkout("c1");
    assert_eq!(flow.begin().await, None);
    assert_eq!(flow.state(), CheckoutState::AwaitingPayment { error: None });

    let outcome = flow.submit(&PaymentMethod::new("pm_card_visa")).await.unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Completed {
            route: Route::Lectures("c1".to_string()),
            notice: None,
        }
    );
    assert_eq!(flow.state(), CheckoutState::Succeeded { notice: None });
    assert!(harness.app.catalog.is_enrolled("c1"));
    assert!(harness.app.bridge().payment_intent_id().is_none());
    assert_eq!(processor.calls(), 1);
}

#[tokio::test]
async fn decline_allows_resubmission() {
    let processor = Arc::new(ScriptedProcessor::new(vec![
        Err(ProcessorError::new("Your card was declined.")),
        settled("pi_1"),
    ]));
    let harness = paid_checkout(processor.clone()).await;
    backend_confirms(&harness, true).await;

    let flow = harness.app.checkout("c1");
    assert_eq!(flow.begin().await, None);

    let err = flow
        .submit(&PaymentMethod::new("pm_card_chargeDeclined"))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::Payment("Your card was declined.".to_string()));
    assert_eq!(
        flow.state(),
        CheckoutState::AwaitingPayment {
            error: Some("Your card was declined.".to_string())
        }
    );

    let outcome = flow.submit(&PaymentMethod::new("pm_card_visa")).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Completed { notice: None, .. }));
    assert_eq!(processor.calls(), 2);
}

#[tokio::test]
async fn unconfirmed_enrollment_is_a_soft_success() {
    let processor = Arc::new(ScriptedProcessor::new(vec![settled("pi_1")]));
    let harness = paid_checkout(processor).await;
    backend_confirms(&harness, false).await;

    let flow = harness.app.checkout("c1");
    flow.begin().await;
    let outcome = flow.submit(&PaymentMethod::new("pm_card_visa")).await.unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Completed {
            route: Route::PaymentSuccess,
            notice: Some(SUPPORT_NOTICE.to_string()),
        }
    );
    assert_eq!(
        harness.session_scoped.get("paymentIntentId").as_deref(),
        Some("pi_1")
    );
}

#[tokio::test]
async fn redirect_then_return_screen_completes() {
    let processor = Arc::new(ScriptedProcessor::new(vec![Ok(ProcessorIntent {
        id: "pi_1".to_string(),
        status: IntentStatus::RequiresAction,
        redirect_url: Some("https://hooks.stripe.test/3ds".to_string()),
    })]));
    let harness = paid_checkout(processor).await;
    backend_confirms(&harness, true).await;

    let flow = harness.app.checkout("c1");
    flow.begin().await;
    let outcome = flow.submit(&PaymentMethod::new("pm_card_threeDSecure2Required")).await.unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Redirect {
            url: "https://hooks.stripe.test/3ds".to_string()
        }
    );
    assert_eq!(harness.session_scoped.get("courseId").as_deref(), Some("c1"));

    // The processor came back without the intent id; the bridge supplies it.
    let params = ReturnParams::parse("http://app.test/payment-success?courseId=c1").unwrap();
    let resumed = harness.app.payment_return().resume(&params).await;

    assert_eq!(resumed.state, CheckoutState::Succeeded { notice: None });
    assert_eq!(resumed.route, Some(Route::Lectures("c1".to_string())));
    assert!(harness.session_scoped.get("paymentIntentId").is_none());
}

#[tokio::test]
async fn return_screen_rejects_missing_or_failed_sessions() {
    let harness = Harness::new().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/confirm"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;
    let screen = harness.app.payment_return();

    let missing = screen.resume(&ReturnParams::parse("/payment-success").unwrap()).await;
    assert_eq!(
        missing.state,
        CheckoutState::Failed {
            message: "Invalid payment session".to_string()
        }
    );

    let failed = screen
        .resume(
            &ReturnParams::parse("/payment-success?payment_intent=pi_9&redirect_status=failed")
                .unwrap(),
        )
        .await;
    assert!(matches!(failed.state, CheckoutState::Failed { .. }));
    assert_eq!(failed.route, None);
}

#[tokio::test]
async fn checkout_requires_a_session() {
    let harness = Harness::new().await;
    harness.app.session.fetch_current_user().await;

    let flow = harness.app.checkout("c1");
    assert_eq!(flow.begin().await, Some(Route::Login));
    assert_eq!(flow.state(), CheckoutState::Idle);

    let err = flow.submit(&PaymentMethod::new("pm_card_visa")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

/// Signed-in student with `courses` in the catalog and nothing enrolled.
async fn student_with_catalog(harness: &Harness, courses: serde_json::Value) {
    harness.sign_in("student").await;
    harness.serve_catalog(courses).await;
    Mock::given(method("GET"))
        .and(path("/api/mycourse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "courses": [] })))
        .mount(&harness.server)
        .await;
    harness.app.bootstrap().await;
}

#[tokio::test]
async fn intent_failure_shows_backend_message() {
    let processor = Arc::new(ScriptedProcessor::default());
    let harness = Harness::with_processor(processor.clone()).await;
    student_with_catalog(&harness, json!([course("c1", json!(25))])).await;
    Mock::given(method("POST"))
        .and(path("/api/payment/create-intent"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "stripe down" })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let flow = harness.app.checkout("c1");
    assert_eq!(flow.begin().await, Some(Route::Courses));
    assert_eq!(
        flow.state(),
        CheckoutState::Failed {
            message: "stripe down".to_string()
        }
    );
    assert_eq!(processor.calls(), 0);
    assert!(harness.app.bridge().payment_intent_id().is_none());
}

#[tokio::test]
async fn intent_timeout_fails_without_assuming_success() {
    let processor = Arc::new(ScriptedProcessor::default());
    let harness = Harness::with_config(processor.clone(), |config| {
        config.payment_timeout = Duration::from_millis(200);
    })
    .await;
    student_with_catalog(&harness, json!([course("c1", json!(25))])).await;
    Mock::given(method("POST"))
        .and(path("/api/payment/create-intent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "clientSecret": "pi_1_secret_abc" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&harness.server)
        .await;

    let flow = harness.app.checkout("c1");
    assert_eq!(flow.begin().await, Some(Route::Courses));
    assert_eq!(
        flow.state(),
        CheckoutState::Failed {
            message: "Request timed out. Please try again.".to_string()
        }
    );

    let err = flow.submit(&PaymentMethod::new("pm_card_visa")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(processor.calls(), 0);
}

#[tokio::test]
async fn malformed_price_never_reaches_free_enroll_or_intent() {
    let harness = Harness::new().await;
    student_with_catalog(&harness, json!([course("c1", json!("$49"))])).await;
    Mock::given(method("POST"))
        .and(path("/api/course/c1/enroll"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payment/create-intent"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;

    let flow = harness.app.checkout("c1");
    assert_eq!(flow.begin().await, Some(Route::Courses));
    assert_eq!(
        flow.state(),
        CheckoutState::Failed {
            message: "This course has an invalid price.".to_string()
        }
    );
}
