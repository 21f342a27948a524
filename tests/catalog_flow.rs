#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{course, Harness};
use coursehub::{client::AppError, features::courses::Course, Route};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

#[tokio::test]
async fn my_courses_refetch_is_idempotent() {
    let harness = Harness::new().await;
    harness.sign_in("student").await;
    Mock::given(method("GET"))
        .and(path("/api/mycourse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "courses": [course("c1", json!(0)), course("c2", json!(10)), course("c1", json!(0))]
        })))
        .expect(2)
        .mount(&harness.server)
        .await;

    let catalog = &harness.app.catalog;
    let mut updates = catalog.subscribe();

    catalog.fetch_my_courses().await;
    let first = catalog.snapshot().my_courses;
    assert_eq!(first.len(), 2);
    updates.borrow_and_update();

    catalog.fetch_my_courses().await;
    assert_eq!(catalog.snapshot().my_courses, first);
    assert!(!updates.has_changed().unwrap());
}

#[tokio::test]
async fn guests_have_no_courses_and_are_sent_to_login() {
    let harness = Harness::new().await;
    Mock::given(method("GET"))
        .and(path("/api/mycourse"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;
    harness.app.session.fetch_current_user().await;

    harness.app.catalog.fetch_my_courses().await;
    assert!(harness.app.catalog.snapshot().my_courses.is_empty());

    let paid: Course = serde_json::from_value(course("c1", json!(49))).unwrap();
    let route = harness.app.catalog.handle_enroll(&paid).await.unwrap();
    assert_eq!(route, Route::Login);
}

#[tokio::test]
async fn admins_open_any_course_without_enrolling() {
    let harness = Harness::new().await;
    harness.sign_in("admin").await;
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

    let paid: Course = serde_json::from_value(course("c1", json!("49.99"))).unwrap();
    let route = harness.app.catalog.handle_enroll(&paid).await.unwrap();

    assert_eq!(route, Route::Lectures("c1".to_string()));
    assert!(harness.app.catalog.is_enrolled("c1"));
    assert!(harness.app.catalog.is_enrolled("never-listed"));
}

#[tokio::test]
async fn free_course_enrolls_then_opens_lectures() {
    let harness = Harness::new().await;
    harness.sign_in("student").await;
    harness.serve_catalog(json!([course("c1", json!("0"))])).await;
    Mock::given(method("POST"))
        .and(path("/api/course/c1/enroll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Enrolled" })))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mycourse"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "courses": [course("c1", json!(0))] })),
        )
        .mount(&harness.server)
        .await;

    harness.app.catalog.fetch_all_courses().await.unwrap();
    let free = harness.app.catalog.course("c1").unwrap();
    assert!(free.is_free());

    let route = harness.app.catalog.handle_enroll(&free).await.unwrap();

    assert_eq!(route, Route::Lectures("c1".to_string()));
    assert!(harness.app.catalog.is_enrolled("c1"));
    assert!(!harness.app.catalog.is_enrolling("c1"));
}

#[tokio::test]
async fn paid_course_goes_to_checkout() {
    let harness = Harness::new().await;
    harness.sign_in("student").await;

    let paid: Course = serde_json::from_value(course("c9", json!(19))).unwrap();
    let route = harness.app.catalog.handle_enroll(&paid).await.unwrap();

    assert_eq!(route, Route::Payment("c9".to_string()));
}

#[tokio::test]
async fn malformed_prices_go_to_checkout_not_free_enroll() {
    let harness = Harness::new().await;
    harness.sign_in("student").await;
    Mock::given(method("POST"))
        .and(path("/api/course/c9/enroll"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;

    for price in [json!("$49"), json!("49 USD"), json!(-5)] {
        let garbled: Course = serde_json::from_value(course("c9", price)).unwrap();
        let route = harness.app.catalog.handle_enroll(&garbled).await.unwrap();
        assert_eq!(route, Route::Payment("c9".to_string()));
    }
}

#[tokio::test]
async fn enroll_busy_flag_is_per_course() {
    let harness = Harness::new().await;
    harness.sign_in("student").await;
    harness.serve_catalog(json!([])).await;
    Mock::given(method("GET"))
        .and(path("/api/mycourse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "courses": [] })))
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/course/c1/enroll"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Enrolled" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/course/c2/enroll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Enrolled" })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let catalog = harness.app.catalog.clone();
    let mut updates = catalog.subscribe();
    let slow = tokio::spawn({
        let catalog = catalog.clone();
        async move { catalog.enroll("c1").await }
    });

    tokio::time::timeout(Duration::from_secs(2), updates.wait_for(|c| c.enrolling.contains("c1")))
        .await
        .expect("c1 enrollment started")
        .unwrap();

    catalog.enroll("c2").await.unwrap();
    assert!(!catalog.is_enrolling("c2"));
    assert!(catalog.is_enrolling("c1"));

    let err = catalog.enroll("c1").await.unwrap_err();
    assert!(matches!(err, AppError::Busy(_)));

    slow.await.unwrap().unwrap();
    assert!(!catalog.is_enrolling("c1"));
}

#[tokio::test]
async fn failed_enroll_keeps_state_and_releases_flag() {
    let harness = Harness::new().await;
    harness.sign_in("student").await;
    Mock::given(method("POST"))
        .and(path("/api/course/c1/enroll"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Already enrolled" })),
        )
        .mount(&harness.server)
        .await;

    let before = harness.app.catalog.snapshot();
    let err = harness.app.catalog.enroll("c1").await.unwrap_err();

    assert_eq!(err.user_message("Enrollment failed"), "Already enrolled");
    assert_eq!(harness.app.catalog.snapshot(), before);
}
