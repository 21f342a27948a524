#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use coursehub::{
    client::{AppConfig, KeyValueStore, MemoryStore},
    features::payments::{ConfirmRequest, PaymentProcessor, ProcessorError, ProcessorIntent},
    App,
};
use serde_json::{json, Value};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const TOKEN: &str = "t1";

pub struct Harness {
    pub server: MockServer,
    pub app: App,
    pub durable: Arc<MemoryStore>,
    pub session_scoped: Arc<MemoryStore>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_processor(Arc::new(ScriptedProcessor::default())).await
    }

    pub async fn with_processor(processor: Arc<dyn PaymentProcessor>) -> Self {
        Self::with_config(processor, |_| {}).await
    }

    pub async fn with_config(
        processor: Arc<dyn PaymentProcessor>,
        configure: impl FnOnce(&mut AppConfig),
    ) -> Self {
        let server = MockServer::start().await;
        let durable = Arc::new(MemoryStore::new());
        let session_scoped = Arc::new(MemoryStore::new());

        let mut config = AppConfig {
            api_base_url: server.uri(),
            app_origin: "http://app.test".to_string(),
            stripe_publishable_key: "pk_test_123".to_string(),
            ..AppConfig::default()
        };
        configure(&mut config);
        let app = App::new(config, durable.clone(), session_scoped.clone(), processor)
            .expect("app builds");

        Self {
            server,
            app,
            durable,
            session_scoped,
        }
    }

    /// Stores a token and answers the identity check with a user of `role`.
    pub async fn sign_in(&self, role: &str) {
        self.durable.set("token", TOKEN).unwrap();
        Mock::given(method("GET"))
            .and(path("/api/user/me"))
            .and(header("token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": user(role) })))
            .mount(&self.server)
            .await;
        self.app.session.fetch_current_user().await;
    }

    pub async fn serve_catalog(&self, courses: Value) {
        Mock::given(method("GET"))
            .and(path("/api/course/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "courses": courses })))
            .mount(&self.server)
            .await;
    }
}

pub fn user(role: &str) -> Value {
    json!({
        "_id": format!("u-{role}"),
        "name": "Ann",
        "email": format!("{role}@coursehub.test"),
        "role": role,
    })
}

pub fn course(id: &str, price: Value) -> Value {
    json!({ "_id": id, "title": format!("Course {id}"), "description": "", "price": price })
}

/// Processor double that replays queued replies in order.
#[derive(Default)]
pub struct ScriptedProcessor {
    replies: Mutex<VecDeque<Result<ProcessorIntent, ProcessorError>>>,
    calls: AtomicUsize,
}

impl ScriptedProcessor {
    pub fn new(replies: Vec<Result<ProcessorIntent, ProcessorError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProcessor for ScriptedProcessor {
    async fn confirm(&self, _request: ConfirmRequest<'_>) -> Result<ProcessorIntent, ProcessorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProcessorError::new("no scripted reply")))
    }
}
