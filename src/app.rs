//! Composition root: builds every store from one configuration and wires
//! the one-directional dependencies between them.

use crate::{
    client::{ApiClient, AppConfig, AppError, CheckoutBridge, Credentials, KeyValueStore},
    features::{
        auth::{SessionStore, TokenWatcher},
        courses::CatalogStore,
        lectures::LectureStore,
        payments::{CheckoutFlow, PaymentDeps, PaymentProcessor, PaymentReturn},
        users::UsersStore,
    },
    tasks::TaskHandle,
};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct App {
    pub config: Arc<AppConfig>,
    pub session: SessionStore,
    pub catalog: CatalogStore,
    pub lectures: LectureStore,
    pub users: UsersStore,
    payments: PaymentDeps,
}

/// Background tasks started by [`App::start`].
#[derive(Debug)]
pub struct Running {
    tasks: Vec<TaskHandle>,
}

impl Running {
    /// Stops the identity subscription and the token watcher.
    pub async fn shutdown(self) {
        for task in self.tasks {
            debug!(task = task.name(), "stopping");
            task.stop().await;
        }
    }
}

impl App {
    /// Wires the stores.
    ///
    /// - `durable` holds the bearer and activation tokens.
    /// - `session_scoped` holds the checkout bridge.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(
        config: AppConfig,
        durable: Arc<dyn KeyValueStore>,
        session_scoped: Arc<dyn KeyValueStore>,
        processor: Arc<dyn PaymentProcessor>,
    ) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let api = ApiClient::new(config.clone(), Credentials::new(durable))?;

        let session = SessionStore::new(api.clone());
        let catalog = CatalogStore::new(api.clone(), session.clone());
        let lectures = LectureStore::new(api.clone(), session.clone());
        let users = UsersStore::new(api.clone(), session.clone());
        let payments = PaymentDeps {
            api,
            session: session.clone(),
            catalog: catalog.clone(),
            bridge: CheckoutBridge::new(session_scoped),
            processor,
        };

        Ok(Self {
            config,
            session,
            catalog,
            lectures,
            users,
            payments,
        })
    }

    /// Resolves the session and loads the catalog.
    pub async fn bootstrap(&self) {
        self.session.fetch_current_user().await;
        let (all, ()) = tokio::join!(
            self.catalog.fetch_all_courses(),
            self.catalog.fetch_my_courses()
        );
        if let Err(err) = all {
            debug!("initial catalog load failed: {err}");
        }

        let session = self.session.snapshot();
        info!(
            authenticated = session.is_authenticated,
            courses = self.catalog.snapshot().courses.len(),
            "startup complete"
        );
    }

    /// Runs [`App::bootstrap`], then starts the background tasks.
    pub async fn start(&self) -> Running {
        self.bootstrap().await;

        let tasks = vec![
            self.catalog.watch_identity(),
            TokenWatcher::new(self.session.clone(), self.config.token_poll_interval).spawn(),
        ];
        Running { tasks }
    }

    #[must_use]
    pub fn checkout(&self, course_id: &str) -> CheckoutFlow {
        CheckoutFlow::new(self.payments.clone(), course_id)
    }

    #[must_use]
    pub fn payment_return(&self) -> PaymentReturn {
        PaymentReturn::new(self.payments.clone())
    }

    #[must_use]
    pub fn bridge(&self) -> &CheckoutBridge {
        &self.payments.bridge
    }
}
