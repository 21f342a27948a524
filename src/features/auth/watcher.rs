//! Polls durable storage for token changes made by other processes
//! (another CLI invocation logging in or out against the same state file)
//! and re-resolves the session when the stored token changes.

use crate::{
    client::{AppConfig, Credentials},
    features::auth::state::SessionStore,
    tasks::{stopped, TaskHandle},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

pub struct TokenWatcher {
    session: SessionStore,
    period: Duration,
}

impl TokenWatcher {
    #[must_use]
    pub fn new(session: SessionStore, period: Duration) -> Self {
        Self {
            session,
            period: AppConfig::bounded_poll_interval(period.as_secs()),
        }
    }

    /// Starts polling. Only the token's fingerprint is remembered between ticks.
    #[must_use]
    pub fn spawn(self) -> TaskHandle {
        let mut rng = StdRng::from_entropy();
        let jittered = self.period.mul_f64(rng.gen_range(0.9..1.1));
        let credentials = self.session.credentials().clone();
        let mut last_seen = fingerprint(&credentials);

        TaskHandle::spawn("token-watcher", move |mut signal| async move {
            let mut ticker = interval(jittered);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;

            info!("watching stored token every {:?}", jittered);
            loop {
                tokio::select! {
                    () = stopped(&mut signal) => break,
                    _ = ticker.tick() => {
                        let current = fingerprint(&credentials);
                        if current != last_seen {
                            debug!("stored token changed, refreshing session");
                            last_seen = current;
                            self.session.fetch_current_user().await;
                        }
                    }
                }
            }
            debug!("token watcher stopped");
        })
    }
}

fn fingerprint(credentials: &Credentials) -> Option<u64> {
    credentials.bearer().map(|token| {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        hasher.finish()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::TokenWatcher;
    use crate::{
        client::{ApiClient, AppConfig, Credentials, KeyValueStore, MemoryStore},
        features::auth::state::SessionStore,
    };
    use serde_json::json;
    use std::{sync::Arc, time::Duration};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn token_written_elsewhere_restores_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"_id": "u1", "name": "Ann", "role": "student"}
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let config = AppConfig {
            api_base_url: server.uri(),
            ..AppConfig::default()
        };
        let api = ApiClient::new(Arc::new(config), Credentials::new(store.clone())).unwrap();
        let session = SessionStore::new(api);
        session.fetch_current_user().await;
        assert!(!session.snapshot().is_authenticated);

        let mut identity = session.identity();
        let handle = TokenWatcher::new(session.clone(), Duration::from_secs(1)).spawn();
        store.set("token", "t1").unwrap();

        tokio::time::timeout(Duration::from_secs(5), identity.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            identity.borrow().as_ref().map(|user| user.id.clone()),
            Some("u1".to_string())
        );

        handle.stop().await;
    }
}
