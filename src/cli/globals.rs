use crate::{
    app::App,
    client::{AppConfig, AppError, AuthHeader, FileStore},
    features::payments::{
        ConfirmRequest, PaymentProcessor, ProcessorError, ProcessorIntent, StripeProcessor,
    },
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::{path::PathBuf, sync::Arc};
use tracing::debug;

/// Options shared by every subcommand.
#[derive(Clone)]
pub struct GlobalArgs {
    pub api_url: Option<String>,
    pub origin: Option<String>,
    pub auth_header: Option<AuthHeader>,
    pub stripe_key: SecretString,
    pub state_file: PathBuf,
    pub session_file: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(state_file: PathBuf, session_file: PathBuf) -> Self {
        Self {
            api_url: None,
            origin: None,
            auth_header: None,
            stripe_key: SecretString::default(),
            state_file,
            session_file,
        }
    }

    /// Environment-derived configuration with the command-line flags on top.
    #[must_use]
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::load();
        if let Some(url) = &self.api_url {
            config.api_base_url.clone_from(url);
        }
        if let Some(origin) = &self.origin {
            config.app_origin.clone_from(origin);
        }
        if let Some(scheme) = self.auth_header {
            config.auth_header = scheme;
        }
        let key = self.stripe_key.expose_secret().trim();
        if !key.is_empty() {
            config.stripe_publishable_key = key.to_string();
        }
        config
    }

    /// Builds the stores over the state files.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn app(&self) -> Result<App, AppError> {
        let config = self.config();
        let processor: Arc<dyn PaymentProcessor> = match StripeProcessor::new(&config) {
            Ok(stripe) => Arc::new(stripe),
            Err(err) => {
                debug!("payments disabled: {err}");
                Arc::new(Unconfigured)
            }
        };

        App::new(
            config,
            Arc::new(FileStore::new(&self.state_file)),
            Arc::new(FileStore::new(&self.session_file)),
            processor,
        )
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("api_url", &self.api_url)
            .field("origin", &self.origin)
            .field("auth_header", &self.auth_header)
            .field("stripe_key", &"***")
            .field("state_file", &self.state_file)
            .field("session_file", &self.session_file)
            .finish()
    }
}

/// `~/.coursehub/state.json`, or the temp dir when there is no home.
#[must_use]
pub fn default_state_file() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map_or_else(std::env::temp_dir, PathBuf::from)
        .join(".coursehub")
        .join("state.json")
}

/// Lives in the temp dir so it does not outlast the machine's session.
#[must_use]
pub fn default_session_file() -> PathBuf {
    std::env::temp_dir().join("coursehub-checkout.json")
}

// Stands in when no publishable key is set; only checkout needs one.
struct Unconfigured;

#[async_trait]
impl PaymentProcessor for Unconfigured {
    async fn confirm(&self, _request: ConfirmRequest<'_>) -> Result<ProcessorIntent, ProcessorError> {
        Err(ProcessorError::new(
            "Payments are not configured. Set --stripe-key or COURSEHUB_STRIPE_KEY.",
        ))
    }
}
