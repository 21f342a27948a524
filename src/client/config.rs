//! Client configuration with compiled-in defaults and runtime overrides.
//! Runtime values are read from `COURSEHUB_*` environment variables so a
//! packaged binary can point at another backend without rebuilding; the CLI
//! layers its own flags on top. Values here are public; do not store secrets.

use std::{str::FromStr, time::Duration};

const DEFAULT_API_BASE_URL: &str = "http://localhost:2000";
const DEFAULT_APP_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_STRIPE_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_CURRENCY: &str = "usd";

/// Default timeout for every backend call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Payment-intent creation crosses the processor's network path.
pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(30);
/// Cross-process token change detection period.
pub const DEFAULT_TOKEN_POLL_INTERVAL: Duration = Duration::from_secs(5);

const MIN_POLL_SECS: u64 = 1;
const MAX_POLL_SECS: u64 = 300;

/// How the bearer token is attached to authenticated requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthHeader {
    /// Custom `token: <value>` header understood by the course backend.
    #[default]
    Token,
    /// Standard `Authorization: Bearer <value>`.
    Bearer,
}

impl FromStr for AuthHeader {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "token" => Ok(Self::Token),
            "bearer" | "authorization" => Ok(Self::Bearer),
            other => Err(format!("unsupported auth header scheme: {other}")),
        }
    }
}

/// Client configuration shared by every store.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub app_origin: String,
    pub stripe_publishable_key: String,
    pub stripe_api_base_url: String,
    pub currency: String,
    pub auth_header: AuthHeader,
    pub request_timeout: Duration,
    pub payment_timeout: Duration,
    pub token_poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("COURSEHUB_API_BASE_URL")
                .unwrap_or(DEFAULT_API_BASE_URL)
                .to_string(),
            app_origin: option_env!("COURSEHUB_APP_ORIGIN")
                .unwrap_or(DEFAULT_APP_ORIGIN)
                .to_string(),
            stripe_publishable_key: option_env!("COURSEHUB_STRIPE_PUBLISHABLE_KEY")
                .unwrap_or("")
                .to_string(),
            stripe_api_base_url: DEFAULT_STRIPE_API_BASE_URL.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            auth_header: AuthHeader::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
            token_poll_interval: DEFAULT_TOKEN_POLL_INTERVAL,
        }
    }
}

impl AppConfig {
    /// Loads compiled-in defaults and applies runtime overrides from the environment.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();
        apply_runtime_overrides(&mut config, runtime_config());
        config
    }

    /// Return URL handed to the payment processor for a given course.
    #[must_use]
    pub fn payment_return_url(&self, course_id: &str) -> String {
        let origin = self.app_origin.trim().trim_end_matches('/');
        match url::Url::parse(&format!("{origin}/payment-success")) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("courseId", course_id);
                url.to_string()
            }
            Err(_) => format!("{origin}/payment-success?courseId={course_id}"),
        }
    }

    /// Clamps a poll period into the supported range.
    #[must_use]
    pub fn bounded_poll_interval(secs: u64) -> Duration {
        Duration::from_secs(secs.clamp(MIN_POLL_SECS, MAX_POLL_SECS))
    }
}

#[derive(Default)]
struct RuntimeConfig {
    api_base_url: Option<String>,
    app_origin: Option<String>,
    stripe_publishable_key: Option<String>,
    stripe_api_base_url: Option<String>,
    currency: Option<String>,
    auth_header: Option<String>,
    token_poll_secs: Option<String>,
}

fn runtime_config() -> RuntimeConfig {
    let read = |key: &str| {
        std::env::var(key)
            .ok()
            .and_then(|value| normalize_runtime_value(&value))
    };

    RuntimeConfig {
        api_base_url: read("COURSEHUB_API_URL"),
        app_origin: read("COURSEHUB_ORIGIN"),
        stripe_publishable_key: read("COURSEHUB_STRIPE_KEY"),
        stripe_api_base_url: read("COURSEHUB_STRIPE_API_URL"),
        currency: read("COURSEHUB_CURRENCY"),
        auth_header: read("COURSEHUB_AUTH_HEADER"),
        token_poll_secs: read("COURSEHUB_TOKEN_POLL_SECS"),
    }
}

fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.app_origin {
        config.app_origin = value;
    }
    if let Some(value) = runtime.stripe_publishable_key {
        config.stripe_publishable_key = value;
    }
    if let Some(value) = runtime.stripe_api_base_url {
        config.stripe_api_base_url = value;
    }
    if let Some(value) = runtime.currency {
        config.currency = value.to_lowercase();
    }
    if let Some(scheme) = runtime.auth_header.and_then(|value| value.parse().ok()) {
        config.auth_header = scheme;
    }
    if let Some(secs) = runtime.token_poll_secs.and_then(|value| value.parse().ok()) {
        config.token_poll_interval = AppConfig::bounded_poll_interval(secs);
    }
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        apply_runtime_overrides, normalize_runtime_value, AppConfig, AuthHeader, RuntimeConfig,
    };
    use std::time::Duration;

    #[test]
    fn normalize_runtime_value_trims_and_rejects_empty() {
        assert_eq!(normalize_runtime_value(""), None);
        assert_eq!(normalize_runtime_value("   "), None);
        assert_eq!(
            normalize_runtime_value("  https://api.coursehub.dev "),
            Some("https://api.coursehub.dev".to_string())
        );
    }

    #[test]
    fn apply_runtime_overrides_ignores_missing_values() {
        let mut config = AppConfig {
            api_base_url: "https://api.default".to_string(),
            ..AppConfig::default()
        };

        apply_runtime_overrides(&mut config, RuntimeConfig::default());

        assert_eq!(config.api_base_url, "https://api.default");
        assert_eq!(config.auth_header, AuthHeader::Token);
    }

    #[test]
    fn apply_runtime_overrides_overwrites_when_present() {
        let mut config = AppConfig::default();
        let runtime = RuntimeConfig {
            api_base_url: normalize_runtime_value("https://api.override"),
            app_origin: normalize_runtime_value("https://app.override"),
            stripe_publishable_key: normalize_runtime_value("pk_test_override"),
            stripe_api_base_url: None,
            currency: normalize_runtime_value("EUR"),
            auth_header: normalize_runtime_value("bearer"),
            token_poll_secs: normalize_runtime_value("9000"),
        };

        apply_runtime_overrides(&mut config, runtime);

        assert_eq!(config.api_base_url, "https://api.override");
        assert_eq!(config.app_origin, "https://app.override");
        assert_eq!(config.stripe_publishable_key, "pk_test_override");
        assert_eq!(config.currency, "eur");
        assert_eq!(config.auth_header, AuthHeader::Bearer);
        assert_eq!(config.token_poll_interval, Duration::from_secs(300));
    }

    #[test]
    fn load_reads_environment() {
        temp_env::with_vars(
            [
                ("COURSEHUB_API_URL", Some("http://backend:2000")),
                ("COURSEHUB_AUTH_HEADER", Some("  ")),
                ("COURSEHUB_TOKEN_POLL_SECS", Some("0")),
            ],
            || {
                let config = AppConfig::load();
                assert_eq!(config.api_base_url, "http://backend:2000");
                assert_eq!(config.auth_header, AuthHeader::Token);
                assert_eq!(config.token_poll_interval, Duration::from_secs(1));
            },
        );
    }

    #[test]
    fn payment_return_url_carries_course_id() {
        let config = AppConfig {
            app_origin: "https://learn.example/".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.payment_return_url("c1"),
            "https://learn.example/payment-success?courseId=c1"
        );
    }

    #[test]
    fn auth_header_parses_known_schemes() {
        assert_eq!("token".parse::<AuthHeader>(), Ok(AuthHeader::Token));
        assert_eq!(" Bearer ".parse::<AuthHeader>(), Ok(AuthHeader::Bearer));
        assert!("cookie".parse::<AuthHeader>().is_err());
    }
}
