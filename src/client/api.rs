//! HTTP helpers for the course backend's JSON API with consistent timeouts and
//! error handling. Feature clients use these helpers instead of building
//! requests themselves. The helpers never store tokens; the bearer token is
//! read from `Credentials` for each request that asks for it.

use super::{
    config::{AppConfig, AuthHeader},
    credentials::Credentials,
    errors::AppError,
    APP_USER_AGENT,
};
use reqwest::{header::AUTHORIZATION, multipart::Form, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info_span, Instrument};

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// Whether a request carries the stored bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Auth {
    None,
    Bearer,
}

/// Binary file attached to a multipart request (profile picture, lecture video).
#[derive(Clone, Debug)]
pub struct Upload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Reads a file from disk, guessing nothing about its type.
    ///
    /// # Errors
    /// Returns `AppError::Validation` when the file cannot be read.
    pub fn from_path(path: &std::path::Path, mime: Option<&str>) -> Result<Self, AppError> {
        let bytes = std::fs::read(path).map_err(|err| {
            AppError::Validation(format!("Unable to read {}: {err}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());

        Ok(Self {
            file_name,
            mime: mime.map(str::to_string),
            bytes,
        })
    }

    /// Converts into a multipart part named `file`, as the backend expects.
    ///
    /// # Errors
    /// Returns `AppError::Validation` when the MIME type is malformed.
    pub fn into_part(self) -> Result<reqwest::multipart::Part, AppError> {
        let part = reqwest::multipart::Part::bytes(self.bytes).file_name(self.file_name);
        match self.mime {
            Some(mime) => part
                .mime_str(&mime)
                .map_err(|err| AppError::Validation(format!("Invalid file type {mime}: {err}"))),
            None => Ok(part),
        }
    }
}

/// Shared JSON client for the course backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<AppConfig>,
    credentials: Credentials,
}

impl ApiClient {
    /// Builds the client.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be initialized.
    pub fn new(config: Arc<AppConfig>, credentials: Credentials) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fetches JSON.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-2xx statuses and undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, AppError> {
        let builder = self.request(Method::GET, path, auth);
        self.send(Method::GET, path, builder, self.config.request_timeout)
            .await
    }

    /// Posts a JSON body and parses a JSON response.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-2xx statuses and undecodable bodies.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, AppError> {
        self.post_json_with_timeout(path, body, auth, self.config.request_timeout)
            .await
    }

    /// Posts a JSON body with an explicit timeout.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-2xx statuses and undecodable bodies.
    pub async fn post_json_with_timeout<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
        timeout: Duration,
    ) -> Result<T, AppError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))?;
        let builder = self
            .request(Method::POST, path, auth)
            .header("Content-Type", "application/json")
            .body(payload);
        self.send(Method::POST, path, builder, timeout).await
    }

    /// Posts an empty JSON object, used for action endpoints like enroll.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-2xx statuses and undecodable bodies.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, AppError> {
        self.post_json(path, &serde_json::json!({}), auth).await
    }

    /// Posts a multipart form.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-2xx statuses and undecodable bodies.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        auth: Auth,
    ) -> Result<T, AppError> {
        let builder = self.request(Method::POST, path, auth).multipart(form);
        self.send(Method::POST, path, builder, self.config.request_timeout)
            .await
    }

    /// Puts a multipart form.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-2xx statuses and undecodable bodies.
    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        auth: Auth,
    ) -> Result<T, AppError> {
        let builder = self.request(Method::PUT, path, auth).multipart(form);
        self.send(Method::PUT, path, builder, self.config.request_timeout)
            .await
    }

    /// Sends a DELETE and parses the JSON response.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-2xx statuses and undecodable bodies.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, AppError> {
        let builder = self.request(Method::DELETE, path, auth);
        self.send(Method::DELETE, path, builder, self.config.request_timeout)
            .await
    }

    /// Sends a DELETE carrying a JSON body.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-2xx statuses and undecodable bodies.
    pub async fn delete_json_with_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, AppError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))?;
        let builder = self
            .request(Method::DELETE, path, auth)
            .header("Content-Type", "application/json")
            .body(payload);
        self.send(Method::DELETE, path, builder, self.config.request_timeout)
            .await
    }

    fn request(&self, method: Method, path: &str, auth: Auth) -> RequestBuilder {
        let url = build_url_with_base(&self.config.api_base_url, path);
        let builder = self.http.request(method, url);

        match (auth, self.credentials.bearer()) {
            (Auth::Bearer, Some(token)) => match self.config.auth_header {
                AuthHeader::Token => builder.header("token", token),
                AuthHeader::Bearer => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            },
            _ => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
        timeout: Duration,
    ) -> Result<T, AppError> {
        let span = info_span!("api.request", http.method = %method, path = %path);
        let response = builder
            .timeout(timeout)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        debug!(status = response.status().as_u16(), "{method} {path}");
        handle_json_response(response).await
    }
}

/// Builds a URL from an explicit base URL and the provided path.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps transport errors into `AppError` variants with timeout detection.
pub(crate) fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Http {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Extracts the backend's `message` field, falling back to the sanitized body.
pub(crate) fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    match from_json {
        Some(message) if !message.trim().is_empty() => sanitize_body(&message),
        _ => sanitize_body(body),
    }
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
