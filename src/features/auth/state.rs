//! Session store: the single authority for who is logged in and with what
//! role. State lives in a `watch` channel so views and other stores can read
//! settled snapshots or subscribe to changes. Identity changes are published
//! on a second channel that only fires when the visitor actually changes.
//! Only non-sensitive account metadata is held in memory.

use crate::{
    client::{ApiClient, AppError, Credentials, Upload},
    features::auth::{
        client,
        types::{
            LoginRequest, ResendOtpRequest, Role, UpdatePasswordRequest, User, VerifyOtpRequest,
            VerifyOtpResponse,
        },
    },
    routes::Route,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Snapshot of the visitor's session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub is_busy: bool,
}

impl Session {
    fn starting() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
            is_busy: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.user, self.is_authenticated) {
            (_, false) if self.is_loading => SessionPhase::Unknown,
            (Some(user), true) => SessionPhase::Authenticated(user.role),
            _ => SessionPhase::Guest,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.phase() == SessionPhase::Authenticated(Role::Admin)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Unknown,
    Guest,
    Authenticated(Role),
}

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: User,
    pub message: Option<String>,
    pub route: Route,
}

/// Result of a successful registration; the caller proceeds to OTP entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub message: Option<String>,
    pub route: Route,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    state: watch::Sender<Session>,
    identity: watch::Sender<Option<User>>,
}

/// Clears the global busy flag when dropped, including on error or cancellation.
struct BusyGuard<'a> {
    state: &'a watch::Sender<Session>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(state: &'a watch::Sender<Session>) -> Result<Self, AppError> {
        let acquired = state.send_if_modified(|session| {
            if session.is_busy {
                false
            } else {
                session.is_busy = true;
                true
            }
        });

        if acquired {
            Ok(Self { state })
        } else {
            Err(AppError::Busy(
                "Another request is already in progress.".to_string(),
            ))
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|session| session.is_busy = false);
    }
}

/// Marks the startup identity check as resolved when dropped.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<Session>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|session| {
            let changed = session.is_loading;
            session.is_loading = false;
            changed
        });
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(Session::starting());
        let (identity, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                identity,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Identity signal: notified only when the visitor changes.
    #[must_use]
    pub fn identity(&self) -> watch::Receiver<Option<User>> {
        self.inner.identity.subscribe()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        self.inner.api.credentials()
    }

    /// Resolves who the visitor is. Failure means "guest" and is never an error.
    #[instrument(skip(self))]
    pub async fn fetch_current_user(&self) {
        let _loading = LoadingGuard {
            state: &self.inner.state,
        };

        if self.credentials().bearer().is_none() {
            debug!("no stored token, visitor is a guest");
            self.become_guest();
            return;
        }

        match client::fetch_me(&self.inner.api).await {
            Ok(response) => {
                debug!(user_id = %response.user.id, "session restored");
                self.become_authenticated(response.user);
            }
            Err(err) => {
                debug!("identity check failed: {err}");
                if err.is_unauthorized() {
                    self.discard_token();
                }
                self.become_guest();
            }
        }
    }

    /// Exchanges credentials for a session. Input validation is the caller's job.
    ///
    /// # Errors
    /// Returns the backend's error; the session is left unauthenticated.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let _busy = BusyGuard::acquire(&self.inner.state)?;

        let request = LoginRequest { email, password };
        match client::login(&self.inner.api, &request).await {
            Ok(response) => {
                self.credentials().persist_bearer(&response.token)?;
                let route = if response.user.is_admin() {
                    Route::Admin
                } else {
                    Route::Home
                };
                info!(user_id = %response.user.id, role = response.user.role.as_str(), "logged in");
                self.become_authenticated(response.user.clone());

                Ok(LoginOutcome {
                    user: response.user,
                    message: response.message,
                    route,
                })
            }
            Err(err) => {
                warn!("login failed: {err}");
                self.become_guest();
                Err(err)
            }
        }
    }

    /// Starts a signup and stores the activation token for OTP entry.
    /// Does not authenticate.
    ///
    /// # Errors
    /// Returns the backend's error or a storage failure.
    #[instrument(skip(self, password, profile_picture))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        profile_picture: Option<Upload>,
    ) -> Result<RegisterOutcome, AppError> {
        let _busy = BusyGuard::acquire(&self.inner.state)?;

        let response =
            client::register(&self.inner.api, name, email, password, profile_picture).await?;
        self.credentials()
            .persist_activation_token(&response.activation_token)?;
        info!("registration pending verification");

        Ok(RegisterOutcome {
            message: response.message,
            route: Route::Otp,
        })
    }

    /// Confirms the pending signup. The caller decides where to go next.
    ///
    /// # Errors
    /// Returns `Validation` when no signup is pending, otherwise the backend's
    /// error; the activation token is kept so the user can retry.
    #[instrument(skip(self, code))]
    pub async fn verify_otp(&self, code: &str) -> Result<VerifyOtpResponse, AppError> {
        let _busy = BusyGuard::acquire(&self.inner.state)?;

        let activation_token = self.credentials().activation_token().ok_or_else(|| {
            AppError::Validation("Activation token not found. Please register again.".to_string())
        })?;

        let request = VerifyOtpRequest {
            otp: code.trim(),
            activation_token: &activation_token,
        };
        let response = client::verify_otp(&self.inner.api, &request).await?;

        if let Err(err) = self.credentials().clear_activation_token() {
            warn!("failed to discard activation token: {err}");
        }
        info!("account verified");
        Ok(response)
    }

    /// Requests a fresh OTP and replaces the stored activation token.
    ///
    /// # Errors
    /// Returns `Validation` without contacting the backend when no signup is
    /// pending, otherwise the backend's error.
    #[instrument(skip(self))]
    pub async fn resend_otp(&self) -> Result<Option<String>, AppError> {
        let _busy = BusyGuard::acquire(&self.inner.state)?;

        let activation_token = self.credentials().activation_token().ok_or_else(|| {
            AppError::Validation("Activation token not found. Please register again.".to_string())
        })?;

        let request = ResendOtpRequest {
            activation_token: &activation_token,
        };
        let response = client::resend_otp(&self.inner.api, &request).await?;
        self.credentials()
            .persist_activation_token(&response.activation_token)?;

        Ok(response.message)
    }

    /// Ends the session locally and hands the login route to `navigate`.
    pub fn logout(&self, navigate: impl FnOnce(Route)) {
        self.discard_token();
        self.become_guest();
        info!("logged out");
        navigate(Route::Login);
    }

    /// # Errors
    /// Returns the backend's error; a 401 also ends the session.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Option<String>, AppError> {
        let _busy = BusyGuard::acquire(&self.inner.state)?;

        let request = UpdatePasswordRequest {
            current_password,
            new_password,
        };
        client::update_password(&self.inner.api, &request)
            .await
            .map(|response| response.message)
            .map_err(|err| self.check_expired(err))
    }

    /// Updates the profile and refreshes the cached account.
    ///
    /// # Errors
    /// Returns the backend's error; a 401 also ends the session.
    #[instrument(skip(self, profile_picture))]
    pub async fn update_profile(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        profile_picture: Option<Upload>,
    ) -> Result<Option<String>, AppError> {
        let _busy = BusyGuard::acquire(&self.inner.state)?;

        let response = client::update_profile(&self.inner.api, name, email, profile_picture)
            .await
            .map_err(|err| self.check_expired(err))?;
        self.become_authenticated(response.user);

        Ok(response.message)
    }

    /// Deletes the account and clears the session, returning the home route.
    ///
    /// # Errors
    /// Returns the backend's error; the session is kept unless it was a 401.
    #[instrument(skip(self))]
    pub async fn delete_account(&self) -> Result<(Option<String>, Route), AppError> {
        let _busy = BusyGuard::acquire(&self.inner.state)?;

        let response = client::delete_account(&self.inner.api)
            .await
            .map_err(|err| self.check_expired(err))?;
        self.discard_token();
        self.become_guest();
        info!("account deleted");

        Ok((response.message, Route::Home))
    }

    /// Drops the session when another component's authenticated call got a 401.
    pub fn expire(&self) {
        warn!("session expired, re-login required");
        self.discard_token();
        self.become_guest();
    }

    fn check_expired(&self, err: AppError) -> AppError {
        if err.is_unauthorized() {
            self.expire();
        }
        err
    }

    fn discard_token(&self) {
        if let Err(err) = self.credentials().clear_bearer() {
            warn!("failed to clear stored token: {err}");
        }
    }

    fn become_authenticated(&self, user: User) {
        self.inner.state.send_modify(|session| {
            session.user = Some(user.clone());
            session.is_authenticated = true;
        });
        self.publish_identity(Some(user));
    }

    fn become_guest(&self) {
        self.inner.state.send_modify(|session| {
            session.user = None;
            session.is_authenticated = false;
        });
        self.publish_identity(None);
    }

    fn publish_identity(&self, next: Option<User>) {
        self.inner.identity.send_if_modified(|current| {
            let key = |user: &Option<User>| user.as_ref().map(|u| (u.id.clone(), u.role));
            let changed = key(current) != key(&next);
            *current = next;
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionPhase};
    use crate::features::auth::types::{Role, User};

    #[test]
    fn phase_follows_loading_and_role() {
        let mut session = Session::starting();
        assert_eq!(session.phase(), SessionPhase::Unknown);

        session.is_loading = false;
        assert_eq!(session.phase(), SessionPhase::Guest);

        session.user = Some(User {
            role: Role::Admin,
            ..User::default()
        });
        session.is_authenticated = true;
        assert_eq!(session.phase(), SessionPhase::Authenticated(Role::Admin));
        assert!(session.is_admin());
    }
}
