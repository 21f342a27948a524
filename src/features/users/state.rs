//! User directory for admins. Role changes and deletions are keyed per user
//! so unrelated rows stay usable while one is pending.

use crate::{
    client::{ApiClient, AppError},
    features::{
        auth::{
            types::{Role, User},
            SessionStore,
        },
        users::client,
    },
};
use std::{collections::BTreeSet, sync::Arc};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDirectory {
    pub users: Vec<User>,
    pub is_loading: bool,
    /// Emails with a role change in flight, and ids with a deletion in flight.
    pub pending: BTreeSet<String>,
}

impl UserDirectory {
    /// Case-insensitive match on name or email.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&User> {
        let term = term.trim().to_lowercase();
        self.users
            .iter()
            .filter(|user| {
                term.is_empty()
                    || user.name.to_lowercase().contains(&term)
                    || user.email.to_lowercase().contains(&term)
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct UsersStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    session: SessionStore,
    state: watch::Sender<UserDirectory>,
}

struct PendingGuard<'a> {
    state: &'a watch::Sender<UserDirectory>,
    key: String,
}

impl<'a> PendingGuard<'a> {
    fn acquire(
        state: &'a watch::Sender<UserDirectory>,
        key: &str,
        busy: impl FnOnce() -> String,
    ) -> Result<Self, AppError> {
        if state.send_if_modified(|directory| directory.pending.insert(key.to_string())) {
            Ok(Self {
                state,
                key: key.to_string(),
            })
        } else {
            Err(AppError::Busy(busy()))
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|directory| {
            directory.pending.remove(&self.key);
        });
    }
}

struct LoadingGuard<'a>(&'a watch::Sender<UserDirectory>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|directory| directory.is_loading = false);
    }
}

impl UsersStore {
    #[must_use]
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        let (state, _) = watch::channel(UserDirectory::default());
        Self {
            inner: Arc::new(Inner {
                api,
                session,
                state,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> UserDirectory {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn is_pending(&self, email: &str) -> bool {
        self.inner.state.borrow().pending.contains(email)
    }

    /// # Errors
    /// Returns the backend's error; the held list is kept.
    #[instrument(skip(self))]
    pub async fn fetch_users(&self) -> Result<usize, AppError> {
        self.inner
            .state
            .send_modify(|directory| directory.is_loading = true);
        let _loading = LoadingGuard(&self.inner.state);

        let response = client::fetch_all(&self.inner.api)
            .await
            .map_err(|err| self.check_expired(err))?;
        let count = response.users.len();
        self.inner
            .state
            .send_modify(|directory| directory.users = response.users);
        Ok(count)
    }

    /// # Errors
    /// Returns `Busy` while a change for the same email is pending, otherwise
    /// the backend's error.
    pub async fn promote(&self, email: &str) -> Result<Option<String>, AppError> {
        self.change_role(email, Role::Admin).await
    }

    /// # Errors
    /// Returns `Busy` while a change for the same email is pending, otherwise
    /// the backend's error.
    pub async fn demote(&self, email: &str) -> Result<Option<String>, AppError> {
        self.change_role(email, Role::Student).await
    }

    #[instrument(skip(self))]
    async fn change_role(&self, email: &str, role: Role) -> Result<Option<String>, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::Validation("Email is required.".to_string()));
        }
        let _pending = PendingGuard::acquire(&self.inner.state, email, || {
            format!("A role change for {email} is already in progress.")
        })?;

        let response = match role {
            Role::Admin => client::promote(&self.inner.api, email).await,
            Role::Student => client::demote(&self.inner.api, email).await,
        }
        .map_err(|err| self.check_expired(err))?;

        self.inner.state.send_modify(|directory| {
            for user in directory.users.iter_mut().filter(|user| user.email == email) {
                user.role = role;
            }
        });
        info!(email, role = role.as_str(), "role changed");
        Ok(response.message)
    }

    /// Deletes another user's account, then refetches the directory. Asking
    /// for confirmation is the caller's job.
    ///
    /// # Errors
    /// Returns `Busy` while the same user is being deleted, otherwise the
    /// backend's error.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation("User id is required.".to_string()));
        }
        let _pending = PendingGuard::acquire(&self.inner.state, user_id, || {
            "This user is already being deleted.".to_string()
        })?;

        let response = client::delete(&self.inner.api, user_id)
            .await
            .map_err(|err| self.check_expired(err))?;
        info!(user_id, "user deleted");

        if let Err(err) = self.fetch_users().await {
            warn!("user list refresh failed: {err}");
        }
        Ok(response.message)
    }

    fn check_expired(&self, err: AppError) -> AppError {
        warn!("user management request failed: {err}");
        if err.is_unauthorized() {
            self.inner.session.expire();
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::UserDirectory;
    use crate::features::auth::types::User;

    #[test]
    fn search_matches_name_or_email() {
        let user = |name: &str, email: &str| User {
            name: name.to_string(),
            email: email.to_string(),
            ..User::default()
        };
        let directory = UserDirectory {
            users: vec![user("Ann", "ann@x.com"), user("Bob", "bob@y.org")],
            ..UserDirectory::default()
        };

        assert_eq!(directory.search("").len(), 2);
        assert_eq!(directory.search("ANN").len(), 1);
        assert_eq!(directory.search("y.org")[0].name, "Bob");
        assert!(directory.search("zed").is_empty());
    }
}
