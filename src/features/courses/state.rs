//! Catalog store: the full course list and the visitor's enrolled subset.
//!
//! Lists are only swapped once a response has fully resolved, so readers see
//! settled state. The enrolled subset follows the session through the
//! identity signal rather than the session pushing into this store.

use crate::{
    client::{ApiClient, AppError},
    features::{
        auth::{types::User, SessionStore},
        courses::{
            client,
            types::{Course, NewCourse},
        },
    },
    routes::Route,
    tasks::{stopped, TaskHandle},
};
use std::{collections::BTreeSet, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub courses: Vec<Course>,
    pub my_courses: Vec<Course>,
    /// Course ids with an enroll request in flight.
    pub enrolling: BTreeSet<String>,
}

#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    session: SessionStore,
    state: watch::Sender<Catalog>,
}

/// Per-course busy flag, released on drop.
struct EnrollGuard<'a> {
    state: &'a watch::Sender<Catalog>,
    course_id: String,
}

impl<'a> EnrollGuard<'a> {
    fn acquire(state: &'a watch::Sender<Catalog>, course_id: &str) -> Result<Self, AppError> {
        let acquired =
            state.send_if_modified(|catalog| catalog.enrolling.insert(course_id.to_string()));
        if acquired {
            Ok(Self {
                state,
                course_id: course_id.to_string(),
            })
        } else {
            Err(AppError::Busy(
                "Enrollment for this course is already in progress.".to_string(),
            ))
        }
    }
}

impl Drop for EnrollGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|catalog| {
            catalog.enrolling.remove(&self.course_id);
        });
    }
}

impl CatalogStore {
    #[must_use]
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        let (state, _) = watch::channel(Catalog::default());
        Self {
            inner: Arc::new(Inner {
                api,
                session,
                state,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Catalog {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Catalog> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn course(&self, course_id: &str) -> Option<Course> {
        self.inner
            .state
            .borrow()
            .courses
            .iter()
            .find(|course| course.id == course_id)
            .cloned()
    }

    /// Replaces the catalog. On failure the previous list is kept.
    ///
    /// # Errors
    /// Returns the backend's error.
    #[instrument(skip(self))]
    pub async fn fetch_all_courses(&self) -> Result<usize, AppError> {
        let response = client::fetch_all(&self.inner.api).await.map_err(|err| {
            warn!("failed to fetch courses: {err}");
            err
        })?;

        let count = response.courses.len();
        self.inner
            .state
            .send_modify(|catalog| catalog.courses = response.courses);
        debug!(count, "catalog refreshed");
        Ok(count)
    }

    /// Replaces the enrolled subset. Guests and failures yield an empty list.
    #[instrument(skip(self))]
    pub async fn fetch_my_courses(&self) {
        if self.inner.api.credentials().bearer().is_none() {
            self.replace_my_courses(Vec::new());
            return;
        }

        match client::fetch_mine(&self.inner.api).await {
            Ok(response) => self.replace_my_courses(dedup(response.courses)),
            Err(err) => {
                warn!("failed to fetch enrolled courses: {err}");
                if err.is_unauthorized() {
                    self.inner.session.expire();
                }
                self.replace_my_courses(Vec::new());
            }
        }
    }

    /// Enrolls in a free course. Both lists are refreshed before the course's
    /// busy flag clears.
    ///
    /// # Errors
    /// Returns `Busy` if this course is already enrolling, otherwise the backend's error.
    #[instrument(skip(self))]
    pub async fn enroll(&self, course_id: &str) -> Result<Option<String>, AppError> {
        let _busy = EnrollGuard::acquire(&self.inner.state, course_id)?;

        let response = client::enroll(&self.inner.api, course_id)
            .await
            .map_err(|err| self.check_expired(err))?;
        info!(course_id, "enrolled");

        let (_, all) = tokio::join!(self.fetch_my_courses(), self.fetch_all_courses());
        if let Err(err) = all {
            debug!("catalog refresh after enroll failed: {err}");
        }

        Ok(response.message)
    }

    /// Creates a course (admin), then refetches the catalog.
    ///
    /// # Errors
    /// Returns `Validation` for an incomplete form, otherwise the backend's error.
    #[instrument(skip(self, course), fields(title = %course.title))]
    pub async fn create_course(&self, course: NewCourse) -> Result<Option<String>, AppError> {
        course.validate()?;
        let created_by = self
            .inner
            .session
            .snapshot()
            .user
            .map(|user| user.name)
            .unwrap_or_default();

        let response = client::create(&self.inner.api, course, &created_by)
            .await
            .map_err(|err| self.check_expired(err))?;
        info!("course created");

        self.refresh_courses().await;
        Ok(response.message)
    }

    /// Deletes a course and its lectures (admin), then refetches the catalog.
    /// Asking for confirmation is the caller's job.
    ///
    /// # Errors
    /// Returns the backend's error.
    #[instrument(skip(self))]
    pub async fn delete_course(&self, course_id: &str) -> Result<Option<String>, AppError> {
        let response = client::delete(&self.inner.api, course_id)
            .await
            .map_err(|err| self.check_expired(err))?;
        info!(course_id, "course deleted");

        self.refresh_courses().await;
        Ok(response.message)
    }

    async fn refresh_courses(&self) {
        if let Err(err) = self.fetch_all_courses().await {
            warn!("catalog refresh failed: {err}");
        }
    }

    fn check_expired(&self, err: AppError) -> AppError {
        if err.is_unauthorized() {
            self.inner.session.expire();
        }
        err
    }

    #[must_use]
    pub fn is_enrolling(&self, course_id: &str) -> bool {
        self.inner.state.borrow().enrolling.contains(course_id)
    }

    /// Admins can open every course; everyone else needs an enrollment.
    #[must_use]
    pub fn is_enrolled(&self, course_id: &str) -> bool {
        if self.inner.session.snapshot().is_admin() {
            return true;
        }
        self.inner
            .state
            .borrow()
            .my_courses
            .iter()
            .any(|course| course.id == course_id)
    }

    /// Decides where an "enroll" click leads: login for guests, lectures for
    /// admins and free courses (after enrolling), checkout otherwise.
    ///
    /// # Errors
    /// Returns the free enrollment's error.
    pub async fn handle_enroll(&self, course: &Course) -> Result<Route, AppError> {
        let session = self.inner.session.snapshot();
        if !session.is_authenticated || self.inner.api.credentials().bearer().is_none() {
            return Ok(Route::Login);
        }
        if session.is_admin() {
            return Ok(Route::Lectures(course.id.clone()));
        }
        if course.is_free() {
            self.enroll(&course.id).await?;
            return Ok(Route::Lectures(course.id.clone()));
        }
        Ok(Route::Payment(course.id.clone()))
    }

    /// Refetches the enrolled subset whenever the session's identity changes.
    #[must_use]
    pub fn watch_identity(&self) -> TaskHandle {
        let store = self.clone();
        let mut identity = self.inner.session.identity();

        TaskHandle::spawn("catalog-identity", move |mut signal| async move {
            loop {
                tokio::select! {
                    () = stopped(&mut signal) => break,
                    changed = identity.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let user: Option<User> = identity.borrow_and_update().clone();
                        debug!(authenticated = user.is_some(), "identity changed");
                        store.fetch_my_courses().await;
                    }
                }
            }
        })
    }

    fn replace_my_courses(&self, courses: Vec<Course>) {
        self.inner.state.send_if_modified(|catalog| {
            if catalog.my_courses == courses {
                false
            } else {
                catalog.my_courses = courses;
                true
            }
        });
    }
}

fn dedup(courses: Vec<Course>) -> Vec<Course> {
    let mut seen = BTreeSet::new();
    courses
        .into_iter()
        .filter(|course| seen.insert(course.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::dedup;
    use crate::features::courses::types::Course;

    #[test]
    fn dedup_keeps_first_occurrence() {
        let course = |id: &str, title: &str| Course {
            id: id.to_string(),
            title: title.to_string(),
            ..Course::default()
        };
        let courses = dedup(vec![course("a", "one"), course("b", "two"), course("a", "three")]);
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].title, "one");
    }
}
