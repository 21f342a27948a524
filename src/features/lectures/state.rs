//! Lecture store: the lecture list of one course at a time. Adds and deletes
//! never patch the list locally; they refetch it.

use crate::{
    client::{ApiClient, AppError, Upload},
    features::{
        auth::SessionStore,
        lectures::{client, types::Lecture},
    },
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lectures {
    /// Course the list belongs to.
    pub course_id: Option<String>,
    pub lectures: Vec<Lecture>,
    pub is_loading: bool,
    pub is_adding: bool,
}

#[derive(Clone)]
pub struct LectureStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    session: SessionStore,
    state: watch::Sender<Lectures>,
}

#[derive(Clone, Copy)]
enum Flag {
    Loading,
    Adding,
}

struct FlagGuard<'a> {
    state: &'a watch::Sender<Lectures>,
    flag: Flag,
}

impl<'a> FlagGuard<'a> {
    fn raise(state: &'a watch::Sender<Lectures>, flag: Flag) -> Self {
        state.send_modify(|lectures| *slot(lectures, flag) = true);
        Self { state, flag }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        let flag = self.flag;
        self.state.send_modify(|lectures| *slot(lectures, flag) = false);
    }
}

fn slot(lectures: &mut Lectures, flag: Flag) -> &mut bool {
    match flag {
        Flag::Loading => &mut lectures.is_loading,
        Flag::Adding => &mut lectures.is_adding,
    }
}

impl LectureStore {
    #[must_use]
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        let (state, _) = watch::channel(Lectures::default());
        Self {
            inner: Arc::new(Inner {
                api,
                session,
                state,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Lectures {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Lectures> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn video_url(&self, lecture: &Lecture) -> Option<String> {
        lecture.video_url(&self.inner.api.config().api_base_url)
    }

    /// Loads the lectures of `course_id`, replacing the held list.
    ///
    /// # Errors
    /// Returns the backend's error. A list held for another course is dropped.
    #[instrument(skip(self))]
    pub async fn fetch_lectures(&self, course_id: &str) -> Result<Vec<Lecture>, AppError> {
        let _loading = FlagGuard::raise(&self.inner.state, Flag::Loading);

        match client::fetch(&self.inner.api, course_id).await {
            Ok(response) => {
                let lectures = response.lecture;
                self.inner.state.send_modify(|state| {
                    state.course_id = Some(course_id.to_string());
                    state.lectures = lectures.clone();
                });
                Ok(lectures)
            }
            Err(err) => {
                warn!("failed to fetch lectures: {err}");
                if err.is_unauthorized() {
                    self.inner.session.expire();
                }
                self.inner.state.send_if_modified(|state| {
                    if state.course_id.as_deref() == Some(course_id) {
                        false
                    } else {
                        state.course_id = Some(course_id.to_string());
                        state.lectures.clear();
                        true
                    }
                });
                Err(err)
            }
        }
    }

    /// Uploads a lecture video, then refetches the course's lectures.
    ///
    /// # Errors
    /// Returns `Validation` for an empty title, otherwise the backend's error.
    #[instrument(skip(self, description, video))]
    pub async fn add_lecture(
        &self,
        course_id: &str,
        title: &str,
        description: &str,
        video: Upload,
    ) -> Result<Option<String>, AppError> {
        if title.trim().is_empty() {
            return Err(AppError::Validation(
                "Please provide a title and a video file.".to_string(),
            ));
        }

        let response = {
            let _adding = FlagGuard::raise(&self.inner.state, Flag::Adding);
            client::add(&self.inner.api, course_id, title, description, video)
                .await
                .map_err(|err| self.check_expired(err))?
        };
        info!(course_id, "lecture added");

        self.refresh(course_id).await;
        Ok(response.message)
    }

    /// Deletes a lecture, then refetches the course's lectures. Asking the
    /// user for confirmation is the caller's job.
    ///
    /// # Errors
    /// Returns the backend's error.
    #[instrument(skip(self))]
    pub async fn delete_lecture(
        &self,
        lecture_id: &str,
        course_id: &str,
    ) -> Result<Option<String>, AppError> {
        let response = client::delete(&self.inner.api, lecture_id)
            .await
            .map_err(|err| self.check_expired(err))?;
        info!(lecture_id, "lecture deleted");

        self.refresh(course_id).await;
        Ok(response.message)
    }

    async fn refresh(&self, course_id: &str) {
        if let Err(err) = self.fetch_lectures(course_id).await {
            warn!("lecture refresh failed: {err}");
        }
    }

    fn check_expired(&self, err: AppError) -> AppError {
        if err.is_unauthorized() {
            self.inner.session.expire();
        }
        err
    }
}
