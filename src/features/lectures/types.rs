use crate::features::courses::types::{lenient_text, null_as_empty};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lecture creator, sent either as a bare id or a populated user document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Creator {
    Id(String),
    User {
        #[serde(rename = "_id", default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl Creator {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::User { name, .. } => name.as_deref(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Backend-relative path of the uploaded video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    /// Minutes, as display text.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Creator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Lecture {
    /// Absolute URL of the video on the backend.
    #[must_use]
    pub fn video_url(&self, api_base_url: &str) -> Option<String> {
        self.video.as_deref().map(|video| {
            format!(
                "{}/{}",
                api_base_url.trim().trim_end_matches('/'),
                video.trim_start_matches('/')
            )
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LecturesResponse {
    #[serde(default, alias = "lectures", deserialize_with = "null_as_empty")]
    pub lecture: Vec<Lecture>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{Creator, Lecture, LecturesResponse};
    use serde_json::json;

    #[test]
    fn creator_accepts_id_or_document() {
        let response: LecturesResponse = serde_json::from_value(json!({
            "lecture": [
                {"_id": "l1", "title": "Intro", "createdBy": "u1", "duration": 12},
                {"_id": "l2", "title": "Traits", "createdBy": {"_id": "u2", "name": "Ann"}}
            ]
        }))
        .unwrap();

        assert_eq!(
            response.lecture[0].created_by,
            Some(Creator::Id("u1".to_string()))
        );
        assert_eq!(response.lecture[0].duration.as_deref(), Some("12"));
        assert_eq!(
            response.lecture[1].created_by.as_ref().and_then(Creator::name),
            Some("Ann")
        );
    }

    #[test]
    fn video_url_joins_backend_base() {
        let lecture = Lecture {
            video: Some("uploads/intro.mp4".to_string()),
            ..Lecture::default()
        };
        assert_eq!(
            lecture.video_url("http://localhost:2000/").as_deref(),
            Some("http://localhost:2000/uploads/intro.mp4")
        );
    }
}
