use crate::{
    client::{ApiClient, AppError, Auth},
    features::{
        auth::types::MessageResponse,
        courses::types::{CoursesResponse, EnrollResponse, NewCourse},
    },
};
use reqwest::multipart::Form;

pub async fn fetch_all(api: &ApiClient) -> Result<CoursesResponse, AppError> {
    api.get_json("/api/course/all", Auth::None).await
}

pub async fn fetch_mine(api: &ApiClient) -> Result<CoursesResponse, AppError> {
    api.get_json("/api/mycourse", Auth::Bearer).await
}

/// Free enrollment; paid courses go through checkout instead.
pub async fn enroll(api: &ApiClient, course_id: &str) -> Result<EnrollResponse, AppError> {
    let path = format!("/api/course/{}/enroll", encode_segment(course_id));
    api.post_empty(&path, Auth::Bearer).await
}

/// Creates a course. `created_by` is the admin's display name.
pub async fn create(
    api: &ApiClient,
    course: NewCourse,
    created_by: &str,
) -> Result<MessageResponse, AppError> {
    let mut form = Form::new()
        .text("title", course.title)
        .text("category", course.category)
        .text("description", course.description)
        .text("price", course.price.trim().to_string())
        .text("instructorName", course.instructor_name)
        .text("createdBy", created_by.to_string());
    if let Some(image) = course.image {
        form = form.part("file", image.into_part()?);
    }

    api.post_multipart("/api/course/me", form, Auth::Bearer)
        .await
}

/// Deletes a course together with its lectures.
pub async fn delete(api: &ApiClient, course_id: &str) -> Result<MessageResponse, AppError> {
    let path = format!("/api/course/{}", encode_segment(course_id));
    api.delete_json(&path, Auth::Bearer).await
}

/// Percent-encodes a value used as a single path segment.
pub(crate) fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
