use crate::{
    client::{ApiClient, AppError, Auth, Upload},
    features::{
        auth::types::MessageResponse, courses::client::encode_segment,
        lectures::types::LecturesResponse,
    },
};
use reqwest::multipart::Form;

pub async fn fetch(api: &ApiClient, course_id: &str) -> Result<LecturesResponse, AppError> {
    let path = format!("/api/lecture/{}", encode_segment(course_id));
    api.get_json(&path, Auth::Bearer).await
}

pub async fn add(
    api: &ApiClient,
    course_id: &str,
    title: &str,
    description: &str,
    video: Upload,
) -> Result<MessageResponse, AppError> {
    let form = Form::new()
        .text("title", title.to_string())
        .text("description", description.to_string())
        .part("file", video.into_part()?);

    let path = format!("/api/course/{}", encode_segment(course_id));
    api.post_multipart(&path, form, Auth::Bearer).await
}

pub async fn delete(api: &ApiClient, lecture_id: &str) -> Result<MessageResponse, AppError> {
    let path = format!("/api/lecture/{}", encode_segment(lecture_id));
    api.delete_json(&path, Auth::Bearer).await
}
