use crate::{
    client::{ApiClient, AppError, Auth},
    features::{
        auth::types::{MessageResponse, User},
        courses::types::null_as_empty,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UsersResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<User>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoleChangeRequest<'a> {
    pub email: &'a str,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest<'a> {
    pub user_id: &'a str,
}

pub async fn fetch_all(api: &ApiClient) -> Result<UsersResponse, AppError> {
    api.get_json("/api/users", Auth::Bearer).await
}

pub async fn promote(api: &ApiClient, email: &str) -> Result<MessageResponse, AppError> {
    api.post_json("/api/user/promote", &RoleChangeRequest { email }, Auth::Bearer)
        .await
}

pub async fn demote(api: &ApiClient, email: &str) -> Result<MessageResponse, AppError> {
    api.post_json("/api/user/demote", &RoleChangeRequest { email }, Auth::Bearer)
        .await
}

pub async fn delete(api: &ApiClient, user_id: &str) -> Result<MessageResponse, AppError> {
    api.delete_json_with_body(
        "/api/user/delete-user",
        &DeleteUserRequest { user_id },
        Auth::Bearer,
    )
    .await
}
