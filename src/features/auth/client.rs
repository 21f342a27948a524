//! Client wrappers for the user endpoints. These helpers centralize paths and
//! auth requirements so the session store never builds requests by hand.

use crate::{
    client::{ApiClient, AppError, Auth, Upload},
    features::auth::types::{
        LoginRequest, LoginResponse, MeResponse, MessageResponse, ProfileResponse,
        RegisterResponse, ResendOtpRequest, ResendOtpResponse, UpdatePasswordRequest,
        VerifyOtpRequest, VerifyOtpResponse,
    },
};
use reqwest::multipart::Form;

/// Fetches the account behind the stored bearer token.
pub async fn fetch_me(api: &ApiClient) -> Result<MeResponse, AppError> {
    api.get_json("/api/user/me", Auth::Bearer).await
}

/// Exchanges credentials for a bearer token. Must never log the request.
pub async fn login(api: &ApiClient, request: &LoginRequest<'_>) -> Result<LoginResponse, AppError> {
    api.post_json("/api/user/login", request, Auth::None).await
}

/// Starts a signup; the account stays unverified until the OTP is accepted.
pub async fn register(
    api: &ApiClient,
    name: &str,
    email: &str,
    password: &str,
    profile_picture: Option<Upload>,
) -> Result<RegisterResponse, AppError> {
    let mut form = Form::new()
        .text("name", name.to_string())
        .text("email", email.to_string())
        .text("password", password.to_string());
    if let Some(upload) = profile_picture {
        form = form.part("file", upload.into_part()?);
    }

    api.post_multipart("/api/user/register", form, Auth::None)
        .await
}

pub async fn verify_otp(
    api: &ApiClient,
    request: &VerifyOtpRequest<'_>,
) -> Result<VerifyOtpResponse, AppError> {
    api.post_json("/api/user/verify", request, Auth::None).await
}

pub async fn resend_otp(
    api: &ApiClient,
    request: &ResendOtpRequest<'_>,
) -> Result<ResendOtpResponse, AppError> {
    api.post_json("/api/user/resend-otp", request, Auth::None)
        .await
}

pub async fn update_password(
    api: &ApiClient,
    request: &UpdatePasswordRequest<'_>,
) -> Result<MessageResponse, AppError> {
    api.post_json("/api/user/update-password", request, Auth::Bearer)
        .await
}

/// Updates whichever profile fields are present.
pub async fn update_profile(
    api: &ApiClient,
    name: Option<&str>,
    email: Option<&str>,
    profile_picture: Option<Upload>,
) -> Result<ProfileResponse, AppError> {
    let mut form = Form::new();
    if let Some(name) = name {
        form = form.text("name", name.to_string());
    }
    if let Some(email) = email {
        form = form.text("email", email.to_string());
    }
    if let Some(upload) = profile_picture {
        form = form.part("file", upload.into_part()?);
    }

    api.put_multipart("/api/user/update-profile", form, Auth::Bearer)
        .await
}

pub async fn delete_account(api: &ApiClient) -> Result<MessageResponse, AppError> {
    api.delete_json("/api/user/delete-account", Auth::Bearer)
        .await
}
