use crate::{
    client::{ApiClient, AppError, Auth},
    features::payments::types::{
        ConfirmPaymentRequest, ConfirmPaymentResponse, CreateIntentRequest, CreateIntentResponse,
    },
};

/// Creates a payment intent. Uses the longer payment timeout since the
/// backend calls out to the processor.
pub async fn create_intent(
    api: &ApiClient,
    request: &CreateIntentRequest<'_>,
) -> Result<CreateIntentResponse, AppError> {
    let timeout = api.config().payment_timeout;
    api.post_json_with_timeout("/api/payment/create-intent", request, Auth::Bearer, timeout)
        .await
}

/// Asks the backend to grant access for a settled payment intent. Safe to
/// repeat with the same intent id.
pub async fn confirm(
    api: &ApiClient,
    request: &ConfirmPaymentRequest<'_>,
) -> Result<ConfirmPaymentResponse, AppError> {
    api.post_json("/api/payment/confirm", request, Auth::Bearer)
        .await
}
