use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::AppState;
use crate::payments::traits::PaymentProvider;
use crate::payments::types::{StkCallbackEnvelope, StkPushOutcome, StkPushRequest};

/// Wire shape of a dispatch outcome: a `success` flag with either a
/// message and checkout id or an error string.
#[derive(Debug, Serialize, Deserialize)]
pub struct StkPushApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_request_id: Option<String>,
}

impl From<StkPushOutcome> for StkPushApiResponse {
    fn from(outcome: StkPushOutcome) -> Self {
        match outcome {
            StkPushOutcome::Success {
                message,
                checkout_request_id,
            } => Self {
                success: true,
                message: Some(message),
                error: None,
                checkout_request_id: Some(checkout_request_id),
            },
            StkPushOutcome::Failure { error } => Self {
                success: false,
                message: None,
                error: Some(error),
                checkout_request_id: None,
            },
        }
    }
}

pub async fn initiate_stk_push(
    State(state): State<AppState>,
    Json(request): Json<StkPushRequest>,
) -> Json<StkPushApiResponse> {
    let outcome = state.provider.initiate_stk_push(request).await;
    Json(StkPushApiResponse::from(outcome))
}

/// Receives the payment result Daraja posts to the registered callback
/// URL and acknowledges it. Correlation with a checkout is the
/// caller's concern; nothing is stored here.
pub async fn mpesa_callback(
    Json(envelope): Json<StkCallbackEnvelope>,
) -> Json<serde_json::Value> {
    let callback = envelope.body.stk_callback;

    if callback.result_code == 0 {
        info!(
            "Payment confirmed: checkout_request_id={} merchant_request_id={}",
            callback.checkout_request_id, callback.merchant_request_id
        );
    } else {
        warn!(
            "Payment not completed: checkout_request_id={} result_code={} desc={}",
            callback.checkout_request_id, callback.result_code, callback.result_desc
        );
    }

    Json(serde_json::json!({ "ResultCode": 0, "ResultDesc": "Accepted" }))
}
