//! Payment types shared by the dispatcher and the HTTP surface.

use serde::{Deserialize, Serialize};

/// Request to prompt a customer's phone for payment authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StkPushRequest {
    /// Customer phone number in local (`07...`) or international
    /// (`+254...`) form; normalized before submission.
    pub phone_number: String,
    /// Amount in whole Kenyan shillings.
    pub amount: u64,
    /// Merchant-side reference shown on the customer's statement.
    pub account_reference: Option<String>,
    /// Short human-readable description of the charge.
    pub transaction_desc: Option<String>,
}

/// Outcome of a single STK Push dispatch.
///
/// Every invocation terminates in exactly one of these; failures are
/// folded into `Failure` rather than surfaced as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StkPushOutcome {
    Success {
        message: String,
        checkout_request_id: String,
    },
    Failure {
        error: String,
    },
}

impl StkPushOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StkPushOutcome::Success { .. })
    }

    pub fn checkout_request_id(&self) -> Option<&str> {
        match self {
            StkPushOutcome::Success {
                checkout_request_id,
                ..
            } => Some(checkout_request_id),
            StkPushOutcome::Failure { .. } => None,
        }
    }
}

/// Envelope Daraja POSTs to the registered callback URL once the
/// customer has confirmed or dismissed the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StkCallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: StkCallbackBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StkCallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

/// Result of a previously initiated push, correlated by
/// `CheckoutRequestID`. `ResultCode` 0 means the customer paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
    #[serde(rename = "CallbackMetadata", default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub item: Vec<CallbackItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Option<serde_json::Value>,
}
