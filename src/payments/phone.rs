//! Phone number normalization for M-Pesa requests.
//!
//! Daraja only accepts MSISDNs in the `254XXXXXXXXX` form, while users
//! type numbers as `07XX...`, `01XX...` or `+2547XX...`.

use regex::Regex;
use std::sync::OnceLock;

use crate::payments::error::{PaymentResult, StkPushError};

static SAFARICOM_MSISDN: OnceLock<Regex> = OnceLock::new();

/// Normalized Kenyan mobile number: country code followed by a 9-digit
/// subscriber number starting with 7 or 1.
fn msisdn_pattern() -> &'static Regex {
    SAFARICOM_MSISDN.get_or_init(|| Regex::new(r"^254[17]\d{8}$").expect("valid MSISDN regex"))
}

/// Normalize a phone number to the `254XXXXXXXXX` form Daraja expects.
///
/// A leading `0` is replaced with `254` and a leading `+254` has the `+`
/// stripped. The result must match the strict MSISDN pattern; anything
/// else is rejected rather than passed through to the provider.
pub fn normalize_msisdn(raw: &str) -> PaymentResult<String> {
    let trimmed = raw.trim();

    let normalized = if let Some(rest) = trimmed.strip_prefix("+254") {
        format!("254{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix('0') {
        format!("254{}", rest)
    } else {
        trimmed.to_string()
    };

    if msisdn_pattern().is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(StkPushError::invalid_phone_number(trimmed))
    }
}
