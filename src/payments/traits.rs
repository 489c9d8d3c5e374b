//! Payment provider trait definitions
//!
//! Defines the common interface that all payment providers must implement.

use crate::payments::types::{StkPushOutcome, StkPushRequest};
use async_trait::async_trait;

/// Trait for mobile-money payment provider implementations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Prompt the customer's phone to authorize a payment.
    ///
    /// Returns an [`StkPushOutcome`] rather than a `Result`: every
    /// failure mode (missing credentials, auth failure, provider
    /// rejection, transport error) is reported as a structured
    /// `Failure` record so callers see exactly one outcome per
    /// invocation.
    ///
    /// # Arguments
    /// * `request` - Phone number, amount and optional merchant reference
    async fn initiate_stk_push(&self, request: StkPushRequest) -> StkPushOutcome;
}
