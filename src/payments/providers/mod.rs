//! Payment provider implementations
//!
//! Concrete implementations of the PaymentProvider trait for different providers.

pub mod mpesa;

pub use mpesa::MpesaProvider;
