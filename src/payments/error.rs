use thiserror::Error;

pub type PaymentResult<T> = Result<T, StkPushError>;

/// Failure modes of an STK Push dispatch.
///
/// The dispatcher never lets these escape to callers; every variant is
/// folded into an [`StkPushOutcome::Failure`](crate::payments::types::StkPushOutcome)
/// whose `error` string is the `Display` form below.
#[derive(Debug, Error)]
pub enum StkPushError {
    #[error("M-Pesa credentials missing in config")]
    MissingCredentials,

    #[error("Invalid phone number: {number}")]
    InvalidPhoneNumber { number: String },

    #[error("Failed to obtain access token: {message}")]
    TokenFetchFailed { message: String },

    #[error("{message}")]
    RemoteRejection { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },
}

impl StkPushError {
    pub fn invalid_phone_number(number: impl Into<String>) -> Self {
        Self::InvalidPhoneNumber {
            number: number.into(),
        }
    }

    pub fn token_fetch_failed(message: impl Into<String>) -> Self {
        Self::TokenFetchFailed {
            message: message.into(),
        }
    }

    pub fn remote_rejection(message: impl Into<String>) -> Self {
        Self::RemoteRejection {
            message: message.into(),
        }
    }

    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for StkPushError {
    fn from(err: reqwest::Error) -> Self {
        StkPushError::connection_error(err.to_string())
    }
}
