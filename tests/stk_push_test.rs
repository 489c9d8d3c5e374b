//! Integration tests for the STK Push dispatcher against mocked Daraja
//! endpoints.

use daraja_gateway::payments::providers::mpesa::{MpesaConfig, MpesaMode, MpesaProvider};
use daraja_gateway::payments::traits::PaymentProvider;
use daraja_gateway::payments::types::{StkPushOutcome, StkPushRequest};
use serde_json::json;
use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: String) -> MpesaConfig {
    MpesaConfig {
        consumer_key: "test_consumer_key".to_string(),
        consumer_secret: "test_consumer_secret".to_string(),
        shortcode: "174379".to_string(),
        passkey: "test_passkey".to_string(),
        callback_url: "https://example.com/payments/callback".to_string(),
        base_url,
        timeout_secs: 5,
        mode: MpesaMode::Live,
        demo_fallback: true,
    }
}

fn push_request(phone: &str) -> StkPushRequest {
    StkPushRequest {
        phone_number: phone.to_string(),
        amount: 100,
        account_reference: None,
        transaction_desc: None,
    }
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/oauth/v1/generate"))
        .and(query_param("grant_type", "client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "expires_in": "3599"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn accepted_push_reports_success_with_checkout_id() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .and(header("authorization", "Bearer abc"))
        .and(body_partial_json(json!({
            "BusinessShortCode": "174379",
            "TransactionType": "CustomerPayBillOnline",
            "Amount": 100,
            "PartyA": "254712345678",
            "PartyB": "174379",
            "PhoneNumber": "254712345678",
            "CallBackURL": "https://example.com/payments/callback",
            "AccountReference": "TindiTech",
            "TransactionDesc": "Order Payment"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "MerchantRequestID": "29115-34620561-1",
            "CheckoutRequestID": "xyz",
            "ResponseCode": "0",
            "ResponseDescription": "Success. Request accepted for processing",
            "CustomerMessage": "Success. Request accepted for processing"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = MpesaProvider::new(test_config(server.uri()));
    let outcome = provider.initiate_stk_push(push_request("0712345678")).await;

    assert_eq!(
        outcome,
        StkPushOutcome::Success {
            message: "STK Push initiated successfully".to_string(),
            checkout_request_id: "xyz".to_string(),
        }
    );
}

#[tokio::test]
async fn rejected_push_reports_provider_error_message() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ResponseCode": "1",
            "errorMessage": "Insufficient funds"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = MpesaProvider::new(test_config(server.uri()));
    let outcome = provider.initiate_stk_push(push_request("0712345678")).await;

    assert_eq!(
        outcome,
        StkPushOutcome::Failure {
            error: "Insufficient funds".to_string(),
        }
    );
}

#[tokio::test]
async fn rejected_push_without_error_message_gets_generic_error() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "requestId": "1234-5678"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = MpesaProvider::new(test_config(server.uri()));
    let outcome = provider.initiate_stk_push(push_request("0712345678")).await;

    assert_eq!(
        outcome,
        StkPushOutcome::Failure {
            error: "STK Push failed".to_string(),
        }
    );
}

#[tokio::test]
async fn token_failure_falls_back_to_simulated_success_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth/v1/generate"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = MpesaProvider::new(test_config(server.uri()));
    let outcome = provider.initiate_stk_push(push_request("0712345678")).await;

    assert_eq!(
        outcome,
        StkPushOutcome::Success {
            message: "Demo: STK Push (Auth Failed)".to_string(),
            checkout_request_id: "ws_CO_DM_FAILSAFE".to_string(),
        }
    );
}

#[tokio::test]
async fn token_failure_is_reported_when_fallback_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth/v1/generate"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(server.uri());
    config.demo_fallback = false;

    let provider = MpesaProvider::new(config);
    let outcome = provider.initiate_stk_push(push_request("0712345678")).await;

    match outcome {
        StkPushOutcome::Failure { error } => {
            assert!(error.contains("access token"), "unexpected error: {}", error)
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn token_response_without_access_token_triggers_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth/v1/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"expires_in": "3599"})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = MpesaProvider::new(test_config(server.uri()));
    let outcome = provider.initiate_stk_push(push_request("0712345678")).await;

    assert_eq!(
        outcome.checkout_request_id(),
        Some("ws_CO_DM_FAILSAFE"),
        "expected the fail-open simulated outcome"
    );
}

#[tokio::test]
async fn missing_credentials_never_touch_the_network() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(server.uri());
    config.consumer_secret = String::new();

    let provider = MpesaProvider::new(config);
    let outcome = provider.initiate_stk_push(push_request("0712345678")).await;

    assert_eq!(
        outcome,
        StkPushOutcome::Failure {
            error: "M-Pesa credentials missing in config".to_string(),
        }
    );
}

#[tokio::test]
async fn placeholder_credentials_never_touch_the_network() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(server.uri());
    config.consumer_key = "your_consumer_key".to_string();

    let provider = MpesaProvider::new(config);
    let outcome = provider.initiate_stk_push(push_request("0712345678")).await;

    assert!(outcome.is_success());
    assert!(outcome
        .checkout_request_id()
        .unwrap()
        .starts_with("ws_CO_DM_"));
}

#[tokio::test]
async fn malformed_phone_number_is_rejected_before_submission() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = MpesaProvider::new(test_config(server.uri()));
    let outcome = provider.initiate_stk_push(push_request("12345")).await;

    match outcome {
        StkPushOutcome::Failure { error } => {
            assert!(
                error.contains("Invalid phone number"),
                "unexpected error: {}",
                error
            )
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn non_json_push_response_is_a_connection_error() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway error</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = MpesaProvider::new(test_config(server.uri()));
    let outcome = provider.initiate_stk_push(push_request("0712345678")).await;

    match outcome {
        StkPushOutcome::Failure { error } => {
            assert!(
                error.starts_with("Connection error:"),
                "unexpected error: {}",
                error
            )
        }
        other => panic!("expected failure, got {:?}", other),
    }
}
