//! HttpBackend against a local mock backend.

mod common;

use alloy::primitives::address;
use common::{eligible_connect, json_ok, start_programmable_backend};
use multichain_verify::backend::client::{CLAIM_PATH, CONNECT_PATH, EXECUTE_FLOW_PATH};
use multichain_verify::backend::{BackendError, ExecuteFlowRequest, HttpBackend, PresaleBackend};
use serde_json::json;

const WALLET: alloy::primitives::Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

#[tokio::test]
async fn test_connect_decodes_envelope() {
    let mock = start_programmable_backend(|path, _| match path {
        "/presale/connect" => (200, json_ok(eligible_connect())),
        _ => (404, String::new()),
    })
    .await;
    let backend = HttpBackend::new(&mock.config().backend).unwrap();

    let response = backend.connect(&WALLET).await.unwrap();
    assert!(response.is_eligible);
    assert_eq!(response.raw_data.len(), 2);
    assert_eq!(response.raw_data[1].amount, "50");

    let requests = mock.requests_to(CONNECT_PATH);
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body["walletAddress"],
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
    );
}

#[tokio::test]
async fn test_error_status_maps_to_status_error() {
    let mock = start_programmable_backend(|_, _| (503, String::new())).await;
    let backend = HttpBackend::new(&mock.config().backend).unwrap();

    let err = backend.connect(&WALLET).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Status {
            endpoint: CONNECT_PATH.to_string(),
            status: 503
        }
    );
}

#[tokio::test]
async fn test_unsuccessful_envelope_is_rejected() {
    let mock = start_programmable_backend(|_, _| {
        (200, json!({"success": false, "error": "wallet blocked"}).to_string())
    })
    .await;
    let backend = HttpBackend::new(&mock.config().backend).unwrap();

    match backend.connect(&WALLET).await {
        Err(BackendError::Rejected { reason, .. }) => assert_eq!(reason, "wallet blocked"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock = start_programmable_backend(|_, _| (200, "not json".to_string())).await;
    let backend = HttpBackend::new(&mock.config().backend).unwrap();

    assert!(matches!(
        backend.connect(&WALLET).await,
        Err(BackendError::Decode { .. })
    ));
}

#[tokio::test]
async fn test_execute_flow_sends_camel_case_body() {
    let mock = start_programmable_backend(|_, _| (200, json!({"success": true}).to_string())).await;
    let backend = HttpBackend::new(&mock.config().backend).unwrap();

    let signature = format!("0x{}", "cd".repeat(65));
    let request = ExecuteFlowRequest::new(&WALLET, "Arbitrum", "SIG-1-0001", &signature);
    backend.execute_flow(&request).await.unwrap();

    let requests = mock.requests_to(EXECUTE_FLOW_PATH);
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    assert_eq!(body["chainName"], "Arbitrum");
    assert_eq!(body["flowId"], "SIG-1-0001");
    assert_eq!(body["txHash"].as_str().unwrap().len(), 66);
}

#[tokio::test]
async fn test_claim_accepts_plain_ack() {
    let mock = start_programmable_backend(|_, _| (200, "OK".to_string())).await;
    let backend = HttpBackend::new(&mock.config().backend).unwrap();

    assert!(backend.claim(&WALLET).await.is_ok());
    assert_eq!(mock.requests_to(CLAIM_PATH).len(), 1);
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let mut config = multichain_verify::FlowConfig::default();
    config.backend.base_url = "http://127.0.0.1:1/api".to_string();
    config.backend.connect_timeout_secs = 1;
    let backend = HttpBackend::new(&config.backend).unwrap();

    assert!(matches!(
        backend.connect(&WALLET).await,
        Err(BackendError::Transport(_)) | Err(BackendError::Timeout(_))
    ));
}
