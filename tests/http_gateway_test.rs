use chrono::NaiveDate;
use httpmock::prelude::*;
use payment_plan::config::toml_config::GatewayConfig;
use payment_plan::utils::error::{CommitError, GatewayError};
use payment_plan::{
    ChannelId, HttpPaymentGateway, Money, PaymentGateway, PlanController, PlanError, PlanState,
    Tenor,
};
use std::collections::HashMap;

fn gateway_config(base_url: String) -> GatewayConfig {
    GatewayConfig {
        base_url,
        save_path: "/payments".to_string(),
        advance_path: "/stage/advance".to_string(),
        timeout_seconds: Some(5),
        headers: Some(HashMap::from([(
            "Authorization".to_string(),
            "Bearer test-token".to_string(),
        )])),
    }
}

fn ready_controller() -> PlanController {
    let mut controller = PlanController::new("006Opp")
        .with_as_of(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    controller.load_total(Money::new(1_000)).unwrap();
    controller.select_tenor(Tenor::new(2).unwrap()).unwrap();
    controller.select_channel(ChannelId::new("CH-1")).unwrap();
    controller
}

#[tokio::test]
async fn test_commit_posts_payments_then_advances_stage() {
    let server = MockServer::start_async().await;

    let save_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/payments")
                .header("Authorization", "Bearer test-token")
                .json_body(serde_json::json!({
                    "recordId": "006Opp",
                    "items": [
                        {"num": 1, "amount": 500, "dueDate": "2024-04-28"},
                        {"num": 2, "amount": 500, "dueDate": "2024-05-28"}
                    ],
                    "paymentChannelId": "CH-1",
                    "allocation": "Tuition Fee",
                    "paymentStatus": "Unpaid"
                }));
            then.status(200);
        })
        .await;

    let advance_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/stage/advance")
                .json_body(serde_json::json!({"recordId": "006Opp"}));
            then.status(204);
        })
        .await;

    let gateway = HttpPaymentGateway::new(gateway_config(server.base_url())).unwrap();
    let mut controller = ready_controller();

    let receipt = controller.commit(&gateway).await.unwrap();

    save_mock.assert_async().await;
    advance_mock.assert_async().await;
    assert_eq!(receipt.installments, 2);
    assert_eq!(controller.state(), PlanState::Committed);
}

#[tokio::test]
async fn test_rejected_save_surfaces_server_message() {
    let server = MockServer::start_async().await;

    let save_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/payments");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"message": "Payment channel is inactive"}));
        })
        .await;

    let advance_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/stage/advance");
            then.status(204);
        })
        .await;

    let gateway = HttpPaymentGateway::new(gateway_config(server.base_url())).unwrap();
    let mut controller = ready_controller();

    let err = controller.commit(&gateway).await.unwrap_err();

    save_mock.assert_async().await;
    assert_eq!(advance_mock.hits_async().await, 0);
    match err {
        PlanError::Commit(CommitError::PersistenceFailed { message }) => {
            assert!(message.contains("Payment channel is inactive"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(controller.state(), PlanState::Editing);
}

#[tokio::test]
async fn test_stage_failure_after_save() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/payments");
            then.status(200);
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/stage/advance");
            then.status(500).body("stage transition not allowed");
        })
        .await;

    let gateway = HttpPaymentGateway::new(gateway_config(server.base_url())).unwrap();
    let mut controller = ready_controller();

    let err = controller.commit(&gateway).await.unwrap_err();

    match err {
        PlanError::Commit(CommitError::StageAdvanceFailed { message }) => {
            assert!(message.contains("stage transition not allowed"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_error_body_falls_back_to_status_reason() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/stage/advance");
            then.status(404);
        })
        .await;

    let gateway = HttpPaymentGateway::new(gateway_config(server.base_url())).unwrap();
    let err = gateway.advance_stage("006Opp").await.unwrap_err();

    match err {
        GatewayError::Rejected { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
