use async_trait::async_trait;
use chrono::NaiveDate;
use payment_plan::utils::error::{CommitError, GatewayError, ValidationError};
use payment_plan::{
    ChannelId, CommitRequest, Money, Notice, PaymentGateway, PlanController, PlanError, PlanShape,
    PlanState, RowEdit, Tenor,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct RecordingGateway {
    saved: Arc<Mutex<Vec<CommitRequest>>>,
    advanced: Arc<Mutex<Vec<String>>>,
    save_failures: Arc<Mutex<u32>>,
}

impl RecordingGateway {
    fn failing_saves(times: u32) -> Self {
        Self {
            save_failures: Arc::new(Mutex::new(times)),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn save_payments(&self, request: &CommitRequest) -> Result<(), GatewayError> {
        let mut failures = self.save_failures.lock().await;
        if *failures > 0 {
            *failures -= 1;
            return Err(GatewayError::Rejected {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        self.saved.lock().await.push(request.clone());
        Ok(())
    }

    async fn advance_stage(&self, record_id: &str) -> Result<(), GatewayError> {
        self.advanced.lock().await.push(record_id.to_string());
        Ok(())
    }
}

fn controller() -> PlanController {
    PlanController::new("006Opp").with_as_of(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
}

fn edit(id: &str, amount: i64) -> HashMap<String, RowEdit> {
    HashMap::from([(id.to_string(), RowEdit::amount(Money::new(amount)))])
}

#[tokio::test]
async fn test_installment_plan_end_to_end() {
    let gateway = RecordingGateway::default();
    let mut plan = controller();

    plan.load_total(Money::new(1_000_001)).unwrap();
    plan.change_shape(PlanShape::Installment { tenor: None }).unwrap();
    assert!(plan.rows().is_empty());

    plan.select_tenor(Tenor::new(4).unwrap()).unwrap();
    let amounts: Vec<i64> = plan.rows().iter().map(|r| r.amount.units()).collect();
    assert_eq!(amounts, vec![250_000, 250_000, 250_000, 250_001]);

    // Move 1 unit from the last installment to the first.
    plan.apply_edits(&edit("1", 250_001)).unwrap();
    assert_eq!(plan.diff(), Money::new(-1));
    plan.apply_edits(&edit("4", 250_000)).unwrap();
    assert_eq!(plan.diff(), Money::ZERO);
    assert_eq!(plan.state(), PlanState::Editing);

    plan.select_channel(ChannelId::new("a0BChannel")).unwrap();
    let receipt = plan.commit(&gateway).await.unwrap();

    assert_eq!(receipt.installments, 4);
    assert_eq!(receipt.total, Money::new(1_000_001));
    assert_eq!(plan.state(), PlanState::Committed);

    let saved = gateway.saved.lock().await;
    assert_eq!(saved.len(), 1);
    let request = &saved[0];
    assert_eq!(request.record_id, "006Opp");
    assert_eq!(request.payment_channel_id, ChannelId::new("a0BChannel"));
    assert_eq!(request.allocation, "Tuition Fee");
    assert_eq!(request.payment_status, "Unpaid");
    let numbers: Vec<u32> = request.items.iter().map(|i| i.sequence_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert_eq!(request.items[0].amount, Money::new(250_001));
    assert_eq!(
        request.items[3].due_date,
        NaiveDate::from_ymd_opt(2024, 7, 28).unwrap()
    );

    assert_eq!(*gateway.advanced.lock().await, vec!["006Opp".to_string()]);
    assert_eq!(Notice::from(&receipt).title, "Success");
}

#[tokio::test]
async fn test_validation_gate_order_through_controller() {
    let gateway = RecordingGateway::default();
    let mut plan = controller();
    plan.load_total(Money::new(100)).unwrap();
    plan.select_tenor(Tenor::new(2).unwrap()).unwrap();

    plan.apply_edits(&edit("2", 49)).unwrap();
    let err = plan.commit(&gateway).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::Validation(ValidationError::AmountMismatch { expected, actual })
            if expected == Money::new(100) && actual == Money::new(99)
    ));

    let zero_first = HashMap::from([
        ("1".to_string(), RowEdit::amount(Money::ZERO)),
        ("2".to_string(), RowEdit::amount(Money::new(100))),
    ]);
    plan.apply_edits(&zero_first).unwrap();
    let err = plan.commit(&gateway).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::Validation(ValidationError::IncompleteRow { ref row_id }) if row_id == "1"
    ));

    plan.apply_edits(&HashMap::from([
        ("1".to_string(), RowEdit::amount(Money::new(50))),
        ("2".to_string(), RowEdit::amount(Money::new(50))),
    ]))
    .unwrap();
    let err = plan.commit(&gateway).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::Validation(ValidationError::ChannelNotSelected)
    ));
    assert_eq!(plan.state(), PlanState::Editing);
    assert!(gateway.saved.lock().await.is_empty());

    plan.select_channel(ChannelId::new("CH")).unwrap();
    assert!(plan.can_commit());
    plan.commit(&gateway).await.unwrap();
    assert_eq!(plan.state(), PlanState::Committed);
}

#[tokio::test]
async fn test_retry_after_gateway_failure_uses_same_rows() {
    let gateway = RecordingGateway::failing_saves(1);
    let mut plan = controller();
    plan.load_total(Money::new(900)).unwrap();
    plan.select_tenor(Tenor::new(2).unwrap()).unwrap();
    plan.apply_edits(&HashMap::from([
        ("1".to_string(), RowEdit::amount(Money::new(300))),
        ("2".to_string(), RowEdit::amount(Money::new(600))),
    ]))
    .unwrap();
    plan.select_channel(ChannelId::new("CH")).unwrap();
    let before = plan.snapshot();

    let err = plan.commit(&gateway).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::Commit(CommitError::PersistenceFailed { ref message }) if message.contains("service unavailable")
    ));
    assert_eq!(plan.state(), PlanState::Editing);
    assert_eq!(plan.snapshot(), before);
    assert!(gateway.advanced.lock().await.is_empty());

    plan.commit(&gateway).await.unwrap();
    let saved = gateway.saved.lock().await;
    assert_eq!(saved[0].items[0].amount, Money::new(300));
    assert_eq!(saved[0].items[1].amount, Money::new(600));
}

#[tokio::test]
async fn test_host_driven_commit_blocks_shape_change() {
    let mut plan = controller();
    plan.load_total(Money::new(1_000)).unwrap();
    plan.select_channel(ChannelId::new("CH")).unwrap();

    let request = plan.begin_commit().unwrap();
    assert_eq!(plan.state(), PlanState::Committing);
    assert_eq!(request.items.len(), 1);

    let err = plan
        .change_shape(PlanShape::installment(Tenor::new(4).unwrap()))
        .unwrap_err();
    assert!(matches!(err, PlanError::CommitInFlight));
    assert_eq!(plan.shape(), PlanShape::Full);
    assert_eq!(plan.rows().len(), 1);
    assert!(matches!(
        plan.load_total(Money::new(5)),
        Err(PlanError::CommitInFlight)
    ));
    assert!(matches!(
        plan.select_channel(ChannelId::new("other")),
        Err(PlanError::CommitInFlight)
    ));

    let receipt = plan.complete_commit(Ok(())).unwrap();
    assert_eq!(receipt.total, Money::new(1_000));
    assert_eq!(plan.state(), PlanState::Committed);
}

#[tokio::test]
async fn test_error_notice_is_specific() {
    let mut plan = controller();
    plan.load_total(Money::new(100)).unwrap();
    plan.apply_edits(&edit("1", 90)).unwrap();
    plan.select_channel(ChannelId::new("CH")).unwrap();

    let err = plan.begin_commit().unwrap_err();
    let notice = Notice::from(&err);

    assert_eq!(notice.title, "Error");
    assert!(notice.message.contains("90"));
    assert!(notice.message.contains("100"));
}
