//! Single-session plan controller.
//!
//! Owns the row set and moves through:
//!
//! ```text
//! uninitialized -> previewing          (target total arrives, full payment)
//! previewing    -> previewing          (plan shape changed)
//! previewing    -> editing             (row edit)
//! editing       -> previewing          (plan shape changed)
//! editing       -> editing             (row edit, failed validation)
//! editing       -> committing          (commit request passes validation)
//! committing    -> committed           (gateway calls succeed)
//! committing    -> editing             (gateway call fails, rows kept)
//! ```
//!
//! `committed` is terminal. Every mutating request made while `committing`
//! is rejected with [`PlanError::CommitInFlight`].

use crate::core::{allocator, reconciler, validator};
use crate::domain::model::{
    ChannelId, CommitReceipt, CommitRequest, InstallmentRow, Money, PaymentItem, PlanShape,
    RowEdit, Tenor, ALLOCATION_TAG, PAYMENT_STATUS_TAG,
};
use crate::domain::ports::PaymentGateway;
use crate::utils::error::{AllocationError, CommitError, PlanError, Result, ValidationError};
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    Uninitialized,
    Previewing,
    Editing,
    Committing,
    Committed,
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanState::Uninitialized => "uninitialized",
            PlanState::Previewing => "previewing",
            PlanState::Editing => "editing",
            PlanState::Committing => "committing",
            PlanState::Committed => "committed",
        };
        f.write_str(s)
    }
}

pub struct PlanController {
    record_id: String,
    state: PlanState,
    shape: PlanShape,
    target: Option<Money>,
    rows: Vec<InstallmentRow>,
    channel: Option<ChannelId>,
    fixed_as_of: Option<NaiveDate>,
}

impl PlanController {
    pub fn new(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            state: PlanState::Uninitialized,
            shape: PlanShape::Full,
            target: None,
            rows: Vec::new(),
            channel: None,
            fixed_as_of: None,
        }
    }

    /// Pin the date due dates are derived from instead of reading the clock.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.fixed_as_of = Some(as_of);
        self
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn state(&self) -> PlanState {
        self.state
    }

    pub fn shape(&self) -> PlanShape {
        self.shape
    }

    pub fn target(&self) -> Option<Money> {
        self.target
    }

    pub fn channel(&self) -> Option<&ChannelId> {
        self.channel.as_ref()
    }

    pub fn rows(&self) -> &[InstallmentRow] {
        &self.rows
    }

    pub fn snapshot(&self) -> Vec<InstallmentRow> {
        self.rows.clone()
    }

    pub fn sum(&self) -> Money {
        validator::sum(&self.rows)
    }

    /// Live feedback for the host: how far the rows are from the target.
    pub fn diff(&self) -> Money {
        validator::diff(&self.rows, self.target.unwrap_or(Money::ZERO))
    }

    /// Whether a commit request would currently pass validation.
    pub fn can_commit(&self) -> bool {
        matches!(self.state, PlanState::Previewing | PlanState::Editing)
            && self.check().is_ok()
    }

    /// Supply the target total. The first positive total generates the
    /// default full-payment preview; later totals only move the target.
    pub fn load_total(&mut self, total: Money) -> Result<()> {
        self.ensure_mutable("update the total")?;

        if self.state == PlanState::Uninitialized {
            let rows = allocator::generate(total, &PlanShape::Full, self.as_of())?;
            self.target = Some(total);
            self.shape = PlanShape::Full;
            self.rows = rows;
            self.transition(PlanState::Previewing);
            return Ok(());
        }

        if !total.is_positive() {
            return Err(AllocationError::InvalidTotal { total }.into());
        }
        tracing::debug!("Target total for {} updated to {}", self.record_id, total);
        self.target = Some(total);
        Ok(())
    }

    /// Replace the plan shape. Rows and edits are regenerated from scratch.
    pub fn change_shape(&mut self, shape: PlanShape) -> Result<()> {
        self.ensure_mutable("change the plan shape")?;
        let target = self.require_target("change the plan shape")?;

        let rows = match shape {
            PlanShape::Installment { tenor: None } => Vec::new(),
            _ => allocator::generate(target, &shape, self.as_of())?,
        };

        tracing::info!(
            "Plan {} regenerated as {:?} with {} row(s)",
            self.record_id,
            shape,
            rows.len()
        );
        self.shape = shape;
        self.rows = rows;
        self.transition(PlanState::Previewing);
        Ok(())
    }

    pub fn select_tenor(&mut self, tenor: Tenor) -> Result<()> {
        self.change_shape(PlanShape::installment(tenor))
    }

    pub fn apply_edits(&mut self, edits: &HashMap<String, RowEdit>) -> Result<()> {
        self.ensure_mutable("edit rows")?;
        self.require_target("edit rows")?;

        self.rows = reconciler::apply_edits(&self.rows, edits);
        self.transition(PlanState::Editing);
        Ok(())
    }

    pub fn select_channel(&mut self, channel: ChannelId) -> Result<()> {
        self.ensure_mutable("select a payment channel")?;
        tracing::debug!("Payment channel for {} set to {}", self.record_id, channel);
        self.channel = Some(channel);
        Ok(())
    }

    /// Validate and enter `committing`, returning the payload to persist.
    ///
    /// A validation failure leaves the rows untouched and puts the plan in
    /// `editing`.
    pub fn begin_commit(&mut self) -> Result<CommitRequest> {
        self.ensure_mutable("commit")?;
        self.require_target("commit")?;

        let request = match self.check().and_then(|()| self.build_request()) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!("Commit of {} rejected: {}", self.record_id, err);
                self.transition(PlanState::Editing);
                return Err(err.into());
            }
        };

        self.transition(PlanState::Committing);
        Ok(request)
    }

    /// Resolve an in-flight commit with the outcome of the gateway calls.
    pub fn complete_commit(
        &mut self,
        outcome: std::result::Result<(), CommitError>,
    ) -> Result<CommitReceipt> {
        if self.state != PlanState::Committing {
            return Err(self.invalid_state("complete a commit"));
        }

        match outcome {
            Ok(()) => {
                self.transition(PlanState::Committed);
                Ok(CommitReceipt {
                    record_id: self.record_id.clone(),
                    installments: self.rows.len(),
                    total: self.sum(),
                })
            }
            Err(err) => {
                tracing::error!("Commit of {} failed: {}", self.record_id, err);
                self.transition(PlanState::Editing);
                Err(err.into())
            }
        }
    }

    /// Validate, save the payments, then advance the record's stage.
    pub async fn commit<G>(&mut self, gateway: &G) -> Result<CommitReceipt>
    where
        G: PaymentGateway + ?Sized,
    {
        let request = self.begin_commit()?;
        let outcome = Self::send(gateway, &request).await;
        self.complete_commit(outcome)
    }

    async fn send<G>(gateway: &G, request: &CommitRequest) -> std::result::Result<(), CommitError>
    where
        G: PaymentGateway + ?Sized,
    {
        gateway
            .save_payments(request)
            .await
            .map_err(|e| CommitError::PersistenceFailed {
                message: e.to_string(),
            })?;

        gateway
            .advance_stage(&request.record_id)
            .await
            .map_err(|e| CommitError::StageAdvanceFailed {
                message: e.to_string(),
            })
    }

    fn check(&self) -> std::result::Result<(), ValidationError> {
        validator::validate(
            &self.rows,
            self.target.unwrap_or(Money::ZERO),
            self.channel.is_some(),
        )
    }

    fn build_request(&self) -> std::result::Result<CommitRequest, ValidationError> {
        let items = self
            .rows
            .iter()
            .map(|row| {
                let due_date = row.due_date.ok_or_else(|| ValidationError::IncompleteRow {
                    row_id: row.id.clone(),
                })?;
                Ok(PaymentItem {
                    sequence_number: row.sequence,
                    amount: row.amount,
                    due_date,
                })
            })
            .collect::<std::result::Result<Vec<_>, ValidationError>>()?;

        let channel = self
            .channel
            .clone()
            .ok_or(ValidationError::ChannelNotSelected)?;

        Ok(CommitRequest {
            record_id: self.record_id.clone(),
            items,
            payment_channel_id: channel,
            allocation: ALLOCATION_TAG.to_string(),
            payment_status: PAYMENT_STATUS_TAG.to_string(),
        })
    }

    fn ensure_mutable(&self, action: &str) -> Result<()> {
        match self.state {
            PlanState::Committing => {
                tracing::warn!(
                    "Rejected request to {} on {}: commit in flight",
                    action,
                    self.record_id
                );
                Err(PlanError::CommitInFlight)
            }
            PlanState::Committed => Err(self.invalid_state(action)),
            _ => Ok(()),
        }
    }

    fn require_target(&self, action: &str) -> Result<Money> {
        self.target.ok_or_else(|| self.invalid_state(action))
    }

    fn invalid_state(&self, action: &str) -> PlanError {
        PlanError::InvalidState {
            state: self.state.to_string(),
            action: action.to_string(),
        }
    }

    fn as_of(&self) -> NaiveDate {
        self.fixed_as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    fn transition(&mut self, to: PlanState) {
        if self.state != to {
            tracing::info!("Plan {}: {} -> {}", self.record_id, self.state, to);
        }
        self.state = to;
    }
}
