use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A savings target with a running balance and a deadline.
///
/// `current_amount` is a cached running total of the goal's contribution
/// ledger. It is only ever changed together with a ledger append
/// (see `GoalService::apply_contribution`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
    /// Derived: `current_amount >= target_amount`
    #[serde(default)]
    pub is_completed: bool,
}

impl Goal {
    pub fn new(
        owner: Uuid,
        name: impl Into<String>,
        target_amount: Decimal,
        start_date: NaiveDate,
        target_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name: name.into(),
            description: None,
            target_amount,
            current_amount: Decimal::ZERO,
            start_date,
            target_date,
            is_completed: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set an opening balance and recompute completion.
    pub fn with_current_amount(mut self, current_amount: Decimal) -> Self {
        self.current_amount = current_amount;
        self.refresh_completion();
        self
    }

    /// Recompute `is_completed` from the amounts.
    pub fn refresh_completion(&mut self) {
        self.is_completed = self.current_amount >= self.target_amount;
    }

    /// Add a signed amount to the running total, floored at zero, and
    /// recompute completion.
    pub fn apply_delta(&mut self, delta: Decimal) {
        self.current_amount = (self.current_amount + delta).max(Decimal::ZERO);
        self.refresh_completion();
    }
}

/// Append-only ledger entry adjusting a goal's balance.
/// Positive for deposits, negative for withdrawals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalContribution {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GoalContribution {
    pub fn new(goal_id: Uuid, amount: Decimal, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal_id,
            amount,
            description,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_withdrawal(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

/// A validated contribution and its projected outcome, computed before
/// anything is written.
///
/// Only `contribution` is committed. The projection is taken from the goal
/// as it was read; the commit applies the signed amount to the stored total,
/// so a concurrent contribution is never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionPlan {
    pub contribution: GoalContribution,
    /// `max(0, current_amount + delta)` as of the read
    pub new_current_amount: Decimal,
    /// `new_current_amount >= target_amount` as of the read
    pub is_completed: bool,
}
