use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the period a budget ceiling applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetPeriod::Weekly => write!(f, "weekly"),
            BudgetPeriod::Monthly => write!(f, "monthly"),
            BudgetPeriod::Yearly => write!(f, "yearly"),
        }
    }
}

/// A spending ceiling for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub owner: Uuid,
    pub category_id: Uuid,
    /// Positive ceiling
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub is_recurring: bool,
}

impl Budget {
    pub fn new(
        owner: Uuid,
        category_id: Uuid,
        amount: Decimal,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            category_id,
            amount,
            period,
            start_date,
            is_recurring: true,
        }
    }

    pub fn monthly(owner: Uuid, category_id: Uuid, amount: Decimal, start_date: NaiveDate) -> Self {
        Self::new(owner, category_id, amount, BudgetPeriod::Monthly, start_date)
    }
}
