use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::budget::BudgetPeriod;
use super::settings::Locale;
use super::transaction::Transaction;

/// Income/expense totals for one calendar month.
///
/// The core computes the numbers; the frontend only renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Short display label, e.g. "Jan/24"
    pub period: String,
    pub year: i32,
    /// 1-based month
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Expense total for one category bucket (pie chart slice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryExpense {
    /// Category of the first transaction in the bucket; `None` for the uncategorized bucket
    pub category_id: Option<Uuid>,
    pub name: String,
    pub total: Decimal,
    pub color: String,
}

/// Income/expense/balance for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySummary {
    /// 4-digit year
    pub year: String,
    pub income: Decimal,
    pub expense: Decimal,
    /// income - expense
    pub balance: Decimal,
}

/// Totals over a whole set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    /// total_income - total_expense
    pub balance: Decimal,
}

/// Severity band of a budget line, used for icons/colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetLevel {
    /// Up to 80% used
    OnTrack,
    /// More than 80% used
    Warning,
    /// More than 100% used
    Exceeded,
}

/// Budgeted vs. actual spend for the current calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub color: String,
    pub period: BudgetPeriod,
    pub budgeted: Decimal,
    pub spent: Decimal,
    /// `spent / budgeted * 100`, not clamped; `0` when nothing is budgeted
    pub percentage: Decimal,
    /// `percentage` clamped to 100 for progress bars
    pub bar_width: Decimal,
    /// `budgeted - spent`; negative means the budget was exceeded
    pub remaining: Decimal,
    pub level: BudgetLevel,
}

impl BudgetStatus {
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.percentage > Decimal::ONE_HUNDRED
    }

    /// "Available: X" or "Exceeded by |X|".
    #[must_use]
    pub fn remaining_label(&self, locale: Locale) -> String {
        let abs = self.remaining.abs().round_dp(2);
        match (locale, self.remaining.is_sign_negative() && !self.remaining.is_zero()) {
            (Locale::PtBr, false) => format!("Disponível: {abs:.2}"),
            (Locale::PtBr, true) => format!("Excedido em: {abs:.2}"),
            (Locale::EnUs, false) => format!("Available: {abs:.2}"),
            (Locale::EnUs, true) => format!("Exceeded by: {abs:.2}"),
        }
    }
}

/// Where a goal stands relative to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlineStatus {
    /// Days left, always > 0
    Remaining(i64),
    DueToday,
    /// Days past the deadline, always > 0
    Overdue(i64),
}

impl DeadlineStatus {
    /// Map a signed day count onto the tri-state.
    #[must_use]
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d > 0 => DeadlineStatus::Remaining(d),
            0 => DeadlineStatus::DueToday,
            d => DeadlineStatus::Overdue(d.abs()),
        }
    }

    #[must_use]
    pub fn label(&self, locale: Locale) -> String {
        match (self, locale) {
            (DeadlineStatus::Remaining(n), Locale::PtBr) => format!("{n} dias restantes"),
            (DeadlineStatus::DueToday, Locale::PtBr) => "Prazo é hoje".to_string(),
            (DeadlineStatus::Overdue(n), Locale::PtBr) => format!("{n} dias em atraso"),
            (DeadlineStatus::Remaining(n), Locale::EnUs) => format!("{n} days remaining"),
            (DeadlineStatus::DueToday, Locale::EnUs) => "due today".to_string(),
            (DeadlineStatus::Overdue(n), Locale::EnUs) => format!("{n} days overdue"),
        }
    }
}

/// Progress of a savings goal at a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub name: String,
    pub current: Decimal,
    pub target: Decimal,
    /// `current / target * 100`, not clamped
    pub percentage: Decimal,
    /// `percentage` clamped to [0, 100] for progress bars
    pub bar_width: Decimal,
    pub is_completed: bool,
    /// Signed: negative when overdue
    pub days_remaining: i64,
    pub deadline: DeadlineStatus,
}

/// Everything the home screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub as_of_date: NaiveDate,
    pub currency: String,
    pub summary: FinancialSummary,
    /// Newest first
    pub recent_transactions: Vec<Transaction>,
    /// Incomplete goals only
    pub active_goals: Vec<GoalProgress>,
    pub budgets: Vec<BudgetStatus>,
}

/// Everything the reports screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    pub as_of_date: NaiveDate,
    pub currency: String,
    pub summary: FinancialSummary,
    pub monthly: Vec<MonthlySummary>,
    pub categories: Vec<CategoryExpense>,
    pub yearly: Vec<YearlySummary>,
    pub goals: Vec<GoalProgress>,
}
