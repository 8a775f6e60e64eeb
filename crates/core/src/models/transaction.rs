use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in (salary, refunds, ...)
    Income,
    /// Money going out
    Expense,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrenceFrequency::Daily => write!(f, "daily"),
            RecurrenceFrequency::Weekly => write!(f, "weekly"),
            RecurrenceFrequency::Monthly => write!(f, "monthly"),
            RecurrenceFrequency::Yearly => write!(f, "yearly"),
        }
    }
}

/// A single dated income or expense.
///
/// `amount` is always a positive magnitude; `kind` decides the sign when
/// summing toward income/expense totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: Uuid,

    /// The user who recorded the transaction
    pub owner: Uuid,

    /// Category, if any. May point at a category that was deleted since.
    #[serde(default)]
    pub category_id: Option<Uuid>,

    /// Positive magnitude
    pub amount: Decimal,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Income or expense
    pub kind: TransactionKind,

    /// Calendar date of the movement (no time component)
    pub date: NaiveDate,

    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default)]
    pub recurrence: Option<RecurrenceFrequency>,
}

impl Transaction {
    pub fn new(owner: Uuid, kind: TransactionKind, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            category_id: None,
            amount,
            description: String::new(),
            kind,
            date,
            is_recurring: false,
            recurrence: None,
        }
    }

    pub fn income(owner: Uuid, amount: Decimal, date: NaiveDate) -> Self {
        Self::new(owner, TransactionKind::Income, amount, date)
    }

    pub fn expense(owner: Uuid, amount: Decimal, date: NaiveDate) -> Self {
        Self::new(owner, TransactionKind::Expense, amount, date)
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the transaction as repeating with the given frequency.
    pub fn recurring(mut self, frequency: RecurrenceFrequency) -> Self {
        self.is_recurring = true;
        self.recurrence = Some(frequency);
        self
    }

    #[must_use]
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// `+amount` for income, `-amount` for expense.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}
