use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::budget::Budget;
use crate::models::category::{unknown_category_label, CategoryIndex, NEUTRAL_COLOR};
use crate::models::report::{BudgetLevel, BudgetStatus};
use crate::models::settings::{BudgetMergePolicy, Locale};
use crate::models::transaction::Transaction;

/// Percentage above which a budget line is flagged as a warning.
const WARNING_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Compares budgets against actual spending in the current calendar month.
pub struct BudgetService;

impl BudgetService {
    pub fn new() -> Self {
        Self
    }

    /// Compute budgeted vs. spent for every budget.
    ///
    /// Spending counts expense transactions dated in `today`'s month and year
    /// whose category matches the budget's. Uncategorized spending never
    /// counts against any budget. Output follows budget order.
    pub fn budget_overview(
        &self,
        budgets: &[Budget],
        transactions: &[Transaction],
        categories: &CategoryIndex<'_>,
        today: NaiveDate,
        policy: BudgetMergePolicy,
        locale: Locale,
    ) -> Vec<BudgetStatus> {
        let spent_by_category = Self::spent_this_month(transactions, today);

        let lines: Vec<(&Budget, Decimal)> = match policy {
            BudgetMergePolicy::PerBudget => budgets.iter().map(|b| (b, b.amount)).collect(),
            BudgetMergePolicy::MergeByCategory => {
                let mut merged: Vec<(&Budget, Decimal)> = Vec::new();
                let mut slots: HashMap<Uuid, usize> = HashMap::new();
                for budget in budgets {
                    match slots.get(&budget.category_id) {
                        Some(&idx) => merged[idx].1 += budget.amount,
                        None => {
                            slots.insert(budget.category_id, merged.len());
                            merged.push((budget, budget.amount));
                        }
                    }
                }
                merged
            }
        };

        lines
            .into_iter()
            .map(|(budget, budgeted)| {
                let spent = spent_by_category
                    .get(&budget.category_id)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                let (category_name, color) = match categories.resolve(Some(budget.category_id)) {
                    Some(c) => (c.name.clone(), c.color.clone()),
                    None => (
                        unknown_category_label(locale).to_string(),
                        NEUTRAL_COLOR.to_string(),
                    ),
                };
                let percentage = Self::percentage(spent, budgeted);

                BudgetStatus {
                    budget_id: budget.id,
                    category_id: budget.category_id,
                    category_name,
                    color,
                    period: budget.period,
                    budgeted,
                    spent,
                    percentage,
                    bar_width: percentage.min(Decimal::ONE_HUNDRED),
                    remaining: budgeted - spent,
                    level: Self::level(percentage),
                }
            })
            .collect()
    }

    /// `spent / budgeted * 100`; exactly zero when nothing is budgeted.
    pub fn percentage(spent: Decimal, budgeted: Decimal) -> Decimal {
        super::percent_of(spent, budgeted)
    }

    pub fn level(percentage: Decimal) -> BudgetLevel {
        if percentage > Decimal::ONE_HUNDRED {
            BudgetLevel::Exceeded
        } else if percentage > WARNING_THRESHOLD {
            BudgetLevel::Warning
        } else {
            BudgetLevel::OnTrack
        }
    }

    /// Validate a budget before it is stored.
    pub fn validate_budget(&self, budget: &Budget) -> Result<(), CoreError> {
        if budget.amount <= Decimal::ZERO {
            return Err(CoreError::ValidationError(
                "Budget amount must be positive".into(),
            ));
        }
        Ok(())
    }

    fn spent_this_month(transactions: &[Transaction], today: NaiveDate) -> HashMap<Uuid, Decimal> {
        let mut spent: HashMap<Uuid, Decimal> = HashMap::new();
        for tx in transactions {
            if !tx.is_expense() || tx.date.year() != today.year() || tx.date.month() != today.month() {
                continue;
            }
            if let Some(category_id) = tx.category_id {
                *spent.entry(category_id).or_insert(Decimal::ZERO) += tx.amount;
            }
        }
        spent
    }
}

impl Default for BudgetService {
    fn default() -> Self {
        Self::new()
    }
}
