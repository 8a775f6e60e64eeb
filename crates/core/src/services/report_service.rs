use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::models::category::{uncategorized_label, CategoryIndex, NEUTRAL_COLOR};
use crate::models::report::{CategoryExpense, FinancialSummary, MonthlySummary, YearlySummary};
use crate::models::settings::{CategoryGrouping, Locale};
use crate::models::transaction::{Transaction, TransactionKind};

/// Turns raw transaction lists into chart-ready series.
///
/// Pure business logic: no I/O, input order is never assumed, and an empty
/// input always yields an empty output rather than an error.
pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self
    }

    /// Income/expense per calendar month, oldest first, truncated to the
    /// most recent `window` months that have data.
    ///
    /// Buckets are keyed by `(year, month)`, so "Jan/24" and "Jan/25" never merge
    /// even though the ordering key is the date, not the label.
    pub fn monthly_series(
        &self,
        transactions: &[Transaction],
        locale: Locale,
        window: usize,
    ) -> Vec<MonthlySummary> {
        let mut buckets: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();

        for tx in transactions {
            let entry = buckets
                .entry((tx.date.year(), tx.date.month()))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            match tx.kind {
                TransactionKind::Income => entry.0 += tx.amount,
                TransactionKind::Expense => entry.1 += tx.amount,
            }
        }

        let skip = buckets.len().saturating_sub(window);
        tracing::debug!(
            transactions = transactions.len(),
            months = buckets.len(),
            kept = buckets.len() - skip,
            "aggregated monthly series"
        );

        buckets
            .into_iter()
            .skip(skip)
            .map(|((year, month), (income, expense))| MonthlySummary {
                period: Self::month_label(locale, year, month),
                year,
                month,
                income,
                expense,
            })
            .collect()
    }

    /// Expense totals per category, in order of first occurrence.
    ///
    /// Transactions with no category, or whose category was deleted, fall
    /// into a single "uncategorized" bucket with the neutral color.
    pub fn category_expenses(
        &self,
        transactions: &[Transaction],
        categories: &CategoryIndex<'_>,
        locale: Locale,
        grouping: CategoryGrouping,
    ) -> Vec<CategoryExpense> {
        let mut out: Vec<CategoryExpense> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut by_id: HashMap<Option<Uuid>, usize> = HashMap::new();

        for tx in transactions.iter().filter(|t| t.is_expense()) {
            let category = categories.resolve(tx.category_id);
            let (id, name, color) = match category {
                Some(c) => (Some(c.id), c.name.as_str(), c.color.as_str()),
                None => (None, uncategorized_label(locale), NEUTRAL_COLOR),
            };

            let slot = match grouping {
                CategoryGrouping::ByName => by_name.get(name).copied(),
                CategoryGrouping::ById => by_id.get(&id).copied(),
            };

            match slot {
                Some(idx) => out[idx].total += tx.amount,
                None => {
                    let idx = out.len();
                    match grouping {
                        CategoryGrouping::ByName => {
                            by_name.insert(name.to_string(), idx);
                        }
                        CategoryGrouping::ById => {
                            by_id.insert(id, idx);
                        }
                    }
                    out.push(CategoryExpense {
                        category_id: id,
                        name: name.to_string(),
                        total: tx.amount,
                        color: color.to_string(),
                    });
                }
            }
        }

        out
    }

    /// Income/expense/balance per year, sorted by the 4-digit year string.
    pub fn yearly_comparison(&self, transactions: &[Transaction]) -> Vec<YearlySummary> {
        let mut years: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();

        for tx in transactions {
            let entry = years
                .entry(format!("{:04}", tx.date.year()))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            match tx.kind {
                TransactionKind::Income => entry.0 += tx.amount,
                TransactionKind::Expense => entry.1 += tx.amount,
            }
        }

        years
            .into_iter()
            .map(|(year, (income, expense))| YearlySummary {
                year,
                income,
                expense,
                balance: income - expense,
            })
            .collect()
    }

    /// Total income, total expense and balance.
    pub fn summary(&self, transactions: &[Transaction]) -> FinancialSummary {
        let (total_income, total_expense) = transactions.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(inc, exp), tx| match tx.kind {
                TransactionKind::Income => (inc + tx.amount, exp),
                TransactionKind::Expense => (inc, exp + tx.amount),
            },
        );
        FinancialSummary {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }

    /// The `limit` newest transactions, newest first.
    pub fn recent(&self, transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.into_iter().take(limit).cloned().collect()
    }

    /// "Mon/yy" label, e.g. "Fev/24".
    pub fn month_label(locale: Locale, year: i32, month: u32) -> String {
        format!("{}/{:02}", locale.month_abbrev(month), year.rem_euclid(100))
    }
}

impl Default for ReportService {
    fn default() -> Self {
        Self::new()
    }
}
