use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::budget::Budget;
use super::category::Category;
use super::goal::{Goal, GoalContribution};
use super::settings::Settings;
use super::transaction::Transaction;

/// The main data container for one owner: every record the aggregations
/// run over, plus settings. Serialized as-is for JSON snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceBook {
    /// Opaque owner id supplied by the identity provider
    pub owner: Uuid,

    pub categories: Vec<Category>,

    /// Kept sorted by date, oldest first
    pub transactions: Vec<Transaction>,

    pub budgets: Vec<Budget>,

    pub goals: Vec<Goal>,

    /// Append-only contribution ledger for all goals
    #[serde(default)]
    pub contributions: Vec<GoalContribution>,

    #[serde(default)]
    pub settings: Settings,
}

impl FinanceBook {
    pub fn new(owner: Uuid) -> Self {
        Self {
            owner,
            categories: Vec::new(),
            transactions: Vec::new(),
            budgets: Vec::new(),
            goals: Vec::new(),
            contributions: Vec::new(),
            settings: Settings::default(),
        }
    }

    #[must_use]
    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn goal(&self, id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    /// Ledger rows for one goal, oldest first.
    #[must_use]
    pub fn contributions_for(&self, goal_id: Uuid) -> Vec<&GoalContribution> {
        self.contributions
            .iter()
            .filter(|c| c.goal_id == goal_id)
            .collect()
    }
}
