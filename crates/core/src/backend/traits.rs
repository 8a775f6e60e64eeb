use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::budget::Budget;
use crate::models::category::Category;
use crate::models::goal::{Goal, GoalContribution};
use crate::models::transaction::Transaction;

/// Supplies the opaque id of the signed-in user.
/// The core never authenticates; it only consumes this id.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_owner(&self) -> Result<Uuid, CoreError>;
}

/// Reads an owner's transactions. Callers must not assume any order.
#[async_trait]
pub trait TransactionReader: Send + Sync {
    async fn list_transactions(&self, owner: Uuid) -> Result<Vec<Transaction>, CoreError>;
}

/// Reads an owner's categories (used to resolve names/colors).
#[async_trait]
pub trait CategoryReader: Send + Sync {
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, CoreError>;
}

/// Reads an owner's budgets.
#[async_trait]
pub trait BudgetReader: Send + Sync {
    async fn list_budgets(&self, owner: Uuid) -> Result<Vec<Budget>, CoreError>;
}

/// Reads goals and writes contributions.
#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn list_goals(&self, owner: Uuid) -> Result<Vec<Goal>, CoreError>;

    /// Fetch one goal; `CoreError::GoalNotFound` if it does not exist.
    async fn get_goal(&self, goal_id: Uuid) -> Result<Goal, CoreError>;

    /// Ledger rows of one goal, oldest first.
    async fn list_contributions(&self, goal_id: Uuid) -> Result<Vec<GoalContribution>, CoreError>;

    /// Append the ledger row and add its signed amount to the goal's stored
    /// `current_amount` (floored at zero, `is_completed` recomputed) as one
    /// atomic unit: either both writes land or neither does. The total is
    /// computed from the stored row, never from a value read earlier, so
    /// concurrent contributions all count. Returns the updated goal.
    async fn commit_contribution(&self, contribution: &GoalContribution) -> Result<Goal, CoreError>;
}

/// Everything the dashboard and reports need from a backend.
pub trait FinanceBackend:
    IdentityProvider + TransactionReader + CategoryReader + BudgetReader + GoalStore
{
}

impl<T> FinanceBackend for T where
    T: IdentityProvider + TransactionReader + CategoryReader + BudgetReader + GoalStore
{
}
