use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::book::FinanceBook;
use crate::models::budget::Budget;
use crate::models::category::Category;
use crate::models::goal::{Goal, GoalContribution};
use crate::models::transaction::Transaction;
use crate::services::goal_service::GoalService;

use super::traits::{BudgetReader, CategoryReader, GoalStore, IdentityProvider, TransactionReader};

/// Backend over an in-memory `FinanceBook`.
///
/// Used offline and in tests. Contributions are committed while holding
/// the book's lock, so the ledger row and the goal total change together.
pub struct MemoryBackend {
    book: Mutex<FinanceBook>,
    signed_in: bool,
}

impl MemoryBackend {
    /// Backend signed in as the book's owner.
    pub fn new(book: FinanceBook) -> Self {
        Self {
            book: Mutex::new(book),
            signed_in: true,
        }
    }

    /// Backend with no authenticated user.
    pub fn signed_out(book: FinanceBook) -> Self {
        Self {
            book: Mutex::new(book),
            signed_in: false,
        }
    }

    /// Clone of the current book state.
    pub fn snapshot(&self) -> Result<FinanceBook, CoreError> {
        Ok(self.lock("snapshot")?.clone())
    }

    fn lock(&self, operation: &str) -> Result<MutexGuard<'_, FinanceBook>, CoreError> {
        self.book.lock().map_err(|_| CoreError::Backend {
            operation: operation.to_string(),
            message: "in-memory book lock poisoned".into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn current_owner(&self) -> Result<Uuid, CoreError> {
        if !self.signed_in {
            return Err(CoreError::Unauthenticated);
        }
        Ok(self.lock("current_owner")?.owner)
    }
}

#[async_trait]
impl TransactionReader for MemoryBackend {
    async fn list_transactions(&self, owner: Uuid) -> Result<Vec<Transaction>, CoreError> {
        let book = self.lock("list_transactions")?;
        Ok(book
            .transactions
            .iter()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CategoryReader for MemoryBackend {
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, CoreError> {
        let book = self.lock("list_categories")?;
        Ok(book
            .categories
            .iter()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BudgetReader for MemoryBackend {
    async fn list_budgets(&self, owner: Uuid) -> Result<Vec<Budget>, CoreError> {
        let book = self.lock("list_budgets")?;
        Ok(book
            .budgets
            .iter()
            .filter(|b| b.owner == owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GoalStore for MemoryBackend {
    async fn list_goals(&self, owner: Uuid) -> Result<Vec<Goal>, CoreError> {
        let book = self.lock("list_goals")?;
        Ok(book
            .goals
            .iter()
            .filter(|g| g.owner == owner)
            .cloned()
            .collect())
    }

    async fn get_goal(&self, goal_id: Uuid) -> Result<Goal, CoreError> {
        let book = self.lock("get_goal")?;
        book.goal(goal_id)
            .cloned()
            .ok_or_else(|| CoreError::GoalNotFound(goal_id.to_string()))
    }

    async fn list_contributions(&self, goal_id: Uuid) -> Result<Vec<GoalContribution>, CoreError> {
        let book = self.lock("list_contributions")?;
        Ok(book.contributions_for(goal_id).into_iter().cloned().collect())
    }

    async fn commit_contribution(&self, contribution: &GoalContribution) -> Result<Goal, CoreError> {
        let mut book = self.lock("commit_contribution")?;
        GoalService::new().commit_contribution(&mut book, contribution.clone())
    }
}
