use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::backend::traits::FinanceBackend;
use crate::errors::CoreError;
use crate::models::budget::Budget;
use crate::models::category::{Category, CategoryIndex};
use crate::models::goal::{Goal, GoalContribution};
use crate::models::report::{DashboardSnapshot, ReportBundle};
use crate::models::settings::Settings;
use crate::models::transaction::Transaction;
use crate::services::budget_service::BudgetService;
use crate::services::goal_service::GoalService;
use crate::services::report_service::ReportService;

/// Records fetched for one owner, ready to aggregate.
#[derive(Debug, Clone, Default)]
pub struct FetchedRecords {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
}

/// Builds dashboard and report views from a backend or from records
/// already in memory.
///
/// Reads are independent and issued concurrently. A failed read is logged
/// and treated as "no data" so the views still render their empty state.
/// Writes (contributions) never degrade: their errors reach the caller.
pub struct DashboardService {
    report_service: ReportService,
    budget_service: BudgetService,
    goal_service: GoalService,
}

impl DashboardService {
    pub fn new() -> Self {
        Self {
            report_service: ReportService::new(),
            budget_service: BudgetService::new(),
            goal_service: GoalService::new(),
        }
    }

    /// Fetch everything the views need for the signed-in owner.
    ///
    /// Only the identity lookup is fatal; without an owner nothing can be read.
    pub async fn fetch<B>(&self, backend: &B) -> Result<FetchedRecords, CoreError>
    where
        B: FinanceBackend + ?Sized,
    {
        let owner = backend.current_owner().await?;

        let (transactions, categories, budgets, goals) = tokio::join!(
            backend.list_transactions(owner),
            backend.list_categories(owner),
            backend.list_budgets(owner),
            backend.list_goals(owner),
        );

        Ok(FetchedRecords {
            transactions: Self::or_empty("transactions", transactions),
            categories: Self::or_empty("categories", categories),
            budgets: Self::or_empty("budgets", budgets),
            goals: Self::or_empty("goals", goals),
        })
    }

    pub async fn load_dashboard<B>(
        &self,
        backend: &B,
        today: NaiveDate,
        settings: &Settings,
    ) -> Result<DashboardSnapshot, CoreError>
    where
        B: FinanceBackend + ?Sized,
    {
        let records = self.fetch(backend).await?;
        Ok(self.dashboard(&records, today, settings))
    }

    pub async fn load_reports<B>(
        &self,
        backend: &B,
        today: NaiveDate,
        settings: &Settings,
    ) -> Result<ReportBundle, CoreError>
    where
        B: FinanceBackend + ?Sized,
    {
        let records = self.fetch(backend).await?;
        Ok(self.reports(&records, today, settings))
    }

    /// Apply a signed contribution to a goal through the backend.
    ///
    /// The row is validated locally and committed in a single
    /// `commit_contribution` call, so a failure leaves both the ledger and
    /// the goal total unchanged. The backend adds the signed amount to the
    /// total it stores, so contributions racing on the same goal all count.
    pub async fn contribute<B>(
        &self,
        backend: &B,
        goal_id: Uuid,
        delta: Decimal,
        description: Option<String>,
        settings: &Settings,
    ) -> Result<GoalContribution, CoreError>
    where
        B: FinanceBackend + ?Sized,
    {
        let owner = backend.current_owner().await?;
        let goal = backend.get_goal(goal_id).await?;
        if goal.owner != owner {
            return Err(CoreError::GoalNotFound(goal_id.to_string()));
        }

        let plan = self
            .goal_service
            .plan_contribution(&goal, delta, description, settings.locale)?;
        let updated = backend.commit_contribution(&plan.contribution).await?;

        tracing::info!(
            goal = %goal_id,
            delta = %delta,
            new_balance = %updated.current_amount,
            completed = updated.is_completed,
            "committed goal contribution"
        );
        Ok(plan.contribution)
    }

    /// Home screen view over already-fetched records.
    pub fn dashboard(
        &self,
        records: &FetchedRecords,
        today: NaiveDate,
        settings: &Settings,
    ) -> DashboardSnapshot {
        let index = CategoryIndex::new(&records.categories);

        let active_goals = records
            .goals
            .iter()
            .filter(|g| g.current_amount < g.target_amount)
            .take(settings.active_goals_limit)
            .map(|g| self.goal_service.progress(g, today))
            .collect();

        DashboardSnapshot {
            as_of_date: today,
            currency: settings.currency.clone(),
            summary: self.report_service.summary(&records.transactions),
            recent_transactions: self
                .report_service
                .recent(&records.transactions, settings.recent_limit),
            active_goals,
            budgets: self.budget_service.budget_overview(
                &records.budgets,
                &records.transactions,
                &index,
                today,
                settings.budget_merge,
                settings.locale,
            ),
        }
    }

    /// Reports screen view over already-fetched records.
    pub fn reports(
        &self,
        records: &FetchedRecords,
        today: NaiveDate,
        settings: &Settings,
    ) -> ReportBundle {
        let index = CategoryIndex::new(&records.categories);

        ReportBundle {
            as_of_date: today,
            currency: settings.currency.clone(),
            summary: self.report_service.summary(&records.transactions),
            monthly: self.report_service.monthly_series(
                &records.transactions,
                settings.locale,
                settings.monthly_window,
            ),
            categories: self.report_service.category_expenses(
                &records.transactions,
                &index,
                settings.locale,
                settings.category_grouping,
            ),
            yearly: self.report_service.yearly_comparison(&records.transactions),
            goals: records
                .goals
                .iter()
                .map(|g| self.goal_service.progress(g, today))
                .collect(),
        }
    }

    fn or_empty<T>(what: &str, result: Result<Vec<T>, CoreError>) -> Vec<T> {
        match result {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load {what}; showing no data");
                Vec::new()
            }
        }
    }
}

impl Default for DashboardService {
    fn default() -> Self {
        Self::new()
    }
}
