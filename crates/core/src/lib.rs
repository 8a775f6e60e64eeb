pub mod backend;
pub mod errors;
pub mod models;
pub mod services;

use chrono::NaiveDate;
use models::{
    book::FinanceBook,
    budget::Budget,
    category::{Category, CategoryIndex},
    goal::{Goal, GoalContribution},
    report::{
        BudgetStatus, CategoryExpense, DashboardSnapshot, FinancialSummary, GoalProgress,
        MonthlySummary, ReportBundle, YearlySummary,
    },
    settings::{BudgetMergePolicy, CategoryGrouping, Locale, Settings},
    transaction::{Transaction, TransactionKind},
};
use rust_decimal::Decimal;
use services::{
    budget_service::BudgetService, category_service::CategoryService,
    dashboard_service::{DashboardService, FetchedRecords}, goal_service::GoalService,
    report_service::ReportService, transaction_service::TransactionService,
};
use std::sync::Once;
use uuid::Uuid;

use errors::CoreError;

static INIT_TRACING: Once = Once::new();

/// Install a `tracing` subscriber (fmt + env filter).
///
/// Honors `RUST_LOG`; defaults to `finance_tracker_core=info`. Safe to call
/// more than once.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("finance_tracker_core=info"));
        // Another subscriber may already be installed by the host application.
        let _ = fmt().with_env_filter(filter).try_init();
        tracing::info!("Finance tracker tracing initialized.");
    });
}

/// Main entry point for the Finance Tracker core library.
/// Holds one owner's records and all services needed to operate on them.
#[must_use]
pub struct FinanceTracker {
    book: FinanceBook,
    transaction_service: TransactionService,
    category_service: CategoryService,
    report_service: ReportService,
    budget_service: BudgetService,
    goal_service: GoalService,
    dashboard_service: DashboardService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for FinanceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceTracker")
            .field("owner", &self.book.owner)
            .field("transactions", &self.book.transactions.len())
            .field("budgets", &self.book.budgets.len())
            .field("goals", &self.book.goals.len())
            .field("settings", &self.book.settings)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl FinanceTracker {
    /// Create an empty book for `owner` with default settings.
    pub fn create_new(owner: Uuid) -> Self {
        Self::build(FinanceBook::new(owner))
    }

    /// Create a book pre-seeded with the default categories for `locale`.
    pub fn create_with_defaults(owner: Uuid, locale: Locale) -> Self {
        let mut book = FinanceBook::new(owner);
        book.settings.locale = locale;
        book.categories = CategoryService::new().default_categories(owner, locale);
        Self::build(book)
    }

    /// Wrap an existing book (e.g., fetched from a backend). Transactions may
    /// arrive in any order.
    pub fn from_book(book: FinanceBook) -> Self {
        Self::build(book)
    }

    #[must_use]
    pub fn book(&self) -> &FinanceBook {
        &self.book
    }

    #[must_use]
    pub fn owner(&self) -> Uuid {
        self.book.owner
    }

    // ── Snapshots ───────────────────────────────────────────────────

    /// Serialize the whole book (records + settings) as pretty JSON.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.book)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize book: {e}")))
    }

    /// Restore a book from a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let book: FinanceBook = serde_json::from_str(json)?;
        Ok(Self::build(book))
    }

    /// Write a JSON snapshot to disk. Clears the unsaved-changes flag on success.
    pub fn save_snapshot(&mut self, path: &str) -> Result<(), CoreError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        self.dirty = false;
        Ok(())
    }

    /// Load a JSON snapshot from disk.
    pub fn load_snapshot(path: &str) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Returns `true` if the book has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Categories ──────────────────────────────────────────────────

    pub fn add_category(
        &mut self,
        name: impl Into<String>,
        kind: TransactionKind,
        color: impl Into<String>,
    ) -> Result<Uuid, CoreError> {
        let category = Category::new(self.book.owner, name, kind, color);
        let id = category.id;
        self.category_service.add(&mut self.book, category)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn update_category(&mut self, category: Category) -> Result<(), CoreError> {
        self.category_service.update(&mut self.book, category)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove a category and its budgets. Default categories are protected.
    pub fn remove_category(&mut self, id: Uuid) -> Result<Category, CoreError> {
        let removed = self.category_service.remove(&mut self.book, id)?;
        self.dirty = true;
        Ok(removed)
    }

    /// Categories sorted by name.
    #[must_use]
    pub fn get_categories(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.book.categories.iter().collect();
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        categories
    }

    #[must_use]
    pub fn get_categories_by_kind(&self, kind: TransactionKind) -> Vec<&Category> {
        self.get_categories()
            .into_iter()
            .filter(|c| c.kind == kind)
            .collect()
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Add a transaction; it is re-owned by this book's owner.
    pub fn add_transaction(&mut self, mut transaction: Transaction) -> Result<Uuid, CoreError> {
        transaction.owner = self.book.owner;
        let id = transaction.id;
        self.transaction_service.add(&mut self.book, transaction)?;
        self.dirty = true;
        Ok(id)
    }

    /// Add many transactions. If any fails validation, none are added.
    pub fn add_transactions(&mut self, transactions: Vec<Transaction>) -> Result<Vec<Uuid>, CoreError> {
        let mut temp_book = self.book.clone();
        let mut ids = Vec::with_capacity(transactions.len());

        for mut transaction in transactions {
            transaction.owner = self.book.owner;
            ids.push(transaction.id);
            self.transaction_service.add(&mut temp_book, transaction)?;
        }

        self.book = temp_book;
        self.dirty = true;
        Ok(ids)
    }

    pub fn update_transaction(&mut self, mut transaction: Transaction) -> Result<(), CoreError> {
        transaction.owner = self.book.owner;
        self.transaction_service.update(&mut self.book, transaction)?;
        self.dirty = true;
        Ok(())
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Result<Transaction, CoreError> {
        let removed = self.transaction_service.remove(&mut self.book, id)?;
        self.dirty = true;
        Ok(removed)
    }

    #[must_use]
    pub fn get_transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.book.transactions.iter().find(|t| t.id == id)
    }

    /// All transactions, newest first.
    #[must_use]
    pub fn get_transactions(&self) -> Vec<&Transaction> {
        self.transaction_service.get_sorted(&self.book)
    }

    /// Transactions within a date range (inclusive), newest first.
    #[must_use]
    pub fn get_transactions_in_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<&Transaction> {
        let mut transactions: Vec<&Transaction> = self
            .book
            .transactions
            .iter()
            .filter(|t| t.date >= from && t.date <= to)
            .collect();
        transactions.reverse();
        transactions
    }

    #[must_use]
    pub fn search_transactions(&self, query: &str) -> Vec<&Transaction> {
        self.transaction_service.search(&self.book, query)
    }

    pub fn export_transactions_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.book.transactions).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize transactions to JSON: {e}"))
        })
    }

    /// Import transactions from JSON (all-or-nothing). Returns how many were added.
    pub fn import_transactions_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let transactions: Vec<Transaction> = serde_json::from_str(json)?;
        let count = transactions.len();
        self.add_transactions(transactions)?;
        Ok(count)
    }

    // ── Budgets ─────────────────────────────────────────────────────

    pub fn add_budget(&mut self, mut budget: Budget) -> Result<Uuid, CoreError> {
        budget.owner = self.book.owner;
        self.validate_budget(&budget)?;
        let id = budget.id;
        self.book.budgets.push(budget);
        self.dirty = true;
        Ok(id)
    }

    pub fn update_budget(&mut self, mut budget: Budget) -> Result<(), CoreError> {
        budget.owner = self.book.owner;
        let idx = self
            .book
            .budgets
            .iter()
            .position(|b| b.id == budget.id)
            .ok_or_else(|| CoreError::BudgetNotFound(budget.id.to_string()))?;
        self.validate_budget(&budget)?;
        self.book.budgets[idx] = budget;
        self.dirty = true;
        Ok(())
    }

    pub fn remove_budget(&mut self, id: Uuid) -> Result<Budget, CoreError> {
        let idx = self
            .book
            .budgets
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| CoreError::BudgetNotFound(id.to_string()))?;
        self.dirty = true;
        Ok(self.book.budgets.remove(idx))
    }

    #[must_use]
    pub fn get_budgets(&self) -> &[Budget] {
        &self.book.budgets
    }

    // ── Goals ───────────────────────────────────────────────────────

    /// Add a goal. An opening balance is recorded in the contribution ledger
    /// so the ledger always accounts for `current_amount`.
    pub fn add_goal(&mut self, mut goal: Goal) -> Result<Uuid, CoreError> {
        goal.owner = self.book.owner;
        self.goal_service.validate_goal(&goal)?;
        goal.refresh_completion();

        let id = goal.id;
        if let Some(opening) = self
            .goal_service
            .opening_contribution(&goal, self.book.settings.locale)
        {
            self.book.contributions.push(opening);
        }
        self.book.goals.push(goal);
        self.dirty = true;
        Ok(id)
    }

    /// Update a goal's descriptive fields, target and dates.
    ///
    /// `current_amount` is left untouched: it only changes through
    /// contributions. Completion is recomputed against the new target.
    pub fn update_goal(&mut self, mut goal: Goal) -> Result<(), CoreError> {
        let idx = self
            .book
            .goals
            .iter()
            .position(|g| g.id == goal.id)
            .ok_or_else(|| CoreError::GoalNotFound(goal.id.to_string()))?;

        goal.owner = self.book.owner;
        goal.current_amount = self.book.goals[idx].current_amount;
        self.goal_service.validate_goal(&goal)?;
        goal.refresh_completion();

        self.book.goals[idx] = goal;
        self.dirty = true;
        Ok(())
    }

    /// Remove a goal together with its ledger.
    pub fn remove_goal(&mut self, id: Uuid) -> Result<Goal, CoreError> {
        let idx = self
            .book
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| CoreError::GoalNotFound(id.to_string()))?;
        let removed = self.book.goals.remove(idx);
        self.book.contributions.retain(|c| c.goal_id != id);
        self.dirty = true;
        Ok(removed)
    }

    #[must_use]
    pub fn get_goal(&self, id: Uuid) -> Option<&Goal> {
        self.book.goal(id)
    }

    #[must_use]
    pub fn get_goals(&self) -> &[Goal] {
        &self.book.goals
    }

    /// Apply a signed contribution (`delta > 0` deposit, `delta < 0` withdrawal).
    ///
    /// The ledger row is appended and the goal's total/completion updated in
    /// one step; a rejected contribution changes nothing.
    pub fn contribute_to_goal(
        &mut self,
        goal_id: Uuid,
        delta: Decimal,
        description: Option<String>,
    ) -> Result<GoalContribution, CoreError> {
        let contribution =
            self.goal_service
                .apply_contribution(&mut self.book, goal_id, delta, description)?;
        self.dirty = true;
        Ok(contribution)
    }

    /// Ledger rows of one goal, oldest first.
    #[must_use]
    pub fn goal_contributions(&self, goal_id: Uuid) -> Vec<&GoalContribution> {
        self.book.contributions_for(goal_id)
    }

    /// Balance recomputed from the goal's ledger alone.
    pub fn ledger_balance(&self, goal_id: Uuid) -> Result<Decimal, CoreError> {
        if self.book.goal(goal_id).is_none() {
            return Err(CoreError::GoalNotFound(goal_id.to_string()));
        }
        Ok(self
            .goal_service
            .replay_ledger(self.book.contributions_for(goal_id)))
    }

    // ── Reports ─────────────────────────────────────────────────────

    #[must_use]
    pub fn summary(&self) -> FinancialSummary {
        self.report_service.summary(&self.book.transactions)
    }

    /// Income/expense for the most recent months (see `Settings::monthly_window`).
    #[must_use]
    pub fn monthly_series(&self) -> Vec<MonthlySummary> {
        let settings = &self.book.settings;
        self.report_service.monthly_series(
            &self.book.transactions,
            settings.locale,
            settings.monthly_window,
        )
    }

    #[must_use]
    pub fn category_expenses(&self) -> Vec<CategoryExpense> {
        let settings = &self.book.settings;
        self.report_service.category_expenses(
            &self.book.transactions,
            &CategoryIndex::new(&self.book.categories),
            settings.locale,
            settings.category_grouping,
        )
    }

    #[must_use]
    pub fn yearly_comparison(&self) -> Vec<YearlySummary> {
        self.report_service.yearly_comparison(&self.book.transactions)
    }

    /// Budgeted vs. spent for the calendar month containing `today`.
    #[must_use]
    pub fn budget_overview(&self, today: NaiveDate) -> Vec<BudgetStatus> {
        let settings = &self.book.settings;
        self.budget_service.budget_overview(
            &self.book.budgets,
            &self.book.transactions,
            &CategoryIndex::new(&self.book.categories),
            today,
            settings.budget_merge,
            settings.locale,
        )
    }

    #[must_use]
    pub fn goal_progress(&self, today: NaiveDate) -> Vec<GoalProgress> {
        self.book
            .goals
            .iter()
            .map(|g| self.goal_service.progress(g, today))
            .collect()
    }

    #[must_use]
    pub fn dashboard(&self, today: NaiveDate) -> DashboardSnapshot {
        self.dashboard_service
            .dashboard(&self.records(), today, &self.book.settings)
    }

    #[must_use]
    pub fn reports(&self, today: NaiveDate) -> ReportBundle {
        self.dashboard_service
            .reports(&self.records(), today, &self.book.settings)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.book.settings
    }

    /// Set the display currency. Must be exactly 3 ASCII letters.
    pub fn set_currency(&mut self, currency: &str) -> Result<(), CoreError> {
        let trimmed = currency.trim().to_uppercase();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{currency}': must be exactly 3 ASCII letters (e.g., BRL, USD)"
            )));
        }
        self.book.settings.currency = trimmed;
        self.dirty = true;
        Ok(())
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.book.settings.locale = locale;
        self.dirty = true;
    }

    pub fn set_budget_merge_policy(&mut self, policy: BudgetMergePolicy) {
        self.book.settings.budget_merge = policy;
        self.dirty = true;
    }

    pub fn set_category_grouping(&mut self, grouping: CategoryGrouping) {
        self.book.settings.category_grouping = grouping;
        self.dirty = true;
    }

    pub fn set_monthly_window(&mut self, months: usize) -> Result<(), CoreError> {
        if months == 0 {
            return Err(CoreError::ValidationError(
                "Monthly window must cover at least one month".into(),
            ));
        }
        self.book.settings.monthly_window = months;
        self.dirty = true;
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    fn validate_budget(&self, budget: &Budget) -> Result<(), CoreError> {
        self.budget_service.validate_budget(budget)?;
        if self.book.category(budget.category_id).is_none() {
            return Err(CoreError::CategoryNotFound(budget.category_id.to_string()));
        }
        Ok(())
    }

    fn records(&self) -> FetchedRecords {
        FetchedRecords {
            transactions: self.book.transactions.clone(),
            categories: self.book.categories.clone(),
            budgets: self.book.budgets.clone(),
            goals: self.book.goals.clone(),
        }
    }

    fn build(mut book: FinanceBook) -> Self {
        // Range queries and inserts rely on oldest-first order; the sort is stable.
        book.transactions.sort_by_key(|t| t.date);
        book.settings.normalize();
        Self {
            book,
            transaction_service: TransactionService::new(),
            category_service: CategoryService::new(),
            report_service: ReportService::new(),
            budget_service: BudgetService::new(),
            goal_service: GoalService::new(),
            dashboard_service: DashboardService::new(),
            dirty: false,
        }
    }
}
