// ═══════════════════════════════════════════════════════════════════
// Backend Tests: MemoryBackend, RestBackend config, DashboardService
// over healthy and failing backends
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use finance_tracker_core::backend::memory::MemoryBackend;
use finance_tracker_core::backend::rest::{RestBackend, RestBackendConfig};
use finance_tracker_core::backend::traits::{
    BudgetReader, CategoryReader, GoalStore, IdentityProvider, TransactionReader,
};
use finance_tracker_core::errors::CoreError;
use finance_tracker_core::models::book::FinanceBook;
use finance_tracker_core::models::budget::Budget;
use finance_tracker_core::models::category::Category;
use finance_tracker_core::models::goal::{Goal, GoalContribution};
use finance_tracker_core::models::settings::Settings;
use finance_tracker_core::models::transaction::Transaction;
use finance_tracker_core::services::dashboard_service::DashboardService;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

/// A book with one category, a budget, two goals and a few transactions.
fn sample_book() -> FinanceBook {
    let owner = Uuid::new_v4();
    let mut book = FinanceBook::new(owner);

    let food = Category::expense(owner, "Food", "#FF6B6B");
    book.budgets
        .push(Budget::monthly(owner, food.id, dec(200), d(2024, 1, 1)));
    book.transactions = vec![
        Transaction::income(owner, dec(3000), d(2024, 2, 1)),
        Transaction::expense(owner, dec(120), d(2024, 3, 2)).with_category(food.id),
        Transaction::expense(owner, dec(80), d(2024, 3, 5)).with_category(food.id),
    ];
    book.categories.push(food);
    book.goals.push(
        Goal::new(owner, "Trip", dec(1000), d(2024, 1, 1), d(2024, 12, 31))
            .with_current_amount(dec(300)),
    );
    book.goals.push(
        Goal::new(owner, "Laptop", dec(500), d(2024, 1, 1), d(2024, 6, 30))
            .with_current_amount(dec(500)),
    );
    book
}

// ═══════════════════════════════════════════════════════════════════
// Mock Backend (reads fail, identity and goals work)
// ═══════════════════════════════════════════════════════════════════

struct FlakyBackend {
    owner: Uuid,
    goal: Goal,
    fail_commit: bool,
}

impl FlakyBackend {
    fn new() -> Self {
        let owner = Uuid::new_v4();
        Self {
            owner,
            goal: Goal::new(owner, "Car", dec(1000), d(2024, 1, 1), d(2025, 1, 1))
                .with_current_amount(dec(100)),
            fail_commit: false,
        }
    }

    fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::new()
        }
    }

    fn down(operation: &str) -> CoreError {
        CoreError::Backend {
            operation: operation.into(),
            message: "service unavailable".into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FlakyBackend {
    async fn current_owner(&self) -> Result<Uuid, CoreError> {
        Ok(self.owner)
    }
}

#[async_trait]
impl TransactionReader for FlakyBackend {
    async fn list_transactions(&self, _owner: Uuid) -> Result<Vec<Transaction>, CoreError> {
        Err(Self::down("list_transactions"))
    }
}

#[async_trait]
impl CategoryReader for FlakyBackend {
    async fn list_categories(&self, _owner: Uuid) -> Result<Vec<Category>, CoreError> {
        Err(Self::down("list_categories"))
    }
}

#[async_trait]
impl BudgetReader for FlakyBackend {
    async fn list_budgets(&self, _owner: Uuid) -> Result<Vec<Budget>, CoreError> {
        Err(Self::down("list_budgets"))
    }
}

#[async_trait]
impl GoalStore for FlakyBackend {
    async fn list_goals(&self, _owner: Uuid) -> Result<Vec<Goal>, CoreError> {
        Ok(vec![self.goal.clone()])
    }

    async fn get_goal(&self, goal_id: Uuid) -> Result<Goal, CoreError> {
        if goal_id == self.goal.id {
            Ok(self.goal.clone())
        } else {
            Err(CoreError::GoalNotFound(goal_id.to_string()))
        }
    }

    async fn list_contributions(&self, _goal_id: Uuid) -> Result<Vec<GoalContribution>, CoreError> {
        Ok(Vec::new())
    }

    async fn commit_contribution(&self, contribution: &GoalContribution) -> Result<Goal, CoreError> {
        if self.fail_commit {
            return Err(Self::down("commit_contribution"));
        }
        let mut goal = self.goal.clone();
        goal.apply_delta(contribution.amount);
        Ok(goal)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Interleaving Backend (yields after reading a goal)
// ═══════════════════════════════════════════════════════════════════

/// Wraps a `MemoryBackend` and yields to the scheduler right after
/// `get_goal`, so concurrent contributions all read the same balance
/// before any of them commits.
struct InterleavingBackend {
    inner: MemoryBackend,
}

#[async_trait]
impl IdentityProvider for InterleavingBackend {
    async fn current_owner(&self) -> Result<Uuid, CoreError> {
        self.inner.current_owner().await
    }
}

#[async_trait]
impl TransactionReader for InterleavingBackend {
    async fn list_transactions(&self, owner: Uuid) -> Result<Vec<Transaction>, CoreError> {
        self.inner.list_transactions(owner).await
    }
}

#[async_trait]
impl CategoryReader for InterleavingBackend {
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, CoreError> {
        self.inner.list_categories(owner).await
    }
}

#[async_trait]
impl BudgetReader for InterleavingBackend {
    async fn list_budgets(&self, owner: Uuid) -> Result<Vec<Budget>, CoreError> {
        self.inner.list_budgets(owner).await
    }
}

#[async_trait]
impl GoalStore for InterleavingBackend {
    async fn list_goals(&self, owner: Uuid) -> Result<Vec<Goal>, CoreError> {
        self.inner.list_goals(owner).await
    }

    async fn get_goal(&self, goal_id: Uuid) -> Result<Goal, CoreError> {
        let goal = self.inner.get_goal(goal_id).await;
        tokio::task::yield_now().await;
        goal
    }

    async fn list_contributions(&self, goal_id: Uuid) -> Result<Vec<GoalContribution>, CoreError> {
        self.inner.list_contributions(goal_id).await
    }

    async fn commit_contribution(&self, contribution: &GoalContribution) -> Result<Goal, CoreError> {
        self.inner.commit_contribution(contribution).await
    }
}

// ═══════════════════════════════════════════════════════════════════
// MemoryBackend
// ═══════════════════════════════════════════════════════════════════

mod memory_backend {
    use super::*;

    #[tokio::test]
    async fn identity_is_book_owner() {
        let book = sample_book();
        let owner = book.owner;
        let backend = MemoryBackend::new(book);
        assert_eq!(backend.current_owner().await.unwrap(), owner);
    }

    #[tokio::test]
    async fn signed_out_is_unauthenticated() {
        let backend = MemoryBackend::signed_out(sample_book());
        assert!(matches!(
            backend.current_owner().await,
            Err(CoreError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn readers_filter_by_owner() {
        let mut book = sample_book();
        let owner = book.owner;
        book.transactions
            .push(Transaction::income(Uuid::new_v4(), dec(1), d(2024, 1, 1)));
        let backend = MemoryBackend::new(book);

        assert_eq!(backend.list_transactions(owner).await.unwrap().len(), 3);
        assert_eq!(backend.list_categories(owner).await.unwrap().len(), 1);
        assert_eq!(backend.list_budgets(owner).await.unwrap().len(), 1);
        assert_eq!(backend.list_goals(owner).await.unwrap().len(), 2);
        assert!(backend
            .list_transactions(Uuid::new_v4())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn get_missing_goal() {
        let backend = MemoryBackend::new(sample_book());
        assert!(matches!(
            backend.get_goal(Uuid::new_v4()).await,
            Err(CoreError::GoalNotFound(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// DashboardService
// ═══════════════════════════════════════════════════════════════════

mod dashboard {
    use super::*;

    #[test]
    fn stale_completion_flag_does_not_make_goal_active() {
        use finance_tracker_core::services::dashboard_service::FetchedRecords;

        let mut funded = Goal::new(Uuid::nil(), "Funded", dec(500), d(2024, 1, 1), d(2024, 12, 31));
        funded.current_amount = dec(600);
        funded.is_completed = false;
        let mut open = Goal::new(Uuid::nil(), "Open", dec(500), d(2024, 1, 1), d(2024, 12, 31));
        open.current_amount = dec(100);
        open.is_completed = true;

        let records = FetchedRecords {
            goals: vec![funded, open],
            ..FetchedRecords::default()
        };
        let snapshot = DashboardService::new().dashboard(&records, d(2024, 3, 1), &Settings::default());

        assert_eq!(snapshot.active_goals.len(), 1);
        assert_eq!(snapshot.active_goals[0].name, "Open");
    }

    #[tokio::test]
    async fn dashboard_from_memory_backend() {
        let backend = MemoryBackend::new(sample_book());
        let snapshot = DashboardService::new()
            .load_dashboard(&backend, d(2024, 3, 20), &Settings::default())
            .await
            .unwrap();

        assert_eq!(snapshot.currency, "BRL");
        assert_eq!(snapshot.summary.total_income, dec(3000));
        assert_eq!(snapshot.summary.total_expense, dec(200));
        assert_eq!(snapshot.summary.balance, dec(2800));
        assert_eq!(snapshot.recent_transactions.len(), 3);
        assert_eq!(snapshot.recent_transactions[0].date, d(2024, 3, 5));
        // Completed "Laptop" goal is not active
        assert_eq!(snapshot.active_goals.len(), 1);
        assert_eq!(snapshot.active_goals[0].name, "Trip");
        assert_eq!(snapshot.budgets.len(), 1);
        assert_eq!(snapshot.budgets[0].spent, dec(200));
        assert_eq!(snapshot.budgets[0].percentage, dec(100));
    }

    #[tokio::test]
    async fn reports_from_memory_backend() {
        let backend = MemoryBackend::new(sample_book());
        let bundle = DashboardService::new()
            .load_reports(&backend, d(2024, 3, 20), &Settings::default())
            .await
            .unwrap();

        let labels: Vec<&str> = bundle.monthly.iter().map(|m| m.period.as_str()).collect();
        assert_eq!(labels, ["Fev/24", "Mar/24"]);
        assert_eq!(bundle.categories.len(), 1);
        assert_eq!(bundle.categories[0].total, dec(200));
        assert_eq!(bundle.yearly.len(), 1);
        assert_eq!(bundle.yearly[0].year, "2024");
        assert_eq!(bundle.goals.len(), 2);
    }

    #[tokio::test]
    async fn failed_reads_render_empty_views() {
        let backend = FlakyBackend::new();
        let snapshot = DashboardService::new()
            .load_dashboard(&backend, d(2024, 3, 20), &Settings::default())
            .await
            .unwrap();

        assert!(snapshot.recent_transactions.is_empty());
        assert!(snapshot.budgets.is_empty());
        assert_eq!(snapshot.summary.balance, Decimal::ZERO);
        // Goals still load
        assert_eq!(snapshot.active_goals.len(), 1);

        let bundle = DashboardService::new()
            .load_reports(&backend, d(2024, 3, 20), &Settings::default())
            .await
            .unwrap();
        assert!(bundle.monthly.is_empty());
        assert!(bundle.categories.is_empty());
        assert!(bundle.yearly.is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_is_fatal() {
        let backend = MemoryBackend::signed_out(sample_book());
        let result = DashboardService::new()
            .load_dashboard(&backend, d(2024, 3, 20), &Settings::default())
            .await;
        assert!(matches!(result, Err(CoreError::Unauthenticated)));
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        use finance_tracker_core::backend::traits::FinanceBackend;

        let backend: Box<dyn FinanceBackend> = Box::new(MemoryBackend::new(sample_book()));
        let records = DashboardService::new().fetch(backend.as_ref()).await.unwrap();
        assert_eq!(records.transactions.len(), 3);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Contributions through a backend
// ═══════════════════════════════════════════════════════════════════

mod contribute {
    use super::*;

    #[tokio::test]
    async fn concurrent_contributions_all_count() {
        let mut book = FinanceBook::new(Uuid::new_v4());
        let goal = Goal::new(book.owner, "Bike", dec(1000), d(2024, 1, 1), d(2025, 1, 1));
        let goal_id = goal.id;
        book.goals.push(goal);
        let backend = InterleavingBackend {
            inner: MemoryBackend::new(book),
        };
        let service = DashboardService::new();
        let settings = Settings::default();

        let (a, b) = tokio::join!(
            service.contribute(&backend, goal_id, dec(100), None, &settings),
            service.contribute(&backend, goal_id, dec(100), None, &settings),
        );
        a.unwrap();
        b.unwrap();

        let book = backend.inner.snapshot().unwrap();
        let cached = book.goal(goal_id).unwrap().current_amount;
        let ledger = finance_tracker_core::services::goal_service::GoalService::new()
            .replay_ledger(book.contributions_for(goal_id));
        assert_eq!(book.contributions_for(goal_id).len(), 2);
        assert_eq!(cached, dec(200));
        assert_eq!(cached, ledger);
    }

    #[tokio::test]
    async fn commit_applies_delta_to_stored_total() {
        let book = sample_book();
        let goal_id = book.goals[0].id;
        let backend = MemoryBackend::new(book);

        // Row planned against an old read; the stored total is 300.
        let row = GoalContribution::new(goal_id, dec(-50), None);
        let updated = backend.commit_contribution(&row).await.unwrap();
        assert_eq!(updated.current_amount, dec(250));
        assert_eq!(
            backend.snapshot().unwrap().goal(goal_id).unwrap().current_amount,
            dec(250)
        );
    }

    #[tokio::test]
    async fn commits_ledger_row_and_total_together() {
        let book = sample_book();
        let goal_id = book.goals[0].id;
        let backend = MemoryBackend::new(book);

        let row = DashboardService::new()
            .contribute(&backend, goal_id, dec(800), None, &Settings::default())
            .await
            .unwrap();
        assert_eq!(row.amount, dec(800));

        let book = backend.snapshot().unwrap();
        let goal = book.goal(goal_id).unwrap();
        assert_eq!(goal.current_amount, dec(1100));
        assert!(goal.is_completed);
        assert_eq!(book.contributions_for(goal_id).len(), 1);
        assert_eq!(
            backend.list_contributions(goal_id).await.unwrap()[0].id,
            row.id
        );
    }

    #[tokio::test]
    async fn failed_commit_is_reported() {
        let backend = FlakyBackend::failing_commit();
        let goal_id = backend.goal.id;
        let result = DashboardService::new()
            .contribute(&backend, goal_id, dec(50), None, &Settings::default())
            .await;
        assert!(matches!(result, Err(CoreError::Backend { .. })));
    }

    #[tokio::test]
    async fn foreign_goal_is_not_found() {
        let mut book = sample_book();
        let stranger_goal = Goal::new(Uuid::new_v4(), "Not mine", dec(10), d(2024, 1, 1), d(2024, 2, 1));
        let goal_id = stranger_goal.id;
        book.goals.push(stranger_goal);
        let backend = MemoryBackend::new(book);

        let result = DashboardService::new()
            .contribute(&backend, goal_id, dec(5), None, &Settings::default())
            .await;
        assert!(matches!(result, Err(CoreError::GoalNotFound(_))));
        assert!(backend.snapshot().unwrap().contributions.is_empty());
    }

    #[tokio::test]
    async fn zero_delta_never_reaches_backend() {
        let backend = FlakyBackend::failing_commit();
        let goal_id = backend.goal.id;
        let result = DashboardService::new()
            .contribute(&backend, goal_id, Decimal::ZERO, None, &Settings::default())
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn signed_out_cannot_contribute() {
        let book = sample_book();
        let goal_id = book.goals[0].id;
        let backend = MemoryBackend::signed_out(book);
        let result = DashboardService::new()
            .contribute(&backend, goal_id, dec(5), None, &Settings::default())
            .await;
        assert!(matches!(result, Err(CoreError::Unauthenticated)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// RestBackend (no network)
// ═══════════════════════════════════════════════════════════════════

mod rest_backend {
    use super::*;

    #[test]
    fn config_trims_trailing_slash() {
        let config = RestBackendConfig::new("https://example.test/", "anon-key");
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.api_key, "anon-key");
        assert!(config.access_token.is_none());
    }

    #[test]
    fn config_with_token() {
        let config = RestBackendConfig::new("https://example.test", "k").with_access_token("jwt");
        assert_eq!(config.access_token.as_deref(), Some("jwt"));
        let backend = RestBackend::new(config.clone());
        assert_eq!(backend.config(), &config);
    }

    #[tokio::test]
    async fn no_session_token_is_unauthenticated() {
        let backend = RestBackend::new(RestBackendConfig::new("http://127.0.0.1:9", "k"));
        assert!(matches!(
            backend.current_owner().await,
            Err(CoreError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn dashboard_without_session_fails_fast() {
        let backend = RestBackend::new(RestBackendConfig::new("http://127.0.0.1:9", "k"));
        let result = DashboardService::new()
            .load_dashboard(&backend, d(2024, 3, 20), &Settings::default())
            .await;
        assert!(matches!(result, Err(CoreError::Unauthenticated)));
    }
}
