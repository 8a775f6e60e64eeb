use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::budget::{Budget, BudgetPeriod};
use crate::models::category::Category;
use crate::models::goal::{Goal, GoalContribution};
use crate::models::transaction::{RecurrenceFrequency, Transaction, TransactionKind};

use super::traits::{BudgetReader, CategoryReader, GoalStore, IdentityProvider, TransactionReader};

const ENV_URL: &str = "FINANCE_BACKEND_URL";
const ENV_KEY: &str = "FINANCE_BACKEND_KEY";
const ENV_TOKEN: &str = "FINANCE_BACKEND_TOKEN";

/// Server-side function that inserts the ledger row and adds its amount to
/// the goal's stored total (floored at zero, completion recomputed) inside
/// one database transaction. Returns the updated goal row.
const CONTRIBUTION_RPC: &str = "apply_goal_contribution";

/// Connection settings for a PostgREST-style backend-as-a-service.
#[derive(Debug, Clone, PartialEq)]
pub struct RestBackendConfig {
    /// Project URL, e.g. `https://xyz.example.co`
    pub base_url: String,
    /// Public (anon) API key, sent as `apikey`
    pub api_key: String,
    /// User session token. Without it, identity lookups fail with `Unauthenticated`.
    pub access_token: Option<String>,
}

impl RestBackendConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Read `FINANCE_BACKEND_URL`, `FINANCE_BACKEND_KEY` and the optional
    /// `FINANCE_BACKEND_TOKEN` from the environment.
    pub fn from_env() -> Result<Self, CoreError> {
        let url = std::env::var(ENV_URL)
            .map_err(|_| CoreError::ValidationError(format!("{ENV_URL} is not set")))?;
        let key = std::env::var(ENV_KEY)
            .map_err(|_| CoreError::ValidationError(format!("{ENV_KEY} is not set")))?;
        let mut config = Self::new(url, key);
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            if !token.trim().is_empty() {
                config.access_token = Some(token);
            }
        }
        Ok(config)
    }
}

/// `reqwest` client for the hosted backend.
///
/// - Reads go to `/rest/v1/{table}` filtered by `user_id`.
/// - Identity comes from `/auth/v1/user`.
/// - Contributions go through a single RPC so the ledger insert and the
///   goal update cannot diverge.
pub struct RestBackend {
    client: Client,
    config: RestBackendConfig,
}

impl RestBackend {
    pub fn new(config: RestBackendConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    pub fn config(&self) -> &RestBackendConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.api_key);
        self.client
            .request(method, format!("{}{path}", self.config.base_url))
            .header("apikey", &self.config.api_key)
            .bearer_auth(bearer)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &str,
    ) -> Result<Vec<T>, CoreError> {
        let resp = self
            .request(Method::GET, &format!("/rest/v1/{table}?select=*&{filter}"))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CoreError::Backend {
                operation: format!("select {table}"),
                message: format!("HTTP {status}: {body}"),
            });
        }

        resp.json().await.map_err(|e| CoreError::Backend {
            operation: format!("select {table}"),
            message: format!("Failed to parse rows: {e}"),
        })
    }
}

// ── Row types (backend column names) ────────────────────────────────

#[derive(Deserialize)]
struct UserResponse {
    id: Uuid,
}

#[derive(Deserialize)]
struct TransactionRow {
    id: Uuid,
    user_id: Uuid,
    category_id: Option<Uuid>,
    amount: Decimal,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type")]
    kind: TransactionKind,
    date: NaiveDate,
    #[serde(default)]
    is_recurring: bool,
    #[serde(default)]
    recurrence_type: Option<RecurrenceFrequency>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: row.id,
            owner: row.user_id,
            category_id: row.category_id,
            amount: row.amount,
            description: row.description.unwrap_or_default(),
            kind: row.kind,
            date: row.date,
            is_recurring: row.is_recurring,
            recurrence: if row.is_recurring { row.recurrence_type } else { None },
        }
    }
}

#[derive(Deserialize)]
struct CategoryRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
    color: String,
    #[serde(default)]
    is_default: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            owner: row.user_id,
            name: row.name,
            kind: row.kind,
            color: row.color,
            is_default: row.is_default,
        }
    }
}

#[derive(Deserialize)]
struct BudgetRow {
    id: Uuid,
    user_id: Uuid,
    category_id: Uuid,
    amount: Decimal,
    period: BudgetPeriod,
    start_date: NaiveDate,
    #[serde(default)]
    is_recurring: bool,
}

impl From<BudgetRow> for Budget {
    fn from(row: BudgetRow) -> Self {
        Budget {
            id: row.id,
            owner: row.user_id,
            category_id: row.category_id,
            amount: row.amount,
            period: row.period,
            start_date: row.start_date,
            is_recurring: row.is_recurring,
        }
    }
}

#[derive(Deserialize)]
struct GoalRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: Option<String>,
    target_amount: Decimal,
    current_amount: Decimal,
    start_date: NaiveDate,
    target_date: NaiveDate,
    #[serde(default)]
    is_completed: bool,
}

impl From<GoalRow> for Goal {
    fn from(row: GoalRow) -> Self {
        Goal {
            id: row.id,
            owner: row.user_id,
            name: row.name,
            description: row.description,
            target_amount: row.target_amount,
            current_amount: row.current_amount,
            start_date: row.start_date,
            target_date: row.target_date,
            is_completed: row.is_completed,
        }
    }
}

#[derive(Deserialize)]
struct ContributionRow {
    id: Uuid,
    goal_id: Uuid,
    amount: Decimal,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ContributionRow> for GoalContribution {
    fn from(row: ContributionRow) -> Self {
        GoalContribution {
            id: row.id,
            goal_id: row.goal_id,
            amount: row.amount,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Serialize)]
struct ContributionRpcArgs<'a> {
    p_contribution_id: Uuid,
    p_goal_id: Uuid,
    p_amount: Decimal,
    p_description: Option<&'a str>,
    p_created_at: DateTime<Utc>,
}

// ── Trait impls ─────────────────────────────────────────────────────

#[async_trait]
impl IdentityProvider for RestBackend {
    async fn current_owner(&self) -> Result<Uuid, CoreError> {
        if self.config.access_token.is_none() {
            return Err(CoreError::Unauthenticated);
        }

        let resp = self.request(Method::GET, "/auth/v1/user").send().await?;
        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CoreError::Unauthenticated),
            status if !status.is_success() => Err(CoreError::Backend {
                operation: "current_owner".into(),
                message: format!("HTTP {status}"),
            }),
            _ => {
                let user: UserResponse = resp.json().await.map_err(|e| CoreError::Backend {
                    operation: "current_owner".into(),
                    message: format!("Failed to parse user: {e}"),
                })?;
                Ok(user.id)
            }
        }
    }
}

#[async_trait]
impl TransactionReader for RestBackend {
    async fn list_transactions(&self, owner: Uuid) -> Result<Vec<Transaction>, CoreError> {
        let rows: Vec<TransactionRow> = self
            .select("transactions", &format!("user_id=eq.{owner}&order=date.desc"))
            .await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }
}

#[async_trait]
impl CategoryReader for RestBackend {
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, CoreError> {
        let rows: Vec<CategoryRow> = self
            .select("categories", &format!("user_id=eq.{owner}&order=name.asc"))
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}

#[async_trait]
impl BudgetReader for RestBackend {
    async fn list_budgets(&self, owner: Uuid) -> Result<Vec<Budget>, CoreError> {
        let rows: Vec<BudgetRow> = self
            .select("budgets", &format!("user_id=eq.{owner}&order=created_at.desc"))
            .await?;
        Ok(rows.into_iter().map(Budget::from).collect())
    }
}

#[async_trait]
impl GoalStore for RestBackend {
    async fn list_goals(&self, owner: Uuid) -> Result<Vec<Goal>, CoreError> {
        let rows: Vec<GoalRow> = self
            .select("goals", &format!("user_id=eq.{owner}&order=created_at.desc"))
            .await?;
        Ok(rows.into_iter().map(Goal::from).collect())
    }

    async fn get_goal(&self, goal_id: Uuid) -> Result<Goal, CoreError> {
        let rows: Vec<GoalRow> = self.select("goals", &format!("id=eq.{goal_id}")).await?;
        rows.into_iter()
            .next()
            .map(Goal::from)
            .ok_or_else(|| CoreError::GoalNotFound(goal_id.to_string()))
    }

    async fn list_contributions(&self, goal_id: Uuid) -> Result<Vec<GoalContribution>, CoreError> {
        let rows: Vec<ContributionRow> = self
            .select(
                "goal_contributions",
                &format!("goal_id=eq.{goal_id}&order=created_at.asc"),
            )
            .await?;
        Ok(rows.into_iter().map(GoalContribution::from).collect())
    }

    async fn commit_contribution(&self, contribution: &GoalContribution) -> Result<Goal, CoreError> {
        let args = ContributionRpcArgs {
            p_contribution_id: contribution.id,
            p_goal_id: contribution.goal_id,
            p_amount: contribution.amount,
            p_description: contribution.description.as_deref(),
            p_created_at: contribution.created_at,
        };

        let resp = self
            .request(Method::POST, &format!("/rest/v1/rpc/{CONTRIBUTION_RPC}"))
            .json(&args)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CoreError::Backend {
                operation: CONTRIBUTION_RPC.into(),
                message: format!("HTTP {status}: {body}"),
            });
        }

        let row: GoalRow = resp.json().await.map_err(|e| CoreError::Backend {
            operation: CONTRIBUTION_RPC.into(),
            message: format!("Failed to parse updated goal: {e}"),
        })?;
        Ok(Goal::from(row))
    }
}
