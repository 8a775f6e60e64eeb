use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::book::FinanceBook;
use crate::models::goal::{ContributionPlan, Goal, GoalContribution};
use crate::models::report::{DeadlineStatus, GoalProgress};
use crate::models::settings::Locale;

/// Goal progress and the contribution ledger.
///
/// A goal's `current_amount` is a cached total over its ledger. It only
/// changes when a ledger row is committed, and the commit applies the row's
/// signed amount to the stored total in the same unit of work.
pub struct GoalService;

impl GoalService {
    pub fn new() -> Self {
        Self
    }

    /// Progress of a goal as of `today`.
    pub fn progress(&self, goal: &Goal, today: NaiveDate) -> GoalProgress {
        let percentage = super::percent_of(goal.current_amount, goal.target_amount);
        let days_remaining = Self::days_remaining(goal.target_date, today);

        GoalProgress {
            goal_id: goal.id,
            name: goal.name.clone(),
            current: goal.current_amount,
            target: goal.target_amount,
            percentage,
            bar_width: percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
            is_completed: goal.current_amount >= goal.target_amount,
            days_remaining,
            deadline: DeadlineStatus::from_days(days_remaining),
        }
    }

    /// Whole days from `today` to `target_date`; negative once overdue.
    ///
    /// Both ends are calendar dates, so the ceiling of the fractional
    /// difference is the plain day difference.
    pub fn days_remaining(target_date: NaiveDate, today: NaiveDate) -> i64 {
        (target_date - today).num_days()
    }

    /// Work out a contribution without touching any state.
    ///
    /// `delta` is signed: positive deposits, negative withdrawals. The new
    /// balance is clamped at zero; the ledger row keeps the requested delta.
    pub fn plan_contribution(
        &self,
        goal: &Goal,
        delta: Decimal,
        description: Option<String>,
        locale: Locale,
    ) -> Result<ContributionPlan, CoreError> {
        if delta.is_zero() {
            return Err(CoreError::ValidationError(
                "Contribution amount must not be zero".into(),
            ));
        }

        let mut projected = goal.clone();
        projected.apply_delta(delta);
        let description =
            description.or_else(|| Some(Self::default_description(delta, locale).to_string()));

        Ok(ContributionPlan {
            contribution: GoalContribution::new(goal.id, delta, description),
            new_current_amount: projected.current_amount,
            is_completed: projected.is_completed,
        })
    }

    /// Append a ledger row and apply its signed amount to the goal as stored
    /// in the book, not as it was when the row was planned. Returns the
    /// updated goal.
    ///
    /// The goal is looked up before anything is written, so a missing goal
    /// leaves the book untouched.
    pub fn commit_contribution(
        &self,
        book: &mut FinanceBook,
        contribution: GoalContribution,
    ) -> Result<Goal, CoreError> {
        let goal = book
            .goals
            .iter_mut()
            .find(|g| g.id == contribution.goal_id)
            .ok_or_else(|| CoreError::GoalNotFound(contribution.goal_id.to_string()))?;

        goal.apply_delta(contribution.amount);
        let updated = goal.clone();
        book.contributions.push(contribution);
        Ok(updated)
    }

    /// Plan and commit a contribution against the in-memory book.
    /// Returns the appended ledger row.
    pub fn apply_contribution(
        &self,
        book: &mut FinanceBook,
        goal_id: Uuid,
        delta: Decimal,
        description: Option<String>,
    ) -> Result<GoalContribution, CoreError> {
        let goal = book
            .goal(goal_id)
            .ok_or_else(|| CoreError::GoalNotFound(goal_id.to_string()))?;
        let plan = self.plan_contribution(goal, delta, description, book.settings.locale)?;
        let contribution = plan.contribution.clone();

        let goal = self.commit_contribution(book, plan.contribution)?;
        tracing::info!(
            goal = %goal_id,
            delta = %delta,
            new_balance = %goal.current_amount,
            completed = goal.is_completed,
            "applied goal contribution"
        );
        Ok(contribution)
    }

    /// Balance derived purely from the ledger, applying the same zero floor
    /// as live contributions. Agrees with the cached `current_amount` as long
    /// as every change went through `commit_contribution`.
    pub fn replay_ledger<'a>(
        &self,
        contributions: impl IntoIterator<Item = &'a GoalContribution>,
    ) -> Decimal {
        contributions
            .into_iter()
            .fold(Decimal::ZERO, |balance, c| (balance + c.amount).max(Decimal::ZERO))
    }

    /// Validate a goal before it is stored.
    pub fn validate_goal(&self, goal: &Goal) -> Result<(), CoreError> {
        if goal.name.trim().is_empty() {
            return Err(CoreError::ValidationError("Goal name must not be empty".into()));
        }
        if goal.target_amount <= Decimal::ZERO {
            return Err(CoreError::ValidationError(
                "Goal target amount must be positive".into(),
            ));
        }
        if goal.current_amount < Decimal::ZERO {
            return Err(CoreError::ValidationError(
                "Goal current amount must not be negative".into(),
            ));
        }
        if goal.target_date < goal.start_date {
            return Err(CoreError::ValidationError(format!(
                "Goal target date {} is before its start date {}",
                goal.target_date, goal.start_date
            )));
        }
        Ok(())
    }

    /// Ledger row recording a goal's opening balance, if it has one.
    pub fn opening_contribution(&self, goal: &Goal, locale: Locale) -> Option<GoalContribution> {
        if goal.current_amount <= Decimal::ZERO {
            return None;
        }
        let description = match locale {
            Locale::PtBr => "Saldo inicial",
            Locale::EnUs => "Opening balance",
        };
        Some(GoalContribution::new(
            goal.id,
            goal.current_amount,
            Some(description.to_string()),
        ))
    }

    /// Ledger description used when the caller gives none.
    pub fn default_description(delta: Decimal, locale: Locale) -> &'static str {
        let deposit = delta.is_sign_positive();
        match (locale, deposit) {
            (Locale::PtBr, true) => "Contribuição adicionada",
            (Locale::PtBr, false) => "Contribuição removida",
            (Locale::EnUs, true) => "Contribution added",
            (Locale::EnUs, false) => "Contribution removed",
        }
    }
}

impl Default for GoalService {
    fn default() -> Self {
        Self::new()
    }
}
