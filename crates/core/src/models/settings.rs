use serde::{Deserialize, Serialize};

/// Display language. Controls month labels, sentinel labels and
/// deadline/budget phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Brazilian Portuguese (`Jan`, `Fev`, ... `Dez`)
    #[default]
    PtBr,
    /// US English (`Jan`, `Feb`, ... `Dec`)
    EnUs,
}

impl Locale {
    /// Three-letter, capitalized month abbreviation. `month` is 1-based.
    #[must_use]
    pub fn month_abbrev(self, month: u32) -> &'static str {
        const PT: [&str; 12] = [
            "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
        ];
        const EN: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Locale::PtBr => PT[idx],
            Locale::EnUs => EN[idx],
        }
    }
}

/// How the budget overview treats several budgets on the same category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BudgetMergePolicy {
    /// One line per budget record, even when categories repeat.
    #[default]
    PerBudget,
    /// Budgeted amounts are summed per category before computing the percentage.
    MergeByCategory,
}

/// How expense breakdowns bucket categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryGrouping {
    /// Bucket by display name; two categories sharing a name merge.
    #[default]
    ByName,
    /// Bucket by category id; names are resolved only for output.
    ById,
}

/// User-configurable settings, stored alongside the records in the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Display currency (e.g., "BRL", "USD")
    pub currency: String,

    #[serde(default)]
    pub locale: Locale,

    #[serde(default)]
    pub budget_merge: BudgetMergePolicy,

    #[serde(default)]
    pub category_grouping: CategoryGrouping,

    /// Number of trailing months kept in the monthly series
    #[serde(default = "default_monthly_window")]
    pub monthly_window: usize,

    /// Number of transactions shown as "recent" on the dashboard
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Number of incomplete goals shown on the dashboard
    #[serde(default = "default_active_goals_limit")]
    pub active_goals_limit: usize,
}

impl Settings {
    /// Replace values the setters would reject (e.g., from a hand-edited
    /// snapshot) with their defaults.
    pub fn normalize(&mut self) {
        if self.monthly_window == 0 {
            tracing::warn!(
                default = default_monthly_window(),
                "monthly window of 0 months; using the default"
            );
            self.monthly_window = default_monthly_window();
        }
    }
}

fn default_monthly_window() -> usize {
    6
}

fn default_recent_limit() -> usize {
    5
}

fn default_active_goals_limit() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "BRL".to_string(),
            locale: Locale::default(),
            budget_merge: BudgetMergePolicy::default(),
            category_grouping: CategoryGrouping::default(),
            monthly_window: default_monthly_window(),
            recent_limit: default_recent_limit(),
            active_goals_limit: default_active_goals_limit(),
        }
    }
}
