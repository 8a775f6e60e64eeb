use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::settings::Locale;
use super::transaction::TransactionKind;

/// Display color used when a record has no (or a dangling) category.
pub const NEUTRAL_COLOR: &str = "#7C7C7C";

/// Preset colors offered when creating a category.
pub const CATEGORY_PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7",
    "#DDA0DD", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E9",
];

/// Label for expenses without a category (report breakdowns).
pub fn uncategorized_label(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Sem categoria",
        Locale::EnUs => "Uncategorized",
    }
}

/// Label for budgets whose category can no longer be resolved.
pub fn unknown_category_label(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Categoria Desconhecida",
        Locale::EnUs => "Unknown category",
    }
}

/// A user-defined label/color grouping for transactions and budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub kind: TransactionKind,
    /// `#RRGGBB` display hint
    pub color: String,
    /// Seeded categories cannot be deleted
    #[serde(default)]
    pub is_default: bool,
}

impl Category {
    pub fn new(
        owner: Uuid,
        name: impl Into<String>,
        kind: TransactionKind,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name: name.into(),
            kind,
            color: color.into(),
            is_default: false,
        }
    }

    pub fn expense(owner: Uuid, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self::new(owner, name, TransactionKind::Expense, color)
    }

    pub fn income(owner: Uuid, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self::new(owner, name, TransactionKind::Income, color)
    }
}

/// Borrowed id → category lookup, built once per aggregation pass.
#[derive(Debug, Default)]
pub struct CategoryIndex<'a> {
    by_id: HashMap<Uuid, &'a Category>,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        Self {
            by_id: categories.iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Resolve an optional id. Missing ids and deleted categories both yield `None`.
    #[must_use]
    pub fn resolve(&self, id: Option<Uuid>) -> Option<&'a Category> {
        id.and_then(|id| self.by_id.get(&id).copied())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
