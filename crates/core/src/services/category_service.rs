use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::book::FinanceBook;
use crate::models::category::{Category, CATEGORY_PALETTE};
use crate::models::settings::Locale;
use crate::models::transaction::TransactionKind;

/// Manages the user's categories.
pub struct CategoryService;

impl CategoryService {
    pub fn new() -> Self {
        Self
    }

    pub fn add(&self, book: &mut FinanceBook, category: Category) -> Result<(), CoreError> {
        self.validate(book, &category)?;
        book.categories.push(category);
        Ok(())
    }

    /// Rename/recolor a category. The `is_default` flag cannot be changed.
    pub fn update(&self, book: &mut FinanceBook, mut category: Category) -> Result<(), CoreError> {
        let idx = Self::position(book, category.id)?;
        self.validate(book, &category)?;
        category.is_default = book.categories[idx].is_default;
        book.categories[idx] = category;
        Ok(())
    }

    /// Delete a non-default category and every budget tied to it.
    ///
    /// Transactions keep their now-dangling `category_id`; reports resolve it
    /// to the uncategorized bucket.
    pub fn remove(&self, book: &mut FinanceBook, id: Uuid) -> Result<Category, CoreError> {
        let idx = Self::position(book, id)?;
        if book.categories[idx].is_default {
            return Err(CoreError::ValidationError(format!(
                "Default category '{}' cannot be removed",
                book.categories[idx].name
            )));
        }

        let removed = book.categories.remove(idx);
        let before = book.budgets.len();
        book.budgets.retain(|b| b.category_id != id);
        let dropped = before - book.budgets.len();
        if dropped > 0 {
            tracing::info!(category = %removed.name, budgets = dropped, "removed budgets of deleted category");
        }
        Ok(removed)
    }

    /// The standard income/expense set a new user starts with.
    pub fn default_categories(&self, owner: Uuid, locale: Locale) -> Vec<Category> {
        let names: [(&str, &str, TransactionKind); 8] = [
            ("Alimentação", "Food", TransactionKind::Expense),
            ("Transporte", "Transport", TransactionKind::Expense),
            ("Moradia", "Housing", TransactionKind::Expense),
            ("Saúde", "Health", TransactionKind::Expense),
            ("Lazer", "Leisure", TransactionKind::Expense),
            ("Salário", "Salary", TransactionKind::Income),
            ("Freelance", "Freelance", TransactionKind::Income),
            ("Investimentos", "Investments", TransactionKind::Income),
        ];

        names
            .iter()
            .zip(CATEGORY_PALETTE.iter().cycle())
            .map(|((pt, en, kind), color)| {
                let name = match locale {
                    Locale::PtBr => *pt,
                    Locale::EnUs => *en,
                };
                let mut category = Category::new(owner, name, *kind, *color);
                category.is_default = true;
                category
            })
            .collect()
    }

    /// Rules:
    /// - Name must not be blank
    /// - Name is unique per kind (case-insensitive)
    /// - Color is a `#RRGGBB` hex string
    fn validate(&self, book: &FinanceBook, category: &Category) -> Result<(), CoreError> {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError(
                "Category name must not be empty".into(),
            ));
        }

        let lower = name.to_lowercase();
        let duplicate = book.categories.iter().any(|c| {
            c.id != category.id && c.kind == category.kind && c.name.trim().to_lowercase() == lower
        });
        if duplicate {
            return Err(CoreError::ValidationError(format!(
                "A {} category named '{name}' already exists",
                category.kind
            )));
        }

        if !Self::is_hex_color(&category.color) {
            return Err(CoreError::ValidationError(format!(
                "Invalid color '{}': expected #RRGGBB",
                category.color
            )));
        }
        Ok(())
    }

    fn is_hex_color(color: &str) -> bool {
        color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit())
    }

    fn position(book: &FinanceBook, id: Uuid) -> Result<usize, CoreError> {
        book.categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::CategoryNotFound(id.to_string()))
    }
}

impl Default for CategoryService {
    fn default() -> Self {
        Self::new()
    }
}
