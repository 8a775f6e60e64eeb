use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::book::FinanceBook;
use crate::models::category::CategoryIndex;
use crate::models::transaction::Transaction;

/// Manages income/expense records in a book.
///
/// Pure business logic, no I/O. Transactions are kept sorted by date
/// (oldest first) so range queries and "recent" views stay cheap.
pub struct TransactionService;

impl TransactionService {
    pub fn new() -> Self {
        Self
    }

    /// Validate and insert a transaction at its date-sorted position.
    pub fn add(&self, book: &mut FinanceBook, transaction: Transaction) -> Result<(), CoreError> {
        let transaction = self.validate(book, transaction)?;
        Self::binary_insert(&mut book.transactions, transaction);
        Ok(())
    }

    /// Replace an existing transaction (matched by id). The old record stays
    /// in place if the replacement fails validation.
    pub fn update(&self, book: &mut FinanceBook, transaction: Transaction) -> Result<(), CoreError> {
        let idx = Self::position(book, transaction.id)?;
        let transaction = self.validate(book, transaction)?;
        book.transactions.remove(idx);
        Self::binary_insert(&mut book.transactions, transaction);
        Ok(())
    }

    /// Remove a transaction by id, returning it.
    pub fn remove(&self, book: &mut FinanceBook, id: Uuid) -> Result<Transaction, CoreError> {
        let idx = Self::position(book, id)?;
        Ok(book.transactions.remove(idx))
    }

    /// All transactions, newest first.
    pub fn get_sorted<'a>(&self, book: &'a FinanceBook) -> Vec<&'a Transaction> {
        let mut transactions: Vec<&Transaction> = book.transactions.iter().collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        transactions
    }

    /// Case-insensitive match on description and category name.
    pub fn search<'a>(&self, book: &'a FinanceBook, query: &str) -> Vec<&'a Transaction> {
        let q = query.to_lowercase();
        let index = CategoryIndex::new(&book.categories);
        book.transactions
            .iter()
            .filter(|t| {
                t.description.to_lowercase().contains(&q)
                    || index
                        .resolve(t.category_id)
                        .is_some_and(|c| c.name.to_lowercase().contains(&q))
            })
            .collect()
    }

    /// Check a transaction against the book and normalize its recurrence.
    ///
    /// Rules:
    /// - Amount must be positive
    /// - A referenced category must exist
    /// - Recurring transactions need a frequency; non-recurring ones drop it
    ///
    /// A kind that disagrees with the category's kind is allowed but logged.
    pub fn validate(
        &self,
        book: &FinanceBook,
        mut transaction: Transaction,
    ) -> Result<Transaction, CoreError> {
        if transaction.amount <= Decimal::ZERO {
            return Err(CoreError::ValidationError(
                "Transaction amount must be positive".into(),
            ));
        }

        if let Some(category_id) = transaction.category_id {
            let category = book
                .category(category_id)
                .ok_or_else(|| CoreError::CategoryNotFound(category_id.to_string()))?;
            if category.kind != transaction.kind {
                tracing::warn!(
                    transaction = %transaction.id,
                    category = %category.name,
                    transaction_kind = %transaction.kind,
                    category_kind = %category.kind,
                    "transaction kind does not match its category"
                );
            }
        }

        if transaction.is_recurring {
            if transaction.recurrence.is_none() {
                return Err(CoreError::ValidationError(
                    "Recurring transactions need a recurrence frequency".into(),
                ));
            }
        } else {
            transaction.recurrence = None;
        }

        Ok(transaction)
    }

    fn position(book: &FinanceBook, id: Uuid) -> Result<usize, CoreError> {
        book.transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))
    }

    /// Binary insert into a date-sorted Vec in O(log n); equal dates keep insertion order.
    fn binary_insert(transactions: &mut Vec<Transaction>, transaction: Transaction) {
        let pos = transactions.partition_point(|t| t.date <= transaction.date);
        transactions.insert(pos, transaction);
    }
}

impl Default for TransactionService {
    fn default() -> Self {
        Self::new()
    }
}
