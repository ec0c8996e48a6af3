use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::resource::{group_by, total_by};
use crate::model::Transaction;

pub fn total_income(transactions: &[Transaction]) -> Decimal {
    total_by(transactions, Transaction::is_income, |t| t.amount)
}

pub fn total_expense(transactions: &[Transaction]) -> Decimal {
    total_by(transactions, Transaction::is_expense, |t| t.amount)
}

/// Income minus expense.
pub fn balance(transactions: &[Transaction]) -> Decimal {
    total_income(transactions) - total_expense(transactions)
}

/// Expense as a percentage of income; 0 when there is no income.
/// Saturates at `Decimal::MAX` when the quotient leaves Decimal's range.
pub fn expense_ratio(transactions: &[Transaction]) -> Decimal {
    ratio(total_income(transactions), total_expense(transactions))
}

pub(crate) fn ratio(income: Decimal, expense: Decimal) -> Decimal {
    if income.is_zero() {
        return Decimal::ZERO;
    }
    percent_of(expense, income)
}

/// `part / whole * 100`, saturating instead of overflowing.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}

pub fn by_category(transactions: &[Transaction]) -> BTreeMap<String, Vec<Transaction>> {
    group_by(transactions, |t| t.category_id.clone())
}

pub fn by_account(transactions: &[Transaction]) -> BTreeMap<String, Vec<Transaction>> {
    group_by(transactions, |t| t.account_id.clone())
}

/// The `limit` most recent transactions, newest first.
pub fn recent(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::model::{Transaction, TransactionStatus, TransactionType};

    pub(crate) fn transaction(
        id: &str,
        transaction_type: TransactionType,
        amount: i64,
        category_id: &str,
        day: u32,
    ) -> Transaction {
        let date = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        Transaction {
            id: id.to_string(),
            user_id: "u1".to_string(),
            account_id: "acc".to_string(),
            category_id: category_id.to_string(),
            transaction_type,
            amount: Decimal::from(amount),
            description: id.to_string(),
            date,
            status: TransactionStatus::Completed,
            notes: None,
            tags: Vec::new(),
            created_at: date,
            updated_at: date,
        }
    }
}
