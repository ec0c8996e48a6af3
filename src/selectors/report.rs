//! Cross-resource views for the dashboard and the reports screen.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::account::total_balance;
use super::category::name_of;
use super::transaction::{percent_of, ratio, total_expense, total_income};
use crate::model::{Account, Category, Transaction};

/// Name shown for transactions whose category is not loaded.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_balance: Decimal,
    pub income: Decimal,
    pub expense: Decimal,
    /// Income minus expense.
    pub net: Decimal,
    pub expense_ratio: Decimal,
    pub account_count: usize,
    pub transaction_count: usize,
}

pub fn dashboard_summary(accounts: &[Account], transactions: &[Transaction]) -> DashboardSummary {
    let income = total_income(transactions);
    let expense = total_expense(transactions);
    DashboardSummary {
        total_balance: total_balance(accounts),
        income,
        expense,
        net: income - expense,
        expense_ratio: ratio(income, expense),
        account_count: accounts.len(),
        transaction_count: transactions.len(),
    }
}

/// Inclusive range of calendar days (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, transaction: &Transaction) -> bool {
        let day = transaction.date.date_naive();
        day >= self.start && day <= self.end
    }
}

/// Transactions inside `range`, or all of them without a range.
pub fn in_range(transactions: &[Transaction], range: Option<DateRange>) -> Vec<Transaction> {
    match range {
        Some(range) => transactions
            .iter()
            .filter(|t| range.contains(t))
            .cloned()
            .collect(),
        None => transactions.to_vec(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub category_id: String,
    pub name: String,
    pub income: Decimal,
    pub expense: Decimal,
    /// Percentage of all income plus expense in the report.
    pub share: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub expense_ratio: Decimal,
    /// Sorted by income plus expense, largest first.
    pub categories: Vec<CategoryBreakdown>,
}

pub fn category_report(
    transactions: &[Transaction],
    categories: &[Category],
    range: Option<DateRange>,
) -> CategoryReport {
    let selected = in_range(transactions, range);
    let income = total_income(&selected);
    let expense = total_expense(&selected);

    let mut order: Vec<String> = Vec::new();
    let mut rows: HashMap<String, CategoryBreakdown> = HashMap::new();
    for t in &selected {
        let row = rows.entry(t.category_id.clone()).or_insert_with(|| {
            order.push(t.category_id.clone());
            CategoryBreakdown {
                category_id: t.category_id.clone(),
                name: name_of(categories, &t.category_id)
                    .unwrap_or(UNCATEGORIZED)
                    .to_string(),
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
                share: Decimal::ZERO,
            }
        });
        if t.is_income() {
            row.income += t.amount;
        } else {
            row.expense += t.amount;
        }
    }

    let grand_total = income + expense;
    let mut breakdown: Vec<CategoryBreakdown> = order
        .into_iter()
        .filter_map(|id| rows.remove(&id))
        .map(|mut row| {
            if !grand_total.is_zero() {
                row.share = percent_of(row.income + row.expense, grand_total).round_dp(2);
            }
            row
        })
        .collect();
    // Stable sort: equal totals keep first-seen order.
    breakdown.sort_by(|a, b| (b.income + b.expense).cmp(&(a.income + a.expense)));

    CategoryReport {
        income,
        expense,
        balance: income - expense,
        expense_ratio: ratio(income, expense),
        categories: breakdown,
    }
}
