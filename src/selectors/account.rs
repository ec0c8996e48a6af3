use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::resource::{group_by, total_by};
use crate::model::{Account, AccountType};

/// Sum of every account balance.
pub fn total_balance(accounts: &[Account]) -> Decimal {
    total_by(accounts, |_| true, |a| a.balance)
}

pub fn active(accounts: &[Account]) -> Vec<Account> {
    accounts.iter().filter(|a| a.is_active).cloned().collect()
}

pub fn by_type(accounts: &[Account]) -> BTreeMap<AccountType, Vec<Account>> {
    group_by(accounts, |a| a.account_type)
}
