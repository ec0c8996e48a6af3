//! Command-line interface for the `expense-flow` binary.

mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::model::{CategoryType, TransactionType};

pub use commands::{run, CommandError};

/// expense-flow: track accounts, categories and transactions from the
/// terminal.
#[derive(Debug, Parser, Clone)]
#[command(name = "expense-flow", version)]
pub struct Args {
    #[clap(flatten)]
    pub common: Common,

    #[command(subcommand)]
    pub command: Command,
}

/// Arguments common to all subcommands.
#[derive(Debug, ClapArgs, Clone)]
pub struct Common {
    /// Config file. Defaults to ~/.config/expense-flow/config.toml.
    #[arg(long, env = "EXPENSE_FLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the config file.
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and keep the session for later commands.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "EXPENSE_FLOW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, env = "EXPENSE_FLOW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session here and on the server.
    Logout,
    /// Show the logged in user.
    Whoami,
    /// Ask the server to send a password reset email.
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with a reset token.
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "EXPENSE_FLOW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Money holders: cash, bank accounts, wallets.
    #[command(subcommand)]
    Accounts(AccountsCommand),
    /// Income and expense categories.
    #[command(subcommand)]
    Categories(CategoriesCommand),
    /// Income and expense entries.
    #[command(subcommand)]
    Transactions(TransactionsCommand),
    /// Balance, income, expense and the latest transactions.
    Dashboard,
    /// Income and expense per category.
    Report {
        /// First day to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, ClapArgs)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Defaults to the configured page size.
    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AccountsCommand {
    List {
        /// Only active accounts.
        #[arg(long)]
        active: bool,
        #[arg(long)]
        search: Option<String>,
        #[clap(flatten)]
        paging: PageArgs,
    },
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoriesCommand {
    List {
        #[arg(long = "type", value_enum)]
        kind: Option<FlowArg>,
        #[arg(long)]
        search: Option<String>,
        #[clap(flatten)]
        paging: PageArgs,
    },
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TransactionsCommand {
    List {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long = "type", value_enum)]
        kind: Option<FlowArg>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        account: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[clap(flatten)]
        paging: PageArgs,
    },
    Show { id: String },
    Delete { id: String },
    Add(AddTransaction),
}

#[derive(Debug, Clone, ClapArgs)]
pub struct AddTransaction {
    #[arg(long)]
    pub account: String,
    #[arg(long)]
    pub category: String,
    #[arg(long = "type", value_enum)]
    pub kind: FlowArg,
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long)]
    pub description: String,
    /// Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

/// Direction of money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlowArg {
    Income,
    Expense,
}

impl From<FlowArg> for TransactionType {
    fn from(value: FlowArg) -> Self {
        match value {
            FlowArg::Income => TransactionType::Income,
            FlowArg::Expense => TransactionType::Expense,
        }
    }
}

impl From<FlowArg> for CategoryType {
    fn from(value: FlowArg) -> Self {
        match value {
            FlowArg::Income => CategoryType::Income,
            FlowArg::Expense => CategoryType::Expense,
        }
    }
}
