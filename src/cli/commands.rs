use std::sync::Arc;

use chrono::{TimeZone, Utc};
use thiserror::Error;

use super::{AccountsCommand, AddTransaction, CategoriesCommand, Command, PageArgs, TransactionsCommand};
use crate::app::{App, Runner};
use crate::config::Config;
use crate::effects::{AuthIntent, ResourceIntent};
use crate::format::{format_currency, format_date, truncate_text};
use crate::gateway::{LoginRequest, SignupRequest};
use crate::model::{
    Account, AccountFilter, Category, CategoryFilter, Transaction, TransactionDraft,
    TransactionFilter,
};
use crate::resource::{Resource, ResourceState, ResourceTransition};
use crate::selectors::{self, report};
use crate::session::SecureString;
use crate::validation::{self, ValidationError};

/// Transactions shown on the dashboard.
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Not logged in. Run `expense-flow login` first.")]
    NotLoggedIn,

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Invalid password: {}", join(.0))]
    WeakPassword(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Run one command and return what to print.
pub async fn run(app: &App, command: Command) -> Result<String, CommandError> {
    match command {
        Command::Login { email, password } => login(app, email, password).await,
        Command::Signup {
            email,
            full_name,
            password,
        } => signup(app, email, full_name, password).await,
        Command::Logout => {
            app.logout().await;
            Ok("Logged out".to_string())
        }
        Command::Whoami => whoami(app),
        Command::ForgotPassword { email } => {
            validation::validate_email(&email)?;
            app.auth()
                .forgot_password(&email)
                .await
                .map_err(|e| CommandError::Failed(e.message_or(&e.user_message())))
        }
        Command::ResetPassword { token, password } => {
            validation::validate_password(&password).map_err(CommandError::WeakPassword)?;
            app.auth()
                .reset_password(&token, &SecureString::new(password))
                .await
                .map_err(|e| CommandError::Failed(e.message_or(&e.user_message())))
        }
        Command::Accounts(cmd) => {
            require_login(app)?;
            accounts(app, cmd).await
        }
        Command::Categories(cmd) => {
            require_login(app)?;
            categories(app, cmd).await
        }
        Command::Transactions(cmd) => {
            require_login(app)?;
            transactions(app, cmd).await
        }
        Command::Dashboard => {
            require_login(app)?;
            dashboard(app).await
        }
        Command::Report { from, to } => {
            require_login(app)?;
            category_report(app, from, to).await
        }
    }
}

fn require_login(app: &App) -> Result<(), CommandError> {
    if app.session().is_authenticated() {
        Ok(())
    } else {
        Err(CommandError::NotLoggedIn)
    }
}

async fn login(app: &App, email: String, password: String) -> Result<String, CommandError> {
    validation::validate_email(&email)?;
    validation::validate_required("Password", &password)?;
    app.auth()
        .execute(AuthIntent::Login(LoginRequest {
            email,
            password: SecureString::new(password),
        }))
        .await;
    greeting(app, "Logged in")
}

async fn signup(
    app: &App,
    email: String,
    full_name: String,
    password: String,
) -> Result<String, CommandError> {
    validation::validate_email(&email)?;
    validation::validate_required("Full name", &full_name)?;
    validation::validate_password(&password).map_err(CommandError::WeakPassword)?;
    app.auth()
        .execute(AuthIntent::Signup(SignupRequest {
            email,
            password: SecureString::new(password),
            full_name,
        }))
        .await;
    greeting(app, "Signed up")
}

fn greeting(app: &App, verb: &str) -> Result<String, CommandError> {
    let state = app.session().snapshot();
    if !state.is_authenticated {
        let message = selectors::auth::error(&state).unwrap_or("Authentication failed");
        return Err(CommandError::Failed(message.to_string()));
    }
    let name = selectors::auth::display_name(&state).unwrap_or("unknown user");
    Ok(format!("{} as {}", verb, name))
}

fn whoami(app: &App) -> Result<String, CommandError> {
    let state = app.session().snapshot();
    match selectors::auth::user(&state) {
        Some(user) => Ok(format!("{} <{}>", user.display_name(), user.email)),
        None if state.is_authenticated => Ok("Logged in (no profile stored)".to_string()),
        None => Err(CommandError::NotLoggedIn),
    }
}

/// Run an intent with its follow-ups and surface the intent's own error.
async fn perform<R: Resource>(
    runner: &Runner<R>,
    intent: ResourceIntent<R>,
) -> Result<Arc<ResourceState<R>>, CommandError> {
    let operation = intent.operation();
    runner.run(intent).await;
    let state = runner.store().snapshot();
    match selectors::resource::operation_error(&state, operation) {
        Some(message) => Err(CommandError::Failed(message.to_string())),
        None => Ok(state),
    }
}

async fn list_page<R: Resource>(
    runner: &Runner<R>,
    criteria: R::Filter,
    paging: PageArgs,
) -> Result<Arc<ResourceState<R>>, CommandError> {
    if let Some(page_size) = paging.page_size {
        runner
            .store()
            .dispatch(ResourceTransition::SetPageSize { page_size });
    }
    runner.store().dispatch(ResourceTransition::SetFilter {
        criteria: criteria.clone(),
    });
    runner
        .store()
        .dispatch(ResourceTransition::SetPage { page: paging.page });
    perform(runner, ResourceIntent::List { criteria }).await
}

/// Load up to the configured maximum page of one kind.
async fn load_all<R: Resource>(
    runner: &Runner<R>,
    config: &Config,
    criteria: R::Filter,
) -> Result<Arc<ResourceState<R>>, CommandError> {
    let paging = PageArgs {
        page: 1,
        page_size: Some(config.pagination.max_page_size),
    };
    list_page(runner, criteria, paging).await
}

fn page_footer<R: Resource>(state: &ResourceState<R>) -> String {
    let pagination = selectors::resource::pagination(state);
    format!(
        "Page {}/{} ({} {})",
        pagination.page,
        selectors::resource::total_pages(state).max(1),
        pagination.total,
        R::KIND.plural()
    )
}

fn render_list<R: Resource>(state: &ResourceState<R>, line: impl Fn(&R) -> String) -> String {
    if selectors::resource::is_empty(state) {
        return format!("No {} found", R::KIND.plural());
    }
    let mut out: Vec<String> = selectors::resource::items(state).iter().map(line).collect();
    out.push(page_footer(state));
    out.join("\n")
}

fn focused_or_missing<R: Resource>(
    state: &ResourceState<R>,
    line: impl Fn(&R) -> String,
) -> Result<String, CommandError> {
    selectors::resource::focused(state)
        .map(line)
        .ok_or_else(|| CommandError::Failed(format!("{} not found", R::KIND.label())))
}

fn deleted<R: Resource>(state: &ResourceState<R>) -> String {
    selectors::resource::success_message(state)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} deleted", R::KIND.label()))
}

fn account_line(account: &Account) -> String {
    format!(
        "{:<24} {:<24} {:<15} {:>20}{}",
        account.id,
        truncate_text(&account.name, 24),
        account.account_type.label(),
        format_currency(account.balance, &account.currency, 0),
        if account.is_active { "" } else { "  (inactive)" }
    )
}

async fn accounts(app: &App, cmd: AccountsCommand) -> Result<String, CommandError> {
    let runner = app.accounts();
    let config = app.config();
    match cmd {
        AccountsCommand::List {
            active,
            search,
            paging,
        } => {
            let criteria = AccountFilter {
                is_active: active.then_some(true),
                account_type: None,
                search_text: search,
            };
            let state = list_page(runner, criteria, paging).await?;
            let mut out = render_list(&state, account_line);
            if !selectors::resource::is_empty(&state) {
                out.push_str(&format!(
                    "\nTotal balance: {}",
                    format_currency(
                        selectors::account::total_balance(&state.items),
                        &config.display.currency,
                        0
                    )
                ));
            }
            Ok(out)
        }
        AccountsCommand::Show { id } => {
            let state = perform(runner, ResourceIntent::FetchOne { id }).await?;
            focused_or_missing(&state, account_line)
        }
        AccountsCommand::Delete { id } => {
            let state = perform(runner, ResourceIntent::Delete { id }).await?;
            Ok(deleted(&state))
        }
    }
}

fn category_line(category: &Category) -> String {
    format!(
        "{:<24} {:<24} {:<8}{}",
        category.id,
        truncate_text(&category.name, 24),
        category.category_type.label(),
        if category.is_default { "  (default)" } else { "" }
    )
}

async fn categories(app: &App, cmd: CategoriesCommand) -> Result<String, CommandError> {
    let runner = app.categories();
    match cmd {
        CategoriesCommand::List { kind, search, paging } => {
            let criteria = CategoryFilter {
                category_type: kind.map(Into::into),
                is_active: None,
                search_text: search,
            };
            let state = list_page(runner, criteria, paging).await?;
            Ok(render_list(&state, category_line))
        }
        CategoriesCommand::Show { id } => {
            let state = perform(runner, ResourceIntent::FetchOne { id }).await?;
            focused_or_missing(&state, category_line)
        }
        CategoriesCommand::Delete { id } => {
            let state = perform(runner, ResourceIntent::Delete { id }).await?;
            Ok(deleted(&state))
        }
    }
}

fn transaction_line(config: &Config, tx: &Transaction) -> String {
    let sign = if tx.is_income() { "+" } else { "-" };
    format!(
        "{:<24} {:<10} {:<30} {:>1}{:>18}",
        tx.id,
        format_date(tx.date.date_naive(), &config.display.date_format),
        truncate_text(&tx.description, 30),
        sign,
        format_currency(tx.amount, &config.display.currency, 0)
    )
}

async fn transactions(app: &App, cmd: TransactionsCommand) -> Result<String, CommandError> {
    let runner = app.transactions();
    let config = app.config();
    let line = |t: &Transaction| transaction_line(config, t);
    match cmd {
        TransactionsCommand::List {
            from,
            to,
            kind,
            category,
            account,
            search,
            paging,
        } => {
            let criteria = TransactionFilter {
                start_date: from,
                end_date: to,
                category_id: category,
                account_id: account,
                transaction_type: kind.map(Into::into),
                search_text: search,
                ..Default::default()
            };
            let state = list_page(runner, criteria, paging).await?;
            Ok(render_list(&state, line))
        }
        TransactionsCommand::Show { id } => {
            let state = perform(runner, ResourceIntent::FetchOne { id }).await?;
            focused_or_missing(&state, line)
        }
        TransactionsCommand::Delete { id } => {
            let state = perform(runner, ResourceIntent::Delete { id }).await?;
            Ok(deleted(&state))
        }
        TransactionsCommand::Add(add) => {
            let draft = transaction_draft(add)?;
            let state = perform(runner, ResourceIntent::Create { draft }).await?;
            let message = selectors::resource::success_message(&state)
                .unwrap_or("Transaction created")
                .to_string();
            match state.items.first() {
                Some(tx) => Ok(format!("{}\n{}", message, line(tx))),
                None => Ok(message),
            }
        }
    }
}

fn transaction_draft(add: AddTransaction) -> Result<TransactionDraft, CommandError> {
    let amount = validation::validate_amount(add.amount)?;
    validation::validate_required("Description", &add.description)?;
    validation::validate_required("Account", &add.account)?;
    validation::validate_required("Category", &add.category)?;

    let today = Utc::now().date_naive();
    let day = add.date.unwrap_or(today);
    validation::validate_date(day, today)?;

    Ok(TransactionDraft {
        category_id: add.category,
        account_id: add.account,
        transaction_type: add.kind.into(),
        amount,
        description: add.description,
        date: Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN)),
        notes: add.notes,
        tags: add.tags,
    })
}

async fn dashboard(app: &App) -> Result<String, CommandError> {
    let config = app.config();
    let accounts = load_all(app.accounts(), config, AccountFilter::default()).await?;
    let transactions = load_all(app.transactions(), config, TransactionFilter::default()).await?;

    let summary = report::dashboard_summary(&accounts.items, &transactions.items);
    let money = |amount| format_currency(amount, &config.display.currency, 0);

    let mut out = vec![
        format!("Total balance: {}", money(summary.total_balance)),
        format!("Income:        {}", money(summary.income)),
        format!("Expense:       {}", money(summary.expense)),
        format!("Net:           {}", money(summary.net)),
        format!(
            "Expense ratio: {}%",
            summary.expense_ratio.round_dp(0)
        ),
        format!(
            "{} accounts, {} transactions",
            summary.account_count, summary.transaction_count
        ),
    ];

    let recent = selectors::transaction::recent(&transactions.items, RECENT_LIMIT);
    if !recent.is_empty() {
        out.push(String::new());
        out.push("Recent transactions:".to_string());
        out.extend(recent.iter().map(|t| transaction_line(config, t)));
    }
    Ok(out.join("\n"))
}

async fn category_report(
    app: &App,
    from: Option<chrono::NaiveDate>,
    to: Option<chrono::NaiveDate>,
) -> Result<String, CommandError> {
    let config = app.config();
    let criteria = TransactionFilter {
        start_date: from,
        end_date: to,
        ..Default::default()
    };
    let transactions = load_all(app.transactions(), config, criteria).await?;
    let categories = load_all(app.categories(), config, CategoryFilter::default()).await?;

    let range = match (from, to) {
        (Some(start), Some(end)) => Some(report::DateRange { start, end }),
        _ => None,
    };
    let result = report::category_report(&transactions.items, &categories.items, range);
    let money = |amount| format_currency(amount, &config.display.currency, 0);

    let mut out = vec![
        format!("Income:  {}", money(result.income)),
        format!("Expense: {}", money(result.expense)),
        format!("Balance: {}", money(result.balance)),
        String::new(),
    ];
    if result.categories.is_empty() {
        out.push("No transactions in this period".to_string());
    }
    for row in &result.categories {
        out.push(format!(
            "{:<24} {:>18} {:>18} {:>7}%",
            truncate_text(&row.name, 24),
            money(row.income),
            money(row.expense),
            row.share
        ));
    }
    Ok(out.join("\n"))
}
