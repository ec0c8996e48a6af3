//! Offline app: in-memory gateways, a scripted auth backend and the CLI
//! command layer on top.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use clap::Parser;
use expense_flow::cli::{self, Args, CommandError};
use expense_flow::config::Config;
use expense_flow::gateway::{
    AuthGateway, AuthResponse, GatewayError, GatewayResult, InMemoryGateway, LoginRequest,
    SignupRequest,
};
use expense_flow::model::{
    Account, AccountType, CategoryFilter, CategoryType, Transaction, TransactionType,
};
use expense_flow::session::{SecureString, Session};
use expense_flow::validation::ValidationError;
use expense_flow::{App, Gateways};
use rust_decimal::Decimal;

struct ScriptedAuth;

fn tokens() -> AuthResponse {
    AuthResponse {
        access_token: SecureString::new("access-1".to_string()),
        refresh_token: SecureString::new("refresh-1".to_string()),
        user: Some(common::user()),
    }
}

#[async_trait]
impl AuthGateway for ScriptedAuth {
    async fn login(&self, request: &LoginRequest) -> GatewayResult<AuthResponse> {
        if request.password.expose() == "Secret123" {
            Ok(tokens())
        } else {
            Err(GatewayError::Unauthorized {
                message: "Invalid credentials".to_string(),
            })
        }
    }

    async fn signup(&self, _request: &SignupRequest) -> GatewayResult<AuthResponse> {
        Ok(tokens())
    }

    async fn refresh(&self, _refresh_token: &SecureString) -> GatewayResult<AuthResponse> {
        Ok(tokens())
    }

    async fn logout(&self) -> GatewayResult<()> {
        Ok(())
    }

    async fn forgot_password(&self, _email: &str) -> GatewayResult<String> {
        Ok("Reset link sent".to_string())
    }

    async fn reset_password(&self, _token: &str, _password: &SecureString) -> GatewayResult<String> {
        Ok("Password updated".to_string())
    }
}

fn wallet() -> Account {
    Account {
        id: "a1".to_string(),
        user_id: "u1".to_string(),
        name: "Wallet".to_string(),
        account_type: AccountType::Cash,
        balance: Decimal::from(1_000_000),
        initial_balance: Decimal::ZERO,
        currency: "VND".to_string(),
        is_active: true,
        color: None,
        icon: None,
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

struct Fixture {
    app: App,
    transactions: Arc<InMemoryGateway<Transaction>>,
}

fn fixture() -> Fixture {
    let transactions = Arc::new(
        InMemoryGateway::with_records(vec![
            common::transaction("t-lunch", TransactionType::Expense, 50_000, "c-food"),
            common::transaction("t-salary", TransactionType::Income, 9_000_000, "c-salary"),
        ])
        .for_user("u1"),
    );
    let gateways = Gateways {
        accounts: Arc::new(InMemoryGateway::with_records(vec![wallet()])),
        categories: Arc::new(InMemoryGateway::with_records(vec![
            common::category("c-food", "Food", CategoryType::Expense),
            common::category("c-salary", "Salary", CategoryType::Income),
        ])),
        transactions: transactions.clone(),
        auth: Arc::new(ScriptedAuth),
    };
    let app = App::new(Config::default(), Session::in_memory(), gateways);
    Fixture { app, transactions }
}

async fn run(app: &App, argv: &[&str]) -> Result<String, CommandError> {
    let args = Args::try_parse_from(std::iter::once("expense-flow").chain(argv.iter().copied()))
        .expect("arguments parse");
    cli::run(app, args.command).await
}

async fn log_in(app: &App) {
    let out = run(app, &["login", "--email", "an@example.com", "--password", "Secret123"])
        .await
        .unwrap();
    assert_eq!(out, "Logged in as Nguyen An");
}

#[tokio::test]
async fn loaded_config_sets_page_size() {
    let mut config = Config::default();
    config.pagination.default_page_size = 25;
    let gateways = Gateways::in_memory(Arc::new(ScriptedAuth));
    let app = App::new(config.clone(), Session::in_memory(), gateways);

    assert_eq!(app.config(), &config);
    for page_size in [
        app.accounts().store().snapshot().pagination.page_size,
        app.categories().store().snapshot().pagination.page_size,
        app.transactions().store().snapshot().pagination.page_size,
    ] {
        assert_eq!(page_size, 25);
    }
}

#[tokio::test]
async fn resource_commands_require_login() {
    let Fixture { app, .. } = fixture();

    let err = run(&app, &["accounts", "list"]).await.unwrap_err();
    assert!(matches!(err, CommandError::NotLoggedIn));
    assert!(matches!(
        run(&app, &["whoami"]).await,
        Err(CommandError::NotLoggedIn)
    ));
}

#[tokio::test]
async fn failed_login_reports_server_message() {
    let Fixture { app, .. } = fixture();

    let err = run(&app, &["login", "--email", "an@example.com", "--password", "nope"])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!app.session().is_authenticated());

    let err = run(&app, &["login", "--email", "not-an-email", "--password", "x"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Invalid(ValidationError::InvalidEmail)
    ));
}

#[tokio::test]
async fn list_whoami_and_logout() {
    let Fixture { app, .. } = fixture();
    log_in(&app).await;

    assert_eq!(
        run(&app, &["whoami"]).await.unwrap(),
        "Nguyen An <an@example.com>"
    );

    let out = run(&app, &["transactions", "list", "--type", "expense"])
        .await
        .unwrap();
    assert!(out.contains("t-lunch"), "{}", out);
    assert!(!out.contains("t-salary"), "{}", out);
    assert!(out.ends_with("Page 1/1 (1 transactions)"), "{}", out);

    let out = run(&app, &["categories", "list", "--search", "zzz"])
        .await
        .unwrap();
    assert_eq!(out, "No categories found");

    assert_eq!(run(&app, &["logout"]).await.unwrap(), "Logged out");
    assert!(!app.session().is_authenticated());
    assert!(app.transactions().store().snapshot().items.is_empty());
    assert_eq!(app.categories().store().snapshot().filter, CategoryFilter::default());
}

#[tokio::test]
async fn add_transaction_validates_then_creates() {
    let Fixture { app, transactions } = fixture();
    log_in(&app).await;
    transactions.queue_ids(["t-new"]);

    let base = [
        "transactions",
        "add",
        "--account",
        "a1",
        "--category",
        "c-food",
        "--type",
        "expense",
        "--description",
        "Coffee",
    ];

    let mut negative = base.to_vec();
    negative.push("--amount=-5");
    let err = run(&app, &negative).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Invalid(ValidationError::AmountTooSmall { .. })
    ));

    let tomorrow = (Utc::now().date_naive() + chrono::Days::new(2)).to_string();
    let mut future = base.to_vec();
    future.extend(["--amount", "30000", "--date", tomorrow.as_str()]);
    assert!(matches!(
        run(&app, &future).await,
        Err(CommandError::Invalid(ValidationError::FutureDate))
    ));
    assert_eq!(transactions.records().len(), 2);

    let mut valid = base.to_vec();
    valid.extend(["--amount", "30000", "--tag", "morning"]);
    let out = run(&app, &valid).await.unwrap();
    assert!(out.starts_with("Transaction created successfully"), "{}", out);
    assert!(out.contains("30.000 ₫"), "{}", out);

    let created = &transactions.records()[0];
    assert_eq!(created.id, "t-new");
    assert_eq!(created.user_id, "u1");
    assert_eq!(created.tags, vec!["morning".to_string()]);
}

#[tokio::test]
async fn show_and_delete_transaction() {
    let Fixture { app, transactions } = fixture();
    log_in(&app).await;

    let out = run(&app, &["transactions", "show", "t-lunch"]).await.unwrap();
    assert!(out.starts_with("t-lunch"), "{}", out);
    assert!(out.contains("50.000 ₫"), "{}", out);

    let err = run(&app, &["transactions", "show", "t-missing"])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "transaction t-missing not found");

    run(&app, &["transactions", "list"]).await.unwrap();
    assert_eq!(
        run(&app, &["transactions", "delete", "t-lunch"]).await.unwrap(),
        "Transaction deleted successfully"
    );
    assert_eq!(transactions.records().len(), 1);
    let state = app.transactions().store().snapshot();
    assert!(state.items.iter().all(|t| t.id != "t-lunch"));
    assert_eq!(state.pagination.total, 1);

    assert!(run(&app, &["transactions", "delete", "t-lunch"]).await.is_err());
}

#[tokio::test]
async fn dashboard_and_report_summarise_loaded_data() {
    let Fixture { app, .. } = fixture();
    log_in(&app).await;

    let out = run(&app, &["dashboard"]).await.unwrap();
    assert!(out.contains("Total balance: 1.000.000 ₫"), "{}", out);
    assert!(out.contains("Income:        9.000.000 ₫"), "{}", out);
    assert!(out.contains("Expense:       50.000 ₫"), "{}", out);
    assert!(out.contains("1 accounts, 2 transactions"), "{}", out);
    assert!(out.contains("Recent transactions:"), "{}", out);

    let out = run(&app, &["report"]).await.unwrap();
    assert!(out.contains("Balance: 8.950.000 ₫"), "{}", out);
    let salary = out.find("Salary").expect("salary row");
    let food = out.find("Food").expect("food row");
    assert!(salary < food, "rows ordered by volume: {}", out);
}

#[tokio::test]
async fn session_guard_clears_resources_when_session_ends() {
    let Fixture { app, .. } = fixture();
    log_in(&app).await;
    let guard = app.spawn_session_guard();

    run(&app, &["accounts", "list"]).await.unwrap();
    assert_eq!(app.accounts().store().snapshot().items.len(), 1);

    // An unauthorized response anywhere ends the session the same way.
    app.session().force_logout();
    assert!(
        common::wait_until(Duration::from_secs(2), || {
            app.accounts().store().snapshot().items.is_empty()
        })
        .await
    );
    guard.abort();
}

#[tokio::test]
async fn password_recovery_commands() {
    let Fixture { app, .. } = fixture();

    assert_eq!(
        run(&app, &["forgot-password", "--email", "an@example.com"])
            .await
            .unwrap(),
        "Reset link sent"
    );
    let err = run(&app, &["reset-password", "--token", "t", "--password", "short"])
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::WeakPassword(_)));
    assert_eq!(
        run(&app, &["reset-password", "--token", "t", "--password", "Secret123"])
            .await
            .unwrap(),
        "Password updated"
    );
}
