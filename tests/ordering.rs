//! Overlapping requests of the same kind under both ordering policies.

mod common;

use std::sync::Arc;
use std::time::Duration;

use expense_flow::effects::{EffectRunner, OrderingPolicy, ResourceIntent};
use expense_flow::gateway::{GatewayError, InMemoryGateway};
use expense_flow::model::{Category, CategoryDraft, CategoryFilter, CategoryType};
use expense_flow::resource::{Operation, ResourceStore};

type Runner = EffectRunner<Category, InMemoryGateway<Category>>;

fn runner(policy: OrderingPolicy) -> Runner {
    let gateway = InMemoryGateway::with_records(vec![
        common::category("c-food", "Food", CategoryType::Expense),
        common::category("c-salary", "Salary", CategoryType::Income),
    ]);
    EffectRunner::new(ResourceStore::default(), Arc::new(gateway)).with_policy(policy)
}

fn of_type(category_type: CategoryType) -> ResourceIntent<Category> {
    ResourceIntent::List {
        criteria: CategoryFilter {
            category_type: Some(category_type),
            ..CategoryFilter::default()
        },
    }
}

fn ids(runner: &Runner) -> Vec<String> {
    runner
        .store()
        .select(|state| state.items.iter().map(|c| c.id.clone()).collect())
}

/// Start a slow expense list, then run a fast income list to completion.
async fn overlap(runner: &Runner) {
    runner
        .gateway()
        .delay_next(Operation::List, Duration::from_millis(150));
    let slow = runner.dispatch(of_type(CategoryType::Expense));
    tokio::time::sleep(Duration::from_millis(30)).await;

    runner.run(of_type(CategoryType::Income)).await;
    assert_eq!(ids(runner), vec!["c-salary"]);

    slow.await.unwrap();
}

#[tokio::test]
async fn last_terminal_wins_applies_late_response() {
    let runner = runner(OrderingPolicy::LastTerminalWins);
    overlap(&runner).await;

    assert_eq!(ids(&runner), vec!["c-food"]);
    assert!(!runner.store().snapshot().pending.listing);
    assert_eq!(runner.gateway().list_queries().len(), 2);
}

#[tokio::test]
async fn latest_issued_discards_superseded_response() {
    let runner = runner(OrderingPolicy::LatestIssued);
    overlap(&runner).await;

    assert_eq!(ids(&runner), vec!["c-salary"]);
    assert!(!runner.store().snapshot().pending.listing);
}

#[tokio::test]
async fn latest_issued_discards_superseded_failure() {
    let runner = runner(OrderingPolicy::LatestIssued);
    runner.gateway().fail_next(
        Operation::List,
        GatewayError::Server {
            status: 503,
            message: "Unavailable".to_string(),
        },
    );
    overlap(&runner).await;

    let state = runner.store().snapshot();
    assert_eq!(state.errors.list, None);
    assert_eq!(ids(&runner), vec!["c-salary"]);
}

#[tokio::test]
async fn superseded_failure_still_lands_by_default() {
    let runner = runner(OrderingPolicy::LastTerminalWins);
    runner.gateway().fail_next(
        Operation::List,
        GatewayError::Server {
            status: 503,
            message: "Unavailable".to_string(),
        },
    );
    overlap(&runner).await;

    let state = runner.store().snapshot();
    assert_eq!(state.errors.list.as_deref(), Some("Unavailable"));
    // A failed list keeps what the successful one loaded.
    assert_eq!(ids(&runner), vec!["c-salary"]);
}

#[tokio::test]
async fn concurrent_creates_are_not_coalesced() {
    let runner = runner(OrderingPolicy::LastTerminalWins);
    runner.gateway().queue_ids(["c-new-1", "c-new-2"]);

    let draft = |name: &str| CategoryDraft {
        name: name.to_string(),
        category_type: CategoryType::Expense,
        icon: None,
        color: None,
        description: None,
    };
    let first = runner.dispatch(ResourceIntent::Create {
        draft: draft("Coffee"),
    });
    let second = runner.dispatch(ResourceIntent::Create {
        draft: draft("Books"),
    });
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(runner.gateway().records().len(), 4);
    let state = runner.store().snapshot();
    assert!(!state.pending.creating);
    assert_eq!(state.pagination.total, 4);
    for id in ["c-new-1", "c-new-2"] {
        assert!(state.items.iter().any(|c| c.id == id), "{} missing", id);
    }
}
