//! Tests for the in-memory points store.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::*;
use crate::domain::{
    LedgerReference, RedemptionCode, RedemptionStatus, RewardCatalogItemDraft,
};

#[fixture]
fn store() -> InMemoryPointsStore {
    InMemoryPointsStore::default()
}

fn seed_reward(store: &InMemoryPointsStore, stock: u32) -> RewardId {
    let reward = RewardCatalogItem::new(RewardCatalogItemDraft {
        id: RewardId::random(),
        name: "Umbrella".to_owned(),
        points_cost: 100,
        stock_quantity: stock,
    })
    .expect("valid reward");
    let id = reward.id();
    store.insert_reward(reward);
    id
}

fn credit(customer_id: CustomerId, amount: u32) -> LedgerEntry {
    credit_points(customer_id, Points::from(amount))
}

fn credit_points(customer_id: CustomerId, amount: Points) -> LedgerEntry {
    LedgerEntry::credit(
        customer_id,
        amount,
        "Welcome bonus",
        LedgerReference {
            module: "AWARD".to_owned(),
            id: Uuid::new_v4(),
            code: "WELCOME".to_owned(),
        },
        Utc::now(),
    )
    .expect("valid credit")
}

fn pending(customer_id: CustomerId, reward_id: RewardId) -> RedemptionRecord {
    let now = Utc::now();
    RedemptionRecord::pending(
        customer_id,
        reward_id,
        100,
        RedemptionCode::generate(now),
        now,
    )
}

#[rstest]
#[tokio::test]
async fn staged_writes_are_invisible_until_commit(store: InMemoryPointsStore) {
    let customer = CustomerId::random();
    let mut tx = store.begin().await.expect("begin");
    store
        .append_entry(&mut tx, &credit(customer, 150))
        .await
        .expect("append");

    let inside = store
        .balance_for_update(&mut tx, &customer)
        .await
        .expect("locked balance");
    let outside = store
        .balance_read_only(&customer)
        .await
        .expect("read-only balance");
    assert_eq!(inside, Points::from(150_u32));
    assert_eq!(outside, Points::ZERO);

    store.commit(tx).await.expect("commit");
    assert_eq!(
        store.balance_read_only(&customer).await.expect("balance"),
        Points::from(150_u32)
    );
}

#[rstest]
#[tokio::test]
async fn overflowing_balances_are_reported_not_panicked(store: InMemoryPointsStore) {
    let customer = CustomerId::random();
    let mut seed = store.begin().await.expect("begin");
    for _ in 0..2 {
        store
            .append_entry(&mut seed, &credit_points(customer, Points::new(Decimal::MAX)))
            .await
            .expect("append");
    }
    store.commit(seed).await.expect("commit");

    let read_only = store
        .balance_read_only(&customer)
        .await
        .expect_err("read-only balance overflows");
    assert!(matches!(read_only, PointsPersistenceError::Query { .. }));

    let mut tx = store.begin().await.expect("begin");
    let locked = store
        .balance_for_update(&mut tx, &customer)
        .await
        .expect_err("locked balance overflows");
    assert!(matches!(locked, PointsPersistenceError::Query { .. }));
}

#[rstest]
#[tokio::test]
async fn rollback_discards_every_staged_write(store: InMemoryPointsStore) {
    let customer = CustomerId::random();
    let reward_id = seed_reward(&store, 1);

    let mut tx = store.begin().await.expect("begin");
    store
        .append_entry(&mut tx, &credit(customer, 10))
        .await
        .expect("append");
    store
        .decrement_stock_if_positive(&mut tx, &reward_id)
        .await
        .expect("decrement");
    store
        .create(&mut tx, &pending(customer, reward_id))
        .await
        .expect("create");
    store.rollback(tx).await.expect("rollback");

    assert!(store.ledger_entries(&customer).is_empty());
    assert_eq!(store.redemption_count(), 0);
    assert_eq!(
        store.reward(&reward_id).expect("reward").stock_quantity(),
        1
    );
}

#[rstest]
#[tokio::test]
async fn decrement_reports_no_matching_row_at_zero(store: InMemoryPointsStore) {
    let reward_id = seed_reward(&store, 1);
    let mut tx = store.begin().await.expect("begin");

    let first = store
        .decrement_stock_if_positive(&mut tx, &reward_id)
        .await
        .expect("first decrement");
    let second = store
        .decrement_stock_if_positive(&mut tx, &reward_id)
        .await
        .expect("second decrement");

    assert_eq!(first, StockUpdate::Applied);
    assert_eq!(second, StockUpdate::NoMatchingRow);
}

#[rstest]
#[tokio::test]
async fn soft_deleted_rewards_are_invisible(store: InMemoryPointsStore) {
    let reward_id = seed_reward(&store, 5);
    assert!(store.soft_delete_reward(&reward_id));

    let mut tx = store.begin().await.expect("begin");
    let found = store
        .get_for_update(&mut tx, &reward_id)
        .await
        .expect("lookup");
    let decrement = store
        .decrement_stock_if_positive(&mut tx, &reward_id)
        .await
        .expect("decrement");

    assert!(found.is_none());
    assert_eq!(decrement, StockUpdate::NoMatchingRow);
}

#[rstest]
#[tokio::test]
async fn increment_of_unknown_reward_matches_nothing(store: InMemoryPointsStore) {
    let mut tx = store.begin().await.expect("begin");
    let outcome = store
        .increment_stock(&mut tx, &RewardId::random())
        .await
        .expect("increment");
    assert_eq!(outcome, StockUpdate::NoMatchingRow);
}

#[rstest]
#[tokio::test]
async fn duplicate_redemption_code_conflicts(store: InMemoryPointsStore) {
    let customer = CustomerId::random();
    let reward_id = seed_reward(&store, 5);
    let record = pending(customer, reward_id);

    let mut tx = store.begin().await.expect("begin");
    store.create(&mut tx, &record).await.expect("first insert");
    store.commit(tx).await.expect("commit");

    let mut clash = pending(customer, reward_id);
    clash.redemption_code = record.redemption_code.clone();
    let mut tx = store.begin().await.expect("begin");
    let err = store
        .create(&mut tx, &clash)
        .await
        .expect_err("duplicate code");
    assert!(matches!(err, PointsPersistenceError::Conflict { .. }));
}

#[rstest]
#[tokio::test]
async fn find_for_update_sees_own_staged_update(store: InMemoryPointsStore) {
    let record = pending(CustomerId::random(), seed_reward(&store, 1));
    let mut tx = store.begin().await.expect("begin");
    store.create(&mut tx, &record).await.expect("create");
    store.commit(tx).await.expect("commit");

    let mut tx = store.begin().await.expect("begin");
    let approved = record.clone().with_status(RedemptionStatus::Approved, Utc::now());
    store.update(&mut tx, &approved).await.expect("update");
    let seen = store
        .find_for_update(&mut tx, &record.id)
        .await
        .expect("lookup")
        .expect("record exists");
    let committed = store
        .find_by_id(&record.id)
        .await
        .expect("lookup")
        .expect("record exists");

    assert_eq!(seen.status, RedemptionStatus::Approved);
    assert_eq!(committed.status, RedemptionStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_record_fails(store: InMemoryPointsStore) {
    let record = pending(CustomerId::random(), RewardId::random());
    let mut tx = store.begin().await.expect("begin");
    let err = store
        .update(&mut tx, &record)
        .await
        .expect_err("unknown record");
    assert!(matches!(err, PointsPersistenceError::Query { .. }));
}

#[rstest]
#[tokio::test]
async fn reward_lock_blocks_second_transaction(store: InMemoryPointsStore) {
    let reward_id = seed_reward(&store, 1);
    let mut holder = store.begin().await.expect("begin");
    store
        .get_for_update(&mut holder, &reward_id)
        .await
        .expect("lock");

    let contender = {
        let store = store.clone();
        tokio::spawn(async move {
            let mut tx = store.begin().await.expect("begin");
            store
                .get_for_update(&mut tx, &reward_id)
                .await
                .expect("lock")
                .map(|reward| reward.stock_quantity())
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!contender.is_finished());

    store
        .decrement_stock_if_positive(&mut holder, &reward_id)
        .await
        .expect("decrement");
    store.commit(holder).await.expect("commit");

    let observed = tokio::time::timeout(Duration::from_secs(1), contender)
        .await
        .expect("contender proceeds")
        .expect("task joins");
    assert_eq!(observed, Some(0));
}

#[rstest]
#[tokio::test]
async fn listings_are_newest_first_and_paginated(store: InMemoryPointsStore) {
    let customer = CustomerId::random();
    let reward_id = seed_reward(&store, 10);
    let base = Utc::now();

    let mut tx = store.begin().await.expect("begin");
    for offset in 0..3 {
        let mut record = pending(customer, reward_id);
        record.created_at = base + ChronoDuration::seconds(offset);
        store.create(&mut tx, &record).await.expect("create");
    }
    store
        .create(&mut tx, &pending(CustomerId::random(), reward_id))
        .await
        .expect("other customer");
    store.commit(tx).await.expect("commit");

    let filter = RedemptionFilter {
        customer_id: Some(customer),
        status: None,
    };
    let first = store
        .list(&filter, PageRequest::new(2, 0))
        .await
        .expect("first page");
    assert_eq!(first.total, 3);
    assert_eq!(first.items.len(), 2);
    assert!(first.items[0].created_at > first.items[1].created_at);
    assert!(first.next_cursor.is_some());

    let second = store
        .list(&filter, PageRequest::new(2, 2))
        .await
        .expect("second page");
    assert_eq!(second.items.len(), 1);
    assert!(second.next_cursor.is_none());
}

#[rstest]
#[tokio::test]
async fn ledger_listing_is_newest_first(store: InMemoryPointsStore) {
    let customer = CustomerId::random();
    let mut tx = store.begin().await.expect("begin");
    for amount in [10, 20, 30] {
        store
            .append_entry(&mut tx, &credit(customer, amount))
            .await
            .expect("append");
    }
    store.commit(tx).await.expect("commit");

    let page = store
        .list_entries(&customer, PageRequest::default())
        .await
        .expect("entries");
    let amounts: Vec<Points> = page.items.iter().map(LedgerEntry::amount).collect();
    assert_eq!(page.total, 3);
    assert_eq!(amounts[0], Points::from(30_u32));
}
