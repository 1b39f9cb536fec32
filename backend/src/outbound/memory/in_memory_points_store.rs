//! Transactional in-process adapter for the points stores.
//!
//! Used when no database is configured and by tests. A transaction holds the
//! row locks it acquired and a list of staged writes; reads inside the
//! transaction see committed state plus its own staged writes. Commit
//! applies the staged writes in one critical section, and dropping the
//! transaction discards them and releases its locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::domain::ports::{
    LedgerStore, PointsPersistenceError, RedemptionStore, RewardCatalogStore, UnitOfWork,
};
use crate::domain::{
    CustomerId, LedgerEntry, LedgerEntryId, Points, RedemptionFilter, RedemptionId,
    RedemptionRecord, RewardCatalogItem, RewardId, StockUpdate,
};

use super::row_locks::{LockKey, RowLocks};

#[derive(Debug, Clone)]
struct StoredReward {
    item: RewardCatalogItem,
    deleted: bool,
}

#[derive(Debug, Default)]
struct Tables {
    rewards: HashMap<RewardId, StoredReward>,
    ledger: Vec<LedgerEntry>,
    redemptions: HashMap<RedemptionId, RedemptionRecord>,
}

#[derive(Debug)]
enum StagedWrite {
    Entry(LedgerEntry),
    Stock { reward_id: RewardId, delta: i64 },
    InsertRedemption(RedemptionRecord),
    UpdateRedemption(RedemptionRecord),
}

/// Transaction handle for [`InMemoryPointsStore`].
#[derive(Default)]
pub struct InMemoryTransaction {
    guards: HashMap<LockKey, OwnedMutexGuard<()>>,
    staged: Vec<StagedWrite>,
}

impl InMemoryTransaction {
    fn staged_entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.staged.iter().filter_map(|write| match write {
            StagedWrite::Entry(entry) => Some(entry),
            _ => None,
        })
    }

    fn stock_delta(&self, reward_id: &RewardId) -> i64 {
        self.staged
            .iter()
            .filter_map(|write| match write {
                StagedWrite::Stock {
                    reward_id: id,
                    delta,
                } if id == reward_id => Some(*delta),
                _ => None,
            })
            .sum()
    }

    fn staged_redemption(&self, id: &RedemptionId) -> Option<&RedemptionRecord> {
        self.staged.iter().rev().find_map(|write| match write {
            StagedWrite::InsertRedemption(record) | StagedWrite::UpdateRedemption(record)
                if &record.id == id =>
            {
                Some(record)
            }
            _ => None,
        })
    }

    fn staged_codes(&self) -> impl Iterator<Item = &str> {
        self.staged.iter().filter_map(|write| match write {
            StagedWrite::InsertRedemption(record) => Some(record.redemption_code.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Default)]
struct Shared {
    tables: Mutex<Tables>,
    locks: RowLocks,
}

/// In-memory implementation of every points port.
///
/// Cloning shares the underlying tables.
///
/// # Examples
/// ```
/// use rewards_backend::domain::{RewardCatalogItem, RewardCatalogItemDraft, RewardId};
/// use rewards_backend::outbound::memory::InMemoryPointsStore;
///
/// let store = InMemoryPointsStore::default();
/// let reward = RewardCatalogItem::new(RewardCatalogItemDraft {
///     id: RewardId::random(),
///     name: "Fleece".to_owned(),
///     points_cost: 500,
///     stock_quantity: 2,
/// })
/// .expect("valid reward");
/// store.insert_reward(reward.clone());
/// assert_eq!(store.reward(&reward.id()), Some(reward));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryPointsStore {
    shared: Arc<Shared>,
}

impl InMemoryPointsStore {
    /// Insert or replace a catalogue item as committed state.
    pub fn insert_reward(&self, reward: RewardCatalogItem) {
        self.tables().rewards.insert(
            reward.id(),
            StoredReward {
                item: reward,
                deleted: false,
            },
        );
    }

    /// Soft-delete a catalogue item. Returns whether it existed.
    pub fn soft_delete_reward(&self, reward_id: &RewardId) -> bool {
        self.tables()
            .rewards
            .get_mut(reward_id)
            .map(|stored| stored.deleted = true)
            .is_some()
    }

    /// Committed state of a live catalogue item.
    pub fn reward(&self, reward_id: &RewardId) -> Option<RewardCatalogItem> {
        self.tables()
            .rewards
            .get(reward_id)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.item.clone())
    }

    /// Committed ledger entries of a customer in insertion order.
    pub fn ledger_entries(&self, customer_id: &CustomerId) -> Vec<LedgerEntry> {
        self.tables()
            .ledger
            .iter()
            .filter(|entry| &entry.customer_id() == customer_id)
            .cloned()
            .collect()
    }

    /// Number of committed redemption records.
    pub fn redemption_count(&self) -> usize {
        self.tables().redemptions.len()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.shared
            .tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn lock(&self, transaction: &mut InMemoryTransaction, key: LockKey) {
        if transaction.guards.contains_key(&key) {
            return;
        }
        let guard = self.shared.locks.acquire(key).await;
        debug!(?key, "in-memory row lock acquired");
        transaction.guards.insert(key, guard);
    }

    fn committed_balance(
        tables: &Tables,
        customer_id: &CustomerId,
    ) -> Result<Points, PointsPersistenceError> {
        let amounts = tables
            .ledger
            .iter()
            .filter(|entry| &entry.customer_id() == customer_id)
            .map(LedgerEntry::amount);
        Points::checked_sum(amounts).ok_or_else(|| balance_overflow(customer_id))
    }

    /// Live reward with the transaction's staged stock deltas applied.
    fn visible_reward(
        &self,
        transaction: &InMemoryTransaction,
        reward_id: &RewardId,
    ) -> Result<Option<RewardCatalogItem>, PointsPersistenceError> {
        let tables = self.tables();
        let Some(stored) = tables.rewards.get(reward_id).filter(|s| !s.deleted) else {
            return Ok(None);
        };
        let stock = apply_delta(
            stored.item.stock_quantity(),
            transaction.stock_delta(reward_id),
        )
        .ok_or_else(|| {
            PointsPersistenceError::query(format!("stock for reward {reward_id} out of range"))
        })?;
        Ok(Some(stored.item.clone().with_stock_quantity(stock)))
    }

    fn apply(&self, transaction: InMemoryTransaction) -> Result<(), PointsPersistenceError> {
        let mut tables = self.tables();

        let mut stock_changes: HashMap<RewardId, i64> = HashMap::new();
        for write in &transaction.staged {
            match write {
                StagedWrite::Stock { reward_id, delta } => {
                    *stock_changes.entry(*reward_id).or_default() += delta;
                }
                StagedWrite::InsertRedemption(record) => {
                    let taken = tables
                        .redemptions
                        .values()
                        .any(|existing| existing.redemption_code == record.redemption_code);
                    if taken {
                        return Err(PointsPersistenceError::conflict(format!(
                            "redemption code {} already exists",
                            record.redemption_code
                        )));
                    }
                }
                StagedWrite::Entry(_) | StagedWrite::UpdateRedemption(_) => {}
            }
        }

        let mut new_stock = Vec::with_capacity(stock_changes.len());
        for (reward_id, delta) in stock_changes {
            let current = tables
                .rewards
                .get(&reward_id)
                .map(|stored| stored.item.stock_quantity())
                .ok_or_else(|| {
                    PointsPersistenceError::query(format!("reward {reward_id} missing at commit"))
                })?;
            let stock = apply_delta(current, delta).ok_or_else(|| {
                PointsPersistenceError::query(format!(
                    "stock for reward {reward_id} would leave the valid range"
                ))
            })?;
            new_stock.push((reward_id, stock));
        }

        for (reward_id, stock) in new_stock {
            if let Some(stored) = tables.rewards.get_mut(&reward_id) {
                stored.item = stored.item.clone().with_stock_quantity(stock);
            }
        }
        for write in transaction.staged {
            match write {
                StagedWrite::Entry(entry) => tables.ledger.push(entry),
                StagedWrite::InsertRedemption(record) | StagedWrite::UpdateRedemption(record) => {
                    tables.redemptions.insert(record.id, record);
                }
                StagedWrite::Stock { .. } => {}
            }
        }
        Ok(())
    }
}

fn apply_delta(stock: u32, delta: i64) -> Option<u32> {
    u32::try_from(i64::from(stock).checked_add(delta)?).ok()
}

fn balance_overflow(customer_id: &CustomerId) -> PointsPersistenceError {
    PointsPersistenceError::query(format!("ledger balance for customer {customer_id} overflows"))
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let window = items.into_iter().skip(offset).take(limit).collect();
    Page::new(window, total, page)
}

#[async_trait]
impl UnitOfWork for InMemoryPointsStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Transaction, PointsPersistenceError> {
        Ok(InMemoryTransaction::default())
    }

    async fn commit(&self, transaction: Self::Transaction) -> Result<(), PointsPersistenceError> {
        self.apply(transaction)
    }

    async fn rollback(
        &self,
        transaction: Self::Transaction,
    ) -> Result<(), PointsPersistenceError> {
        drop(transaction);
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryPointsStore {
    type Transaction = InMemoryTransaction;

    async fn append_entry(
        &self,
        transaction: &mut Self::Transaction,
        entry: &LedgerEntry,
    ) -> Result<LedgerEntryId, PointsPersistenceError> {
        transaction.staged.push(StagedWrite::Entry(entry.clone()));
        Ok(entry.id())
    }

    async fn balance_for_update(
        &self,
        transaction: &mut Self::Transaction,
        customer_id: &CustomerId,
    ) -> Result<Points, PointsPersistenceError> {
        self.lock(transaction, LockKey::CustomerLedger(*customer_id.as_uuid()))
            .await;
        let committed = Self::committed_balance(&self.tables(), customer_id)?;
        let staged = transaction
            .staged_entries()
            .filter(|entry| &entry.customer_id() == customer_id)
            .map(LedgerEntry::amount);
        Points::checked_sum(std::iter::once(committed).chain(staged))
            .ok_or_else(|| balance_overflow(customer_id))
    }

    async fn balance_read_only(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Points, PointsPersistenceError> {
        Self::committed_balance(&self.tables(), customer_id)
    }

    async fn list_entries(
        &self,
        customer_id: &CustomerId,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, PointsPersistenceError> {
        let mut entries: Vec<LedgerEntry> = self
            .tables()
            .ledger
            .iter()
            .rev()
            .filter(|entry| &entry.customer_id() == customer_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(paginate(entries, page))
    }
}

#[async_trait]
impl RewardCatalogStore for InMemoryPointsStore {
    type Transaction = InMemoryTransaction;

    async fn get_for_update(
        &self,
        transaction: &mut Self::Transaction,
        reward_id: &RewardId,
    ) -> Result<Option<RewardCatalogItem>, PointsPersistenceError> {
        self.lock(transaction, LockKey::Reward(*reward_id.as_uuid()))
            .await;
        self.visible_reward(transaction, reward_id)
    }

    async fn decrement_stock_if_positive(
        &self,
        transaction: &mut Self::Transaction,
        reward_id: &RewardId,
    ) -> Result<StockUpdate, PointsPersistenceError> {
        self.lock(transaction, LockKey::Reward(*reward_id.as_uuid()))
            .await;
        match self.visible_reward(transaction, reward_id)? {
            Some(reward) if reward.is_in_stock() => {
                transaction.staged.push(StagedWrite::Stock {
                    reward_id: *reward_id,
                    delta: -1,
                });
                Ok(StockUpdate::Applied)
            }
            _ => Ok(StockUpdate::NoMatchingRow),
        }
    }

    async fn increment_stock(
        &self,
        transaction: &mut Self::Transaction,
        reward_id: &RewardId,
    ) -> Result<StockUpdate, PointsPersistenceError> {
        self.lock(transaction, LockKey::Reward(*reward_id.as_uuid()))
            .await;
        if !self.tables().rewards.contains_key(reward_id) {
            return Ok(StockUpdate::NoMatchingRow);
        }
        transaction.staged.push(StagedWrite::Stock {
            reward_id: *reward_id,
            delta: 1,
        });
        Ok(StockUpdate::Applied)
    }
}

#[async_trait]
impl RedemptionStore for InMemoryPointsStore {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        transaction: &mut Self::Transaction,
        record: &RedemptionRecord,
    ) -> Result<RedemptionRecord, PointsPersistenceError> {
        let code = record.redemption_code.as_str();
        let taken = {
            let tables = self.tables();
            tables.redemptions.contains_key(&record.id)
                || tables
                    .redemptions
                    .values()
                    .any(|existing| existing.redemption_code.as_str() == code)
        } || transaction.staged_codes().any(|staged| staged == code);
        if taken {
            return Err(PointsPersistenceError::conflict(format!(
                "redemption {} or code {code} already exists",
                record.id
            )));
        }
        transaction
            .staged
            .push(StagedWrite::InsertRedemption(record.clone()));
        Ok(record.clone())
    }

    async fn update(
        &self,
        transaction: &mut Self::Transaction,
        record: &RedemptionRecord,
    ) -> Result<RedemptionRecord, PointsPersistenceError> {
        let exists = transaction.staged_redemption(&record.id).is_some()
            || self.tables().redemptions.contains_key(&record.id);
        if !exists {
            return Err(PointsPersistenceError::query(format!(
                "redemption {} not found for update",
                record.id
            )));
        }
        transaction
            .staged
            .push(StagedWrite::UpdateRedemption(record.clone()));
        Ok(record.clone())
    }

    async fn find_for_update(
        &self,
        transaction: &mut Self::Transaction,
        id: &RedemptionId,
    ) -> Result<Option<RedemptionRecord>, PointsPersistenceError> {
        self.lock(transaction, LockKey::Redemption(*id.as_uuid()))
            .await;
        if let Some(staged) = transaction.staged_redemption(id) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.tables().redemptions.get(id).cloned())
    }

    async fn find_by_id(
        &self,
        id: &RedemptionId,
    ) -> Result<Option<RedemptionRecord>, PointsPersistenceError> {
        Ok(self.tables().redemptions.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &RedemptionFilter,
        page: PageRequest,
    ) -> Result<Page<RedemptionRecord>, PointsPersistenceError> {
        let mut records: Vec<RedemptionRecord> = self
            .tables()
            .redemptions
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(paginate(records, page))
    }
}

#[cfg(test)]
#[path = "in_memory_points_store_tests.rs"]
mod tests;
