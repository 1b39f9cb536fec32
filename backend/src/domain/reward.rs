//! Reward catalogue items.

use serde::Serialize;

use super::{Points, RewardId};

/// Validation errors for catalogue items.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewardValidationError {
    /// The reward name was blank.
    #[error("reward name must not be empty")]
    EmptyName,
    /// Rewards must cost at least one point.
    #[error("reward points cost must be positive")]
    NonPositiveCost,
}

/// Input payload for [`RewardCatalogItem::new`].
#[derive(Debug, Clone)]
pub struct RewardCatalogItemDraft {
    pub id: RewardId,
    pub name: String,
    pub points_cost: u32,
    pub stock_quantity: u32,
}

/// Redeemable catalogue item.
///
/// Soft-deleted items are never returned by the catalogue store, so an
/// instance of this type always describes a live reward.
///
/// # Examples
/// ```
/// use rewards_backend::domain::{RewardCatalogItem, RewardCatalogItemDraft, RewardId};
///
/// let reward = RewardCatalogItem::new(RewardCatalogItemDraft {
///     id: RewardId::random(),
///     name: "Coffee voucher".to_owned(),
///     points_cost: 100,
///     stock_quantity: 0,
/// })
/// .expect("valid reward");
/// assert!(!reward.is_in_stock());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardCatalogItem {
    id: RewardId,
    name: String,
    points_cost: u32,
    stock_quantity: u32,
}

impl RewardCatalogItem {
    /// Validate and build a catalogue item.
    pub fn new(draft: RewardCatalogItemDraft) -> Result<Self, RewardValidationError> {
        let RewardCatalogItemDraft {
            id,
            name,
            points_cost,
            stock_quantity,
        } = draft;
        if name.trim().is_empty() {
            return Err(RewardValidationError::EmptyName);
        }
        if points_cost == 0 {
            return Err(RewardValidationError::NonPositiveCost);
        }
        Ok(Self {
            id,
            name,
            points_cost,
            stock_quantity,
        })
    }

    #[must_use]
    pub fn id(&self) -> RewardId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Price of one unit in whole points.
    #[must_use]
    pub fn points_cost(&self) -> u32 {
        self.points_cost
    }

    /// Price as a ledger amount.
    #[must_use]
    pub fn cost(&self) -> Points {
        Points::from(self.points_cost)
    }

    #[must_use]
    pub fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    /// Whether at least one unit can still be allocated.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Copy of this item with a different stock level.
    #[must_use]
    pub fn with_stock_quantity(mut self, stock_quantity: u32) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }
}

/// Outcome of a conditional stock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    /// Exactly one row changed.
    Applied,
    /// No live row satisfied the update's guard.
    NoMatchingRow,
}
