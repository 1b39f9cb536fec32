//! Clock and catalogue fixtures shared by the points service tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{RewardCatalogItem, RewardCatalogItemDraft, RewardId};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub(crate) struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub(crate) fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    pub(crate) fn advance_seconds(&self, seconds: i64) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(MutableClock::new(fixture_timestamp()))
}

pub(crate) fn reward(name: &str, points_cost: u32, stock_quantity: u32) -> RewardCatalogItem {
    RewardCatalogItem::new(RewardCatalogItemDraft {
        id: RewardId::random(),
        name: name.to_owned(),
        points_cost,
        stock_quantity,
    })
    .expect("valid reward")
}
