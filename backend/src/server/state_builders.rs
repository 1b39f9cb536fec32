//! Builders wiring the domain services onto a concrete set of stores.

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use tracing::info;

use rewards_backend::domain::ports::{
    LedgerStore, RedemptionStore, RewardCatalogStore, UnitOfWork,
};
use rewards_backend::domain::{PointsLedgerService, RedemptionEngine, RedemptionQueryService};
use rewards_backend::inbound::http::state::HttpState;
use rewards_backend::outbound::memory::InMemoryPointsStore;
use rewards_backend::outbound::persistence::{
    DieselLedgerStore, DieselRedemptionStore, DieselRewardCatalogStore, DieselUnitOfWork,
};

use super::ServerConfig;

/// Stores sharing one transaction type.
struct Stores<U, L, C, R> {
    unit_of_work: Arc<U>,
    ledger: Arc<L>,
    catalog: Arc<C>,
    redemptions: Arc<R>,
}

fn wire<U, L, C, R>(
    stores: Stores<U, L, C, R>,
    clock: Arc<dyn Clock>,
    transaction_timeout: Option<Duration>,
) -> HttpState
where
    U: UnitOfWork + 'static,
    U::Transaction: 'static,
    L: LedgerStore<Transaction = U::Transaction> + 'static,
    C: RewardCatalogStore<Transaction = U::Transaction> + 'static,
    R: RedemptionStore<Transaction = U::Transaction> + 'static,
{
    let Stores {
        unit_of_work,
        ledger,
        catalog,
        redemptions,
    } = stores;

    let mut engine = RedemptionEngine::new(
        Arc::clone(&unit_of_work),
        Arc::clone(&ledger),
        catalog,
        Arc::clone(&redemptions),
        Arc::clone(&clock),
    );
    if let Some(timeout) = transaction_timeout {
        engine = engine.with_transaction_timeout(timeout);
    }
    let points = Arc::new(PointsLedgerService::new(unit_of_work, ledger, clock));

    HttpState::new(
        Arc::new(engine),
        Arc::new(RedemptionQueryService::new(redemptions)),
        points.clone(),
        points,
    )
}

/// Build handler state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
pub(super) fn build_http_state(config: &ServerConfig) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match &config.db_pool {
        Some(pool) => {
            info!("serving from PostgreSQL");
            wire(
                Stores {
                    unit_of_work: Arc::new(DieselUnitOfWork::new(pool.clone())),
                    ledger: Arc::new(DieselLedgerStore::new(pool.clone())),
                    catalog: Arc::new(DieselRewardCatalogStore::new(pool.clone())),
                    redemptions: Arc::new(DieselRedemptionStore::new(pool.clone())),
                },
                clock,
                config.transaction_timeout,
            )
        }
        None => {
            info!("no database configured; serving from the in-memory store");
            let store = Arc::new(InMemoryPointsStore::default());
            wire(
                Stores {
                    unit_of_work: Arc::clone(&store),
                    ledger: Arc::clone(&store),
                    catalog: Arc::clone(&store),
                    redemptions: store,
                },
                clock,
                config.transaction_timeout,
            )
        }
    }
}
