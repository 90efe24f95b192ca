//! CreditCache — read-through mirror of the server-side credit ledger.
//!
//! The balance is only ever replaced wholesale by a server response or
//! cleared; there is no optimistic arithmetic anywhere. Overlapping
//! refreshes are safe: the last response to land wins.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use thumblab_core::models::CreditBalance;
use thumblab_core::traits::IApiTransport;

const BALANCE_PATH: &str = "/api/credits/user-credits";

pub struct CreditCache {
    transport: Arc<dyn IApiTransport>,
    balance: watch::Sender<Option<CreditBalance>>,
}

impl CreditCache {
    pub fn new(transport: Arc<dyn IApiTransport>) -> Self {
        let (balance, _) = watch::channel(None);
        Self { transport, balance }
    }

    /// Subscribe to balance changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<CreditBalance>> {
        self.balance.subscribe()
    }

    /// Cloned snapshot of the cached balance.
    pub fn snapshot(&self) -> Option<CreditBalance> {
        self.balance.borrow().clone()
    }

    /// Re-pull the balance from the ledger.
    ///
    /// On success the whole balance is replaced; on any failure it is set
    /// absent — never partially updated. Returns the freshly applied value.
    pub async fn refresh(&self) -> Option<CreditBalance> {
        match self.transport.get_json(BALANCE_PATH).await {
            Ok(value) => match serde_json::from_value::<CreditBalance>(value) {
                Ok(fresh) => {
                    tracing::debug!(credits = fresh.credits, "credits: refreshed");
                    self.balance.send_replace(Some(fresh.clone()));
                    Some(fresh)
                }
                Err(e) => {
                    tracing::warn!("credits: unexpected balance shape: {e}");
                    self.balance.send_replace(None);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("credits: refresh failed: {e}");
                self.balance.send_replace(None);
                None
            }
        }
    }

    /// Forget the cached balance (logout, account deletion).
    pub fn clear(&self) {
        self.balance.send_replace(None);
    }

    /// Fail-closed funds pre-check: a fresh pull, not the cache.
    ///
    /// Only a confirmed positive balance passes; any failure to confirm
    /// counts as "no funds". Does not touch the cached value.
    pub async fn has_funds(&self) -> bool {
        match self.transport.get_json(BALANCE_PATH).await {
            Ok(value) => value
                .get("credits")
                .and_then(Value::as_u64)
                .map(|credits| credits > 0)
                .unwrap_or(false),
            Err(e) => {
                tracing::debug!("credits: funds pre-check failed: {e}");
                false
            }
        }
    }
}
