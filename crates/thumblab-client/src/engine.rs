//! StudioEngine — owns the stores and wires them together.
//!
//! The one cross-store reaction lives here: a task watching the session
//! channel refreshes the credit cache when a user appears and clears it
//! when the user goes away. SessionStore itself stays ignorant of
//! credits.

use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use thumblab_core::config::ClientConfig;
use thumblab_core::errors::{ClientError, ClientResult};
use thumblab_core::traits::IApiTransport;

use crate::account::AccountManager;
use crate::billing::BillableActionExecutor;
use crate::credits::CreditCache;
use crate::detail::{DetailLoader, ListingDetailFetcher, ThumbnailDetailFetcher};
use crate::effects::{EffectBus, Route, UiEvent};
use crate::registration::RegistrationFlow;
use crate::session::{Session, SessionStore};
use crate::transport::HttpApi;

pub struct StudioEngine {
    transport: Arc<dyn IApiTransport>,
    session: Arc<SessionStore>,
    credits: Arc<CreditCache>,
    billing: BillableActionExecutor,
    registration: RegistrationFlow,
    account: AccountManager,
    effects: EffectBus,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl StudioEngine {
    /// Build the engine against the real HTTP transport. Returns the
    /// engine and the effect stream the shell should drain.
    pub fn new(config: &ClientConfig) -> ClientResult<(Self, UnboundedReceiver<UiEvent>)> {
        let transport: Arc<dyn IApiTransport> =
            Arc::new(HttpApi::new(config).map_err(ClientError::Api)?);
        Ok(Self::with_transport(transport))
    }

    /// Build the engine on any transport. This is the seam tests use.
    pub fn with_transport(
        transport: Arc<dyn IApiTransport>,
    ) -> (Self, UnboundedReceiver<UiEvent>) {
        let (effects, events) = EffectBus::new();
        let session = Arc::new(SessionStore::new(Arc::clone(&transport)));
        let credits = Arc::new(CreditCache::new(Arc::clone(&transport)));
        let billing = BillableActionExecutor::new(
            Arc::clone(&transport),
            Arc::clone(&credits),
            effects.clone(),
        );
        let registration = RegistrationFlow::new(
            Arc::clone(&transport),
            Arc::clone(&session),
            Arc::clone(&credits),
            effects.clone(),
        );
        let account = AccountManager::new(
            Arc::clone(&transport),
            Arc::clone(&session),
            Arc::clone(&credits),
            effects.clone(),
        );

        let watcher = tokio::spawn(watch_session(session.subscribe(), Arc::clone(&credits)));

        let engine = Self {
            transport,
            session,
            credits,
            billing,
            registration,
            account,
            effects,
            watcher: Mutex::new(Some(watcher)),
        };
        (engine, events)
    }

    /// Resolve the session once at startup.
    pub async fn bootstrap(&self) {
        self.session.bootstrap().await;
    }

    /// Server logout, then unconditional local teardown — a failed server
    /// call must not leave a dead session behind.
    pub async fn sign_out(&self) {
        match self.transport.post_json("/api/auth/logout", json!({})).await {
            Ok(_) => {
                self.effects.success("Logged out successfully");
            }
            Err(e) => {
                tracing::warn!("engine: server logout failed: {e}");
                self.effects.error("Session ended");
            }
        }
        self.session.logout();
        self.credits.clear();
        self.effects.redirect(Route::Login);
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn credits(&self) -> &Arc<CreditCache> {
        &self.credits
    }

    pub fn billing(&self) -> &BillableActionExecutor {
        &self.billing
    }

    pub fn registration(&self) -> &RegistrationFlow {
        &self.registration
    }

    pub fn account(&self) -> &AccountManager {
        &self.account
    }

    pub fn effects(&self) -> &EffectBus {
        &self.effects
    }

    /// Loader for a community listing's detail modal.
    pub fn listing_detail_loader(&self) -> DetailLoader<ListingDetailFetcher> {
        DetailLoader::new(
            ListingDetailFetcher::new(Arc::clone(&self.transport)),
            self.effects.clone(),
        )
    }

    /// Loader for the generation result view.
    pub fn thumbnail_detail_loader(&self) -> DetailLoader<ThumbnailDetailFetcher> {
        DetailLoader::new(
            ThumbnailDetailFetcher::new(Arc::clone(&self.transport)),
            self.effects.clone(),
        )
    }
}

impl Drop for StudioEngine {
    fn drop(&mut self) {
        if let Ok(mut watcher) = self.watcher.lock() {
            if let Some(handle) = watcher.take() {
                handle.abort();
            }
        }
    }
}

/// React to user transitions: refresh credits when a user appears, drop
/// them when the user goes away.
async fn watch_session(mut sessions: watch::Receiver<Session>, credits: Arc<CreditCache>) {
    let mut had_user = sessions.borrow().user.is_some();
    while sessions.changed().await.is_ok() {
        let has_user = sessions.borrow().user.is_some();
        match (had_user, has_user) {
            (false, true) => {
                tracing::debug!("engine: user appeared, refreshing credits");
                credits.refresh().await;
            }
            (true, false) => {
                tracing::debug!("engine: user gone, clearing credits");
                credits.clear();
            }
            _ => {}
        }
        had_user = has_user;
    }
}
