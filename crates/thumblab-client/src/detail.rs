//! DetailLoader — cancellable per-identifier fetch for modal and detail
//! views.
//!
//! Exactly one request is live per loader. Loading a new id (or closing
//! the view) supersedes the old request: its task is aborted, and an
//! epoch check stops a response that already left the wire from writing
//! anything — no state, no notices.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use thumblab_core::errors::ApiError;
use thumblab_core::models::{CommunityListing, Thumbnail};
use thumblab_core::traits::IApiTransport;

use crate::effects::EffectBus;

/// Fetches the item behind an identifier.
#[async_trait]
pub trait IDetailFetcher: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn fetch(&self, id: &str) -> Result<Self::Item, ApiError>;
}

/// What the owning view currently sees.
#[derive(Debug, Clone)]
pub struct LoaderSnapshot<T: Clone> {
    pub loading: bool,
    pub item: Option<T>,
    /// Set when the identifier resolved to nothing; the view should close.
    pub not_found: bool,
}

impl<T: Clone> Default for LoaderSnapshot<T> {
    fn default() -> Self {
        Self {
            loading: false,
            item: None,
            not_found: false,
        }
    }
}

pub struct DetailLoader<F: IDetailFetcher> {
    fetcher: Arc<F>,
    effects: EffectBus,
    state: Arc<watch::Sender<LoaderSnapshot<F::Item>>>,
    epoch: Arc<AtomicU64>,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl<F: IDetailFetcher> DetailLoader<F> {
    pub fn new(fetcher: F, effects: EffectBus) -> Self {
        let (state, _) = watch::channel(LoaderSnapshot::default());
        Self {
            fetcher: Arc::new(fetcher),
            effects,
            state: Arc::new(state),
            epoch: Arc::new(AtomicU64::new(0)),
            inflight: Mutex::new(None),
        }
    }

    /// Begin fetching `id`, cancelling any in-flight request first.
    pub fn load(&self, id: &str) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_inflight();
        self.state.send_replace(LoaderSnapshot {
            loading: true,
            item: None,
            not_found: false,
        });

        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        let epochs = Arc::clone(&self.epoch);
        let effects = self.effects.clone();
        let id = id.to_string();

        let handle = tokio::spawn(async move {
            let result = fetcher.fetch(&id).await;

            // Superseded while we were on the wire: no writes, no notices.
            if epochs.load(Ordering::SeqCst) != epoch {
                return;
            }

            match result {
                Ok(item) => {
                    state.send_replace(LoaderSnapshot {
                        loading: false,
                        item: Some(item),
                        not_found: false,
                    });
                }
                Err(ApiError::Rejected { .. }) | Err(ApiError::Malformed { .. }) => {
                    tracing::debug!(id = %id, "detail: not found");
                    effects.error("Design listing not found.");
                    state.send_replace(LoaderSnapshot {
                        loading: false,
                        item: None,
                        not_found: true,
                    });
                }
                Err(e) => {
                    tracing::warn!("detail: load failed: {e}");
                    effects.error("Error loading design details");
                    state.send_replace(LoaderSnapshot {
                        loading: false,
                        item: None,
                        not_found: false,
                    });
                }
            }
        });

        if let Ok(mut inflight) = self.inflight.lock() {
            *inflight = Some(handle);
        }
    }

    /// The view closed: cancel any in-flight request and reset.
    pub fn close(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.abort_inflight();
        self.state.send_replace(LoaderSnapshot::default());
    }

    pub fn snapshot(&self) -> LoaderSnapshot<F::Item> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoaderSnapshot<F::Item>> {
        self.state.subscribe()
    }

    fn abort_inflight(&self) {
        if let Ok(mut inflight) = self.inflight.lock() {
            if let Some(handle) = inflight.take() {
                handle.abort();
            }
        }
    }
}

impl<F: IDetailFetcher> Drop for DetailLoader<F> {
    fn drop(&mut self) {
        self.abort_inflight();
    }
}

/// Unwrap the `{ "data": ... }` envelope some endpoints use; others return
/// the object directly.
fn unwrap_data(value: serde_json::Value) -> serde_json::Value {
    match value.get("data") {
        Some(inner) => inner.clone(),
        None => value,
    }
}

/// Plain thumbnail detail, as shown on the generation result view.
pub struct ThumbnailDetailFetcher {
    transport: Arc<dyn IApiTransport>,
}

impl ThumbnailDetailFetcher {
    pub fn new(transport: Arc<dyn IApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl IDetailFetcher for ThumbnailDetailFetcher {
    type Item = Thumbnail;

    async fn fetch(&self, id: &str) -> Result<Thumbnail, ApiError> {
        let value = self
            .transport
            .get_json(&format!("/api/thumbnail/generate/{id}"))
            .await?;
        serde_json::from_value(unwrap_data(value)).map_err(|e| ApiError::Malformed {
            reason: e.to_string(),
        })
    }
}

/// A community listing joined with its underlying render. The listing id
/// is the marketplace id; the thumbnail comes from a chained second fetch.
#[derive(Debug, Clone)]
pub struct ListingDetail {
    pub listing: CommunityListing,
    pub thumbnail: Thumbnail,
}

pub struct ListingDetailFetcher {
    transport: Arc<dyn IApiTransport>,
}

impl ListingDetailFetcher {
    pub fn new(transport: Arc<dyn IApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl IDetailFetcher for ListingDetailFetcher {
    type Item = ListingDetail;

    async fn fetch(&self, id: &str) -> Result<ListingDetail, ApiError> {
        let listing_value = self
            .transport
            .get_json(&format!("/api/community/rank/{id}"))
            .await?;
        let listing: CommunityListing =
            serde_json::from_value(unwrap_data(listing_value)).map_err(|e| {
                ApiError::Malformed {
                    reason: e.to_string(),
                }
            })?;

        let thumb_value = self
            .transport
            .get_json(&format!("/api/generate/{}", listing.thumbnail_id))
            .await?;
        let thumbnail: Thumbnail =
            serde_json::from_value(unwrap_data(thumb_value)).map_err(|e| ApiError::Malformed {
                reason: e.to_string(),
            })?;

        Ok(ListingDetail { listing, thumbnail })
    }
}
