//! Resend cooldown — a client-side 1 Hz countdown.
//!
//! Purely cosmetic spam protection: the server-enforced OTP validity
//! window is authoritative and this timer never reflects it. The ticker
//! task is aborted when the owning flow is dropped, so no callbacks
//! outlive their view.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct CooldownTimer {
    remaining: Arc<watch::Sender<u64>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl CooldownTimer {
    pub fn new() -> Self {
        let (remaining, _) = watch::channel(0);
        Self {
            remaining: Arc::new(remaining),
            ticker: Mutex::new(None),
        }
    }

    /// One countdown step. Saturating: the remaining time never goes
    /// negative.
    pub fn next(value: u64) -> u64 {
        value.saturating_sub(1)
    }

    /// Restart the countdown at `secs`, replacing any running ticker.
    pub fn start(&self, secs: u64) {
        self.stop_ticker();
        self.remaining.send_replace(secs);
        if secs == 0 {
            return;
        }

        let remaining = Arc::clone(&self.remaining);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let mut done = false;
                remaining.send_modify(|v| {
                    *v = CooldownTimer::next(*v);
                    done = *v == 0;
                });
                if done {
                    break;
                }
            }
        });
        if let Ok(mut ticker) = self.ticker.lock() {
            *ticker = Some(handle);
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        *self.remaining.borrow()
    }

    /// Whether a resend is currently permitted.
    pub fn is_idle(&self) -> bool {
        self.remaining_secs() == 0
    }

    /// Subscribe to countdown updates (for a "Resend in Ns" label).
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.subscribe()
    }

    fn stop_ticker(&self) {
        if let Ok(mut ticker) = self.ticker.lock() {
            if let Some(handle) = ticker.take() {
                handle.abort();
            }
        }
    }
}

impl Default for CooldownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CooldownTimer {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
