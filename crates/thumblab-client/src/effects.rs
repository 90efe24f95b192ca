//! UI side effects — toasts and redirects — delivered over a channel so
//! they stay serialized with the network completions that caused them.
//!
//! Senders never fail: once the consuming view is gone, an emit is a no-op
//! rather than an error.

use tokio::sync::mpsc;
use uuid::Uuid;

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
    /// A spinner-style notice, later replaced in place via its id.
    Loading,
}

/// A single toast. `replaces` points at an earlier (usually loading)
/// notice this one should take the place of.
#[derive(Debug, Clone)]
pub struct Notice {
    pub id: Uuid,
    pub severity: Severity,
    pub text: String,
    pub replaces: Option<Uuid>,
}

/// Navigation targets the engine may request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Generate,
    ThumbnailResult(String),
    Pricing,
}

/// An effect for the shell to apply.
#[derive(Debug, Clone)]
pub enum UiEvent {
    Toast(Notice),
    Redirect(Route),
}

/// Cloneable sender half of the effect channel.
#[derive(Debug, Clone)]
pub struct EffectBus {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl EffectBus {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn success(&self, text: impl Into<String>) -> Uuid {
        self.toast(Severity::Success, text, None)
    }

    pub fn error(&self, text: impl Into<String>) -> Uuid {
        self.toast(Severity::Error, text, None)
    }

    pub fn warning(&self, text: impl Into<String>) -> Uuid {
        self.toast(Severity::Warning, text, None)
    }

    pub fn info(&self, text: impl Into<String>) -> Uuid {
        self.toast(Severity::Info, text, None)
    }

    pub fn loading(&self, text: impl Into<String>) -> Uuid {
        self.toast(Severity::Loading, text, None)
    }

    /// Replace an earlier notice (e.g. resolve a loading spinner).
    pub fn update(&self, replaces: Uuid, severity: Severity, text: impl Into<String>) -> Uuid {
        self.toast(severity, text, Some(replaces))
    }

    pub fn redirect(&self, route: Route) {
        self.send(UiEvent::Redirect(route));
    }

    fn toast(&self, severity: Severity, text: impl Into<String>, replaces: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        self.send(UiEvent::Toast(Notice {
            id,
            severity,
            text: text.into(),
            replaces,
        }));
        id
    }

    fn send(&self, event: UiEvent) {
        // The shell may already have torn the receiver down.
        let _ = self.tx.send(event);
    }
}
