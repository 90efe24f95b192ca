//! # thumblab-client
//!
//! The client-side session and credit-gated transaction engine behind the
//! Thumblab browser shell. The shell renders; this crate decides: it owns
//! the authenticated session, mirrors the server's credit ledger, drives
//! the email-verification registration flow, and runs every billable
//! action through a verify-funds → perform → settle → refresh sequence.
//!
//! The server ledger is authoritative throughout — the engine is a
//! read-through cache and never does credit arithmetic of its own.

pub mod account;
pub mod billing;
pub mod cooldown;
pub mod credits;
pub mod detail;
pub mod effects;
pub mod engine;
pub mod observability;
pub mod registration;
pub mod session;
pub mod transport;

pub use effects::{EffectBus, Notice, Route, Severity, UiEvent};
pub use engine::StudioEngine;
