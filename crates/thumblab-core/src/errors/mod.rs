//! Error taxonomy for the Thumblab client engine.
//!
//! Every failure is caught at the boundary of the operation that issued it
//! and converted into a user-visible notice; nothing here is fatal to the
//! process.

mod api_error;
mod billing_error;

pub use api_error::ApiError;
pub use billing_error::BillingError;

/// Top-level error type unifying all engine domains.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Billing(#[from] BillingError),
}

/// Convenience alias used across the workspace.
pub type ClientResult<T> = Result<T, ClientError>;
