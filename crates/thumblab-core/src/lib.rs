//! # thumblab-core
//!
//! Foundation crate for the Thumblab client engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ClientConfig;
pub use errors::{ApiError, BillingError, ClientError, ClientResult};
pub use models::{
    CommunityListing, CreditBalance, ExportFormat, GenerateRequest, GenerationModel, Thumbnail,
    UserIdentity,
};
pub use traits::IApiTransport;
