//! Wire-facing data models, mirrored into TypeScript for the browser shell.

mod credits;
mod export;
mod listing;
mod thumbnail;
mod user;

pub use credits::CreditBalance;
pub use export::ExportFormat;
pub use listing::CommunityListing;
pub use thumbnail::{GenerateRequest, GenerationModel, Thumbnail};
pub use user::UserIdentity;
