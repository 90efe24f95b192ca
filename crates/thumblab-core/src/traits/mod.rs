//! Trait seams implemented by the client crate (and by fakes in tests).

mod transport;

pub use transport::IApiTransport;
