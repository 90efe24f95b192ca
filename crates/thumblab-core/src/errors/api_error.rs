/// Transport-level errors.
///
/// The transport never inspects status codes beyond 2xx-vs-not; a rejected
/// request carries the server's `message`/`error` field verbatim so the UI
/// can surface it unchanged.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The request never reached the server or the connection dropped.
    #[error("network failure: {reason}")]
    Network { reason: String },

    /// The server answered non-2xx. `message` is the server's own text.
    #[error("{message}")]
    Rejected { message: String },

    /// A 2xx body that does not match the expected shape.
    #[error("malformed response: {reason}")]
    Malformed { reason: String },
}

impl ApiError {
    /// Whether this failure is a server-side rejection (as opposed to the
    /// request never completing).
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }
}
