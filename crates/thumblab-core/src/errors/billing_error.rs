/// Errors raised while running a credit-gated action.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BillingError {
    /// The ledger refused the deduction, or the fail-closed pre-check could
    /// not confirm a positive balance.
    #[error("insufficient credits: {message}")]
    InsufficientFunds { message: String },

    /// The action itself succeeded but the ledger settlement call failed.
    /// The produced result is NOT rolled back; the balance is re-pulled so
    /// the UI never shows a number the server disagrees with.
    #[error("settlement failed after action completed: {message}")]
    Settlement { message: String },

    /// Settlement (if any) went through but the exported asset could not
    /// be fetched or written.
    #[error("export failed: {message}")]
    ExportDelivery { message: String },
}
