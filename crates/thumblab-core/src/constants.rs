/// Thumblab engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Credits deducted when neither generation model matches the request.
pub const FALLBACK_GENERATION_COST: u64 = 5;

/// Credits seeded into every freshly verified account.
pub const REGISTRATION_BONUS_CREDITS: u64 = 50;

/// Cooldown granted after the first OTP request during registration.
/// Short on purpose: the first attempt should not be penalized.
pub const OTP_INITIAL_COOLDOWN_SECS: u64 = 5;

/// Cooldown granted after every OTP resend. Longer than the initial
/// grant to discourage rapid resend abuse.
pub const OTP_RESEND_COOLDOWN_SECS: u64 = 60;

/// Cooldown for the account-security (password change) OTP flow.
pub const SECURITY_OTP_COOLDOWN_SECS: u64 = 60;

/// Delay before the post-registration welcome notice, so it does not
/// overlap the primary success toast.
pub const DEFERRED_NOTICE_DELAY_MS: u64 = 400;
