//! Account management: profile updates, the password-change OTP flow, and
//! account deletion.

use std::sync::Arc;

use serde_json::json;

use thumblab_core::constants::SECURITY_OTP_COOLDOWN_SECS;
use thumblab_core::errors::{ApiError, ClientError, ClientResult};
use thumblab_core::traits::IApiTransport;

use crate::cooldown::CooldownTimer;
use crate::credits::CreditCache;
use crate::effects::{EffectBus, Route, Severity};
use crate::session::SessionStore;

pub struct AccountManager {
    transport: Arc<dyn IApiTransport>,
    session: Arc<SessionStore>,
    credits: Arc<CreditCache>,
    effects: EffectBus,
    cooldown: CooldownTimer,
}

impl AccountManager {
    pub fn new(
        transport: Arc<dyn IApiTransport>,
        session: Arc<SessionStore>,
        credits: Arc<CreditCache>,
        effects: EffectBus,
    ) -> Self {
        Self {
            transport,
            session,
            credits,
            effects,
            cooldown: CooldownTimer::new(),
        }
    }

    pub fn cooldown(&self) -> &CooldownTimer {
        &self.cooldown
    }

    /// Change username/email, then re-pull the identity so the session
    /// reflects what the server actually stored.
    pub async fn update_profile(&self, username: &str, email: &str) -> ClientResult<()> {
        let body = json!({ "username": username, "email": email });
        match self
            .transport
            .put_json("/api/manage/update-profile", body)
            .await
        {
            Ok(_) => {
                self.session.refresh_identity().await;
                self.effects.success("Profile updated successfully!");
                Ok(())
            }
            Err(e) => {
                self.effects.error(profile_error_text(&e));
                Err(ClientError::Api(e))
            }
        }
    }

    /// Start the password-change flow: the server emails an OTP to the
    /// account address.
    pub async fn request_security_otp(&self) -> ClientResult<()> {
        let loading = self.effects.loading("Sending OTP to your email...");
        match self
            .transport
            .post_json("/api/manage/request-otp", json!({}))
            .await
        {
            Ok(_) => {
                self.effects.update(loading, Severity::Success, "OTP sent!");
                self.cooldown.start(SECURITY_OTP_COOLDOWN_SECS);
                Ok(())
            }
            Err(e) => {
                self.effects
                    .update(loading, Severity::Error, "Could not send OTP");
                Err(ClientError::Api(e))
            }
        }
    }

    /// Ask for a fresh security OTP. No network traffic while the
    /// cooldown is counting. Returns whether a request was issued.
    pub async fn resend_security_otp(&self) -> bool {
        if !self.cooldown.is_idle() {
            tracing::debug!(
                remaining = self.cooldown.remaining_secs(),
                "account: resend suppressed during cooldown"
            );
            return false;
        }

        let loading = self.effects.loading("Resending a fresh code...");
        match self
            .transport
            .post_json("/api/manage/resend-otp", json!({}))
            .await
        {
            Ok(_) => {
                self.effects
                    .update(loading, Severity::Success, "New OTP sent!");
                self.cooldown.start(SECURITY_OTP_COOLDOWN_SECS);
            }
            Err(e) => {
                tracing::warn!("account: resend failed: {e}");
                self.effects
                    .update(loading, Severity::Error, "Failed to resend");
            }
        }
        true
    }

    /// Submit the OTP with the new password.
    pub async fn confirm_password_reset(&self, otp: &str, new_password: &str) -> ClientResult<()> {
        let body = json!({ "otp": otp, "newPassword": new_password });
        match self
            .transport
            .post_json("/api/manage/verify-otp", body)
            .await
        {
            Ok(_) => {
                self.effects.success("Password updated successfully!");
                Ok(())
            }
            Err(e) => {
                self.effects.error(profile_error_text(&e));
                Err(ClientError::Api(e))
            }
        }
    }

    /// Delete the account. On success the server has already destroyed the
    /// session, so local state is dropped unconditionally.
    pub async fn delete_account(&self) -> ClientResult<()> {
        let loading = self.effects.loading("Purging account data...");
        match self
            .transport
            .delete_json("/api/manage/delete-account")
            .await
        {
            Ok(_) => {
                self.effects
                    .update(loading, Severity::Success, "Account deleted successfully.");
                self.session.logout();
                self.credits.clear();
                self.effects.redirect(Route::Home);
                Ok(())
            }
            Err(e) => {
                self.effects
                    .update(loading, Severity::Error, profile_error_text(&e));
                Err(ClientError::Api(e))
            }
        }
    }
}

fn profile_error_text(e: &ApiError) -> String {
    match e {
        ApiError::Rejected { message } => message.clone(),
        _ => "Connection failed. Is the server running?".to_string(),
    }
}
