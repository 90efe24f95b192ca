//! RegistrationFlow — credentials → OTP verification → settled.
//!
//! The typed credential fields survive every phase transition so backing
//! out of the OTP step never loses input; the OTP input itself is cleared
//! only on settlement or an explicit back-navigation. Failures return the
//! machine to its pre-call state and surface the server's message.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use thumblab_core::constants::{
    DEFERRED_NOTICE_DELAY_MS, OTP_INITIAL_COOLDOWN_SECS, OTP_RESEND_COOLDOWN_SECS,
    REGISTRATION_BONUS_CREDITS,
};
use thumblab_core::errors::ApiError;
use thumblab_core::models::UserIdentity;
use thumblab_core::traits::IApiTransport;

use crate::cooldown::CooldownTimer;
use crate::credits::CreditCache;
use crate::effects::{EffectBus, Route};
use crate::session::SessionStore;

const CONNECTIVITY_MESSAGE: &str = "Connection failed. Is the server running?";

/// Which credential form is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPhase {
    Credentials(AuthMode),
    AwaitingOtp,
    Settled,
}

/// The typed form fields. Persist across phase transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialFields {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
struct FlowState {
    phase: RegistrationPhase,
    fields: CredentialFields,
    otp_input: String,
}

pub struct RegistrationFlow {
    transport: Arc<dyn IApiTransport>,
    session: Arc<SessionStore>,
    credits: Arc<CreditCache>,
    effects: EffectBus,
    state: Mutex<FlowState>,
    cooldown: CooldownTimer,
}

impl RegistrationFlow {
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
            state: Mutex::new(FlowState {
                phase: RegistrationPhase::Credentials(AuthMode::Login),
                fields: CredentialFields::default(),
                otp_input: String::new(),
            }),
            cooldown: CooldownTimer::new(),
        }
    }

    pub fn phase(&self) -> RegistrationPhase {
        self.lock().phase
    }

    pub fn fields(&self) -> CredentialFields {
        self.lock().fields.clone()
    }

    pub fn otp_input(&self) -> String {
        self.lock().otp_input.clone()
    }

    pub fn cooldown(&self) -> &CooldownTimer {
        &self.cooldown
    }

    pub fn set_username(&self, value: impl Into<String>) {
        self.lock().fields.username = value.into();
    }

    pub fn set_email(&self, value: impl Into<String>) {
        self.lock().fields.email = value.into();
    }

    pub fn set_password(&self, value: impl Into<String>) {
        self.lock().fields.password = value.into();
    }

    pub fn set_otp_input(&self, value: impl Into<String>) {
        self.lock().otp_input = value.into();
    }

    /// Toggle between the login and register forms. Only meaningful while
    /// on the credentials step; typed fields are kept.
    pub fn switch_mode(&self, mode: AuthMode) {
        let mut state = self.lock();
        if matches!(state.phase, RegistrationPhase::Credentials(_)) {
            state.phase = RegistrationPhase::Credentials(mode);
        }
    }

    /// Submit the login form. The identity field doubles as email or
    /// username; the server decides.
    pub async fn submit_login(&self) {
        let fields = {
            let state = self.lock();
            if state.phase != RegistrationPhase::Credentials(AuthMode::Login) {
                return;
            }
            state.fields.clone()
        };
        if fields.email.trim().is_empty() || fields.password.is_empty() {
            self.effects.error("Email and password are required");
            return;
        }

        let body = json!({ "userId": fields.email, "password": fields.password });
        let result = self.transport.post_json("/api/auth/login", body).await;

        // Keep email/username for convenience; the password never survives
        // a submit.
        self.lock().fields.password.clear();

        match result {
            Ok(value) => {
                let message = value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("Success!");
                self.effects.success(message);

                let user = value
                    .get("user")
                    .cloned()
                    .and_then(|u| serde_json::from_value::<UserIdentity>(u).ok());
                if let Some(user) = user {
                    self.session.login(user);
                    self.lock().phase = RegistrationPhase::Settled;
                    self.effects.redirect(Route::Generate);
                }
            }
            Err(ApiError::Rejected { message }) => {
                self.effects.error(message);
            }
            Err(e) => {
                tracing::warn!("registration: login failed: {e}");
                self.effects.error(CONNECTIVITY_MESSAGE);
            }
        }
    }

    /// Submit the register form: asks the server to email an OTP and, on
    /// success, advances to the verification step with a short cooldown.
    pub async fn submit_registration(&self) {
        let fields = {
            let state = self.lock();
            if state.phase != RegistrationPhase::Credentials(AuthMode::Register) {
                return;
            }
            state.fields.clone()
        };
        if fields.username.trim().is_empty()
            || fields.email.trim().is_empty()
            || fields.password.is_empty()
        {
            self.effects.error("All fields are required");
            return;
        }

        let body = json!({ "username": fields.username, "email": fields.email });
        match self
            .transport
            .post_json("/api/auth/register/request-otp", body)
            .await
        {
            Ok(_) => {
                self.lock().phase = RegistrationPhase::AwaitingOtp;
                self.cooldown.start(OTP_INITIAL_COOLDOWN_SECS);
                self.effects
                    .success(format!("OTP sent to {}", fields.email));
            }
            Err(ApiError::Rejected { message }) => {
                self.effects.error(message);
            }
            Err(e) => {
                tracing::warn!("registration: OTP request failed: {e}");
                self.effects.error(CONNECTIVITY_MESSAGE);
            }
        }
    }

    /// Submit the typed OTP together with the held credentials. On
    /// settlement the verified identity is handed to the session store and
    /// the seeded bonus balance is pulled into the credit cache.
    pub async fn submit_otp(&self) {
        let (fields, otp) = {
            let state = self.lock();
            if state.phase != RegistrationPhase::AwaitingOtp {
                return;
            }
            (state.fields.clone(), state.otp_input.clone())
        };
        if otp.trim().is_empty() {
            self.effects.error("Enter the 6-digit code");
            return;
        }

        let body = json!({
            "username": fields.username,
            "email": fields.email,
            "password": fields.password,
            "otp": otp,
        });
        match self
            .transport
            .post_json("/api/auth/register/verify", body)
            .await
        {
            Ok(value) => {
                let user = value
                    .get("user")
                    .cloned()
                    .and_then(|u| serde_json::from_value::<UserIdentity>(u).ok());
                let Some(user) = user else {
                    tracing::warn!("registration: verify response had no user");
                    self.effects.error(CONNECTIVITY_MESSAGE);
                    return;
                };

                {
                    let mut state = self.lock();
                    state.phase = RegistrationPhase::Settled;
                    state.otp_input.clear();
                    state.fields.password.clear();
                }

                self.effects.success("Account verified — welcome aboard!");
                let effects = self.effects.clone();
                tokio::spawn(async move {
                    // Deferred so it lands after the primary success toast.
                    tokio::time::sleep(Duration::from_millis(DEFERRED_NOTICE_DELAY_MS)).await;
                    effects.success(format!(
                        "{REGISTRATION_BONUS_CREDITS} bonus credits added to your account"
                    ));
                });

                self.session.login(user);
                self.credits.refresh().await;
                self.effects.redirect(Route::Generate);
            }
            Err(ApiError::Rejected { message }) => {
                // Invalid OTP is recoverable: stay put, keep the input for
                // correction.
                self.effects.error(message);
            }
            Err(e) => {
                tracing::warn!("registration: verification failed: {e}");
                self.effects.error(CONNECTIVITY_MESSAGE);
            }
        }
    }

    /// Ask for a fresh OTP. Suppressed entirely — no network traffic —
    /// while the cooldown is still counting. Returns whether a request was
    /// actually issued.
    pub async fn resend_otp(&self) -> bool {
        {
            let state = self.lock();
            if state.phase != RegistrationPhase::AwaitingOtp {
                return false;
            }
        }
        if !self.cooldown.is_idle() {
            tracing::debug!(
                remaining = self.cooldown.remaining_secs(),
                "registration: resend suppressed during cooldown"
            );
            return false;
        }

        let fields = self.lock().fields.clone();
        let body = json!({ "username": fields.username, "email": fields.email });
        match self
            .transport
            .post_json("/api/auth/register/resend-otp", body)
            .await
        {
            Ok(_) => {
                self.cooldown.start(OTP_RESEND_COOLDOWN_SECS);
                self.effects.success("New OTP sent!");
            }
            Err(ApiError::Rejected { message }) => {
                self.effects.error(message);
            }
            Err(e) => {
                tracing::warn!("registration: resend failed: {e}");
                self.effects.error(CONNECTIVITY_MESSAGE);
            }
        }
        true
    }

    /// Abandon verification and go back to the register form. Typed
    /// fields are kept; the OTP input is discarded.
    pub fn back_to_credentials(&self) {
        let mut state = self.lock();
        if state.phase == RegistrationPhase::AwaitingOtp {
            state.phase = RegistrationPhase::Credentials(AuthMode::Register);
            state.otp_input.clear();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
