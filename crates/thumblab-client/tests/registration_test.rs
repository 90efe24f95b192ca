mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use common::{balance_json, drain_events, settle_tasks, user_json, FakeTransport};
use thumblab_client::effects::{Route, Severity, UiEvent};
use thumblab_client::registration::{AuthMode, RegistrationPhase};
use thumblab_client::StudioEngine;
use thumblab_core::errors::ApiError;
use thumblab_core::traits::IApiTransport;

fn engine_with(
    fake: &Arc<FakeTransport>,
) -> (
    StudioEngine,
    tokio::sync::mpsc::UnboundedReceiver<thumblab_client::UiEvent>,
) {
    let transport: Arc<dyn IApiTransport> = fake.clone();
    StudioEngine::with_transport(transport)
}

fn fill_register_form(engine: &StudioEngine) {
    let flow = engine.registration();
    flow.switch_mode(AuthMode::Register);
    flow.set_username("maya");
    flow.set_email("maya@example.com");
    flow.set_password("hunter2!");
}

// ── login ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_success_settles_and_redirects() {
    let fake = Arc::new(FakeTransport::new());
    fake.stub(
        "POST /api/auth/login",
        Ok(json!({ "user": user_json(), "message": "Welcome back!" })),
    );
    fake.stub("GET /api/credits/user-credits", Ok(balance_json(20, 0)));
    let (engine, mut events) = engine_with(&fake);

    let flow = engine.registration();
    flow.set_email("maya@example.com");
    flow.set_password("hunter2!");
    flow.submit_login().await;

    assert_eq!(flow.phase(), RegistrationPhase::Settled);
    assert!(engine.session().is_authenticated());
    // The password never survives a submit.
    assert!(flow.fields().password.is_empty());

    let events = drain_events(&mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        UiEvent::Toast(n) if n.severity == Severity::Success && n.text == "Welcome back!"
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, UiEvent::Redirect(Route::Generate))));
}

#[tokio::test]
async fn login_rejection_stays_and_shows_the_server_reason() {
    let fake = Arc::new(FakeTransport::new());
    fake.stub(
        "POST /api/auth/login",
        Err(ApiError::Rejected {
            message: "Invalid credentials".into(),
        }),
    );
    let (engine, mut events) = engine_with(&fake);

    let flow = engine.registration();
    flow.set_email("maya@example.com");
    flow.set_password("wrong");
    flow.submit_login().await;

    assert_eq!(flow.phase(), RegistrationPhase::Credentials(AuthMode::Login));
    assert!(!engine.session().is_authenticated());
    // The identity field is kept for convenience.
    assert_eq!(flow.fields().email, "maya@example.com");

    let events = drain_events(&mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        UiEvent::Toast(n) if n.severity == Severity::Error && n.text == "Invalid credentials"
    )));
}

// ── OTP request / resend ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn otp_request_advances_with_a_short_cooldown() {
    let fake = Arc::new(FakeTransport::new());
    fake.stub("POST /api/auth/register/request-otp", Ok(json!({})));
    let (engine, _events) = engine_with(&fake);

    fill_register_form(&engine);
    engine.registration().submit_registration().await;

    assert_eq!(engine.registration().phase(), RegistrationPhase::AwaitingOtp);
    // First request gets the short grant, not the 60s resend penalty.
    assert_eq!(engine.registration().cooldown().remaining_secs(), 5);
}

#[tokio::test(start_paused = true)]
async fn resend_during_cooldown_has_no_network_effect() {
    let fake = Arc::new(FakeTransport::new());
    fake.stub("POST /api/auth/register/request-otp", Ok(json!({})));
    fake.stub("POST /api/auth/register/resend-otp", Ok(json!({})));
    let (engine, _events) = engine_with(&fake);

    fill_register_form(&engine);
    engine.registration().submit_registration().await;

    let issued = engine.registration().resend_otp().await;
    assert!(!issued);
    assert_eq!(fake.calls_to("POST /api/auth/register/resend-otp"), 0);

    // Once the cooldown drains, the resend goes out and resets to the
    // longer duration.
    tokio::time::sleep(Duration::from_secs(6)).await;
    settle_tasks().await;
    assert!(engine.registration().cooldown().is_idle());

    let issued = engine.registration().resend_otp().await;
    assert!(issued);
    assert_eq!(fake.calls_to("POST /api/auth/register/resend-otp"), 1);
    assert_eq!(engine.registration().cooldown().remaining_secs(), 60);
}

#[tokio::test(start_paused = true)]
async fn failed_request_stays_on_the_credentials_step() {
    let fake = Arc::new(FakeTransport::new());
    fake.stub(
        "POST /api/auth/register/request-otp",
        Err(ApiError::Rejected {
            message: "Email already registered".into(),
        }),
    );
    let (engine, mut events) = engine_with(&fake);

    fill_register_form(&engine);
    engine.registration().submit_registration().await;

    assert_eq!(
        engine.registration().phase(),
        RegistrationPhase::Credentials(AuthMode::Register)
    );
    assert!(engine.registration().cooldown().is_idle());

    let events = drain_events(&mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        UiEvent::Toast(n) if n.text == "Email already registered"
    )));
}

// ── verification ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn verification_settles_logs_in_and_shows_the_bonus() {
    let fake = Arc::new(FakeTransport::new());
    fake.stub("POST /api/auth/register/request-otp", Ok(json!({})));
    fake.stub(
        "POST /api/auth/register/verify",
        Ok(json!({ "user": user_json() })),
    );
    // Fresh accounts come pre-seeded with the signup bonus.
    fake.stub("GET /api/credits/user-credits", Ok(balance_json(50, 0)));
    let (engine, mut events) = engine_with(&fake);

    fill_register_form(&engine);
    engine.registration().submit_registration().await;
    engine.registration().set_otp_input("482913");
    engine.registration().submit_otp().await;

    assert_eq!(engine.registration().phase(), RegistrationPhase::Settled);
    assert!(engine.registration().otp_input().is_empty());
    assert!(engine.session().is_authenticated());
    assert_eq!(engine.credits().snapshot().unwrap().credits, 50);

    // The verify call carried the held credentials plus the code.
    let verify = fake
        .calls()
        .into_iter()
        .find(|c| c.key == "POST /api/auth/register/verify")
        .unwrap();
    assert_eq!(verify.body["username"], "maya");
    assert_eq!(verify.body["email"], "maya@example.com");
    assert_eq!(verify.body["password"], "hunter2!");
    assert_eq!(verify.body["otp"], "482913");

    // The welcome-bonus notice is deferred past the primary toast.
    let before_delay = drain_events(&mut events);
    let primary_at = before_delay
        .iter()
        .position(|e| matches!(e, UiEvent::Toast(n) if n.text.contains("verified")))
        .expect("primary toast");
    assert!(!before_delay
        .iter()
        .any(|e| matches!(e, UiEvent::Toast(n) if n.text.contains("bonus"))));

    tokio::time::sleep(Duration::from_secs(1)).await;
    settle_tasks().await;
    let after_delay = drain_events(&mut events);
    assert!(after_delay
        .iter()
        .any(|e| matches!(e, UiEvent::Toast(n) if n.text.contains("bonus"))));
    let _ = primary_at;
}

#[tokio::test(start_paused = true)]
async fn invalid_otp_is_recoverable() {
    let fake = Arc::new(FakeTransport::new());
    fake.stub("POST /api/auth/register/request-otp", Ok(json!({})));
    fake.stub(
        "POST /api/auth/register/verify",
        Err(ApiError::Rejected {
            message: "Invalid OTP".into(),
        }),
    );
    let (engine, mut events) = engine_with(&fake);

    fill_register_form(&engine);
    engine.registration().submit_registration().await;
    engine.registration().set_otp_input("000000");
    engine.registration().submit_otp().await;

    // Still on the verification step, input kept for correction.
    assert_eq!(engine.registration().phase(), RegistrationPhase::AwaitingOtp);
    assert_eq!(engine.registration().otp_input(), "000000");
    assert!(!engine.session().is_authenticated());

    let events = drain_events(&mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        UiEvent::Toast(n) if n.text == "Invalid OTP"
    )));
}

// ── back-navigation ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn editing_keeps_typed_fields_and_drops_the_otp() {
    let fake = Arc::new(FakeTransport::new());
    fake.stub("POST /api/auth/register/request-otp", Ok(json!({})));
    let (engine, _events) = engine_with(&fake);

    fill_register_form(&engine);
    engine.registration().submit_registration().await;
    engine.registration().set_otp_input("123456");

    engine.registration().back_to_credentials();

    let flow = engine.registration();
    assert_eq!(
        flow.phase(),
        RegistrationPhase::Credentials(AuthMode::Register)
    );
    assert_eq!(flow.fields().username, "maya");
    assert_eq!(flow.fields().email, "maya@example.com");
    assert!(flow.otp_input().is_empty());
}
