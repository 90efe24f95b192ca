//! Generation path: perform before settling — credits pay for success.
//!
//! The fail-closed pre-check keeps a zero-balance user from ever reaching
//! the render endpoint and routes them to pricing instead.

use serde_json::json;

use thumblab_core::errors::{ApiError, BillingError, ClientError};
use thumblab_core::models::{GenerateRequest, Thumbnail};
use thumblab_core::traits::IApiTransport;

use crate::credits::CreditCache;
use crate::effects::{EffectBus, Route};

use super::{ActionKind, ActionReceipt, ActionStatus, GenerateOutcome, StepResult, DEDUCT_PATH};

pub(super) async fn run(
    transport: &dyn IApiTransport,
    credits: &CreditCache,
    effects: &EffectBus,
    request: &GenerateRequest,
) -> GenerateOutcome {
    let cost = request.credit_cost();
    let mut receipt = ActionReceipt::new(ActionKind::Generate, cost);
    receipt.status = ActionStatus::InFlight;

    // Fresh pull, not the cache. Anything short of a confirmed positive
    // balance aborts before the render endpoint is touched.
    if !credits.has_funds().await {
        receipt.precheck = StepResult::Failed("positive balance not confirmed".to_string());
        receipt.status = ActionStatus::InsufficientFunds;
        credits.refresh().await;
        effects.error("Insufficient balance");
        effects.redirect(Route::Pricing);
        return GenerateOutcome {
            receipt,
            thumbnail: None,
            error: Some(ClientError::Billing(BillingError::InsufficientFunds {
                message: "positive balance not confirmed".to_string(),
            })),
        };
    }
    receipt.precheck = StepResult::Ok;

    let thumbnail = match transport
        .post_json("/api/thumbnail/generate", render_body(request))
        .await
    {
        Ok(value) => {
            match value
                .get("thumbnail")
                .cloned()
                .map(serde_json::from_value::<Thumbnail>)
            {
                Some(Ok(thumbnail)) => thumbnail,
                _ => {
                    tracing::warn!("billing: generation response had no thumbnail");
                    let err = ApiError::Malformed {
                        reason: "no thumbnail in response".to_string(),
                    };
                    receipt.perform = StepResult::Failed(err.to_string());
                    receipt.status = ActionStatus::Failed;
                    effects.error("Generation failed");
                    return GenerateOutcome {
                        receipt,
                        thumbnail: None,
                        error: Some(ClientError::Api(err)),
                    };
                }
            }
        }
        Err(e) => {
            tracing::warn!("billing: generation failed: {e}");
            receipt.perform = StepResult::Failed(e.to_string());
            receipt.status = ActionStatus::Failed;
            effects.error(e.to_string());
            return GenerateOutcome {
                receipt,
                thumbnail: None,
                error: Some(ClientError::Api(e)),
            };
        }
    };
    receipt.perform = StepResult::Ok;
    effects.success("Thumbnail generated successfully!");

    // Settle. The render is already done; a failed deduction is surfaced
    // but nothing is rolled back.
    receipt.status = ActionStatus::Settling;
    let mut error = None;
    match transport
        .post_json(DEDUCT_PATH, json!({ "amount": cost }))
        .await
    {
        Ok(_) => {
            receipt.settle = StepResult::Ok;
        }
        Err(e) => {
            tracing::warn!("billing: settlement failed after generation: {e}");
            receipt.settle = StepResult::Failed(e.to_string());
            effects.warning(format!("Generation completed but billing did not settle: {e}"));
            error = Some(ClientError::Billing(BillingError::Settlement {
                message: e.to_string(),
            }));
        }
    }

    // Unconditional: the UI must never show a number the server disagrees
    // with, whichever way settlement went.
    receipt.refresh = match credits.refresh().await {
        Some(_) => StepResult::Ok,
        None => StepResult::Failed("balance unavailable".to_string()),
    };

    receipt.status = ActionStatus::Done;
    effects.redirect(Route::ThumbnailResult(thumbnail.id.clone()));
    GenerateOutcome {
        receipt,
        thumbnail: Some(thumbnail),
        error,
    }
}

/// The render payload. Serializing our own request type cannot fail.
fn render_body(request: &GenerateRequest) -> serde_json::Value {
    serde_json::to_value(request).unwrap_or_else(|_| json!({}))
}
