//! Export path: settle before performing — a rejected deduction must
//! abort before the file is touched. Free formats never talk to the
//! ledger at all.

use std::path::Path;

use serde_json::json;

use thumblab_core::errors::{ApiError, BillingError, ClientError};
use thumblab_core::models::{ExportFormat, Thumbnail};
use thumblab_core::traits::IApiTransport;

use crate::credits::CreditCache;
use crate::effects::EffectBus;

use super::{
    sanitize_title, ActionKind, ActionReceipt, ActionStatus, ExportOutcome, StepResult,
    DEDUCT_PATH,
};

pub(super) async fn run(
    transport: &dyn IApiTransport,
    credits: &CreditCache,
    effects: &EffectBus,
    thumbnail: &Thumbnail,
    format: ExportFormat,
    dest_dir: &Path,
) -> ExportOutcome {
    let cost = format.credit_cost();
    let mut receipt = ActionReceipt::new(ActionKind::Export, cost);
    receipt.status = ActionStatus::InFlight;
    // Export has no separate funds pre-check: the deduction itself is the
    // authoritative sufficiency test.
    receipt.precheck = StepResult::Skipped;

    if cost > 0 {
        receipt.status = ActionStatus::Settling;
        match transport
            .post_json(DEDUCT_PATH, json!({ "amount": cost }))
            .await
        {
            Ok(_) => {
                receipt.settle = StepResult::Ok;
            }
            Err(e) => {
                receipt.settle = StepResult::Failed(e.to_string());
                let error = match &e {
                    ApiError::Rejected { message } => {
                        effects.error("Insufficient credits.");
                        receipt.status = ActionStatus::InsufficientFunds;
                        ClientError::Billing(BillingError::InsufficientFunds {
                            message: message.clone(),
                        })
                    }
                    _ => {
                        tracing::warn!("billing: export settlement failed: {e}");
                        effects.error("Download failed.");
                        receipt.status = ActionStatus::Failed;
                        ClientError::Api(e.clone())
                    }
                };
                // Even a refused settlement re-pulls the balance so the UI
                // shows the unchanged server value.
                receipt.refresh = refresh_step(credits).await;
                return ExportOutcome {
                    receipt,
                    saved_to: None,
                    error: Some(error),
                };
            }
        }
    } else {
        receipt.settle = StepResult::Skipped;
    }

    let bytes = match transport.fetch_bytes(&thumbnail.image_url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("billing: asset fetch failed: {e}");
            return delivery_failure(receipt, credits, effects, cost, e.to_string()).await;
        }
    };

    let file_name = format!("{}.{}", sanitize_title(&thumbnail.title), format.extension());
    let path = dest_dir.join(file_name);
    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        tracing::warn!("billing: could not write export: {e}");
        return delivery_failure(receipt, credits, effects, cost, e.to_string()).await;
    }
    receipt.perform = StepResult::Ok;
    effects.success(format!("{} exported!", format.label()));

    receipt.refresh = if cost > 0 {
        refresh_step(credits).await
    } else {
        // No settlement happened, so there is nothing to re-mirror.
        StepResult::Skipped
    };

    receipt.status = ActionStatus::Done;
    ExportOutcome {
        receipt,
        saved_to: Some(path),
        error: None,
    }
}

/// Settlement (if any) already went through; the asset never made it to
/// disk. Credits are not refunded — the balance is simply re-mirrored.
async fn delivery_failure(
    mut receipt: ActionReceipt,
    credits: &CreditCache,
    effects: &EffectBus,
    cost: u64,
    message: String,
) -> ExportOutcome {
    receipt.perform = StepResult::Failed(message.clone());
    receipt.status = ActionStatus::Failed;
    effects.error("Download failed.");
    receipt.refresh = if cost > 0 {
        refresh_step(credits).await
    } else {
        StepResult::Skipped
    };
    ExportOutcome {
        receipt,
        saved_to: None,
        error: Some(ClientError::Billing(BillingError::ExportDelivery {
            message,
        })),
    }
}

async fn refresh_step(credits: &CreditCache) -> StepResult {
    match credits.refresh().await {
        Some(_) => StepResult::Ok,
        None => StepResult::Failed("balance unavailable".to_string()),
    }
}
