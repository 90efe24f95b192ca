//! Credit-gated actions.
//!
//! Every billable action runs a fixed sequence — verify funds, perform,
//! settle, refresh — with each step's outcome tagged separately so a
//! failure in one is never mistaken for a failure in another. The two
//! instantiations order perform and settle differently: generation pays
//! after a successful render, export pays before the file is touched.

mod export;
mod generate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use thumblab_core::errors::{ApiError, ClientError, ClientResult};
use thumblab_core::models::{ExportFormat, GenerateRequest, Thumbnail};
use thumblab_core::traits::IApiTransport;

use crate::credits::CreditCache;
use crate::effects::EffectBus;

pub(crate) const DEDUCT_PATH: &str = "/api/credits/deduct-credits";

/// What kind of billable action ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Generate,
    Export,
}

/// Lifecycle of one action instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Idle,
    InsufficientFunds,
    InFlight,
    Settling,
    /// The remote action succeeded and settlement was attempted. A failed
    /// settlement still counts: the produced result is never rolled back.
    Done,
    Failed,
}

/// Outcome of a single protocol step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StepResult {
    #[default]
    NotRun,
    Ok,
    Skipped,
    Failed(String),
}

impl StepResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, StepResult::Ok)
    }

    pub fn was_attempted(&self) -> bool {
        matches!(self, StepResult::Ok | StepResult::Failed(_))
    }
}

/// Per-step record of one action run. Ephemeral — created per user
/// gesture, discarded after settlement.
#[derive(Debug, Clone)]
pub struct ActionReceipt {
    pub kind: ActionKind,
    pub cost: u64,
    pub status: ActionStatus,
    pub precheck: StepResult,
    pub perform: StepResult,
    pub settle: StepResult,
    pub refresh: StepResult,
}

impl ActionReceipt {
    fn new(kind: ActionKind, cost: u64) -> Self {
        Self {
            kind,
            cost,
            status: ActionStatus::Idle,
            precheck: StepResult::NotRun,
            perform: StepResult::NotRun,
            settle: StepResult::NotRun,
            refresh: StepResult::NotRun,
        }
    }
}

/// Result of a generation run.
#[derive(Debug)]
pub struct GenerateOutcome {
    pub receipt: ActionReceipt,
    pub thumbnail: Option<Thumbnail>,
    /// The typed failure, when any step failed. A partial settlement
    /// coexists with a produced thumbnail.
    pub error: Option<ClientError>,
}

/// Result of an export run.
#[derive(Debug)]
pub struct ExportOutcome {
    pub receipt: ActionReceipt,
    pub saved_to: Option<PathBuf>,
    pub error: Option<ClientError>,
}

/// Runs billable actions against the ledger.
pub struct BillableActionExecutor {
    transport: Arc<dyn IApiTransport>,
    credits: Arc<CreditCache>,
    effects: EffectBus,
}

impl BillableActionExecutor {
    pub fn new(
        transport: Arc<dyn IApiTransport>,
        credits: Arc<CreditCache>,
        effects: EffectBus,
    ) -> Self {
        Self {
            transport,
            credits,
            effects,
        }
    }

    /// Render a thumbnail: pre-check funds (fail-closed), perform, settle,
    /// refresh, then navigate to the result.
    pub async fn generate(&self, request: &GenerateRequest) -> GenerateOutcome {
        generate::run(
            &*self.transport,
            &self.credits,
            &self.effects,
            request,
        )
        .await
    }

    /// Export a render to disk: settle first for paid formats, then fetch
    /// and save the asset. Free formats skip the ledger entirely.
    pub async fn export(
        &self,
        thumbnail: &Thumbnail,
        format: ExportFormat,
        dest_dir: &Path,
    ) -> ExportOutcome {
        export::run(
            &*self.transport,
            &self.credits,
            &self.effects,
            thumbnail,
            format,
            dest_dir,
        )
        .await
    }

    /// Ask the prompt optimizer for an enhanced description. Not billable;
    /// lives here because the generation form owns it.
    pub async fn optimize_prompt(
        &self,
        title: &str,
        description: &str,
        style: &str,
    ) -> ClientResult<String> {
        let body = json!({ "title": title, "description": description, "style": style });
        match self
            .transport
            .post_json("/api/thumbnail/optimize-prompt", body)
            .await
        {
            Ok(value) => match value.get("optimized").and_then(|o| o.as_str()) {
                Some(optimized) => {
                    self.effects.success("Prompt enhanced!");
                    Ok(optimized.to_string())
                }
                None => {
                    let err = ApiError::Malformed {
                        reason: "no `optimized` field in response".to_string(),
                    };
                    self.effects.error(err.to_string());
                    Err(ClientError::Api(err))
                }
            },
            Err(e) => {
                self.effects.error(e.to_string());
                Err(ClientError::Api(e))
            }
        }
    }
}

/// File-system-safe variant of a thumbnail title.
pub(crate) fn sanitize_title(title: &str) -> String {
    let joined = title.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        "thumbnail".to_string()
    } else {
        joined
    }
}
