//! The `ask` entry point.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::answer::FinalAnswer;
use crate::capability::CapabilityName;
use crate::error::{AskError, AskResult};
use crate::orchestrator::Orchestrator;

/// Tracing target for the entry point.
pub const TRACING_TARGET: &str = "scout_agent::service";

/// Request for a single research question.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AskRequest {
    /// Question text.
    #[validate(length(min = 1, max = 4096), custom(function = "not_blank"))]
    pub question: String,
}

impl AskRequest {
    /// Creates a new request.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Answer to an [`AskRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    /// Identifier used in logs for this request.
    pub request_id: Uuid,
    /// Answer text. Never empty.
    pub answer: String,
    /// Capabilities that contributed to the answer.
    pub contributors: Vec<CapabilityName>,
    /// Contributors accepted without passing evaluation.
    pub unverified: Vec<CapabilityName>,
    /// `true` when the answer was cut short by the request deadline.
    pub timed_out: bool,
}

impl AskResponse {
    fn new(request_id: Uuid, answer: FinalAnswer) -> Self {
        let contributors = match answer.short_circuit {
            Some(capability) => vec![capability],
            None => answer.contributors,
        };

        Self {
            request_id,
            answer: answer.text,
            contributors,
            unverified: answer.unverified,
            timed_out: answer.timed_out,
        }
    }
}

/// Cloneable handle answering research questions.
#[derive(Debug, Clone)]
pub struct AgentService {
    orchestrator: Arc<Orchestrator>,
}

impl AgentService {
    /// Creates a new agent service.
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Returns the orchestrator.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Answers a question.
    ///
    /// Validation failures are reported as [`AskError::InvalidRequest`].
    /// Every other failure, including a panic inside a collaborator, is
    /// logged and reported as the opaque [`AskError::Internal`].
    pub async fn ask(&self, request: AskRequest) -> AskResult<AskResponse> {
        if let Err(errors) = request.validate() {
            tracing::debug!(
                target: TRACING_TARGET,
                error = %errors,
                "Rejected invalid request"
            );
            return Err(AskError::InvalidRequest(errors.to_string()));
        }

        let request_id = Uuid::now_v7();
        let question = request.question.trim().to_owned();
        let orchestrator = self.orchestrator.clone();

        tracing::info!(
            target: TRACING_TARGET,
            request_id = %request_id,
            question_len = question.len(),
            "Answering question"
        );

        let handle = tokio::spawn(async move { orchestrator.run(&question).await });

        match handle.await {
            Ok(Ok(answer)) => Ok(AskResponse::new(request_id, answer)),
            Ok(Err(error)) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    request_id = %request_id,
                    error = %error,
                    "Orchestration failed"
                );
                Err(AskError::Internal)
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    request_id = %request_id,
                    error = %error,
                    "Orchestration task aborted"
                );
                Err(AskError::Internal)
            }
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Question cannot be blank".into());
        return Err(error);
    }
    Ok(())
}
