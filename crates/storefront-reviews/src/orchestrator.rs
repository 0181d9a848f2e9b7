//! Submission orchestrator
//!
//! Validating → Submitting → Succeeded | Failed

use storefront_forms::{validate, FieldErrors, FieldSchema, SubmittedValues, ValidatedValues, ValidationOutcome};
use storefront_graphql::{MutationResult, ReviewMutation};
use tracing::Instrument;
use uuid::Uuid;

use crate::reply::Reply;

/// Submission stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    /// Checking values against the schema
    Validating,
    /// Waiting on the remote mutation
    Submitting,
    /// Remote accepted the review
    Succeeded,
    /// Validation, remote or transport failure
    Failed,
}

impl SubmissionStage {
    /// Whether no further transition follows
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

enum State {
    Validating,
    Submitting(ValidatedValues),
    Succeeded,
    Failed {
        field_errors: FieldErrors,
        form_errors: Vec<String>,
    },
}

impl State {
    fn stage(&self) -> SubmissionStage {
        match self {
            Self::Validating => SubmissionStage::Validating,
            Self::Submitting(_) => SubmissionStage::Submitting,
            Self::Succeeded => SubmissionStage::Succeeded,
            Self::Failed { .. } => SubmissionStage::Failed,
        }
    }
}

/// Runs one submission end to end against a [`ReviewMutation`]
///
/// Holds no state between calls; concurrent submissions are independent.
pub struct SubmissionOrchestrator<M> {
    mutation: M,
}

impl<M: ReviewMutation> SubmissionOrchestrator<M> {
    /// Wrap a mutation client
    pub fn new(mutation: M) -> Self {
        Self { mutation }
    }

    /// Validate, submit on success, and fold the outcome into a [`Reply`]
    ///
    /// Remote errors are always reported as form-level messages, even when
    /// the remote service names the offending fields.
    pub async fn handle(&self, schema: &FieldSchema, submitted: &SubmittedValues) -> Reply {
        let span = tracing::info_span!("submission", id = %Uuid::new_v4());
        self.run(schema, submitted).instrument(span).await
    }

    async fn run(&self, schema: &FieldSchema, submitted: &SubmittedValues) -> Reply {
        let mut state = State::Validating;

        loop {
            tracing::trace!(stage = ?state.stage(), "submission stage");

            state = match state {
                State::Validating => match validate(schema, submitted) {
                    ValidationOutcome::Success { values } => State::Submitting(values),
                    ValidationOutcome::Failure { field_errors, form_errors } => {
                        tracing::debug!(
                            fields = ?field_errors.keys().collect::<Vec<_>>(),
                            "submission failed validation"
                        );
                        State::Failed { field_errors, form_errors }
                    }
                },

                State::Submitting(values) => match self.mutation.submit(&values).await {
                    MutationResult::Accepted => State::Succeeded,
                    MutationResult::Rejected { messages } => {
                        tracing::warn!(errors = messages.len(), "submission rejected");
                        State::Failed { field_errors: FieldErrors::new(), form_errors: messages }
                    }
                    MutationResult::TransportFailure { message } => {
                        tracing::warn!(error = %message, "submission transport failure");
                        State::Failed { field_errors: FieldErrors::new(), form_errors: vec![message] }
                    }
                },

                State::Succeeded => {
                    tracing::info!("submission succeeded");
                    return Reply::success(schema.clone());
                }

                State::Failed { field_errors, form_errors } => {
                    return Reply::failure(schema.clone(), field_errors, form_errors);
                }
            };
        }
    }
}
