//! Storefront Reviews
//!
//! Submission pipeline for the product review form.
//!
//! ```text
//! submitted values ──► validate ──► submit mutation ──► Reply
//!                         │                │
//!                         └── Failed ◄─────┘ (rejected / transport)
//! ```
//!
//! Every outcome, including transport failures, comes back as a [`Reply`];
//! the caller never has to handle an error to render a failed submission.

#![warn(missing_docs)]

pub mod form;
pub mod orchestrator;
pub mod reply;

pub use form::review_form_schema;
pub use orchestrator::{SubmissionOrchestrator, SubmissionStage};
pub use reply::{Reply, ReplyStatus};
