//! Worker tasks that back the telemetry submitter.
//!
//! The report worker owns the streaming connection; the submission worker
//! performs the single completion request.

mod report;
mod submission;

pub use report::{ReportCommand, ReportWorker};
pub use submission::{SUBMISSION_TOKEN_HEADER, SubmissionWorker};
