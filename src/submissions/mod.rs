pub mod routes;
pub mod service;

pub use service::{MirrorOutcome, SkipReason, SubmissionReceipt, add_submission};
