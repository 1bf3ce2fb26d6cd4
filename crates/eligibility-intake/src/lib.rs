//! Delivery of built eligibility submissions.
//!
//! A submission goes through three phases: [`IntakeClient::prepare`] claims the
//! single in-flight slot and builds the request, [`IntakeClient::dispatch`]
//! sends it without holding the session, and [`complete`] applies the outcome
//! to the session unless that session has been reset in the meantime.

pub mod client;
pub mod guard;
pub mod share;
pub mod transport;

pub use client::{
    Completion, DispatchReport, IntakeClient, IntakeError, PendingSubmission,
    SUBMISSION_FAILED_MESSAGE, complete,
};
pub use guard::{InFlight, SubmissionGuard};
pub use share::{ShareLinks, share_links};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{DEFAULT_TIMEOUT, IntakeTransport, TransportError};
