//! Session state machine for the eligibility questionnaire.
//!
//! [`SessionStore`] owns the answers, the step cursor and the contact record;
//! [`build_submission`] turns a snapshot of that state into the request the
//! intake endpoint expects.

pub mod answers;
pub mod calling_code;
pub mod schema;
pub mod state;
pub mod store;
pub mod submission;
pub mod user_data;

use thiserror::Error;

pub use answers::{Answer, AnswerValue};
pub use calling_code::{
    CALLING_CODES, CallingCode, DEFAULT_CALLING_CODE, find_calling_code, is_recognized,
};
pub use schema::session_schema;
pub use state::SessionState;
pub use store::{SessionEpoch, SessionObserver, SessionStore};
pub use submission::{
    COUNTRY_QUESTION_ID, IntakeTarget, OutboundSubmission, RequestMethod, SubmissionFields,
    UserDataSnapshot, build_submission, build_submission_with_rng, compose_phone,
    describe_comments, generate_sid, primary_topic,
};
pub use user_data::{UserData, UserDataField, strip_country_prefix};

/// Errors raised while configuring a session or parsing field names.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown user data field '{0}'")]
    UnknownField(String),
    #[error("invalid intake endpoint {0}")]
    InvalidEndpoint(String),
}
