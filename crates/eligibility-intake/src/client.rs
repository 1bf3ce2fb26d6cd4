use eligibility_session::{
    IntakeTarget, OutboundSubmission, SessionEpoch, SessionStore, build_submission,
};
use thiserror::Error;

use crate::guard::{InFlight, SubmissionGuard};
use crate::transport::{IntakeTransport, TransportError};

/// The single message shown for any delivery failure.
pub const SUBMISSION_FAILED_MESSAGE: &str =
    "There was an error submitting your information. Please try again.";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("a submission is already in flight")]
    AlreadyInFlight,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A built submission that owns the in-flight slot until it is dispatched.
#[derive(Debug)]
pub struct PendingSubmission {
    submission: OutboundSubmission,
    epoch: SessionEpoch,
    permit: InFlight,
}

impl PendingSubmission {
    pub fn submission(&self) -> &OutboundSubmission {
        &self.submission
    }

    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }
}

/// Outcome of a dispatch, not yet applied to any session.
#[derive(Debug)]
pub struct DispatchReport {
    pub sid: String,
    pub epoch: SessionEpoch,
    pub result: Result<(), TransportError>,
}

/// What applying a [`DispatchReport`] did to the session.
#[derive(Debug)]
pub enum Completion {
    /// Delivered; the session has been reset. `full_name` is the name it held.
    Accepted { sid: String, full_name: String },
    /// Not delivered; the session is untouched so the user can retry.
    Failed {
        sid: String,
        message: &'static str,
        error: TransportError,
    },
    /// The session was reset while the request was pending; nothing changed.
    Stale { sid: String },
}

impl Completion {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Completion::Accepted { .. })
    }

    pub fn sid(&self) -> &str {
        match self {
            Completion::Accepted { sid, .. }
            | Completion::Failed { sid, .. }
            | Completion::Stale { sid } => sid,
        }
    }
}

/// Builds submissions for a fixed target and sends them one at a time.
#[derive(Debug)]
pub struct IntakeClient<T> {
    transport: T,
    target: IntakeTarget,
    guard: SubmissionGuard,
}

impl<T: IntakeTransport> IntakeClient<T> {
    pub fn new(transport: T, target: IntakeTarget) -> Self {
        Self {
            transport,
            target,
            guard: SubmissionGuard::new(),
        }
    }

    pub fn target(&self) -> &IntakeTarget {
        &self.target
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    /// Claims the in-flight slot and builds a submission with a fresh `sid`.
    pub fn prepare(
        &self,
        store: &SessionStore,
        country_code: &str,
    ) -> Result<PendingSubmission, IntakeError> {
        let permit = self
            .guard
            .try_acquire()
            .ok_or(IntakeError::AlreadyInFlight)?;
        let submission = build_submission(store.state(), country_code, &self.target);
        tracing::debug!(sid = submission.sid(), epoch = %store.epoch(), "prepared submission");
        Ok(PendingSubmission {
            submission,
            epoch: store.epoch(),
            permit,
        })
    }

    /// Sends a prepared submission. The in-flight slot is released when this returns.
    pub async fn dispatch(&self, pending: PendingSubmission) -> DispatchReport {
        let PendingSubmission {
            submission,
            epoch,
            permit,
        } = pending;
        let result = self.transport.send(&submission).await;
        drop(permit);

        let sid = submission.fields.sid;
        match &result {
            Ok(()) => tracing::info!(sid = %sid, "submission delivered"),
            Err(err) => tracing::warn!(sid = %sid, error = %err, "submission failed"),
        }
        DispatchReport { sid, epoch, result }
    }

    /// Prepares, dispatches and applies the outcome to `store` in one go.
    pub async fn submit(
        &self,
        store: &mut SessionStore,
        country_code: &str,
    ) -> Result<Completion, IntakeError> {
        let pending = self.prepare(store, country_code)?;
        let report = self.dispatch(pending).await;
        Ok(complete(store, report))
    }
}

/// Applies a dispatch outcome to the session it was built from.
///
/// Reports whose epoch no longer matches the store are ignored.
pub fn complete(store: &mut SessionStore, report: DispatchReport) -> Completion {
    let DispatchReport { sid, epoch, result } = report;
    if store.epoch() != epoch {
        tracing::warn!(
            sid = %sid,
            report_epoch = %epoch,
            current_epoch = %store.epoch(),
            "ignoring completion for a session that was reset"
        );
        return Completion::Stale { sid };
    }

    match result {
        Ok(()) => {
            let full_name = store.user_data().full_name.clone();
            store.reset();
            Completion::Accepted { sid, full_name }
        }
        Err(error) => Completion::Failed {
            sid,
            message: SUBMISSION_FAILED_MESSAGE,
            error,
        },
    }
}
