use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use eligibility_intake::{
    Completion, IntakeClient, IntakeError, IntakeTransport, SUBMISSION_FAILED_MESSAGE,
    TransportError, complete,
};
use eligibility_session::{IntakeTarget, OutboundSubmission, SessionStore, UserDataField};

/// Records every submission and answers from a queue of scripted outcomes.
#[derive(Default)]
struct ScriptedTransport {
    sent: Mutex<Vec<OutboundSubmission>>,
    outcomes: Mutex<VecDeque<Result<(), TransportError>>>,
}

impl ScriptedTransport {
    fn answering(outcomes: Vec<Result<(), TransportError>>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            outcomes: Mutex::new(outcomes.into()),
        }
    }

    fn sent(&self) -> Vec<OutboundSubmission> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntakeTransport for ScriptedTransport {
    async fn send(&self, submission: &OutboundSubmission) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(submission.clone());
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

fn filled_store() -> SessionStore {
    let mut store = SessionStore::new();
    store.set_answer("country_selection", "Germany");
    store.set_user_data_field(UserDataField::FullName, "Jane Doe");
    store.set_user_data_field(UserDataField::Email, "jane@example.com");
    store.set_user_data_field(UserDataField::Phone, "+1 5551234567");
    store.advance_step();
    store
}

#[tokio::test]
async fn successful_submission_resets_the_session() {
    let client = IntakeClient::new(ScriptedTransport::default(), IntakeTarget::default());
    let mut store = filled_store();

    let completion = client.submit(&mut store, "+49").await.expect("submit");

    match completion {
        Completion::Accepted { full_name, .. } => assert_eq!(full_name, "Jane Doe"),
        other => panic!("expected acceptance, got {other:?}"),
    }
    assert!(store.state().is_empty());
    let sent = client.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].fields.phone, "+495551234567");
    assert!(!client.is_busy());
}

#[tokio::test]
async fn failed_submission_keeps_the_session() {
    let transport = ScriptedTransport::answering(vec![Err(TransportError::Status(502))]);
    let client = IntakeClient::new(transport, IntakeTarget::default());
    let mut store = filled_store();
    let before = store.state().clone();

    let completion = client.submit(&mut store, "+49").await.expect("submit");

    match completion {
        Completion::Failed { message, error, .. } => {
            assert_eq!(message, SUBMISSION_FAILED_MESSAGE);
            assert!(matches!(error, TransportError::Status(502)));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(store.state(), &before);
    assert!(!client.is_busy());
}

#[tokio::test]
async fn retry_after_failure_builds_a_new_submission() {
    let transport = ScriptedTransport::answering(vec![
        Err(TransportError::Request("connection reset".into())),
        Ok(()),
    ]);
    let client = IntakeClient::new(transport, IntakeTarget::default());
    let mut store = filled_store();

    let first = client.submit(&mut store, "+49").await.expect("first attempt");
    assert!(!first.is_accepted());
    assert!(!store.state().is_empty());

    let second = client.submit(&mut store, "+49").await.expect("retry");
    assert!(second.is_accepted());

    let sent = client.transport().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].sid(), first.sid());
    assert_eq!(sent[1].sid(), second.sid());
    assert_eq!(sent[0].fields.user_data, sent[1].fields.user_data);
}

#[tokio::test]
async fn concurrent_prepare_is_rejected() {
    let client = IntakeClient::new(ScriptedTransport::default(), IntakeTarget::default());
    let mut store = filled_store();

    let pending = client.prepare(&store, "+49").expect("first prepare");
    assert!(client.is_busy());
    assert!(matches!(
        client.prepare(&store, "+49"),
        Err(IntakeError::AlreadyInFlight)
    ));
    assert!(matches!(
        client.submit(&mut store, "+49").await,
        Err(IntakeError::AlreadyInFlight)
    ));

    let report = client.dispatch(pending).await;
    assert!(!client.is_busy());
    assert!(complete(&mut store, report).is_accepted());
    assert_eq!(client.transport().sent().len(), 1);
}

#[tokio::test]
async fn completion_after_restart_is_ignored() {
    let client = IntakeClient::new(ScriptedTransport::default(), IntakeTarget::default());
    let mut store = filled_store();

    let pending = client.prepare(&store, "+49").expect("prepare");
    store.reset();
    store.set_user_data_field(UserDataField::FullName, "John Roe");

    let report = client.dispatch(pending).await;
    let completion = complete(&mut store, report);

    assert!(matches!(completion, Completion::Stale { .. }));
    assert_eq!(store.user_data().full_name, "John Roe");
}

#[tokio::test]
async fn dropped_pending_submission_releases_the_slot() {
    let client = IntakeClient::new(ScriptedTransport::default(), IntakeTarget::default());
    let store = filled_store();

    let pending = client.prepare(&store, "+49").expect("prepare");
    assert_eq!(pending.epoch(), store.epoch());
    assert_eq!(pending.submission().fields.name, "Jane Doe");
    drop(pending);

    assert!(!client.is_busy());
    assert!(client.prepare(&store, "+49").is_ok());
    assert!(client.transport().sent().is_empty());
}
