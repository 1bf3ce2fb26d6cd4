use std::collections::VecDeque;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use eligibility_checker::cmd::run::{RunOutcome, SessionOptions, run_session};
use eligibility_checker::prompt::Prompter;
use eligibility_checker::questionnaire::Questionnaire;
use eligibility_checker::session_file::load_session;
use eligibility_intake::{IntakeClient, IntakeTransport, TransportError};
use eligibility_session::{
    AnswerValue, IntakeTarget, OutboundSubmission, SessionStore, UserDataField,
};
use url::Url;

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<OutboundSubmission>>,
    outcomes: Mutex<VecDeque<Result<(), TransportError>>>,
}

impl RecordingTransport {
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
impl IntakeTransport for RecordingTransport {
    async fn send(&self, submission: &OutboundSubmission) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(submission.clone());
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

fn options() -> SessionOptions {
    SessionOptions {
        questionnaire: Questionnaire::embedded().unwrap(),
        country_code: None,
        default_country_code: "+1".to_string(),
        share_origin: None,
        dry_run: false,
        session_out: None,
        interactive: false,
        prefilled: false,
    }
}

fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
    Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
}

/// Name, email, the four embedded questions, then calling code, phone and comments.
const JANE: &str = "Jane Doe\n\
jane@example.com\n\
1\n\
no\n\
no\n\
\n\
3\n\
+1 5551234567\n\
\n";

#[tokio::test]
async fn scripted_session_is_submitted_with_composed_phone() {
    let client = IntakeClient::new(RecordingTransport::default(), IntakeTarget::default());
    let mut p = prompter(JANE);

    let outcome = run_session(&mut p, SessionStore::new(), &client, &options())
        .await
        .expect("run");

    let sent = client.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(outcome, RunOutcome::Submitted {
        sids: vec![sent[0].fields.sid.clone()]
    });
    let fields = &sent[0].fields;
    assert_eq!(fields.name, "Jane Doe");
    assert_eq!(fields.email, "jane@example.com");
    assert_eq!(fields.phone, "+495551234567");
    assert_eq!(fields.topic, "Germany Citizenship - Not Eligible");
    assert_eq!(fields.desc, "Comments: No comments provided");

    let user_data: serde_json::Value = serde_json::from_str(&fields.user_data).unwrap();
    let answers = user_data["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 3, "blank optional answer is not recorded");
    assert_eq!(answers[0]["questionId"], "country_selection");
    assert_eq!(answers[1]["value"], false);

    let shown = String::from_utf8(p.into_output()).unwrap();
    assert!(shown.contains("Thank You, Jane Doe!"));
    assert!(!shown.contains("Share on WhatsApp"));
}

#[tokio::test]
async fn going_back_keeps_earlier_answers_as_defaults() {
    let client = IntakeClient::new(RecordingTransport::default(), IntakeTarget::default());
    let script = "Jane Doe\n\
jane@example.com\n\
2\n\
<\n\
\n\
yes\n\
yes\n\
1938\n\
2\n\
20 7946 0000\n\
call after 5\n";
    let mut p = prompter(script);

    run_session(&mut p, SessionStore::new(), &client, &options())
        .await
        .expect("run");

    let fields = &client.transport().sent()[0].fields;
    assert_eq!(fields.topic, "Austria Citizenship - Not Eligible");
    assert_eq!(fields.phone, "+4420 7946 0000");
    assert_eq!(fields.desc, "Comments: call after 5");
    let user_data: serde_json::Value = serde_json::from_str(&fields.user_data).unwrap();
    assert_eq!(user_data["answers"][3]["value"], "1938");
}

#[tokio::test]
async fn dry_run_builds_without_sending() {
    let client = IntakeClient::new(RecordingTransport::default(), IntakeTarget::default());
    let mut opts = options();
    opts.dry_run = true;
    opts.country_code = Some("+49".to_string());
    // Calling code comes from the options, so the contact step skips its menu.
    let script = "Jane Doe\njane@example.com\n1\nno\nno\n\n5551234567\n\n";
    let mut p = prompter(script);

    let outcome = run_session(&mut p, SessionStore::new(), &client, &opts)
        .await
        .expect("run");

    assert!(client.transport().sent().is_empty());
    let RunOutcome::DryRun { url } = outcome else {
        panic!("expected a dry run");
    };
    let query = url.query().unwrap();
    assert!(query.starts_with("uid=fxSOVhSeeRs9&lead_source=31234&sid="));
    assert!(query.contains("topic=Germany+Citizenship+-+Not+Eligible"));
    assert!(!client.is_busy());
}

#[tokio::test]
async fn prefilled_session_is_sent_without_prompting() {
    let client = IntakeClient::new(RecordingTransport::default(), IntakeTarget::default());
    let mut store = SessionStore::new();
    store.set_answer("country_selection", "Germany");
    store.set_user_data_field(UserDataField::FullName, "John Roe");
    store.set_user_data_field(UserDataField::Phone, "+61 412 345 678");
    let mut opts = options();
    opts.prefilled = true;
    opts.country_code = Some("+61".to_string());
    opts.share_origin = Some(Url::parse("https://checker.example").unwrap());

    let outcome = run_session(&mut prompter(""), store, &client, &opts)
        .await
        .expect("run");

    assert!(matches!(outcome, RunOutcome::Submitted { ref sids } if sids.len() == 1));
    assert_eq!(client.transport().sent()[0].fields.phone, "+61412 345 678");
}

#[tokio::test]
async fn non_interactive_failure_saves_the_session() {
    let temp = tempfile::TempDir::new().unwrap();
    let out: PathBuf = temp.path().join("session.json");
    let transport = RecordingTransport::answering(vec![Err(TransportError::Status(503))]);
    let client = IntakeClient::new(transport, IntakeTarget::default());
    let mut opts = options();
    opts.session_out = Some(out.clone());

    let err = run_session(&mut prompter(JANE), SessionStore::new(), &client, &opts)
        .await
        .expect_err("submission fails");

    assert!(err.to_string().contains("Please try again"));
    let saved = load_session(&out).expect("saved session");
    assert_eq!(saved.user_data().full_name, "Jane Doe");
    assert_eq!(saved.user_data().phone, "5551234567");
    assert_eq!(
        saved.answer("country_selection"),
        Some(&AnswerValue::from("Germany"))
    );
    assert_eq!(saved.current_step(), 6);
}

#[tokio::test]
async fn interactive_retry_sends_a_fresh_request() {
    let transport = RecordingTransport::answering(vec![Err(TransportError::Status(502)), Ok(())]);
    let client = IntakeClient::new(transport, IntakeTarget::default());
    let mut opts = options();
    opts.interactive = true;
    let script = format!("{JANE}y\nn\n");

    let outcome = run_session(&mut prompter(&script), SessionStore::new(), &client, &opts)
        .await
        .expect("run");

    let sent = client.transport().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].fields.name, sent[1].fields.name);
    assert_eq!(outcome, RunOutcome::Submitted {
        sids: vec![sent[1].fields.sid.clone()]
    });
}

#[tokio::test]
async fn start_new_check_collects_a_second_session() {
    let client = IntakeClient::new(RecordingTransport::default(), IntakeTarget::default());
    let mut opts = options();
    opts.interactive = true;
    let second = JANE.replace("Jane Doe", "John Roe").replace("jane@", "john@");
    let script = format!("{JANE}y\n{second}n\n");

    let outcome = run_session(&mut prompter(&script), SessionStore::new(), &client, &opts)
        .await
        .expect("run");

    let sent = client.transport().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].fields.name, "John Roe");
    assert!(matches!(outcome, RunOutcome::Submitted { ref sids } if sids.len() == 2));
}
