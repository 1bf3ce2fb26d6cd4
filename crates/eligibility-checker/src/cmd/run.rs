use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use eligibility_intake::{
    Completion, HttpTransport, IntakeClient, IntakeTransport, complete, share_links,
};
use eligibility_session::{
    AnswerValue, CALLING_CODES, SessionStore, UserDataField, find_calling_code, is_recognized,
};
use url::Url;

use crate::cmd::i18n::{tr, trf};
use crate::config::CheckerConfig;
use crate::prompt::{Prompter, Reply};
use crate::questionnaire::{Question, QuestionKind, Questionnaire};
use crate::session_file::{load_session, write_session};

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Session document to submit instead of prompting
    #[arg(long = "answers", value_name = "answers.json")]
    pub answers: Option<PathBuf>,
    /// Calling code prepended to the phone number
    #[arg(long = "country-code", value_name = "CODE")]
    pub country_code: Option<String>,
    /// Print the request instead of sending it
    #[arg(long = "dry-run", default_value_t = false)]
    pub dry_run: bool,
    /// Where to save the session when the submission fails
    #[arg(long = "session-out", value_name = "session.json")]
    pub session_out: Option<PathBuf>,
}

/// Everything a session run needs besides its input and output streams.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub questionnaire: Questionnaire,
    /// Calling code fixed on the command line; skips the calling code prompt.
    pub country_code: Option<String>,
    pub default_country_code: String,
    pub share_origin: Option<Url>,
    pub dry_run: bool,
    pub session_out: Option<PathBuf>,
    /// Offer retries and new checks; off when input is piped.
    pub interactive: bool,
    /// The store already holds a complete session; do not prompt for it.
    pub prefilled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Delivered submissions, one `sid` per accepted check.
    Submitted { sids: Vec<String> },
    DryRun { url: Url },
}

pub fn run(args: RunArgs, config: &CheckerConfig) -> Result<()> {
    let questionnaire = Questionnaire::load(config.questionnaire_path().as_deref())?;
    let (store, prefilled) = match &args.answers {
        Some(path) => (load_session(path)?, true),
        None => (SessionStore::new(), false),
    };
    let options = SessionOptions {
        questionnaire,
        country_code: args.country_code.clone(),
        default_country_code: config.default_country_code.clone(),
        share_origin: config.share_origin_url()?,
        dry_run: args.dry_run,
        session_out: args.session_out.clone(),
        interactive: io::stdin().is_terminal() && io::stdout().is_terminal(),
        prefilled,
    };

    let transport = HttpTransport::new(config.timeout())?;
    let client = IntakeClient::new(transport, config.intake_target()?);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompter = Prompter::new(stdin.lock(), stdout.lock());
    runtime.block_on(run_session(&mut prompter, store, &client, &options))?;
    Ok(())
}

/// Collects a session, submits it and reports the outcome on the prompter.
pub async fn run_session<R, W, T>(
    prompter: &mut Prompter<R, W>,
    mut store: SessionStore,
    client: &IntakeClient<T>,
    options: &SessionOptions,
) -> Result<RunOutcome>
where
    R: BufRead,
    W: Write,
    T: IntakeTransport,
{
    let questionnaire = &options.questionnaire;
    let ready_step = contact_step(questionnaire) + 1;
    let mut prefilled = options.prefilled;
    let mut sids = Vec::new();

    loop {
        let country_code = if prefilled {
            store.set_step(ready_step);
            resolve_country_code(options)
        } else {
            collect_session(prompter, &mut store, options)?
        };
        prefilled = false;
        if !is_recognized(&country_code) {
            tracing::warn!(country_code = %country_code, "unrecognized calling code");
        }

        if options.dry_run {
            let pending = client.prepare(&store, &country_code)?;
            let submission = pending.submission();
            let url = submission.url();
            prompter.say(&tr("cli.run.dry_run"))?;
            prompter.say(&format!("{} {url}", submission.method))?;
            return Ok(RunOutcome::DryRun { url });
        }

        let sid = submit_until_settled(prompter, &mut store, client, &country_code, options)
            .await?;
        sids.push(sid);

        if !(options.interactive && wants(prompter, "cli.run.prompt.start_new", false)?) {
            return Ok(RunOutcome::Submitted { sids });
        }
    }
}

/// Sends the session, offering retries on failure. Returns the accepted `sid`.
async fn submit_until_settled<R, W, T>(
    prompter: &mut Prompter<R, W>,
    store: &mut SessionStore,
    client: &IntakeClient<T>,
    country_code: &str,
    options: &SessionOptions,
) -> Result<String>
where
    R: BufRead,
    W: Write,
    T: IntakeTransport,
{
    loop {
        prompter.say(&tr("cli.run.submitting"))?;
        let pending = client.prepare(store, country_code)?;
        let report = client.dispatch(pending).await;
        match complete(store, report) {
            Completion::Accepted { sid, full_name } => {
                thank(prompter, &full_name, options.share_origin.as_ref())?;
                return Ok(sid);
            }
            Completion::Failed { error, .. } => {
                tracing::debug!(error = %error, "submission attempt failed");
                prompter.say(&tr("cli.run.submit_failed"))?;
                if options.interactive && wants(prompter, "cli.run.prompt.retry", true)? {
                    continue;
                }
                if let Some(path) = &options.session_out {
                    write_session(path, store.state())?;
                    prompter.say(&trf("cli.run.session_written", &[&path.display().to_string()]))?;
                }
                bail!("{}", tr("cli.run.submit_failed"));
            }
            Completion::Stale { sid } => {
                bail!("submission {sid} completed for a session that no longer exists")
            }
        }
    }
}

fn thank<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    full_name: &str,
    share_origin: Option<&Url>,
) -> Result<()> {
    let name = if full_name.is_empty() {
        String::new()
    } else {
        format!(", {full_name}")
    };
    prompter.say(&trf("cli.run.thank_you", &[&name]))?;
    prompter.say(&tr("cli.run.received"))?;
    if let Some(origin) = share_origin {
        let links = share_links(origin);
        prompter.say(&trf("cli.run.share_whatsapp", &[links.whatsapp.as_str()]))?;
        prompter.say(&trf("cli.run.share_facebook", &[links.facebook.as_str()]))?;
    }
    Ok(())
}

fn wants<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    key: &str,
    default: bool,
) -> Result<bool> {
    Ok(matches!(
        prompter.boolean(&tr(key), Some(default), false)?,
        Reply::Value(true)
    ))
}

/// Step index of the contact form; the questions occupy `1..=len`.
fn contact_step(questionnaire: &Questionnaire) -> usize {
    questionnaire.len() + 1
}

fn resolve_country_code(options: &SessionOptions) -> String {
    options
        .country_code
        .as_deref()
        .unwrap_or(&options.default_country_code)
        .trim()
        .to_string()
}

/// Walks the store's step cursor from wherever it stands to the end of the
/// contact form. Returns the calling code picked on the way.
fn collect_session<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    store: &mut SessionStore,
    options: &SessionOptions,
) -> Result<String> {
    let questionnaire = &options.questionnaire;
    let contact = contact_step(questionnaire);
    let mut country_code = resolve_country_code(options);

    while store.current_step() <= contact {
        let step = store.current_step();
        if step == 0 {
            prompter.say(&tr("cli.run.welcome"))?;
            collect_identity(prompter, store)?;
            prompter.say(&tr("cli.run.questions_header"))?;
            prompter.say(&tr("cli.prompt.back_hint"))?;
            store.advance_step();
        } else if step < contact {
            let question = questionnaire
                .question(step - 1)
                .context("step cursor points past the questionnaire")?;
            match ask_question(prompter, store, question)? {
                Reply::Value(()) => store.advance_step(),
                Reply::Back => store.retreat_step(),
            }
        } else {
            match collect_contact(prompter, store, options)? {
                Reply::Value(code) => {
                    country_code = code;
                    store.advance_step();
                }
                Reply::Back => store.retreat_step(),
            }
        }
    }
    Ok(country_code)
}

fn collect_identity<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    store: &mut SessionStore,
) -> Result<()> {
    let current = store.user_data().full_name.clone();
    if let Reply::Value(name) =
        prompter.text(&tr("cli.run.prompt.full_name"), true, Some(current.as_str()), false)?
    {
        store.set_user_data_field(UserDataField::FullName, &name);
    }
    loop {
        let current = store.user_data().email.clone();
        let Reply::Value(email) =
            prompter.text(&tr("cli.run.prompt.email"), true, Some(current.as_str()), false)?
        else {
            continue;
        };
        if looks_like_email(&email) {
            store.set_user_data_field(UserDataField::Email, &email);
            return Ok(());
        }
        prompter.say(&tr("cli.run.invalid_email"))?;
    }
}

fn looks_like_email(value: &str) -> bool {
    value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}

fn ask_question<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    store: &mut SessionStore,
    question: &Question,
) -> Result<Reply<()>> {
    let previous = store.answer(&question.id).cloned();
    let reply = match &question.kind {
        QuestionKind::Choice { choices } => {
            let default = previous.as_ref().and_then(AnswerValue::as_str);
            prompter
                .choice(&question.title, choices, default, true)?
                .map(AnswerValue::from)
        }
        QuestionKind::Boolean => {
            let default = previous.as_ref().and_then(AnswerValue::as_bool);
            prompter
                .boolean(&question.title, default, true)?
                .map(AnswerValue::from)
        }
        QuestionKind::Text => {
            let default = previous.as_ref().and_then(AnswerValue::as_str);
            prompter
                .text(&question.title, question.required, default, true)?
                .map(AnswerValue::from)
        }
    };

    Ok(match reply {
        Reply::Back => Reply::Back,
        Reply::Value(AnswerValue::Text(text)) if text.is_empty() => {
            store.remove_answer(&question.id);
            Reply::Value(())
        }
        Reply::Value(value) => {
            store.set_answer(question.id.as_str(), value);
            Reply::Value(())
        }
    })
}

fn collect_contact<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    store: &mut SessionStore,
    options: &SessionOptions,
) -> Result<Reply<String>> {
    prompter.say(&tr("cli.run.contact_header"))?;
    prompter.say(&tr("cli.run.contact_intro"))?;

    let country_code = match &options.country_code {
        Some(code) => code.trim().to_string(),
        None => {
            let labels = CALLING_CODES
                .iter()
                .map(|entry| entry.label.to_string())
                .collect::<Vec<_>>();
            let default = find_calling_code(&options.default_country_code).map(|entry| entry.label);
            let Reply::Value(label) =
                prompter.choice(&tr("cli.run.prompt.country_code"), &labels, default, true)?
            else {
                return Ok(Reply::Back);
            };
            CALLING_CODES
                .iter()
                .find(|entry| entry.label == label)
                .map(|entry| entry.code.to_string())
                .context("selected calling code is not in the list")?
        }
    };

    let current = store.user_data().phone.clone();
    let Reply::Value(phone) =
        prompter.text(&tr("cli.run.prompt.phone"), true, Some(current.as_str()), true)?
    else {
        return Ok(Reply::Back);
    };
    store.set_user_data_field(UserDataField::Phone, &phone);

    let current = store.user_data().comments.clone();
    if let Reply::Value(comments) =
        prompter.text(&tr("cli.run.prompt.comments"), false, Some(current.as_str()), false)?
    {
        store.set_user_data_field(UserDataField::Comments, &comments);
    }
    Ok(Reply::Value(country_code))
}
