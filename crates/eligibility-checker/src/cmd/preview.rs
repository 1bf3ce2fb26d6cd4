use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use eligibility_session::{OutboundSubmission, build_submission, is_recognized};
use serde_json::json;

use crate::cmd::i18n::trf;
use crate::config::CheckerConfig;
use crate::session_file::load_session;

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Session document to build the request from
    #[arg(long = "answers", value_name = "answers.json")]
    pub answers: PathBuf,
    /// Calling code prepended to the phone number
    #[arg(long = "country-code", value_name = "CODE")]
    pub country_code: Option<String>,
    /// Print the fields as JSON instead of the request URL
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: PreviewArgs, config: &CheckerConfig) -> Result<()> {
    let store = load_session(&args.answers)?;
    let country_code = args
        .country_code
        .as_deref()
        .unwrap_or(&config.default_country_code)
        .trim()
        .to_string();
    if !is_recognized(&country_code) {
        eprintln!("{}", trf("cli.preview.unrecognized_code", &[&country_code]));
    }

    let submission = build_submission(store.state(), &country_code, &config.intake_target()?);
    println!("{}", render(&submission, args.json)?);
    Ok(())
}

fn render(submission: &OutboundSubmission, as_json: bool) -> Result<String> {
    if !as_json {
        return Ok(format!("{} {}", submission.method, submission.url()));
    }
    let value = json!({
        "method": submission.method,
        "endpoint": submission.endpoint.as_str(),
        "fields": submission.fields,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
