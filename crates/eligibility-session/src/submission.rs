use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::SessionError;
use crate::answers::Answer;
use crate::state::SessionState;
use crate::user_data::strip_country_prefix;

pub const DEFAULT_ENDPOINT: &str = "https://backend-eligibility-checker.onrender.com/api/proxy";
pub const DEFAULT_UID: &str = "fxSOVhSeeRs9";
pub const DEFAULT_LEAD_SOURCE: &str = "31234";

/// Question whose answer names the citizenship the check is about.
pub const COUNTRY_QUESTION_ID: &str = "country_selection";
pub const UNKNOWN_COUNTRY: &str = "Unknown";
pub const NO_COMMENTS: &str = "No comments provided";

const SID_RANGE: std::ops::RangeInclusive<u32> = 100_000..=999_999;

/// Where a submission is addressed and the routing constants it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeTarget {
    endpoint: Url,
    uid: String,
    lead_source: String,
    ref_url: String,
}

impl IntakeTarget {
    pub fn new(
        endpoint: &str,
        uid: impl Into<String>,
        lead_source: impl Into<String>,
        ref_url: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let parsed = Url::parse(endpoint)
            .map_err(|err| SessionError::InvalidEndpoint(format!("{endpoint}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SessionError::InvalidEndpoint(format!(
                "{endpoint}: unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        Ok(Self {
            endpoint: parsed,
            uid: uid.into(),
            lead_source: lead_source.into(),
            ref_url: ref_url.into(),
        })
    }

    pub fn with_ref_url(mut self, ref_url: impl Into<String>) -> Self {
        self.ref_url = ref_url.into();
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn lead_source(&self) -> &str {
        &self.lead_source
    }

    pub fn ref_url(&self) -> &str {
        &self.ref_url
    }
}

impl Default for IntakeTarget {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            uid: DEFAULT_UID.to_string(),
            lead_source: DEFAULT_LEAD_SOURCE.to_string(),
            ref_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
}

impl RequestMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw-data snapshot embedded as the `user_data` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDataSnapshot {
    pub comments: String,
    pub phone: String,
    pub answers: Vec<Answer>,
}

/// Flat parameter set sent as the query string, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFields {
    pub uid: String,
    pub lead_source: String,
    pub sid: String,
    pub name: String,
    pub topic: String,
    pub desc: String,
    pub email: String,
    pub phone: String,
    pub ref_url: String,
    pub user_data: String,
}

impl SubmissionFields {
    pub fn pairs(&self) -> [(&'static str, &str); 10] {
        [
            ("uid", self.uid.as_str()),
            ("lead_source", self.lead_source.as_str()),
            ("sid", self.sid.as_str()),
            ("name", self.name.as_str()),
            ("topic", self.topic.as_str()),
            ("desc", self.desc.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("ref_url", self.ref_url.as_str()),
            ("user_data", self.user_data.as_str()),
        ]
    }
}

/// A fully assembled request, built once per send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSubmission {
    pub method: RequestMethod,
    pub endpoint: Url,
    pub fields: SubmissionFields,
}

impl OutboundSubmission {
    pub fn sid(&self) -> &str {
        &self.fields.sid
    }

    /// Endpoint with the fields appended as a form-encoded query string.
    pub fn url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(self.fields.pairs());
        url
    }
}

/// Builds the outbound request for the current session with a fresh `sid`.
pub fn build_submission(
    state: &SessionState,
    country_code: &str,
    target: &IntakeTarget,
) -> OutboundSubmission {
    build_submission_with_rng(state, country_code, target, &mut rand::thread_rng())
}

/// Same as [`build_submission`], drawing the `sid` from `rng`.
pub fn build_submission_with_rng<R: Rng + ?Sized>(
    state: &SessionState,
    country_code: &str,
    target: &IntakeTarget,
    rng: &mut R,
) -> OutboundSubmission {
    let user = &state.user_data;
    let phone = compose_phone(country_code, &user.phone);
    let snapshot = UserDataSnapshot {
        comments: user.comments.clone(),
        phone: phone.clone(),
        answers: state.answers.clone(),
    };
    // Strings and booleans only; serialization cannot fail.
    let user_data = serde_json::to_string(&snapshot).unwrap_or_default();

    let fields = SubmissionFields {
        uid: target.uid.clone(),
        lead_source: target.lead_source.clone(),
        sid: generate_sid(rng),
        name: user.full_name.clone(),
        topic: primary_topic(state),
        desc: describe_comments(&user.comments),
        email: user.email.clone(),
        phone,
        ref_url: target.ref_url.clone(),
        user_data,
    };

    OutboundSubmission {
        method: RequestMethod::Get,
        endpoint: target.endpoint.clone(),
        fields,
    }
}

/// Six-digit identifier in `[100000, 999999]`.
pub fn generate_sid<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(SID_RANGE).to_string()
}

/// `"<country> Citizenship - Not Eligible"`, with `Unknown` when no country was chosen.
pub fn primary_topic(state: &SessionState) -> String {
    let country = state
        .answer(COUNTRY_QUESTION_ID)
        .filter(|value| !value.is_blank())
        .map(ToString::to_string)
        .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());
    format!("{country} Citizenship - Not Eligible")
}

pub fn describe_comments(comments: &str) -> String {
    if comments.is_empty() {
        format!("Comments: {NO_COMMENTS}")
    } else {
        format!("Comments: {comments}")
    }
}

pub fn compose_phone(country_code: &str, phone: &str) -> String {
    format!("{country_code}{}", strip_country_prefix(phone))
}
