use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::SessionError;

static COUNTRY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[0-9]+\s*").expect("country prefix pattern is valid"));

/// Removes a leading `+<digits>` calling-code prefix (and any whitespace after it).
///
/// Input without such a prefix is returned unchanged. Stacked prefixes such as
/// `+1 +44 20` are all removed so the result never starts with `+<digits>`.
pub fn strip_country_prefix(input: &str) -> Cow<'_, str> {
    let mut rest = input;
    while let Some(found) = COUNTRY_PREFIX.find(rest) {
        rest = &rest[found.end()..];
    }
    if rest.len() == input.len() {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(rest.to_string())
    }
}

/// Contact record collected on the user-info and contact steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserData {
    pub full_name: String,
    pub email: String,
    /// Digits as typed, never starting with `+<digits>`.
    pub phone: String,
    pub comments: String,
}

impl UserData {
    pub fn get(&self, field: UserDataField) -> &str {
        match field {
            UserDataField::FullName => &self.full_name,
            UserDataField::Email => &self.email,
            UserDataField::Phone => &self.phone,
            UserDataField::Comments => &self.comments,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: UserDataField) -> &mut String {
        match field {
            UserDataField::FullName => &mut self.full_name,
            UserDataField::Email => &mut self.email,
            UserDataField::Phone => &mut self.phone,
            UserDataField::Comments => &mut self.comments,
        }
    }
}

/// Writable fields of [`UserData`], named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum UserDataField {
    FullName,
    Email,
    Phone,
    Comments,
}

impl UserDataField {
    pub const ALL: [UserDataField; 4] = [
        UserDataField::FullName,
        UserDataField::Email,
        UserDataField::Phone,
        UserDataField::Comments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserDataField::FullName => "fullName",
            UserDataField::Email => "email",
            UserDataField::Phone => "phone",
            UserDataField::Comments => "comments",
        }
    }
}

impl fmt::Display for UserDataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserDataField {
    type Err = SessionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        UserDataField::ALL
            .into_iter()
            .find(|field| field.as_str() == raw)
            .ok_or_else(|| SessionError::UnknownField(raw.to_string()))
    }
}
