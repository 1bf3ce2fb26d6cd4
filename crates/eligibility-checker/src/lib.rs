//! Terminal front end for the citizenship eligibility questionnaire.

pub mod cli;
pub mod cmd;
pub mod config;
pub mod prompt;
pub mod questionnaire;
pub mod session_file;
