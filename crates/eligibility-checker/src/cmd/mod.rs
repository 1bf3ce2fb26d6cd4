pub mod country_codes;
pub mod i18n;
pub mod preview;
pub mod run;
pub mod schema;
