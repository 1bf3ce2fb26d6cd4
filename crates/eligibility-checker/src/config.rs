use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use eligibility_session::{DEFAULT_CALLING_CODE, IntakeTarget, submission};
use serde::{Deserialize, Serialize};
use url::Url;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Settings read from `config.toml`; every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    pub default_country_code: String,
    /// Questionnaire JSON; relative paths resolve against the config file.
    pub questionnaire: Option<PathBuf>,
    /// Public address of the checker, used for share links after submitting.
    pub share_origin: Option<String>,
    pub intake: IntakeConfig,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeConfig {
    pub endpoint: String,
    pub uid: String,
    pub lead_source: String,
    pub ref_url: String,
    pub timeout_secs: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            default_country_code: DEFAULT_CALLING_CODE.to_string(),
            questionnaire: None,
            share_origin: None,
            intake: IntakeConfig::default(),
            base_dir: None,
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            endpoint: submission::DEFAULT_ENDPOINT.to_string(),
            uid: submission::DEFAULT_UID.to_string(),
            lead_source: submission::DEFAULT_LEAD_SOURCE.to_string(),
            ref_url: String::new(),
            timeout_secs: eligibility_intake::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl CheckerConfig {
    /// Loads `explicit` if given, else the per-user config file when present,
    /// else the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("config file {} does not exist", path.display());
            }
            return Self::from_path(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_path(&path),
            _ => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.intake_target()?;
        config.share_origin_url()?;
        Ok(config)
    }

    pub fn intake_target(&self) -> Result<IntakeTarget> {
        let intake = &self.intake;
        Ok(IntakeTarget::new(
            &intake.endpoint,
            intake.uid.as_str(),
            intake.lead_source.as_str(),
            intake.ref_url.as_str(),
        )?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.intake.timeout_secs.max(1))
    }

    pub fn share_origin_url(&self) -> Result<Option<Url>> {
        self.share_origin
            .as_deref()
            .map(|raw| Url::parse(raw).with_context(|| format!("invalid share_origin '{raw}'")))
            .transpose()
    }

    pub fn questionnaire_path(&self) -> Option<PathBuf> {
        let path = self.questionnaire.as_ref()?;
        match &self.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.clone()),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "eligibility-checker")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
