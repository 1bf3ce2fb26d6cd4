use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::sync::OnceLock;

use unic_langid::LanguageIdentifier;

const SUPPORTED_LOCALES: &[&str] = &["en", "de"];

const EN_CATALOG: &str = include_str!("../../../../i18n/en.json");
const DE_CATALOG: &str = include_str!("../../../../i18n/de.json");

static EN_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();
static SELECTED_LOCALE: OnceLock<String> = OnceLock::new();
static LOCALE_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();

fn en_messages() -> &'static BTreeMap<String, String> {
    EN_MESSAGES.get_or_init(|| {
        serde_json::from_str(EN_CATALOG).expect("parse embedded i18n/en.json catalog")
    })
}

fn embedded_catalog(locale: &str) -> Option<&'static str> {
    match locale {
        "en" => Some(EN_CATALOG),
        "de" => Some(DE_CATALOG),
        _ => None,
    }
}

fn detect_env_locale() -> Option<String> {
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(val) = env::var(key) {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn detect_system_locale() -> Option<String> {
    sys_locale::get_locale()
}

fn normalize_locale(raw: &str) -> Option<String> {
    let mut cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Some((head, _)) = cleaned.split_once('.') {
        cleaned = head;
    }
    if let Some((head, _)) = cleaned.split_once('@') {
        cleaned = head;
    }
    let cleaned = cleaned.replace('_', "-");
    cleaned
        .parse::<LanguageIdentifier>()
        .ok()
        .map(|lid| lid.to_string())
}

fn resolve_supported_locale(candidate: &str) -> Option<String> {
    let norm = normalize_locale(candidate)?;
    if SUPPORTED_LOCALES.iter().any(|supported| *supported == norm) {
        return Some(norm);
    }
    let base = norm.split('-').next()?.to_ascii_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .any(|supported| *supported == base)
        .then_some(base)
}

pub fn select_locale(cli_locale: Option<String>) -> String {
    if let Some(cli) = cli_locale.as_deref()
        && let Some(found) = resolve_supported_locale(cli)
    {
        return found;
    }
    if let Some(env_loc) = detect_env_locale()
        && let Some(found) = resolve_supported_locale(&env_loc)
    {
        return found;
    }
    if let Some(sys_loc) = detect_system_locale()
        && let Some(found) = resolve_supported_locale(&sys_loc)
    {
        return found;
    }
    "en".to_string()
}

fn load_locale_messages(locale: &str) -> BTreeMap<String, String> {
    if locale == "en" {
        return en_messages().clone();
    }
    let Some(raw) = embedded_catalog(locale) else {
        return en_messages().clone();
    };
    let Ok(locale_map) = serde_json::from_str::<BTreeMap<String, String>>(raw) else {
        return en_messages().clone();
    };
    let mut merged = en_messages().clone();
    merged.extend(locale_map);
    merged
}

/// English catalog overlaid with `locale`'s translations.
pub fn resolved_catalog(locale: &str) -> BTreeMap<String, String> {
    load_locale_messages(locale)
}

pub fn init(cli_locale: Option<String>) {
    let locale = select_locale(cli_locale);
    let _ = SELECTED_LOCALE.set(locale.clone());
    let _ = LOCALE_MESSAGES.set(load_locale_messages(&locale));
}

/// Finds `--locale` before clap runs so parse errors can already be localized.
pub fn cli_locale_from_argv(args: &[OsString]) -> Option<String> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let raw = arg.to_string_lossy();
        if raw == "--locale" {
            if let Some(value) = iter.next() {
                return Some(value.to_string_lossy().to_string());
            }
            return None;
        }
        if let Some(rest) = raw.strip_prefix("--locale=") {
            return Some(rest.to_string());
        }
    }
    None
}

pub fn selected_locale() -> &'static str {
    SELECTED_LOCALE.get().map(String::as_str).unwrap_or("en")
}

pub fn tr(key: &str) -> String {
    LOCALE_MESSAGES
        .get()
        .and_then(|m| m.get(key))
        .cloned()
        .or_else(|| en_messages().get(key).cloned())
        .unwrap_or_else(|| key.to_string())
}

pub fn trf(key: &str, args: &[&str]) -> String {
    let mut msg = tr(key);
    for arg in args {
        msg = msg.replacen("{}", arg, 1);
    }
    msg
}
