use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use eligibility_session::{SessionState, SessionStore};

/// Reads a session document and rebuilds a store from it.
pub fn load_session(path: &Path) -> Result<SessionStore> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read answers {}", path.display()))?;
    let state: SessionState = serde_json::from_str(&raw)
        .with_context(|| format!("invalid session document {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        answers = state.answers.len(),
        step = state.current_step,
        "loaded session document"
    );
    Ok(SessionStore::from_state(state))
}

pub fn write_session(path: &Path, state: &SessionState) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = state.to_json_pretty()?;
    fs::write(path, json + "\n")
        .with_context(|| format!("failed to write session {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eligibility_session::UserDataField;

    #[test]
    fn written_session_loads_back() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested").join("session.json");

        let mut store = SessionStore::new();
        store.set_answer("country_selection", "Germany");
        store.set_user_data_field(UserDataField::Phone, "+49 170 1234");
        store.advance_step();
        write_session(&path, store.state()).unwrap();

        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.state(), store.state());
    }

    #[test]
    fn loading_strips_phone_prefix() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("answers.json");
        fs::write(&path, r#"{"userData":{"phone":"+1 5551234567"}}"#).unwrap();

        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.user_data().phone, "5551234567");
        assert!(loaded.answers().is_empty());
    }
}
