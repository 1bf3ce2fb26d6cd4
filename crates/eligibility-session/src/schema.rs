use serde_json::Value;

use crate::state::SessionState;

/// JSON Schema of the session document (the serialized [`SessionState`]).
pub fn session_schema() -> Value {
    let schema = schemars::schema_for!(SessionState);
    schema.to_value()
}
