use serde::{Deserialize, Serialize};

/// Follow-up work a unit hands to the host queue instead of doing inline
///
/// e.g. `Job::new("resave_elements", json!({"type": "product"}))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub kind: String,
    pub payload: serde_json::Value,
}

impl Job {
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}
