use serde::{Deserialize, Serialize};

/// A prompt players vote on. Questions are displayed in the order they are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "ID")]
    pub id: i64,
    #[serde(alias = "val", alias = "Val")]
    pub text: String,
}

impl Question {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}
