use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to set up a new game from free-form player input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[validate(length(min = 1, max = 200, message = "gameName is required"))]
    pub game_name: String,
    /// Empty means a code is generated.
    #[serde(default)]
    #[validate(length(max = 64, message = "roomCode must be at most 64 characters"))]
    pub room_code: String,
    #[validate(length(min = 1, message = "at least one question is required"))]
    pub questions: Vec<String>,
    #[validate(length(min = 1, message = "at least one candidate is required"))]
    pub candidates: Vec<CandidateFields>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub picture: String,
}
