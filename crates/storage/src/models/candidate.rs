use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(alias = "ID")]
    pub id: i64,
    #[serde(alias = "First_Name")]
    pub first_name: String,
    #[serde(alias = "Last_Name")]
    pub last_name: String,
    /// Picture URL, or an object key the caller resolves to one.
    #[serde(alias = "Picture", default)]
    pub picture: String,
    #[serde(alias = "GamesPlayed", default)]
    pub games_played: u32,
}

impl Candidate {
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        picture: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            picture: picture.into(),
            games_played: 0,
        }
    }

    pub fn with_games_played(mut self, games_played: u32) -> Self {
        self.games_played = games_played;
        self
    }
}
