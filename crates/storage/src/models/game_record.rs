use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Candidate, Leaderboard, Question, RoomId};
use crate::error::{Result, StorageError};

/// Full state of one game session, as written to a single `games` row.
///
/// Records are only produced through [`GameRecord::build`] and
/// [`GameRecord::attach_leaderboard`] (or by decoding, which runs the same checks), so a
/// value of this type always satisfies its invariants:
/// - question ids are unique, candidate ids are unique;
/// - `num_candidates` equals the number of candidates;
/// - every leaderboard key is a question id and every belief is valid.
///
/// Leaderboard candidate ids are not required to appear in `candidates`; see
/// [`GameRecord::unknown_candidate_ids`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GameRecordWire")]
pub struct GameRecord {
    game_name: String,
    questions: Vec<Question>,
    candidates: Vec<Candidate>,
    leaderboard: Leaderboard,
    num_candidates: i32,
}

impl GameRecord {
    pub fn build(
        game_name: impl Into<String>,
        questions: Vec<Question>,
        candidates: Vec<Candidate>,
    ) -> Result<Self> {
        let num_candidates = i32::try_from(candidates.len()).map_err(|_| {
            StorageError::validation(format!("too many candidates: {}", candidates.len()))
        })?;

        let record = Self {
            game_name: game_name.into(),
            questions,
            candidates,
            leaderboard: Leaderboard::new(),
            num_candidates,
        };
        record.validate()?;

        Ok(record)
    }

    pub fn attach_leaderboard(self, leaderboard: Leaderboard) -> Result<Self> {
        leaderboard.validate()?;

        let record = Self {
            leaderboard,
            ..self
        };
        record.validate()?;

        Ok(record)
    }

    /// Re-checks every invariant. Writers call this instead of trusting the caller.
    pub fn validate(&self) -> Result<()> {
        let mut question_ids = HashSet::with_capacity(self.questions.len());
        for question in &self.questions {
            if !question_ids.insert(question.id) {
                return Err(StorageError::validation(format!(
                    "duplicate question id {}",
                    question.id
                )));
            }
        }

        let mut candidate_ids = HashSet::with_capacity(self.candidates.len());
        for candidate in &self.candidates {
            if !candidate_ids.insert(candidate.id) {
                return Err(StorageError::validation(format!(
                    "duplicate candidate id {}",
                    candidate.id
                )));
            }
        }

        if usize::try_from(self.num_candidates).ok() != Some(self.candidates.len()) {
            return Err(StorageError::validation(format!(
                "num_candidates is {} but the record has {} candidates",
                self.num_candidates,
                self.candidates.len()
            )));
        }

        self.leaderboard.validate()
    }

    /// Candidate ids referenced by the leaderboard that are not in `candidates`.
    pub fn unknown_candidate_ids(&self) -> Vec<i64> {
        let known: HashSet<i64> = self.candidates.iter().map(|c| c.id).collect();
        self.leaderboard
            .candidate_ids()
            .into_iter()
            .filter(|id| !known.contains(id))
            .collect()
    }

    /// Question ids with leaderboard entries that are not in `questions`.
    pub fn unknown_question_ids(&self) -> Vec<i64> {
        let known: HashSet<i64> = self.questions.iter().map(|q| q.id).collect();
        self.leaderboard
            .question_ids()
            .map(|ids| ids.into_iter().filter(|id| !known.contains(id)).collect())
            .unwrap_or_default()
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn num_candidates(&self) -> i32 {
        self.num_candidates
    }
}

/// Incoming shape before validation. `num_candidates` is optional on input and is
/// cross-checked against the candidate list when present.
#[derive(Deserialize)]
struct GameRecordWire {
    #[serde(alias = "GameName")]
    game_name: String,
    #[serde(alias = "Questions", default)]
    questions: Vec<Question>,
    #[serde(alias = "Candidates", default)]
    candidates: Vec<Candidate>,
    #[serde(alias = "Leaderboard", default)]
    leaderboard: Option<Leaderboard>,
    #[serde(alias = "NumCandidates")]
    num_candidates: Option<i64>,
}

impl TryFrom<GameRecordWire> for GameRecord {
    type Error = StorageError;

    fn try_from(wire: GameRecordWire) -> Result<Self> {
        let record = GameRecord::build(wire.game_name, wire.questions, wire.candidates)?
            .attach_leaderboard(wire.leaderboard.unwrap_or_default())?;

        if let Some(stated) = wire.num_candidates {
            if stated != i64::from(record.num_candidates) {
                return Err(StorageError::validation(format!(
                    "num_candidates is {} but the record has {} candidates",
                    stated, record.num_candidates
                )));
            }
        }

        Ok(record)
    }
}

/// A record together with the room it is stored under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredGame {
    #[serde(rename = "id")]
    pub room_id: RoomId,
    #[serde(flatten)]
    pub record: GameRecord,
}
