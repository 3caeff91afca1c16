//! Conversion between [`GameRecord`] and the column values of a `games` row.
//!
//! `questions` and `candidates` are JSON arrays in input order, `leaderboard` is a JSON
//! object keyed by question id strings whose values are objects keyed by candidate id,
//! and `mu`/`sigma` are JSON numbers. Decoding runs the full record validation.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, StorageError};
use crate::models::{Candidate, GameRecord, Leaderboard, Question};

/// Column values for one `games` row, excluding the `id` key.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct GameColumns {
    pub game_name: String,
    pub questions: Value,
    pub candidates: Value,
    pub leaderboard: Value,
    pub num_candidates: i32,
}

impl GameColumns {
    pub fn encode(record: &GameRecord) -> Result<Self> {
        Ok(Self {
            game_name: record.game_name().to_string(),
            questions: encode_column("questions", record.questions())?,
            candidates: encode_column("candidates", record.candidates())?,
            leaderboard: encode_leaderboard(record.leaderboard())?,
            num_candidates: record.num_candidates(),
        })
    }

    pub fn decode(self) -> Result<GameRecord> {
        let questions: Vec<Question> = decode_column("questions", self.questions)?;
        let candidates: Vec<Candidate> = decode_column("candidates", self.candidates)?;
        let leaderboard = decode_leaderboard(self.leaderboard)?;

        let record = GameRecord::build(self.game_name, questions, candidates)?
            .attach_leaderboard(leaderboard)?;

        if record.num_candidates() != self.num_candidates {
            return Err(StorageError::validation(format!(
                "stored num_candidates is {} but the row has {} candidates",
                self.num_candidates,
                record.num_candidates()
            )));
        }

        Ok(record)
    }
}

pub fn encode_leaderboard(leaderboard: &Leaderboard) -> Result<Value> {
    encode_column("leaderboard", leaderboard)
}

pub fn decode_leaderboard(value: Value) -> Result<Leaderboard> {
    decode_column("leaderboard", value)
}

fn encode_column<T: Serialize + ?Sized>(column: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| StorageError::constraint(format!("encode {}: {}", column, e)))
}

/// A JSON `null` column decodes as the empty value.
fn decode_column<T: DeserializeOwned + Default>(column: &str, value: Value) -> Result<T> {
    if value.is_null() {
        return Ok(T::default());
    }

    serde_json::from_value(value).map_err(|e| {
        StorageError::Database(sqlx::Error::Decode(
            format!("decode {}: {}", column, e).into(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BeliefState;
    use serde_json::json;

    fn record() -> GameRecord {
        let board = Leaderboard::new()
            .with_entry(1, 1, BeliefState { mu: 28.5, sigma: 7.2 })
            .with_entry(1, 2, BeliefState { mu: 24.3, sigma: 6.1 })
            .with_entry(2, 1, BeliefState { mu: 25.0, sigma: 6.4 });

        GameRecord::build(
            "Team Showdown",
            vec![Question::new(2, "Pick the best project idea."), Question::new(1, "Next lead?")],
            vec![
                Candidate::new(2, "Brook", "Lee", "https://picsum.photos/seed/brook/120"),
                Candidate::new(1, "Avery", "Stone", "https://picsum.photos/seed/avery/120")
                    .with_games_played(12),
            ],
        )
        .unwrap()
        .attach_leaderboard(board)
        .unwrap()
    }

    #[test]
    fn test_encode_column_shapes() {
        let columns = GameColumns::encode(&record()).unwrap();

        assert_eq!(columns.game_name, "Team Showdown");
        assert_eq!(columns.num_candidates, 2);
        assert_eq!(
            columns.questions,
            json!([
                {"id": 2, "text": "Pick the best project idea."},
                {"id": 1, "text": "Next lead?"}
            ])
        );
        assert_eq!(columns.candidates[0]["id"], 2);
        assert_eq!(columns.candidates[1]["games_played"], 12);
        assert_eq!(
            columns.leaderboard,
            json!({
                "1": {"1": {"mu": 28.5, "sigma": 7.2}, "2": {"mu": 24.3, "sigma": 6.1}},
                "2": {"1": {"mu": 25.0, "sigma": 6.4}}
            })
        );
    }

    #[test]
    fn test_decode_reproduces_record() {
        let original = record();
        let decoded = GameColumns::encode(&original).unwrap().decode().unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.questions()[0].id, 2);
        assert_eq!(decoded.leaderboard().get(1, 1), Some(&BeliefState { mu: 28.5, sigma: 7.2 }));
    }

    #[test]
    fn test_decode_rejects_count_mismatch() {
        let mut columns = GameColumns::encode(&record()).unwrap();
        columns.num_candidates = 5;

        assert!(matches!(
            columns.decode(),
            Err(StorageError::ValidationError(_))
        ));
    }

    #[test]
    fn test_decode_null_leaderboard_as_empty() {
        let mut columns = GameColumns::encode(&record()).unwrap();
        columns.leaderboard = Value::Null;

        let decoded = columns.decode().unwrap();
        assert!(decoded.leaderboard().is_empty());
    }

    #[test]
    fn test_decode_malformed_column_is_database_error() {
        let mut columns = GameColumns::encode(&record()).unwrap();
        columns.questions = json!({"not": "an array"});

        assert!(matches!(columns.decode(), Err(StorageError::Database(_))));
    }

    #[test]
    fn test_decode_leaderboard_from_python_style_payload() {
        let board = decode_leaderboard(json!({
            "1": {"1": {"mu": 28.5, "sigma": 7.2}, "2": {"mu": 24.3, "sigma": 6.1}, "3": {"mu": 22.9, "sigma": 5.8}},
            "2": {"1": {"mu": 25.0, "sigma": 6.4}, "2": {"mu": 29.1, "sigma": 7.0}, "3": {"mu": 23.8, "sigma": 5.6}}
        }))
        .unwrap();

        assert_eq!(board.len(), 2);
        assert_eq!(board.get(2, 2).map(|b| b.mu), Some(29.1));
    }
}
