use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::codec::{self, GameColumns};
use crate::error::{Result, StorageError};
use crate::models::{BeliefState, GameRecord, RoomId, StoredGame};

/// One belief value to store for a (question, candidate) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingUpdate {
    pub question_id: i64,
    pub candidate_id: i64,
    pub belief: BeliefState,
}

impl RatingUpdate {
    pub fn new(question_id: i64, candidate_id: i64, belief: BeliefState) -> Self {
        Self {
            question_id,
            candidate_id,
            belief,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.question_id <= 0 || self.candidate_id <= 0 {
            return Err(StorageError::validation(format!(
                "question id and candidate id must be positive, got question {} candidate {}",
                self.question_id, self.candidate_id
            )));
        }
        self.belief.validate()
    }
}

#[derive(sqlx::FromRow)]
struct GameRow {
    id: String,
    #[sqlx(flatten)]
    columns: GameColumns,
}

impl GameRow {
    fn into_stored(self) -> Result<StoredGame> {
        Ok(StoredGame {
            room_id: RoomId::new(self.id)?,
            record: self.columns.decode()?,
        })
    }
}

pub struct GameRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GameRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the game, or replace every non-key column of the existing row.
    ///
    /// The insert-or-replace decision is made by Postgres inside a single
    /// `INSERT ... ON CONFLICT` statement, so concurrent writers to the same room
    /// resolve as last-committed-wins and readers never see a mix of two records.
    /// Nested JSON columns are overwritten as a whole, never merged.
    pub async fn upsert(&self, room_id: &RoomId, record: &GameRecord) -> Result<()> {
        record.validate()?;
        warn_unknown_references(room_id, record);

        let GameColumns {
            game_name,
            questions,
            candidates,
            leaderboard,
            num_candidates,
        } = GameColumns::encode(record)?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO games (id, game_name, questions, candidates, leaderboard, num_candidates)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id)
            DO UPDATE SET
                game_name = EXCLUDED.game_name,
                questions = EXCLUDED.questions,
                candidates = EXCLUDED.candidates,
                leaderboard = EXCLUDED.leaderboard,
                num_candidates = EXCLUDED.num_candidates
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(room_id.as_str())
        .bind(game_name)
        .bind(questions)
        .bind(candidates)
        .bind(leaderboard)
        .bind(num_candidates)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if inserted {
            info!(room_id = %room_id, num_candidates, "Created game");
        } else {
            debug!(room_id = %room_id, num_candidates, "Replaced game");
        }

        Ok(())
    }

    /// Insert a game under a room id that must not be taken yet.
    ///
    /// There is no `ON CONFLICT` clause: if the id is already stored the primary key
    /// rejects the row and the error reports `is_unique_violation()`, leaving the
    /// existing game untouched.
    pub async fn insert(&self, room_id: &RoomId, record: &GameRecord) -> Result<()> {
        record.validate()?;
        warn_unknown_references(room_id, record);

        let GameColumns {
            game_name,
            questions,
            candidates,
            leaderboard,
            num_candidates,
        } = GameColumns::encode(record)?;

        sqlx::query(
            r#"
            INSERT INTO games (id, game_name, questions, candidates, leaderboard, num_candidates)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(room_id.as_str())
        .bind(game_name)
        .bind(questions)
        .bind(candidates)
        .bind(leaderboard)
        .bind(num_candidates)
        .execute(self.pool)
        .await?;

        info!(room_id = %room_id, num_candidates, "Created game");

        Ok(())
    }

    /// Find a game by room id
    pub async fn find(&self, room_id: &RoomId) -> Result<StoredGame> {
        let row = sqlx::query_as::<_, GameRow>(
            r#"
            SELECT id, game_name, questions, candidates, leaderboard, num_candidates
            FROM games
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(room_id.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        row.into_stored()
    }

    pub async fn exists(&self, room_id: &RoomId) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM games WHERE id = $1)")
            .bind(room_id.as_str())
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }

    pub async fn update_rating(
        &self,
        room_id: &RoomId,
        question_id: i64,
        candidate_id: i64,
        belief: BeliefState,
    ) -> Result<()> {
        self.update_ratings(room_id, &[RatingUpdate::new(question_id, candidate_id, belief)])
            .await
    }

    /// Store several beliefs in one write. Only the `leaderboard` column changes.
    ///
    /// The row is locked for the duration of the transaction so that two updaters of
    /// the same room apply one after the other instead of overwriting each other.
    pub async fn update_ratings(&self, room_id: &RoomId, updates: &[RatingUpdate]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        for update in updates {
            update.validate()?;
        }

        let mut tx = self.pool.begin().await?;

        let stored = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT leaderboard FROM games WHERE id = $1 FOR UPDATE",
        )
        .bind(room_id.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        let mut leaderboard = codec::decode_leaderboard(stored)?;
        for update in updates {
            leaderboard.insert(update.question_id, update.candidate_id, update.belief);
        }
        leaderboard.validate()?;

        sqlx::query("UPDATE games SET leaderboard = $1 WHERE id = $2")
            .bind(codec::encode_leaderboard(&leaderboard)?)
            .bind(room_id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(room_id = %room_id, updates = updates.len(), "Updated ratings");

        Ok(())
    }
}

/// Dangling leaderboard references are tolerated on write but worth a log line.
fn warn_unknown_references(room_id: &RoomId, record: &GameRecord) {
    let candidate_ids = record.unknown_candidate_ids();
    if !candidate_ids.is_empty() {
        warn!(
            room_id = %room_id,
            candidate_ids = ?candidate_ids,
            "Leaderboard references candidates missing from the candidate list"
        );
    }

    let question_ids = record.unknown_question_ids();
    if !question_ids.is_empty() {
        warn!(
            room_id = %room_id,
            question_ids = ?question_ids,
            "Leaderboard references questions missing from the question list"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_update_requires_positive_ids() {
        let update = RatingUpdate::new(0, 1, BeliefState::INITIAL);
        assert!(matches!(
            update.validate(),
            Err(StorageError::ValidationError(_))
        ));

        let update = RatingUpdate::new(1, -4, BeliefState::INITIAL);
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_rating_update_checks_belief() {
        let update = RatingUpdate::new(1, 1, BeliefState { mu: 20.0, sigma: -2.0 });
        assert!(update.validate().is_err());

        let update = RatingUpdate::new(1, 1, BeliefState { mu: 20.0, sigma: 2.0 });
        assert!(update.validate().is_ok());
    }
}
