use sqlx::PgPool;
use tracing::info;
use validator::Validate;

use crate::dto::game::{CandidateFields, CreateGameRequest};
use crate::error::{Result, StorageError};
use crate::models::{BeliefState, Candidate, GameRecord, Leaderboard, Question, RoomId};
use crate::repository::GameRepository;
use crate::services::room_code;

/// Blank entries are skipped; ids are assigned from 1 in input order.
pub fn questions_from_text(raw: &[String]) -> Vec<Question> {
    raw.iter()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .zip(1..)
        .map(|(text, id)| Question::new(id, text))
        .collect()
}

/// Candidates with neither a first nor a last name are skipped.
pub fn candidates_from_fields(raw: &[CandidateFields]) -> Vec<Candidate> {
    raw.iter()
        .filter(|fields| !fields.first_name.trim().is_empty() || !fields.last_name.trim().is_empty())
        .zip(1..)
        .map(|(fields, id)| {
            Candidate::new(
                id,
                fields.first_name.trim(),
                fields.last_name.trim(),
                fields.picture.trim(),
            )
        })
        .collect()
}

/// Build the record for a fresh game: every candidate starts at the initial belief
/// on every question.
pub fn build_new_game(request: &CreateGameRequest) -> Result<GameRecord> {
    request.validate()?;

    let game_name = request.game_name.trim();
    if game_name.is_empty() {
        return Err(StorageError::validation("gameName is required"));
    }

    let questions = questions_from_text(&request.questions);
    if questions.is_empty() {
        return Err(StorageError::validation("at least one question is required"));
    }

    let candidates = candidates_from_fields(&request.candidates);
    if candidates.is_empty() {
        return Err(StorageError::validation("at least one candidate is required"));
    }

    let leaderboard = Leaderboard::seeded(&questions, &candidates, BeliefState::INITIAL);

    GameRecord::build(game_name, questions, candidates)?.attach_leaderboard(leaderboard)
}

/// Create and store a new game.
///
/// A requested room code replaces whatever game it held; without one a free code is
/// generated and claimed.
pub async fn create_game(pool: &PgPool, request: &CreateGameRequest) -> Result<RoomId> {
    let record = build_new_game(request)?;

    let room_id = if request.room_code.trim().is_empty() {
        room_code::claim_room_code(pool, &record).await?
    } else {
        let room_id = RoomId::new(request.room_code.as_str())?;
        GameRepository::new(pool).upsert(&room_id, &record).await?;
        room_id
    };

    info!(
        room_id = %room_id,
        questions = record.questions().len(),
        candidates = record.candidates().len(),
        "Game set up"
    );

    Ok(room_id)
}
