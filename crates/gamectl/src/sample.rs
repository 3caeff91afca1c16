use std::path::Path;

use storage::dto::game::CreateGameRequest;
use storage::models::{BeliefState, Candidate, GameRecord, Leaderboard, Question};

use crate::Result;

/// A small three-candidate game for local testing.
pub fn sample_game() -> storage::Result<GameRecord> {
    let candidates = vec![
        Candidate::new(1, "Avery", "Stone", "https://picsum.photos/seed/avery/120")
            .with_games_played(12),
        Candidate::new(2, "Brook", "Lee", "https://picsum.photos/seed/brook/120")
            .with_games_played(9),
        Candidate::new(3, "Casey", "Reid", "https://picsum.photos/seed/casey/120")
            .with_games_played(15),
    ];

    let questions = vec![
        Question::new(1, "Who should be the next team lead?"),
        Question::new(2, "Pick the best project idea."),
    ];

    let leaderboard = [
        (1, 1, 28.5, 7.2),
        (1, 2, 24.3, 6.1),
        (1, 3, 22.9, 5.8),
        (2, 1, 25.0, 6.4),
        (2, 2, 29.1, 7.0),
        (2, 3, 23.8, 5.6),
    ]
    .into_iter()
    .try_fold(Leaderboard::new(), |board, (question, candidate, mu, sigma)| {
        Ok::<_, storage::StorageError>(board.with_entry(
            question,
            candidate,
            BeliefState::new(mu, sigma)?,
        ))
    })?;

    GameRecord::build("Team Showdown", questions, candidates)?.attach_leaderboard(leaderboard)
}

pub async fn read_create_request(path: &Path) -> Result<CreateGameRequest> {
    let json_content = tokio::fs::read_to_string(path).await?;
    let request = serde_json::from_str(&json_content)?;
    Ok(request)
}
