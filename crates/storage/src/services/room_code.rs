use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::models::{GameRecord, RoomId};
use crate::repository::GameRepository;

pub const MIN_CODE_LENGTH: usize = 4;
pub const MAX_CODE_LENGTH: usize = 8;
const MAX_ATTEMPTS: usize = 32;

/// Random alphanumeric code between `MIN_CODE_LENGTH` and `MAX_CODE_LENGTH` characters.
pub fn generate_room_code<R: Rng>(rng: &mut R) -> String {
    let length = rng.random_range(MIN_CODE_LENGTH..=MAX_CODE_LENGTH);
    (0..length)
        .map(|_| {
            let byte: u8 = rng.sample(Alphanumeric);
            char::from(byte)
        })
        .collect()
}

/// Store `record` under a freshly generated room code.
///
/// Each code is claimed with a plain insert, so a code drawn by two creators at once
/// goes to whichever commits first and the other draws again.
pub async fn claim_room_code(pool: &PgPool, record: &GameRecord) -> Result<RoomId> {
    let repo = GameRepository::new(pool);

    for attempt in 1..=MAX_ATTEMPTS {
        let room_id = RoomId::new(generate_room_code(&mut rand::rng()))?;
        match repo.insert(&room_id, record).await {
            Ok(()) => return Ok(room_id),
            Err(e) if e.is_unique_violation() => {
                debug!(room_id = %room_id, attempt, "Room code already taken");
            }
            Err(e) => return Err(e),
        }
    }

    Err(StorageError::constraint(format!(
        "no free room code found after {} attempts",
        MAX_ATTEMPTS
    )))
}
