mod belief_state;
mod candidate;
mod game_record;
mod leaderboard;
mod question;
mod room_id;

pub use belief_state::BeliefState;
pub use candidate::Candidate;
pub use game_record::{GameRecord, StoredGame};
pub use leaderboard::Leaderboard;
pub use question::Question;
pub use room_id::RoomId;
