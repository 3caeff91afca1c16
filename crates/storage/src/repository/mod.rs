pub mod game;

pub use game::{GameRepository, RatingUpdate};
