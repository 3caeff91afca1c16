pub mod game_setup;
pub mod room_code;
