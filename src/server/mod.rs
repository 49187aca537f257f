mod app;
mod handlers;
mod repository;

pub use app::{configure, run, AppState};
pub use repository::{find_game, find_game_by_id, find_user, new_game, new_user};
