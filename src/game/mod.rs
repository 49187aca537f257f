mod params;
mod state;

pub use params::{build_game_params, build_game_params_production, get_game_params, valid_game_type, GameParams};
pub use state::{GameState, ACCEPT_BIT};
