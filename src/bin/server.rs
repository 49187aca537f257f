use std::sync::Arc;

use berghain::game::build_game_params_production;
use berghain::rng::NormalGenerator;
use berghain::server::{run, AppState};
use berghain::store::{InMemoryStore, Store};
use clap::Parser;

#[derive(Parser)]
#[command(about = "Berghain challenge server")]
struct Args {
    /// reset the KV store on startup (delete all keys)
    #[arg(short = 'r', long = "reset")]
    reset: bool,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    berghain::init_logging();
    let args = Args::parse();

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    if args.reset {
        log::warn!("--reset passed; in-process store starts empty regardless");
    }

    log::info!("deriving game parameters");
    let params = build_game_params_production();

    let state = Arc::new(AppState {
        store,
        rng: NormalGenerator::from_entropy(),
        params,
    });

    run(state).await
}
