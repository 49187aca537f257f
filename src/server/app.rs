use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use crate::game::GameParams;
use crate::rng::NormalGenerator;
use crate::store::Store;

use super::handlers;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub rng: NormalGenerator,
    pub params: Vec<GameParams>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/new-user", web::get().to(handlers::new_user))
        .route("/new-game", web::get().to(handlers::new_game))
        .route("/process-person", web::get().to(handlers::process_person))
        .route("/details", web::get().to(handlers::details))
        .route("/symbols", web::get().to(handlers::symbols))
        .route("/params", web::get().to(handlers::params))
        .route("/gameid", web::get().to(handlers::gameid))
        .route("/user-games", web::get().to(handlers::user_games))
        .route("/recent-games", web::get().to(handlers::recent_games));
}

pub async fn run(state: Arc<AppState>) -> std::io::Result<()> {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8124".to_string());
    log::info!("binding on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
            .app_data(web::Data::from(state.clone()))
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
