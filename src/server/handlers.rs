use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::GameError;
use crate::game::{valid_game_type, GameState};

use super::app::AppState;
use super::repository as repo;

fn error_response(err: GameError) -> HttpResponse {
    log::warn!("request failed: {}", err);
    HttpResponse::Ok().json(json!({ "error": err.to_string() }))
}

fn store_failure(err: GameError) -> HttpResponse {
    log::error!("store failure: {}", err);
    HttpResponse::InternalServerError().json(json!({ "error": "internal error" }))
}

fn is_store_failure(err: &GameError) -> bool {
    matches!(err, GameError::StoreFailure(_))
}

fn render_error(err: GameError) -> HttpResponse {
    if is_store_failure(&err) {
        store_failure(err)
    } else {
        error_response(err)
    }
}

#[derive(Deserialize)]
pub struct NewUserQuery {
    name: Option<String>,
}

pub async fn new_user(state: web::Data<AppState>, req: HttpRequest, query: web::Query<NewUserQuery>) -> impl Responder {
    if req.cookie("userid").is_some() {
        return error_response(GameError::BadArg("userid".into()));
    }
    let name = match &query.name {
        Some(n) if n.len() >= 3 => n,
        _ => return error_response(GameError::BadArg("name".into())),
    };

    match repo::new_user(state.store.as_ref(), name).await {
        Ok(user) => {
            log::info!("new user {} ({})", user.uuid, user.display_name);
            let mut resp = HttpResponse::Ok();
            resp.cookie(actix_web::cookie::Cookie::new("userid", user.uuid.clone()));
            resp.cookie(actix_web::cookie::Cookie::new("userdisplay", user.display_name.clone()));
            resp.json(json!({ "uuid": user.uuid }))
        }
        Err(e) => render_error(e),
    }
}

#[derive(Deserialize)]
pub struct NewGameQuery {
    user: Option<String>,
    #[serde(rename = "type")]
    game_type: Option<i32>,
}

pub async fn new_game(state: web::Data<AppState>, query: web::Query<NewGameQuery>) -> impl Responder {
    let user_uuid = match &query.user {
        Some(u) => u,
        None => return error_response(GameError::BadArg("user".into())),
    };
    let game_type = match query.game_type {
        Some(t) if valid_game_type(t) => t,
        _ => return error_response(GameError::BadArg("type".into())),
    };

    let user = match repo::find_user(state.store.as_ref(), user_uuid).await {
        Ok(u) => u,
        Err(_) => return error_response(GameError::BadArg("user".into())),
    };

    match repo::new_game(state.store.as_ref(), &state.rng, &state.params, &user, game_type).await {
        Ok(game) => {
            log::info!("new game {}, type {}", game.name, game_type);
            HttpResponse::Ok().json(json!({ "id": game.name }))
        }
        Err(e) => render_error(e),
    }
}

fn format_game(game: &GameState) -> serde_json::Value {
    let status = if game.is_finished() {
        if game.goals_satisfied { "completed" } else { "failed" }
    } else {
        "running"
    };
    let mut body = json!({ "status": status, "count": game.count });
    if !game.is_finished() && game.has_next {
        body["next"] = json!(game.next);
    }
    body
}

#[derive(Deserialize)]
pub struct ProcessPersonQuery {
    game: Option<String>,
    person: Option<u32>,
    verdict: Option<String>,
}

pub async fn process_person(state: web::Data<AppState>, query: web::Query<ProcessPersonQuery>) -> impl Responder {
    let game_uuid = match &query.game {
        Some(g) => g,
        None => return error_response(GameError::BadArg("game".into())),
    };

    let (mut game, _game_type) = match repo::find_game(state.store.as_ref(), &state.params, game_uuid).await {
        Ok(g) => g,
        Err(_) => return error_response(GameError::BadArg("game".into())),
    };

    let verdict_arg = match &query.verdict {
        Some(v) => v,
        None => return HttpResponse::Ok().json(format_game(&game)),
    };

    let person = match query.person {
        Some(p) => p,
        None => return error_response(GameError::BadArg("person".into())),
    };
    let verdict = verdict_arg != "false";

    let params = match crate::game::get_game_params(&state.params, game.game_type) {
        Ok(p) => p,
        Err(e) => return render_error(e),
    };

    if let Err(e) = game.process_person(person, verdict, params) {
        return render_error(e);
    }
    if let Err(e) = repo::persist_person(state.store.as_ref(), &game).await {
        return render_error(e);
    }

    if !game.is_finished() {
        game.draw_next_person(&state.rng, params);
        if let Err(e) = repo::persist_next(state.store.as_ref(), &game).await {
            return render_error(e);
        }
    } else {
        log::info!(
            "game {} finished: {}",
            game.name,
            if game.goals_satisfied { "won" } else { "lost" }
        );
    }

    HttpResponse::Ok().json(format_game(&game))
}

#[derive(Deserialize)]
pub struct GameLookupQuery {
    game: Option<String>,
}

async fn resolve_game(state: &AppState, raw: &str) -> Result<GameState, GameError> {
    if uuid::Uuid::parse_str(raw).is_ok() {
        repo::find_game(state.store.as_ref(), &state.params, raw).await.map(|(g, _)| g)
    } else {
        let id: u32 = raw.parse().map_err(|_| GameError::BadArg("game".into()))?;
        repo::find_game_by_id(state.store.as_ref(), &state.params, id).await.map(|(g, _)| g)
    }
}

pub async fn details(state: web::Data<AppState>, query: web::Query<GameLookupQuery>) -> impl Responder {
    let raw = match &query.game {
        Some(g) => g,
        None => return error_response(GameError::BadArg("game".into())),
    };
    let game = match resolve_game(&state, raw).await {
        Ok(g) => g,
        Err(_) => return error_response(GameError::BadArg("game".into())),
    };

    let mut body = json!({
        "count": game.count,
        "accepted": game.accepted,
        "next": game.next,
        "attrs": game.attr_n,
        "type": game.game_type,
    });
    if game.is_finished() {
        body["finished"] = json!(true);
        body["won"] = json!(game.goals_satisfied);
    }
    HttpResponse::Ok().json(body)
}

fn symbol_for(byte: u8, n: usize) -> String {
    let mut s = String::with_capacity(n + 1);
    for bit in (0..n).rev() {
        s.push(if byte & (1 << bit) != 0 { '1' } else { '0' });
    }
    s.push(if byte & crate::game::ACCEPT_BIT != 0 { 'A' } else { 'R' });
    s
}

pub async fn symbols(state: web::Data<AppState>, query: web::Query<GameLookupQuery>) -> impl Responder {
    let raw = match &query.game {
        Some(g) => g,
        None => return error_response(GameError::BadArg("game".into())),
    };
    let game = match resolve_game(&state, raw).await {
        Ok(g) => g,
        Err(_) => return error_response(GameError::BadArg("game".into())),
    };
    let n = game.attr_n.len();
    let symbols: Vec<String> = game.seen.iter().map(|&b| symbol_for(b, n)).collect();
    HttpResponse::Ok().json(json!({ "count": game.count, "symbols": symbols }))
}

#[derive(Deserialize)]
pub struct ParamsQuery {
    #[serde(rename = "type")]
    game_type: Option<i32>,
}

pub async fn params(state: web::Data<AppState>, query: web::Query<ParamsQuery>) -> impl Responder {
    match query.game_type {
        None => HttpResponse::Ok().json(json!({ "rulesets": state.params.len() })),
        Some(t) => match crate::game::get_game_params(&state.params, t) {
            Ok(p) => {
                let goals: Vec<Vec<u32>> = p.goals.iter().map(|g| g.to_words()).collect();
                HttpResponse::Ok().json(json!({
                    "type": t,
                    "p": p.marginals,
                    "Q": p.corr,
                    "goals": goals,
                }))
            }
            Err(e) => render_error(e),
        },
    }
}

pub async fn gameid(state: web::Data<AppState>) -> impl Responder {
    match state.store.incr("next_game_preview").await {
        Ok(id) => HttpResponse::Ok().json(json!({ "gameid": id })),
        Err(e) => render_error(e),
    }
}

#[derive(Deserialize)]
pub struct UserGamesQuery {
    name: Option<String>,
}

#[derive(Serialize)]
struct GameSummary {
    id: String,
    status: &'static str,
}

async fn summarize(state: &AppState, uuid_bytes: &bytes::Bytes) -> Option<GameSummary> {
    let uuid = String::from_utf8_lossy(uuid_bytes).into_owned();
    let game = repo::find_game(state.store.as_ref(), &state.params, &uuid).await.ok()?.0;
    let status = if game.is_finished() {
        if game.goals_satisfied { "completed" } else { "failed" }
    } else {
        "running"
    };
    Some(GameSummary { id: uuid, status })
}

pub async fn user_games(state: web::Data<AppState>, query: web::Query<UserGamesQuery>) -> impl Responder {
    let user_uuid = match &query.name {
        Some(u) => u,
        None => return error_response(GameError::BadArg("name".into())),
    };
    let uuids = match repo::list_user_games(state.store.as_ref(), user_uuid).await {
        Ok(u) => u,
        Err(e) => return render_error(e),
    };
    let mut games = Vec::with_capacity(uuids.len());
    for uuid in &uuids {
        if let Some(summary) = summarize(&state, uuid).await {
            games.push(summary);
        }
    }
    HttpResponse::Ok().json(json!({ "games": games }))
}

pub async fn recent_games(state: web::Data<AppState>) -> impl Responder {
    let uuids = match repo::list_recent_games(state.store.as_ref()).await {
        Ok(u) => u,
        Err(e) => return render_error(e),
    };
    let mut games = Vec::with_capacity(uuids.len());
    for uuid in &uuids {
        if let Some(summary) = summarize(&state, uuid).await {
            games.push(summary);
        }
    }
    HttpResponse::Ok().json(json!({ "games": games }))
}
