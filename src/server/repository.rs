//! user and game lookups/creation against the [`Store`], mirroring the
//! reference server's valkey access patterns.

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use crate::error::GameError;
use crate::game::{get_game_params, GameParams, GameState};
use crate::rng::NormalGenerator;
use crate::store::Store;

pub const RECENT_GAMES_CAP: usize = 50;
pub const USER_GAME_HISTORY_CAP: usize = 1000;

pub struct User {
    pub id: u32,
    pub uuid: String,
    pub display_name: String,
}

fn bytes_to_string(bytes: Bytes) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

fn bytes_to_u32(bytes: Bytes) -> u32 {
    bytes_to_string(bytes).parse().unwrap_or(0)
}

fn bytes_to_i32(bytes: Bytes) -> i32 {
    bytes_to_string(bytes).parse().unwrap_or(0)
}

pub async fn new_user(store: &dyn Store, display_name: &str) -> Result<User, GameError> {
    if display_name.len() < 3 {
        return Err(GameError::BadArg("name".into()));
    }

    let existing = store.hget("usernames", display_name).await?;
    if existing.is_some() {
        return Err(GameError::BadArg("name".into()));
    }

    let id = store.incr("next_user").await? as u32;
    let uuid = Uuid::new_v4().to_string();

    store
        .hset("usernames", display_name, Bytes::from(uuid.clone()))
        .await?;
    store.hset("userids", &id.to_string(), Bytes::from(uuid.clone())).await?;
    store.hset(&uuid, "id", Bytes::from(id.to_string())).await?;
    store.hset(&uuid, "name", Bytes::from(display_name.to_string())).await?;

    Ok(User {
        id,
        uuid,
        display_name: display_name.to_string(),
    })
}

pub async fn find_user(store: &dyn Store, uuid: &str) -> Result<User, GameError> {
    let id = store
        .hget(uuid, "id")
        .await?
        .ok_or_else(|| GameError::NotFound("user".into()))?;
    let name = store
        .hget(uuid, "name")
        .await?
        .ok_or_else(|| GameError::NotFound("user".into()))?;
    Ok(User {
        id: bytes_to_u32(id),
        uuid: uuid.to_string(),
        display_name: bytes_to_string(name),
    })
}

fn seen_key(uuid: &str) -> String {
    format!("{}-m", uuid)
}

fn user_games_key(uuid: &str) -> String {
    format!("{}-games", uuid)
}

pub async fn new_game(
    store: &dyn Store,
    rng: &NormalGenerator,
    table: &[GameParams],
    user: &User,
    game_type: i32,
) -> Result<GameState, GameError> {
    let params = get_game_params(table, game_type)?;
    let id = store.incr("next_game").await? as u32;
    let uuid = Uuid::new_v4().to_string();

    store.hset(&uuid, "id", Bytes::from(id.to_string())).await?;
    store.hset(&uuid, "userid", Bytes::from(user.id.to_string())).await?;
    store.hset(&uuid, "type", Bytes::from(game_type.to_string())).await?;
    store.hset("gameids", &id.to_string(), Bytes::from(uuid.clone())).await?;
    store.lpush(&user_games_key(&user.uuid), Bytes::from(uuid.clone())).await?;
    store.lpush("recent_games", Bytes::from(uuid.clone())).await?;

    let mut state = GameState::new(uuid, id, user.id, game_type, params.sampler.n);
    state.draw_next_person(rng, params);
    persist_next(store, &state).await?;
    Ok(state)
}

pub async fn find_game(store: &dyn Store, table: &[GameParams], uuid: &str) -> Result<(GameState, i32), GameError> {
    let id = store
        .hget(uuid, "id")
        .await?
        .ok_or_else(|| GameError::NotFound("game".into()))?;
    let user_id = store
        .hget(uuid, "userid")
        .await?
        .ok_or_else(|| GameError::NotFound("game".into()))?;
    let game_type = store
        .hget(uuid, "type")
        .await?
        .ok_or_else(|| GameError::NotFound("game".into()))?;
    let game_type = bytes_to_i32(game_type);
    let params = get_game_params(table, game_type)?;

    let mut state = GameState::new(uuid.to_string(), bytes_to_u32(id), bytes_to_u32(user_id), game_type, params.sampler.n);

    if let Some(seen) = store.get(&seen_key(uuid)).await? {
        state.seen = seen.to_vec();
        state.count = state.seen.len() as u32;
    }
    if let Some(next) = store.hget(uuid, "next").await? {
        state.next = bytes_to_u32(next) as u8;
        state.has_next = true;
    }
    state.recompute(params);

    Ok((state, game_type))
}

pub async fn find_game_by_id(store: &dyn Store, table: &[GameParams], id: u32) -> Result<(GameState, i32), GameError> {
    let uuid = store
        .hget("gameids", &id.to_string())
        .await?
        .ok_or_else(|| GameError::NotFound("game".into()))?;
    find_game(store, table, &bytes_to_string(uuid)).await
}

/// persist the pending patron's attribute byte, matching `create_next_person`.
pub async fn persist_next(store: &dyn Store, state: &GameState) -> Result<(), GameError> {
    store.hset(&state.name, "next", Bytes::from(state.next.to_string())).await
}

/// persist a processed verdict: clear the pending-patron field and append
/// the committed byte to the `seen[]` string, matching `process_next_person`.
pub async fn persist_person(store: &dyn Store, state: &GameState) -> Result<(), GameError> {
    store.hdel(&state.name, "next").await?;
    store.set(&seen_key(&state.name), Bytes::from(state.seen.clone())).await
}

pub async fn list_user_games(store: &dyn Store, user_uuid: &str) -> Result<Vec<Bytes>, GameError> {
    store
        .lrange(&user_games_key(user_uuid), 0, USER_GAME_HISTORY_CAP as isize - 1)
        .await
}

pub async fn list_recent_games(store: &dyn Store) -> Result<Vec<Bytes>, GameError> {
    store.lrange("recent_games", 0, RECENT_GAMES_CAP as isize - 1).await
}

pub type SharedStore = Arc<dyn Store>;
