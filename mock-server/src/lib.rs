//! Fixture REST API used by the client's end-to-end tests.
//!
//! Serves a fixed fish catalogue, a couple of characters, an in-memory posts
//! resource with validation, and a handful of routes that answer with
//! specific statuses (empty 200, 302, 401, 500), echo the request back or
//! serve an oversized body.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const FISH_NAMES: [&str; 14] = [
    "Bottle Nose", "Soda Fin", "Cap Gill", "Straw Tail", "Wrapper Ray", "Bag Eel", "Ring Cod",
    "Lid Snapper", "Cup Carp", "Fork Pike", "Net Grouper", "Foam Perch", "Can Trout", "Tube Bass",
];

pub const SECRET_TOKEN: &str = "secret";

/// Size of the `/api/large` body, above ureq's default read limit.
pub const LARGE_BODY_LEN: usize = 11 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fish {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    pub name: String,
    pub status: String,
    pub species: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub author_name: String,
}

#[derive(Deserialize)]
pub struct CreatePost {
    pub title: String,
    #[serde(default)]
    pub author_name: String,
}

#[derive(Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub author_name: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Post>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/fishes", get(list_fishes))
        .route("/api/character/{id}", get(get_character))
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route("/api/empty", get(empty))
        .route("/api/redirect", get(redirect))
        .route("/api/broken", get(broken))
        .route("/api/echo", get(echo))
        .route("/api/secure", get(secure))
        .route("/api/large", get(large))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

pub fn fishes() -> Vec<Fish> {
    FISH_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| Fish {
            id: format!("fish-{}", i + 1),
            name: name.to_string(),
        })
        .collect()
}

pub fn characters() -> Vec<Character> {
    vec![
        Character {
            id: 1,
            name: "Rick Sanchez".to_string(),
            status: "Alive".to_string(),
            species: "Human".to_string(),
        },
        Character {
            id: 2,
            name: "Morty Smith".to_string(),
            status: "Alive".to_string(),
            species: "Human".to_string(),
        },
    ]
}

async fn list_fishes() -> Json<Vec<Fish>> {
    Json(fishes())
}

async fn get_character(Path(id): Path<u32>) -> Result<Json<Character>, StatusCode> {
    characters()
        .into_iter()
        .find(|c| c.id == id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

fn blank_title() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "title": ["can't be blank"] })),
    )
        .into_response()
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    let posts = db.read().await;
    Json(posts.values().cloned().collect())
}

async fn create_post(State(db): State<Db>, Json(input): Json<CreatePost>) -> Response {
    if input.title.trim().is_empty() {
        return blank_title();
    }
    let post = Post {
        id: Uuid::new_v4(),
        title: input.title,
        author_name: input.author_name,
    };
    db.write().await.insert(post.id, post.clone());
    (StatusCode::CREATED, Json(post)).into_response()
}

async fn get_post(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Post>, StatusCode> {
    let posts = db.read().await;
    posts.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePost>,
) -> Response {
    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return blank_title();
    }
    let mut posts = db.write().await;
    let Some(post) = posts.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(author_name) = input.author_name {
        post.author_name = author_name;
    }
    Json(post.clone()).into_response()
}

async fn delete_post(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Post>, StatusCode> {
    let mut posts = db.write().await;
    posts.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn redirect() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/api/fishes")]).into_response()
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

async fn echo(
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
        })
        .collect();
    Json(json!({ "query": query, "headers": headers }))
}

async fn large() -> Vec<u8> {
    vec![b'x'; LARGE_BODY_LEN]
}

async fn secure(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {SECRET_TOKEN}");
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Json(json!({ "ok": true })).into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}
