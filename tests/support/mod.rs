//! Stub backend shared by the integration tests: an axum app on an ephemeral port.
#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Extension, Router,
};
use idol_stage::common::types::SongCreate;
use idol_stage::ticket::render::encode_png;
use image::{Rgba, RgbaImage};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "tok-7";
pub const USER_ID: i64 = 7;

#[derive(Default)]
pub struct StubState {
    pub auth_headers: Mutex<Vec<Option<String>>>,
    pub month_queries: Mutex<Vec<(i32, u32)>>,
    pub imminent_hits: AtomicUsize,
    pub uploads: Mutex<Vec<String>>,
    pub songs: Mutex<Vec<SongCreate>>,
    pub fail_months: bool,
    pub multipart_fields: Mutex<Vec<Vec<String>>>,
    pub concert_gets: AtomicUsize,
    pub search_queries: Mutex<Vec<HashMap<String, String>>>,
}

#[derive(Deserialize)]
struct MonthQuery {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct PageQuery {
    page: u32,
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

pub fn performance(id: i64, name: &str, date: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "img": format!("http://img/{}.png", id),
        "concertDate": date,
        "startTime": "19:00:00",
        "ticketPrice": 10000,
        "stageName": "Main Hall"
    })
}

pub fn collection_item(id: i64, image: &str) -> serde_json::Value {
    json!({
        "concertId": id,
        "concertImage": image,
        "concertName": "Virtual Concert B \"Encore\"",
        "concertDate": "2024-11-11",
        "startTime": "10:24",
        "artist": "Aria",
        "audience": "42"
    })
}

pub fn photo_png() -> Vec<u8> {
    encode_png(&RgbaImage::from_fn(300, 120, |x, _| {
        if x < 150 {
            Rgba([220, 60, 60, 255])
        } else {
            Rgba([60, 60, 220, 255])
        }
    }))
    .unwrap()
}

async fn login(Json(body): Json<serde_json::Value>) -> Response {
    if body["password"] != "secret" {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "bad credentials"}))).into_response();
    }
    Json(json!({
        "userId": USER_ID,
        "email": body["email"],
        "displayName": "Mina",
        "token": TOKEN
    }))
    .into_response()
}

async fn by_month(Extension(state): Extension<Arc<StubState>>, Query(q): Query<MonthQuery>) -> Response {
    state.month_queries.lock().unwrap().push((q.year, q.month));
    if state.fail_months {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let records = match (q.year, q.month) {
        (2024, 11) => vec![
            performance(16, "Virtual Concert B", "2024-11-11T10:24:00"),
            performance(18, "Virtual Concert B", "2024-11-11T15:16:38"),
        ],
        (2024, 12) => vec![performance(30, "Winter Live", "2024-12-24T20:00:00")],
        _ => Vec::new(),
    };
    Json(records).into_response()
}

async fn collections(
    Extension(state): Extension<Arc<StubState>>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
    Query(q): Query<PageQuery>,
) -> Response {
    let auth = bearer(&headers);
    state.auth_headers.lock().unwrap().push(auth.clone());
    if auth.as_deref() != Some(&format!("Bearer {}", TOKEN)) || user_id != USER_ID {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    // image URLs point back at this stub
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("127.0.0.1")
        .to_string();
    let image = |path: &str| format!("http://{}{}", host, path);
    let page = match q.page {
        0 => json!({
            "content": [collection_item(16, &image("/images/ok.png")), collection_item(18, &image("/images/missing.png"))],
            "number": 0, "last": false, "totalPages": 2
        }),
        _ => json!({
            "content": [collection_item(20, &image("/images/ok.png"))],
            "number": 1, "last": true, "totalPages": 2
        }),
    };
    Json(page).into_response()
}

async fn imminent(Extension(state): Extension<Arc<StubState>>) -> Json<serde_json::Value> {
    state.imminent_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!([{
        "id": 40, "name": "Soon", "concertDate": "2099-01-01",
        "startTime": "10:00", "endTime": "11:00"
    }]))
}

async fn upload(Extension(state): Extension<Arc<StubState>>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("upload").to_string();
            state.uploads.lock().unwrap().push(name.clone());
            return format!("http://files/{}", name).into_response();
        }
    }
    StatusCode::BAD_REQUEST.into_response()
}

async fn create_song(Extension(state): Extension<Arc<StubState>>, Json(song): Json<SongCreate>) -> Json<serde_json::Value> {
    let id = 100 + state.songs.lock().unwrap().len() as i64;
    let body = json!({"id": id, "title": song.title, "url": song.url, "artistId": song.artist_id});
    state.songs.lock().unwrap().push(song);
    Json(body)
}

async fn check_registration(Path(user_id): Path<i64>) -> Json<bool> {
    Json(user_id == USER_ID)
}

async fn ok_image() -> impl IntoResponse {
    ([("content-type", "image/png")], photo_png())
}

async fn field_names(mut multipart: Multipart) -> Vec<String> {
    let mut names = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        names.push(field.name().unwrap_or_default().to_string());
    }
    names
}

async fn create_character(Extension(state): Extension<Arc<StubState>>, multipart: Multipart) -> Json<i64> {
    let names = field_names(multipart).await;
    state.multipart_fields.lock().unwrap().push(names);
    Json(55)
}

async fn update_character(Extension(state): Extension<Arc<StubState>>, multipart: Multipart) -> StatusCode {
    let names = field_names(multipart).await;
    state.multipart_fields.lock().unwrap().push(names);
    StatusCode::OK
}

async fn check_character(Path(user_id): Path<i64>) -> Json<bool> {
    Json(user_id == USER_ID)
}

async fn characters(Path(_user_id): Path<i64>) -> Json<serde_json::Value> {
    Json(json!([{"id": 55, "name": "Nova", "description": "lead", "imageUrl": "http://img/nova.png", "active": true}]))
}

async fn get_concert(Extension(state): Extension<Arc<StubState>>, Path(id): Path<i64>) -> Json<serde_json::Value> {
    let n = state.concert_gets.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "id": id, "name": format!("Concert rev {}", n), "concertDate": "2024-11-11",
        "startTime": "19:00", "endTime": "21:00", "ticketPrice": 12000, "peopleScale": "100",
        "songs": [{"id": 1, "title": "Opening"}]
    }))
}

async fn search(Extension(state): Extension<Arc<StubState>>, Query(q): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    state.search_queries.lock().unwrap().push(q);
    Json(json!({"content": [{"id": 3, "displayName": "Mina"}], "last": true, "number": 0}))
}

pub fn stub_app(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/concerts/by-month", get(by_month))
        .route("/concerts/imminent", get(imminent))
        .route("/concerts/check-registration/:user_id", get(check_registration))
        .route("/collections/user/:user_id", get(collections))
        .route("/files/upload", post(upload))
        .route("/songs", post(create_song))
        .route("/images/ok.png", get(ok_image))
        .route("/characters", post(create_character))
        .route("/characters/:id", put(update_character))
        .route("/characters/user/:user_id", get(characters))
        .route("/characters/check/:user_id", get(check_character))
        .route("/concerts/:id", get(get_concert).put(|| async { StatusCode::OK }))
        .route("/search/user/displayName", get(search))
        .layer(Extension(state))
}

/// Serve `app` on 127.0.0.1 with an OS-assigned port; returns the base URL
pub fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

pub fn spawn_stub(state: Arc<StubState>) -> String {
    spawn(stub_app(state))
}

