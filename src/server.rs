use crate::app::ports::{CollectionSource, PerformanceSource};
use crate::calendar::{leading_blank_cells, CalendarController, MonthKey};
use crate::common::error::{Result, StageError};
use crate::common::types::PerformanceRecord;
use crate::ticket::export::TicketExporter;
use crate::ticket::TicketFace;
use axum::{
    extract::{Path, Query},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use chrono::Local;
use hyper::Server;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Everything the preview routes read from
#[derive(Clone)]
pub struct PreviewState {
    pub performances: Arc<dyn PerformanceSource>,
    pub collections: Arc<dyn CollectionSource>,
    pub exporter: Arc<TicketExporter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub year: i32,
    /// 1-based
    pub month: u32,
    pub label: String,
    pub days_in_month: u32,
    pub leading_blank_cells: u32,
    pub performance_dates: Vec<u32>,
    pub selected_date: Option<String>,
    pub performances: Vec<PerformanceRecord>,
    pub grid: String,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub day: Option<u32>,
}

/// Error body for the preview routes
struct PreviewError(StageError);

impl From<StageError> for PreviewError {
    fn from(e: StageError) -> Self {
        Self(e)
    }
}

impl IntoResponse for PreviewError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StageError::Validation(_) => StatusCode::BAD_REQUEST,
            StageError::NotFound(_) => StatusCode::NOT_FOUND,
            StageError::Api { status: 404, .. } => StatusCode::NOT_FOUND,
            StageError::Api { .. } | StageError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!("Preview request failed ({}): {}", status.as_u16(), self.0);
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "idol_stage-preview",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn calendar_month(
    Extension(state): Extension<PreviewState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<CalendarQuery>,
) -> std::result::Result<Json<CalendarResponse>, PreviewError> {
    if !(1..=12).contains(&month) {
        return Err(StageError::validation(format!("month {} out of range", month)).into());
    }
    let key = MonthKey::new(year, month - 1)?;
    let mut calendar = CalendarController::new(Local::now().date_naive());
    let request = calendar.go_to(key);
    calendar.load(state.performances.as_ref(), request).await;
    if let Some(day) = query.day {
        calendar.select_day(day)?;
    }

    let performances = calendar.selected_performances().into_iter().cloned().collect();
    Ok(Json(CalendarResponse {
        year,
        month,
        label: key.label(),
        days_in_month: key.days(),
        leading_blank_cells: leading_blank_cells(key.year, key.month),
        performance_dates: calendar.performances().performance_dates(),
        selected_date: calendar.state().selected_date.clone(),
        performances,
        grid: calendar.render_grid(),
    }))
}

async fn ticket_png(
    Extension(state): Extension<PreviewState>,
    Path((user_id, concert_id, face)): Path<(i64, i64, String)>,
) -> std::result::Result<Response, PreviewError> {
    let face: TicketFace = face.parse()?;
    let items = state.collections.collection(user_id).await?;
    let item = items
        .iter()
        .find(|i| i.concert_id == concert_id)
        .ok_or_else(|| StageError::NotFound(format!("concert {} not in collection of user {}", concert_id, user_id)))?;
    let png = state.exporter.render_png(item, face).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Create the preview router with all routes
pub fn create_server(state: PreviewState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/calendar/:year/:month", get(calendar_month))
        .route("/tickets/:user_id/:concert_id/:face", get(ticket_png))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

/// Serve on an already bound listener
pub async fn serve_listener(state: PreviewState, listener: TcpListener) -> Result<()> {
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;
    info!("Preview server listening on http://{}", addr);
    Server::from_tcp(listener)
        .map_err(|e| StageError::Config(format!("cannot serve on {}: {}", addr, e)))?
        .serve(create_server(state).into_make_service())
        .await
        .map_err(|e| StageError::Config(format!("preview server stopped: {}", e)))
}

/// Start the preview server on `bind` (host:port)
pub async fn start_server(state: PreviewState, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| StageError::Config(format!("invalid bind address '{}': {}", bind, e)))?;
    let listener = TcpListener::bind(addr)?;

    println!("🚀 Preview server running on http://{addr}");
    println!("💚 Health check: http://{addr}/health");
    println!("📅 Calendar:     http://{addr}/calendar/<year>/<month>");
    println!("🎫 Tickets:      http://{addr}/tickets/<userId>/<concertId>/<front|back>");

    serve_listener(state, listener).await
}
