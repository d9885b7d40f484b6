use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::error;

use super::error::ApiError;
use super::pagination::{paginate, ListRequest};
use super::types::*;
use super::validate::ValidatedJson;
use crate::server::AppState;
use crate::store::{
    AttendanceRecord, AttendanceRepo, FavoriteRecord, FavoriteRepo, GatewayError, MovieRepo,
    StoreError,
};
use crate::util::QueryParams;

/// What a handler does when its store call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorPolicy {
    /// Answer 200 with an empty list and a message.
    Degrade,
    /// Answer 500.
    Fail,
}

#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub name: &'static str,
    pub failure_message: &'static str,
    pub policy: StoreErrorPolicy,
}

pub const LIST_MOVIES: Endpoint = Endpoint {
    name: "GET /api/movies",
    failure_message: "Table 'movies' not found or no records yet.",
    policy: StoreErrorPolicy::Degrade,
};

pub const REGISTER_ATTENDANCE: Endpoint = Endpoint {
    name: "POST /api/register",
    failure_message: "Failed to register attendance. Ensure 'attendance' table exists.",
    policy: StoreErrorPolicy::Fail,
};

pub const CREATE_FAVORITE: Endpoint = Endpoint {
    name: "POST /api/favorites",
    failure_message: "Failed to save favorite. Ensure 'favorites' table exists.",
    policy: StoreErrorPolicy::Fail,
};

pub const LIST_FAVORITES: Endpoint = Endpoint {
    name: "GET /api/favorites/{user_id}",
    failure_message: "Failed to fetch favorites. Ensure 'favorites' table exists.",
    policy: StoreErrorPolicy::Fail,
};

impl Endpoint {
    /// Logs why no store handle was available; the client only sees the
    /// fixed configuration message.
    pub fn gateway_error(&self, err: GatewayError) -> ApiError {
        error!(endpoint = self.name, error = %err, "store gateway unavailable");
        ApiError::Gateway(err)
    }

    /// Logs the raw store error and turns it into what the client sees.
    pub fn store_error(&self, err: StoreError) -> ApiError {
        error!(endpoint = self.name, error = %err, "store call failed");
        match self.policy {
            StoreErrorPolicy::Degrade => ApiError::Degraded(self.failure_message),
            StoreErrorPolicy::Fail => ApiError::Store(self.failure_message),
        }
    }
}

/// Current UTC time as ISO-8601 with an explicit `+00:00` offset.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { message: "Healthy" })
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<MoviesPage>, ApiError> {
    let req = ListRequest::from_params(&params);
    let store = state
        .gateway
        .handle()
        .await
        .map_err(|e| LIST_MOVIES.gateway_error(e))?;

    let page = store
        .list_movies(req.range())
        .await
        .map_err(|e| LIST_MOVIES.store_error(e))?;

    Ok(Json(MoviesPage {
        data: page.rows,
        meta: paginate(req.page, req.limit, page.total),
    }))
}

pub async fn register_attendance(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterAttendance>,
) -> Result<(StatusCode, Json<DataResponse<InsertedRow<AttendanceRecord>>>), ApiError> {
    let store = state
        .gateway
        .handle()
        .await
        .map_err(|e| REGISTER_ATTENDANCE.gateway_error(e))?;

    let record = AttendanceRecord {
        user_id: body.user_id,
        email: body.email,
        timestamp: now_iso(),
    };
    let stored = store
        .insert_attendance(&record)
        .await
        .map_err(|e| REGISTER_ATTENDANCE.store_error(e))?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: InsertedRow::new(stored, record),
        }),
    ))
}

pub async fn create_favorite(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateFavorite>,
) -> Result<(StatusCode, Json<DataResponse<InsertedRow<FavoriteRecord>>>), ApiError> {
    let store = state
        .gateway
        .handle()
        .await
        .map_err(|e| CREATE_FAVORITE.gateway_error(e))?;

    let record = FavoriteRecord {
        user_id: body.user_id,
        movie_id: body.movie_id,
        title: body.title,
        poster_url: body.poster_url,
        created_at: now_iso(),
    };
    let stored = store
        .insert_favorite(&record)
        .await
        .map_err(|e| CREATE_FAVORITE.store_error(e))?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: InsertedRow::new(stored, record),
        }),
    ))
}

pub async fn list_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DataResponse<Vec<Value>>>, ApiError> {
    let store = state
        .gateway
        .handle()
        .await
        .map_err(|e| LIST_FAVORITES.gateway_error(e))?;

    let rows = store
        .list_favorites(&user_id)
        .await
        .map_err(|e| LIST_FAVORITES.store_error(e))?;

    Ok(Json(DataResponse { data: rows }))
}
