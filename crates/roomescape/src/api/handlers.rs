//! Request handlers.
//!
//! Every service call goes through [`blocking`], so `SQLite` I/O and the
//! connection lock never hold up an async worker thread.

#![allow(clippy::needless_pass_by_value)]

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{
    AvailableTime, MemberView, Reservation, ReservationFilter, ReservationTime, Theme,
};
use crate::error::{Error, Result};
use crate::service::{MemberRequest, ReservationRequest, ThemeRequest, TimeRequest};

use super::error::ApiError;
use super::state::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;
type Created<T> = (StatusCode, Json<T>);

/// Query of `GET /times/available`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// Session date.
    pub date: NaiveDate,
    /// Theme to check.
    pub theme_id: i64,
}

/// Run a service call on tokio's blocking thread pool.
///
/// A task that panics or is cancelled surfaces as [`Error::Internal`].
async fn blocking<T, F>(call: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {e}")))?
}

#[allow(clippy::unused_async)]
pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// === Reservations ===

pub(super) async fn list_reservations(
    State(state): State<AppState>,
    filter: std::result::Result<Query<ReservationFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Reservation>>> {
    let Query(filter) = filter?;
    let found = blocking(move || state.reservations.find_reservations_by_filters(&filter)).await?;
    Ok(Json(found))
}

pub(super) async fn create_reservation(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ReservationRequest>, JsonRejection>,
) -> ApiResult<Created<Reservation>> {
    let Json(request) = payload?;
    let now = Local::now().naive_local();
    let saved = blocking(move || state.reservations.add_reservation(request, now)).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(super) async fn delete_reservation(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    blocking(move || state.reservations.remove_reservation(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// === Time slots ===

pub(super) async fn list_times(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ReservationTime>>> {
    let times = blocking(move || state.times.find_all_reservation_times()).await?;
    Ok(Json(times))
}

pub(super) async fn create_time(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TimeRequest>, JsonRejection>,
) -> ApiResult<Created<ReservationTime>> {
    let Json(request) = payload?;
    let saved = blocking(move || state.times.add_reservation_time(request)).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(super) async fn delete_time(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    blocking(move || state.times.remove_reservation_time(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn available_times(
    State(state): State<AppState>,
    query: std::result::Result<Query<AvailabilityQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<AvailableTime>>> {
    let Query(query) = query?;
    let times =
        blocking(move || state.times.find_available_times(query.date, query.theme_id)).await?;
    Ok(Json(times))
}

// === Themes ===

pub(super) async fn list_themes(State(state): State<AppState>) -> ApiResult<Json<Vec<Theme>>> {
    let themes = blocking(move || state.themes.find_all_themes()).await?;
    Ok(Json(themes))
}

pub(super) async fn create_theme(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ThemeRequest>, JsonRejection>,
) -> ApiResult<Created<Theme>> {
    let Json(request) = payload?;
    let saved = blocking(move || state.themes.add_theme(request)).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(super) async fn delete_theme(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    blocking(move || state.themes.remove_theme(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn popular_themes(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Theme>>> {
    let today = Local::now().date_naive();
    let themes = blocking(move || state.themes.find_popular_themes(today)).await?;
    Ok(Json(themes))
}

// === Members ===

pub(super) async fn list_members(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MemberView>>> {
    let members = blocking(move || state.members.find_all_members()).await?;
    Ok(Json(members.iter().map(MemberView::from).collect()))
}

pub(super) async fn create_member(
    State(state): State<AppState>,
    payload: std::result::Result<Json<MemberRequest>, JsonRejection>,
) -> ApiResult<Created<MemberView>> {
    let Json(request) = payload?;
    let saved = blocking(move || state.members.add_member(request)).await?;
    Ok((StatusCode::CREATED, Json(MemberView::from(&saved))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocking_returns_call_result() {
        assert_eq!(blocking(|| Ok(7)).await.unwrap(), 7);

        let err = blocking(|| -> Result<()> { Err(Error::not_found("theme", 3)) })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_blocking_panic_is_internal_error() {
        let err = blocking(|| -> Result<()> { panic!("store call crashed") })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Internal(_)));
        assert!(err.to_string().contains("blocking task failed"));
        assert_eq!(ApiError::from(err).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_blocking_runs_off_the_runtime_thread() {
        let caller = std::thread::current().id();
        let worker = blocking(|| Ok(std::thread::current().id())).await.unwrap();
        assert_ne!(caller, worker);
    }
}
