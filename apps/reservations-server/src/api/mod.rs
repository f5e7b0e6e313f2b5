//! Reservations REST API.

pub mod store;

use std::sync::Arc;

use auth_guard::{CurrentIdentity, Endpoint, GuardedRoutes, Problem, RoutePolicy};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{Value, json};

use self::store::{NewReservation, Reservation, ReservationPatch, ReservationStore, StoreError};

pub const ADMIN_ROLE: &str = "Admin";

#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<ReservationStore>,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        match &self {
            Self::NotFound(_) => {
                Problem::new(StatusCode::NOT_FOUND, "Not Found", &self.to_string())
            }
            Self::Validation(msg) => {
                Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid Reservation", msg)
            }
        }
        .into_response()
    }
}

/// Declare every endpoint with its access requirement.
///
/// # Errors
///
/// Fails if two endpoints share a method and path.
pub fn routes(
    state: AppState,
    require_auth_by_default: bool,
) -> anyhow::Result<(Router, RoutePolicy)> {
    let (router, policy) = GuardedRoutes::new()
        .route(Endpoint::get("/health").public(), health)
        .route(Endpoint::post("/reservations"), create_reservation)
        .route(Endpoint::get("/reservations"), list_reservations)
        .route(Endpoint::get("/reservations/{id}"), get_reservation)
        .route(Endpoint::patch("/reservations/{id}"), update_reservation)
        .route(
            Endpoint::delete("/reservations/{id}").require_roles([ADMIN_ROLE]),
            remove_reservation,
        )
        .build(require_auth_by_default)?;
    Ok((router.with_state(state), policy))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_reservation(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(new): Json<NewReservation>,
) -> Result<(StatusCode, Json<Reservation>), StoreError> {
    let reservation = state.store.create(identity.id, new)?;
    tracing::info!(
        reservation_id = reservation.id,
        user_id = identity.id,
        "reservation created"
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn list_reservations(State(state): State<AppState>) -> Json<Vec<Reservation>> {
    Json(state.store.list())
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Reservation>, StoreError> {
    state.store.get(id).map(Json)
}

async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<ReservationPatch>,
) -> Result<Json<Reservation>, StoreError> {
    state.store.update(id, patch).map(Json)
}

async fn remove_reservation(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(id): Path<u64>,
) -> Result<Json<Reservation>, StoreError> {
    let removed = state.store.remove(id)?;
    tracing::info!(reservation_id = id, user_id = identity.id, "reservation removed");
    Ok(Json(removed))
}
