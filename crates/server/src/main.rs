// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod caller;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State as AxumState,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use docket::{
    CoreError, Deadline, ErrorCode, OperationContext, OverlapEnforcement, RolePolicy,
    SchedulingConfig,
};
use docket_api::{
    ApiError, AvailabilityQuery, BlackoutRangeQuery, BlackoutResponse, BookingResponse,
    CreateBlackoutRequest, CreateBookingRequest, CreateExceptionRequest, CreateTemplateRequest,
    DeleteBlackoutResponse, ErrorBody, ExceptionResponse, GenerateQueueRequest, HealthResponse,
    ListAvailabilityResponse, ListBlackoutsResponse, ListBookingsResponse, ListSlotsResponse,
    ListTemplatesResponse, QueueEntryResponse, QueueQuery, QueueResponse, SlotsQuery,
    TemplateResponse, TemplatesQuery, UpdateQueueEntryRequest, translate_core_error,
};
use docket_domain::CivilTimezone;
use docket_persistence::Persistence;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

use crate::caller::Caller;

/// Docket Server - HTTP server for the Docket scheduling core
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "DOCKET_DATABASE")]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "DOCKET_PORT", default_value_t = 3000)]
    port: u16,

    /// IANA timezone local dates and times are interpreted in. Unknown
    /// names fall back to UTC.
    #[arg(long, env = "DOCKET_CIVIL_TIMEZONE", default_value = docket_domain::DEFAULT_CIVIL_TIMEZONE)]
    civil_timezone: String,

    /// Step between bookable slot starts, in minutes
    #[arg(long, env = "DOCKET_DEFAULT_SLOT_STEP_MINUTES", default_value_t = 15)]
    default_slot_step_minutes: u32,

    /// How booking overlap exclusion is enforced
    #[arg(
        long,
        env = "DOCKET_BOOKING_OVERLAP_ENFORCEMENT",
        default_value = "serializable-recheck"
    )]
    booking_overlap_enforcement: OverlapEnforcement,

    /// Accept the legacy `served` queue status as `completed`
    #[arg(
        long,
        env = "DOCKET_QUEUE_STATUS_ALIAS_SERVED_COMPLETED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    queue_status_alias_served_completed: bool,

    /// Deadline applied to each request, in milliseconds
    #[arg(long, env = "DOCKET_REQUEST_TIMEOUT_MS", default_value_t = 5000)]
    request_timeout_ms: u64,
}

impl Args {
    fn scheduling_config(&self) -> SchedulingConfig {
        SchedulingConfig {
            civil_timezone: CivilTimezone::parse_or_utc(&self.civil_timezone),
            default_slot_step_minutes: self.default_slot_step_minutes,
            booking_overlap_enforcement: self.booking_overlap_enforcement,
            queue_status_alias_served_completed: self.queue_status_alias_served_completed,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

/// Application state shared across handlers.
///
/// The store is a single connection behind a mutex; every request holds it
/// for the duration of one operation.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    config: SchedulingConfig,
    policy: RolePolicy,
}

impl AppState {
    fn new(persistence: Persistence, config: SchedulingConfig) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            config,
            policy: RolePolicy,
        }
    }

    /// Builds the engine context for one request, evaluated now.
    fn context(&self, deadline: Deadline) -> OperationContext<'_> {
        OperationContext::new(&self.config, &self.policy, Utc::now(), deadline)
    }

    /// Waits for the store, giving up when the deadline passes.
    async fn lock_store(
        &self,
        deadline: Deadline,
    ) -> Result<MutexGuard<'_, Persistence>, HttpError> {
        let Some(left) = deadline.remaining() else {
            return Ok(self.persistence.lock().await);
        };
        tokio::time::timeout(left, self.persistence.lock())
            .await
            .map_err(|_| {
                warn!(waited_ms = left.as_millis(), "Timed out waiting for the store");
                HttpError::from(translate_core_error(CoreError::TimedOut))
            })
    }
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    body: ErrorBody,
}

impl HttpError {
    fn unauthenticated(reason: &str) -> Self {
        Self::from(ApiError::AuthenticationFailed {
            reason: reason.to_string(),
        })
    }

    fn invalid_input(field: &str, message: String) -> Self {
        Self::from(ApiError::invalid_input(field, message))
    }
}

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::ValidationFailed | ErrorCode::InvalidTransition | ErrorCode::CaseMismatch => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorCode::ConflictOverlap | ErrorCode::ConflictToken => StatusCode::CONFLICT,
        ErrorCode::TimedOut => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = err
            .code()
            .map_or(StatusCode::UNAUTHORIZED, status_for);
        if status.is_server_error() {
            error!(error = %err, status = status.as_u16(), "Request failed");
        }
        Self {
            status,
            body: err.body(),
        }
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| HttpError::invalid_input("body", rejection.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, HttpError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| HttpError::invalid_input("query", rejection.body_text()))
}

fn path<T>(segment: Result<Path<T>, PathRejection>) -> Result<T, HttpError> {
    segment
        .map(|Path(value)| value)
        .map_err(|rejection| HttpError::invalid_input("path", rejection.body_text()))
}

/// Handler for GET `/health` endpoint.
async fn handle_health(AxumState(app_state): AxumState<AppState>) -> Json<HealthResponse> {
    Json(docket_api::health(&app_state.context(Deadline::none())))
}

/// Handler for POST `/bookings` endpoint.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, HttpError> {
    let request = json_body(payload)?;
    info!(
        actor_id = caller.actor.user_id,
        lawyer_id = request.lawyer_id,
        case_id = request.case_id,
        scheduled_at_utc = %request.scheduled_at_utc,
        "Handling create_booking request"
    );
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::create_booking(&mut *persistence, &ctx, &caller.actor, &request)?;
    Ok(Json(response))
}

/// Handler for PATCH `/bookings/{id}/confirm` endpoint.
async fn handle_confirm_booking(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    booking_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookingResponse>, HttpError> {
    let booking_id = path(booking_id)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response =
        docket_api::confirm_booking(&mut *persistence, &ctx, &caller.actor, booking_id)?;
    Ok(Json(response))
}

/// Handler for PATCH `/bookings/{id}/reject` endpoint.
async fn handle_reject_booking(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    booking_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookingResponse>, HttpError> {
    let booking_id = path(booking_id)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::reject_booking(&mut *persistence, &ctx, &caller.actor, booking_id)?;
    Ok(Json(response))
}

/// Handler for PATCH `/bookings/{id}/cancel` endpoint.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    booking_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookingResponse>, HttpError> {
    let booking_id = path(booking_id)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::cancel_booking(&mut *persistence, &ctx, &caller.actor, booking_id)?;
    Ok(Json(response))
}

/// Handler for PATCH `/bookings/{id}/complete` endpoint.
async fn handle_complete_booking(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    booking_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookingResponse>, HttpError> {
    let booking_id = path(booking_id)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response =
        docket_api::complete_booking(&mut *persistence, &ctx, &caller.actor, booking_id)?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/mine` endpoint.
async fn handle_list_my_bookings(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ListBookingsResponse>, HttpError> {
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::list_my_bookings(&mut *persistence, &ctx, &caller.actor)?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/incoming` endpoint.
async fn handle_lawyer_incoming_bookings(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
) -> Result<Json<ListBookingsResponse>, HttpError> {
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::lawyer_incoming_bookings(&mut *persistence, &ctx, &caller.actor)?;
    Ok(Json(response))
}

/// Handler for GET `/availability` endpoint.
async fn handle_list_availability(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    params: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<ListAvailabilityResponse>, HttpError> {
    let params = query(params)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response =
        docket_api::list_availability(&mut *persistence, &ctx, &caller.actor, &params)?;
    Ok(Json(response))
}

/// Handler for GET `/availability/slots` endpoint.
async fn handle_list_bookable_slots(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    params: Result<Query<SlotsQuery>, QueryRejection>,
) -> Result<Json<ListSlotsResponse>, HttpError> {
    let params = query(params)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response =
        docket_api::list_bookable_slots(&mut *persistence, &ctx, &caller.actor, &params)?;
    Ok(Json(response))
}

/// Handler for POST `/queue/generate` endpoint.
///
/// The optional `date` query parameter selects the local day; it defaults
/// to today.
async fn handle_generate_today_queue(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    params: Result<Query<GenerateQueueRequest>, QueryRejection>,
) -> Result<Json<QueueResponse>, HttpError> {
    let params = query(params)?;
    info!(
        actor_id = caller.actor.user_id,
        date = ?params.date,
        "Handling generate_today_queue request"
    );
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response =
        docket_api::generate_today_queue(&mut *persistence, &ctx, &caller.actor, &params)?;
    Ok(Json(response))
}

/// Handler for GET `/queue` endpoint.
async fn handle_list_today_queue(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    params: Result<Query<QueueQuery>, QueryRejection>,
) -> Result<Json<QueueResponse>, HttpError> {
    let params = query(params)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::list_today_queue(&mut *persistence, &ctx, &caller.actor, &params)?;
    Ok(Json(response))
}

/// Handler for PATCH `/queue/{id}` endpoint.
async fn handle_update_queue_entry(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    entry_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateQueueEntryRequest>, JsonRejection>,
) -> Result<Json<QueueEntryResponse>, HttpError> {
    let entry_id = path(entry_id)?;
    let request = json_body(payload)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::update_queue_entry(
        &mut *persistence,
        &ctx,
        &caller.actor,
        entry_id,
        &request,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/templates` endpoint.
async fn handle_create_weekly_template(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    payload: Result<Json<CreateTemplateRequest>, JsonRejection>,
) -> Result<Json<TemplateResponse>, HttpError> {
    let request = json_body(payload)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response =
        docket_api::create_weekly_template(&mut *persistence, &ctx, &caller.actor, &request)?;
    Ok(Json(response))
}

/// Handler for DELETE `/templates/{id}` endpoint.
async fn handle_deactivate_weekly_template(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    template_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TemplateResponse>, HttpError> {
    let template_id = path(template_id)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::deactivate_weekly_template(
        &mut *persistence,
        &ctx,
        &caller.actor,
        template_id,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/templates` endpoint.
async fn handle_list_weekly_templates(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    params: Result<Query<TemplatesQuery>, QueryRejection>,
) -> Result<Json<ListTemplatesResponse>, HttpError> {
    let params = query(params)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response =
        docket_api::list_weekly_templates(&mut *persistence, &ctx, &caller.actor, &params)?;
    Ok(Json(response))
}

/// Handler for POST `/exceptions` endpoint.
async fn handle_create_availability_exception(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    payload: Result<Json<CreateExceptionRequest>, JsonRejection>,
) -> Result<Json<ExceptionResponse>, HttpError> {
    let request = json_body(payload)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::create_availability_exception(
        &mut *persistence,
        &ctx,
        &caller.actor,
        &request,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/blackouts` endpoint.
async fn handle_create_blackout_day(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    payload: Result<Json<CreateBlackoutRequest>, JsonRejection>,
) -> Result<Json<BlackoutResponse>, HttpError> {
    let request = json_body(payload)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response =
        docket_api::create_blackout_day(&mut *persistence, &ctx, &caller.actor, &request)?;
    Ok(Json(response))
}

/// Handler for DELETE `/blackouts/{date}` endpoint.
async fn handle_delete_blackout_day(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    date: Result<Path<NaiveDate>, PathRejection>,
) -> Result<Json<DeleteBlackoutResponse>, HttpError> {
    let date = path(date)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response = docket_api::delete_blackout_day(&mut *persistence, &ctx, &caller.actor, date)?;
    Ok(Json(response))
}

/// Handler for GET `/blackouts` endpoint.
async fn handle_list_blackout_days(
    AxumState(app_state): AxumState<AppState>,
    caller: Caller,
    params: Result<Query<BlackoutRangeQuery>, QueryRejection>,
) -> Result<Json<ListBlackoutsResponse>, HttpError> {
    let params = query(params)?;
    let mut persistence = app_state.lock_store(caller.deadline).await?;
    let ctx = app_state.context(caller.deadline);
    let response =
        docket_api::list_blackout_days(&mut *persistence, &ctx, &caller.actor, &params)?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/bookings", post(handle_create_booking))
        .route("/bookings/mine", get(handle_list_my_bookings))
        .route("/bookings/incoming", get(handle_lawyer_incoming_bookings))
        .route("/bookings/{id}/confirm", patch(handle_confirm_booking))
        .route("/bookings/{id}/reject", patch(handle_reject_booking))
        .route("/bookings/{id}/cancel", patch(handle_cancel_booking))
        .route("/bookings/{id}/complete", patch(handle_complete_booking))
        .route("/availability", get(handle_list_availability))
        .route("/availability/slots", get(handle_list_bookable_slots))
        .route("/queue", get(handle_list_today_queue))
        .route("/queue/generate", post(handle_generate_today_queue))
        .route("/queue/{id}", patch(handle_update_queue_entry))
        .route(
            "/templates",
            post(handle_create_weekly_template).get(handle_list_weekly_templates),
        )
        .route(
            "/templates/{id}",
            delete(handle_deactivate_weekly_template),
        )
        .route("/exceptions", post(handle_create_availability_exception))
        .route(
            "/blackouts",
            post(handle_create_blackout_day).get(handle_list_blackout_days),
        )
        .route(
            "/blackouts/{date}",
            delete(handle_delete_blackout_day),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Docket Server");

    let config: SchedulingConfig = args.scheduling_config();
    info!(
        civil_timezone = config.civil_timezone.name(),
        default_slot_step_minutes = config.default_slot_step_minutes,
        booking_overlap_enforcement = %config.booking_overlap_enforcement,
        queue_status_alias_served_completed = config.queue_status_alias_served_completed,
        request_timeout_ms = args.request_timeout_ms,
        "Scheduling configuration"
    );

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    persistence.set_busy_timeout(args.request_timeout_ms)?;

    // Build router
    let app: Router = build_router(AppState::new(persistence, config));

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
