//! Axum-based HTTP API for Nightcharge
//!
//! Exposes the simulation sessions to a front end: evaluation of the live
//! charger state, the projected timeline with charge levels, the control
//! panel model and the start/stop commands. OpenAPI docs are served when the
//! `openapi` feature is enabled.

use crate::charger::{
    ChargerMode, ChargerState, ChargerStateMachine, Notice, NoticeLevel, OperatorIntent,
};
use crate::clock::{
    Clock, SystemClock, format_hhmm, parse_hhmm, round_to_slot, short_label, time_options,
};
use crate::config::Config;
use crate::controls::{
    Banner, ControlPanel, StartRequest, control_panel, start_request, status_banner,
};
use crate::error::{NightchargeError, Result};
use crate::estimator::estimate_charge_levels;
use crate::session::SessionRegistry;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod logs;

pub use logs::logs_stream;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<Mutex<SessionRegistry>>,
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

impl AppState {
    pub fn new(config: Config, sessions: SessionRegistry) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions)),
            config: Arc::new(config),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock used when a request carries no `now`
    pub fn with_clock<C: Clock + Send + Sync + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn intent(&self, query: &IntentQuery) -> Result<OperatorIntent> {
        query.resolve(self.clock.as_ref(), self.config.timeline.slot_minutes)
    }

    /// Build the state and its registry from a validated configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let settings = config.charger_settings()?;
        let registry = SessionRegistry::new(settings, config.sessions.max_sessions);
        Ok(Self::new(config, registry))
    }
}

/// Operator toggles; missing values default to plugged in, at home, and the
/// state's clock rounded to the nearest slot
#[derive(Debug, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
pub struct IntentQuery {
    pub plugged_in: Option<bool>,
    pub at_home: Option<bool>,
    /// Time of day as HH:MM
    pub now: Option<String>,
}

impl IntentQuery {
    fn resolve(&self, clock: &dyn Clock, slot_minutes: u32) -> Result<OperatorIntent> {
        let now = match self.now.as_deref() {
            Some(raw) => parse_hhmm(raw)?,
            None => round_to_slot(clock.now(), slot_minutes),
        };
        Ok(OperatorIntent::new(
            self.plugged_in.unwrap_or(true),
            self.at_home.unwrap_or(true),
            now,
        ))
    }
}

/// Start command; without explicit flags the start-button rule decides
#[derive(Debug, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StartBody {
    pub override_schedule: Option<bool>,
    pub boost: Option<bool>,
    #[serde(flatten)]
    pub intent: IntentQuery,
}

#[derive(Debug, Serialize)]
pub struct NoticeView {
    pub level: NoticeLevel,
    pub message: String,
}

impl From<&Notice> for NoticeView {
    fn from(notice: &Notice) -> Self {
        Self {
            level: notice.level(),
            message: notice.to_string(),
        }
    }
}

/// Evaluated charger state with the notices raised on the way
#[derive(Debug, Serialize)]
pub struct StateView {
    pub mode: ChargerMode,
    #[serde(flatten)]
    pub state: ChargerState,
    pub notices: Vec<NoticeView>,
}

/// Outcome of a start or stop command
#[derive(Debug, Serialize)]
pub struct CommandView {
    pub ok: bool,
    pub notice: NoticeView,
    #[serde(flatten)]
    pub view: StateView,
}

#[derive(Debug, Serialize)]
pub struct SlotView {
    pub time: String,
    pub label: String,
    pub offset_minutes: i64,
    pub is_charging: bool,
    pub is_boost: bool,
    pub mode: ChargerMode,
    pub state_of_charge: u8,
}

#[derive(Debug, Serialize)]
pub struct TimelineView {
    pub now: String,
    pub now_offset_minutes: i64,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Serialize)]
pub struct ControlsView {
    pub panel: ControlPanel,
    pub banner: Banner,
    #[serde(flatten)]
    pub view: StateView,
}

fn error_response(err: &NightchargeError) -> Response {
    let status = match err {
        NightchargeError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
        NightchargeError::AlreadyCharging | NightchargeError::NotCharging => StatusCode::CONFLICT,
        NightchargeError::Validation { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let level = if err.is_warning() { "warning" } else { "error" };
    (
        status,
        Json(serde_json::json!({"error": err.to_string(), "level": level})),
    )
        .into_response()
}

// Notices raised while evaluating are only drained once the command succeeds
fn command_view(machine: &mut ChargerStateMachine, notice: &Notice) -> CommandView {
    let notices = machine.drain_notices();
    CommandView {
        ok: true,
        notice: NoticeView::from(notice),
        view: state_view(machine.state(), &notices),
    }
}

fn state_view(state: ChargerState, notices: &[Notice]) -> StateView {
    StateView {
        mode: state.mode(),
        state,
        notices: notices.iter().map(NoticeView::from).collect(),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/health", responses(
    (status = 200, description = "Service is healthy")
)))]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Selectable simulated times, one per timeline slot
#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/time_options", responses((status = 200))))]
pub async fn get_time_options(State(state): State<AppState>) -> impl IntoResponse {
    let options: Vec<String> = time_options(state.config.timeline.slot_minutes)
        .into_iter()
        .map(format_hhmm)
        .collect();
    Json(options)
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/sessions", responses((status = 201))))]
pub async fn create_session(State(state): State<AppState>) -> Response {
    let id = state.sessions.lock().await.create();
    (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/sessions", responses((status = 200))))]
pub async fn list_sessions(State(state): State<AppState>) -> Response {
    let summaries = state.sessions.lock().await.summaries();
    Json(summaries).into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(delete, path = "/api/sessions/{id}", params(("id" = String, Path, description = "Session id")), responses((status = 200), (status = 404))))]
pub async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.sessions.lock().await.remove(&id) {
        Ok(()) => Json(serde_json::json!({"ok": true})).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/sessions/{id}/state", params(("id" = String, Path, description = "Session id"), IntentQuery), responses((status = 200), (status = 404))))]
pub async fn session_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<IntentQuery>,
) -> Response {
    let intent = match state.intent(&query) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };
    let mut sessions = state.sessions.lock().await;
    match sessions.machine_mut(&id) {
        Ok(machine) => {
            let current = machine.evaluate(&intent);
            let notices = machine.drain_notices();
            Json(state_view(current, &notices)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/sessions/{id}/timeline", params(("id" = String, Path, description = "Session id"), IntentQuery), responses((status = 200), (status = 404))))]
pub async fn session_timeline(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<IntentQuery>,
) -> Response {
    let intent = match state.intent(&query) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };
    let sessions = state.sessions.lock().await;
    let session = match sessions.get(&id) {
        Ok(s) => s,
        Err(e) => return error_response(&e),
    };

    let machine = session.machine();
    let settings = machine.settings();
    let projected = machine.project(&intent);
    let levels = estimate_charge_levels(&projected, &settings.charge_level);
    let slots = projected
        .iter()
        .zip(levels.iter())
        .map(|(slot, level)| SlotView {
            time: format_hhmm(slot.time),
            label: short_label(slot.time),
            offset_minutes: slot.offset_minutes,
            is_charging: slot.is_charging,
            is_boost: slot.is_boost,
            mode: slot.mode(),
            state_of_charge: level.state_of_charge,
        })
        .collect();

    Json(TimelineView {
        now: format_hhmm(intent.now),
        now_offset_minutes: settings.timeline.offset_of(intent.now),
        slots,
    })
    .into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/sessions/{id}/controls", params(("id" = String, Path, description = "Session id"), IntentQuery), responses((status = 200), (status = 404))))]
pub async fn session_controls(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<IntentQuery>,
) -> Response {
    let intent = match state.intent(&query) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };
    let mut sessions = state.sessions.lock().await;
    let machine = match sessions.machine_mut(&id) {
        Ok(m) => m,
        Err(e) => return error_response(&e),
    };

    let current = machine.evaluate(&intent);
    let notices = machine.drain_notices();
    let view = ControlsView {
        panel: control_panel(&intent, &current),
        banner: status_banner(intent.at_home, &current, &machine.settings().window),
        view: state_view(current, &notices),
    };
    Json(view).into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/sessions/{id}/start", params(("id" = String, Path, description = "Session id")), request_body = StartBody, responses((status = 200), (status = 404), (status = 409))))]
pub async fn session_start(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StartBody>,
) -> Response {
    let intent = match state.intent(&body.intent) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };
    let mut sessions = state.sessions.lock().await;
    let machine = match sessions.machine_mut(&id) {
        Ok(m) => m,
        Err(e) => return error_response(&e),
    };

    // Bring the charger up to date before acting on it
    machine.evaluate(&intent);

    let request = match (body.override_schedule, body.boost) {
        (None, None) => start_request(&intent, &machine.state()),
        (override_schedule, boost) => Some(StartRequest {
            override_schedule: override_schedule.unwrap_or(false),
            boost: boost.unwrap_or(false),
        }),
    };
    let Some(request) = request else {
        return error_response(&NightchargeError::AlreadyCharging);
    };

    match machine.start_charge(request.override_schedule, request.boost, &intent) {
        Ok(notice) => Json(command_view(machine, &notice)).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/sessions/{id}/stop", params(("id" = String, Path, description = "Session id")), request_body = IntentQuery, responses((status = 200), (status = 404), (status = 409))))]
pub async fn session_stop(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(query): Json<IntentQuery>,
) -> Response {
    let intent = match state.intent(&query) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };
    let mut sessions = state.sessions.lock().await;
    let machine = match sessions.machine_mut(&id) {
        Ok(m) => m,
        Err(e) => return error_response(&e),
    };

    machine.evaluate(&intent);
    match machine.stop_charge() {
        Ok(notice) => Json(command_view(machine, &notice)).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/config", responses((status = 200))))]
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let json = serde_json::to_value(state.config.as_ref())
        .unwrap_or(serde_json::json!({"error":"serialization"}));
    Json(json)
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/config/schema", responses((status = 200))))]
pub async fn get_config_schema() -> impl IntoResponse {
    Json(crate::web_schema::build_ui_schema())
}

#[cfg(feature = "openapi")]
#[utoipa::path(get, path = "/api/config/json_schema", responses((status = 200)))]
pub async fn get_config_json_schema() -> impl IntoResponse {
    let schema = schemars::schema_for!(crate::config::Config);
    Json(serde_json::to_value(&schema).unwrap_or(serde_json::json!({"error":"schema"})))
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        health, get_time_options, create_session, list_sessions, delete_session,
        session_state, session_timeline, session_controls, session_start, session_stop,
        get_config, get_config_schema, get_config_json_schema,
        logs::logs_tail, logs::logs_stream, logs::set_web_level, logs::get_web_level,
    ),
    components(schemas(IntentQuery, StartBody, logs::TailParams, logs::WebLevelQuery)),
    tags((name = "nightcharge", description = "Nightcharge EV charger simulator API"))
)]
pub struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/api/health", get(health))
        .route("/api/time_options", get(get_time_options))
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/{id}", axum::routing::delete(delete_session))
        .route("/api/sessions/{id}/state", get(session_state))
        .route("/api/sessions/{id}/timeline", get(session_timeline))
        .route("/api/sessions/{id}/controls", get(session_controls))
        .route("/api/sessions/{id}/start", post(session_start))
        .route("/api/sessions/{id}/stop", post(session_stop))
        .route("/api/config", get(get_config))
        .route("/api/config/schema", get(get_config_schema))
        .merge(logs::routes());

    #[cfg(feature = "openapi")]
    let router = {
        use utoipa::OpenApi;
        router
            .route("/api/config/json_schema", get(get_config_json_schema))
            .merge(
                utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()),
            )
    };

    let router = router
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    #[cfg(feature = "compression")]
    let router = router.layer(tower_http::compression::CompressionLayer::new());

    router
}

pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let router = build_router(state);

    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={}, port={}",
        host, port
    ));

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!("Invalid host '{}'; falling back to 127.0.0.1", host));
            ([127, 0, 0, 1], port).into()
        }
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| NightchargeError::web(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (API /api)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router).await?;
    Ok(())
}
