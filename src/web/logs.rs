use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{Json, Router, extract::Query, http::header, response::IntoResponse};
use axum::{http::StatusCode, response::Response};
use axum::{routing::get, routing::post};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use super::AppState;

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
pub struct TailParams {
    pub lines: Option<usize>,
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/tail", params(TailParams), responses((status = 200), (status = 404))))]
pub async fn logs_tail(
    State(state): State<AppState>,
    Query(params): Query<TailParams>,
) -> impl IntoResponse {
    let max_lines = params.lines.unwrap_or(200).min(10_000);
    let Some(path) = resolve_log_file_path(&state.config.logging.file).await else {
        return (StatusCode::NOT_FOUND, "Log file not available").into_response();
    };
    match fs::read_to_string(&path).await {
        Ok(contents) => {
            let lines: Vec<&str> = contents.lines().collect();
            let skip = lines.len().saturating_sub(max_lines);
            let mut resp = Response::new(lines[skip..].join("\n").into());
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            resp
        }
        Err(_) => (StatusCode::NOT_FOUND, "Log file not available").into_response(),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/stream", responses((status = 200))))]
pub async fn logs_stream() -> impl IntoResponse {
    let rx = crate::logging::subscribe_log_lines();
    let stream = BroadcastStream::new(rx).filter_map(|res| match res {
        Ok(line) if crate::logging::should_emit_to_web(&line) => {
            Some(Ok::<Event, std::convert::Infallible>(
                Event::default().event("log").data(line),
            ))
        }
        _ => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn name_matches(file_name: &str, prefix: &str, suffix: &str) -> bool {
    file_name.starts_with(prefix)
        && (file_name.ends_with(&format!(".{suffix}"))
            || file_name.contains(&format!(".{suffix}.")))
}

fn rotated_file_pattern(configured: &Path) -> (PathBuf, String, String) {
    if configured.extension().is_some() {
        let dir = configured.parent().unwrap_or_else(|| Path::new("."));
        let ext = configured
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("log")
            .to_string();
        (dir.to_path_buf(), "nightcharge".to_string(), ext)
    } else {
        (
            configured.to_path_buf(),
            "nightcharge".to_string(),
            "log".to_string(),
        )
    }
}

// The rolling appender writes dated files next to the configured path;
// pick the newest one that matches.
async fn resolve_log_file_path(configured_path: &str) -> Option<PathBuf> {
    let configured = Path::new(configured_path);
    if let Ok(md) = fs::metadata(configured).await {
        if md.is_file() {
            return Some(configured.to_path_buf());
        }
    }

    let (search_dir, prefix, suffix) = rotated_file_pattern(configured);
    let mut rd = fs::read_dir(&search_dir).await.ok()?;
    let mut best: Option<(SystemTime, PathBuf)> = None;
    while let Ok(Some(entry)) = rd.next_entry().await {
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if !name_matches(&name, &prefix, &suffix) {
            continue;
        }
        let Ok(modified) = entry.metadata().await.and_then(|md| md.modified()) else {
            continue;
        };
        if best.as_ref().is_none_or(|(t, _)| modified > *t) {
            best = Some((modified, entry.path()));
        }
    }
    best.map(|(_, p)| p)
}

#[derive(Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
pub struct WebLevelQuery {
    level: String,
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/logs/web_level", params(WebLevelQuery), responses((status = 200), (status = 400))))]
pub async fn set_web_level(Query(q): Query<WebLevelQuery>) -> impl IntoResponse {
    match crate::logging::set_web_log_level_str(&q.level) {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": true, "level": q.level})),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": e.to_string()})),
        ),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/web_level", responses((status = 200))))]
pub async fn get_web_level() -> impl IntoResponse {
    let lvl = crate::logging::get_web_log_level();
    Json(serde_json::json!({"level": format!("{:?}", lvl)}))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/logs/tail", get(logs_tail))
        .route("/api/logs/stream", get(logs_stream))
        .route(
            "/api/logs/web_level",
            post(set_web_level).get(get_web_level),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_names_match() {
        assert!(name_matches("nightcharge.2026-10-19.log", "nightcharge", "log"));
        assert!(name_matches("nightcharge.log", "nightcharge", "log"));
        assert!(!name_matches("other.log", "nightcharge", "log"));
    }

    #[test]
    fn test_rotated_pattern_for_file_path() {
        let (dir, prefix, ext) = rotated_file_pattern(Path::new("/tmp/nightcharge.log"));
        assert_eq!(dir, PathBuf::from("/tmp"));
        assert_eq!(prefix, "nightcharge");
        assert_eq!(ext, "log");
    }
}
