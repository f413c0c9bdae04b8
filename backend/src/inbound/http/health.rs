//! Liveness and readiness probes served outside the `/api` scope.
//!
//! Both probes answer with a small JSON body and `Cache-Control: no-store`
//! so intermediaries never serve a stale verdict.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Process health flags shared between the server factory and the probes.
///
/// The server starts live but not ready; `mark_ready` is called once the
/// listener is bound and the storage backend is reachable.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness so orchestrators stop routing traffic while draining.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Probe verdict body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Ok,
    Unavailable,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeBody {
    pub status: ProbeStatus,
}

fn probe_response(healthy: bool) -> HttpResponse {
    let (mut builder, status) = if healthy {
        (HttpResponse::Ok(), ProbeStatus::Ok)
    } else {
        (HttpResponse::ServiceUnavailable(), ProbeStatus::Unavailable)
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ProbeBody { status })
}

/// Readiness probe: 200 once the server accepts traffic, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Ready to handle traffic", body = ProbeBody),
        (status = 503, description = "Not ready", body = ProbeBody)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_ready())
}

/// Liveness probe: 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Alive", body = ProbeBody),
        (status = 503, description = "Shutting down", body = ProbeBody)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;

    async fn probe(state: web::Data<HealthState>, uri: &str) -> (StatusCode, Option<String>, Value) {
        let app = test::init_service(App::new().app_data(state).service(ready).service(live)).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        let cache = res
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body: Value = test::read_body_json(res).await;
        (status, cache, body)
    }

    #[rstest]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE, "unavailable")]
    #[case(true, StatusCode::OK, "ok")]
    #[actix_web::test]
    async fn readiness_follows_flag(
        #[case] ready_flag: bool,
        #[case] expected: StatusCode,
        #[case] verdict: &str,
    ) {
        let state = web::Data::new(HealthState::new());
        if ready_flag {
            state.mark_ready();
        }

        let (status, cache, body) = probe(state, "/health/ready").await;

        assert_eq!(status, expected);
        assert_eq!(cache.as_deref(), Some("no-store"));
        assert_eq!(body["status"], verdict);
    }

    #[actix_web::test]
    async fn liveness_fails_after_drain() {
        let state = web::Data::new(HealthState::new());
        let (status, _, _) = probe(state.clone(), "/health/live").await;
        assert_eq!(status, StatusCode::OK);

        state.mark_unhealthy();
        let (status, cache, body) = probe(state, "/health/live").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(cache.as_deref(), Some("no-store"));
        assert_eq!(body["status"], "unavailable");
    }
}
