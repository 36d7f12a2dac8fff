use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::UNIX_EPOCH;

use crate::admin::AdminState;
use crate::load_balancer::Server;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub state: String,
    pub replication_mode: String,
    pub servers_total: usize,
    pub servers_up: usize,
}

#[derive(Debug, Serialize)]
pub struct ServerStatus {
    pub name: String,
    pub up: bool,
    pub degraded: bool,
    pub last_error: Option<String>,
    pub io_running: bool,
    pub write_set_ready: bool,
    pub seconds_behind_primary: Option<u64>,
    pub open_connections: Option<u64>,
    pub running_connections: Option<u64>,
    pub write_set_local_state: Option<u32>,
    pub last_update_unix_ms: u128,
    pub probing: bool,
}

impl From<&Server> for ServerStatus {
    fn from(server: &Server) -> Self {
        let health = server.health();
        Self {
            name: server.name().to_string(),
            up: health.up,
            degraded: health.up && health.last_error.is_some(),
            last_error: health.last_error.as_ref().map(ToString::to_string),
            io_running: health.io_running,
            write_set_ready: health.write_set_ready,
            seconds_behind_primary: health.seconds_behind_primary,
            open_connections: health.open_connections,
            running_connections: health.running_connections,
            write_set_local_state: health.write_set_local_state,
            last_update_unix_ms: health
                .last_update
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            probing: server.is_probing(),
        }
    }
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let balancer = &state.balancer;
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        state: format!("{:?}", balancer.state()),
        replication_mode: format!("{:?}", balancer.replication_mode()),
        servers_total: balancer.servers().len(),
        servers_up: balancer.servers().iter().filter(|s| s.health_record().is_up()).count(),
    })
}

pub async fn get_servers(State(state): State<AdminState>) -> Json<Vec<ServerStatus>> {
    Json(
        state
            .balancer
            .servers()
            .iter()
            .map(|s| ServerStatus::from(s.as_ref()))
            .collect(),
    )
}

pub async fn get_pick(
    State(state): State<AdminState>,
) -> Result<Json<ServerStatus>, (StatusCode, Json<serde_json::Value>)> {
    match state.balancer.pick_server() {
        Some(server) => Ok(Json(ServerStatus::from(server.as_ref()))),
        None => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": "no server available" })),
        )),
    }
}
