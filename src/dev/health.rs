use actix_web::{HttpResponse, Responder, web};
use log::debug;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::server::ServerState;

/// Health check response structure
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Reason for the status
    pub reason: String,
    /// Version of the service
    pub version: String,
    /// Timestamp of the response
    pub timestamp: u64,
    /// Uptime in seconds
    pub uptime: u64,
    /// Number of configured proxy rules
    pub proxy_rules: usize,
}

/// Server uptime tracking
static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Record the server start time
pub fn init() {
    SERVER_START_TIME.set(now_secs()).ok();
}

fn get_start_time() -> u64 {
    *SERVER_START_TIME.get_or_init(now_secs)
}

/// Reports uptime and whether the asset directory is there to serve.
pub async fn health_check(state: web::Data<ServerState>) -> impl Responder {
    debug!("Health check requested");

    let config = state.config();
    let now = now_secs();

    let mut health = HealthResponse {
        status: "OK".to_string(),
        reason: "Service is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime: now.saturating_sub(get_start_time()),
        proxy_rules: config.proxy.len(),
    };

    if !config.server.static_dir.is_dir() {
        health.status = "ERROR".to_string();
        health.reason = "Static asset directory not found".to_string();
    }

    if health.status == "OK" {
        HttpResponse::Ok().json(health)
    } else {
        HttpResponse::InternalServerError().json(health)
    }
}
