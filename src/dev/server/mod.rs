mod handlers;
mod state;

pub use state::ServerState;

use super::config::DevConfig;
use super::health;
use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Condition, Logger},
    web,
};
use anyhow::Result;
use handlers::dispatch;
use log::{info, warn};

pub const HEALTH_CHECK_PATH: &str = "/__health";

pub struct DevServer {
    config: DevConfig,
}

impl DevServer {
    pub fn new(config: DevConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        health::init();
        log_server_banner(&self.config);

        let host = self.config.server.host.clone();
        let port = self.config.server.port;
        let server_state = web::Data::new(ServerState::new(self.config)?);

        HttpServer::new(move || {
            let state = server_state.clone();
            let cors = state.config.server.cors;

            App::new()
                .app_data(state)
                .wrap(Logger::default())
                .wrap(Condition::new(cors, Cors::permissive()))
                .configure(configure)
        })
        .bind((host.as_str(), port))?
        .run()
        .await?;

        Ok(())
    }
}

/// Health endpoint first, then the catch-all dispatcher.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(HEALTH_CHECK_PATH).route(web::get().to(health::health_check)))
        .service(web::resource("/{tail:.*}").to(dispatch::dispatch));
}

fn log_server_banner(config: &DevConfig) {
    let server = &config.server;
    info!(
        "Starting MeowMail dev server on {}:{}",
        server.host, server.port
    );
    info!(
        "Health check available at http://{}:{}{}",
        server.host, server.port, HEALTH_CHECK_PATH
    );

    if server.static_dir.is_dir() {
        info!("Serving static assets from {:?}", server.static_dir);
    } else {
        warn!(
            "Static asset directory {:?} does not exist yet",
            server.static_dir
        );
    }

    if server.cors {
        info!("CORS: permissive");
    }

    for rule in config.proxy.rules() {
        info!(
            "Proxy {} -> {} (change_origin={}, ws={})",
            rule.prefix, rule.target, rule.change_origin, rule.ws
        );
    }
    for alias in config.aliases.entries() {
        info!("Alias {} -> {:?}", alias.prefix, alias.dir);
    }
}
