use crate::dev::{DevConfig, DevServer};
use anyhow::Result;
use std::path::PathBuf;

pub struct ServeOptions {
    pub host: String,
    pub static_dir: Option<PathBuf>,
}

pub async fn run(options: ServeOptions, mut config: DevConfig) -> Result<()> {
    config.server.host = options.host;
    if let Some(static_dir) = options.static_dir {
        config.server.static_dir = static_dir;
    }

    let server = DevServer::new(config);
    server.run().await
}
