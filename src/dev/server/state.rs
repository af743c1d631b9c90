use std::sync::Arc;

use crate::dev::config::DevConfig;
use crate::dev::error::DevError;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<DevConfig>,
    pub client: reqwest::Client,
}

impl ServerState {
    pub fn new(config: DevConfig) -> Result<Self, DevError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> Arc<DevConfig> {
        Arc::clone(&self.config)
    }
}
