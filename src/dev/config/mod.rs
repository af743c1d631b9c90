mod alias;
mod port;
mod proxy;

pub use alias::AliasTable;
pub use port::port_from_env;
pub use proxy::{ProxyRule, ProxyTable};

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::error::DevError;

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Permissive cross-origin policy.
    pub cors: bool,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn new(root: &Path, port: u16) -> Self {
        Self {
            port,
            host: "127.0.0.1".to_string(),
            cors: true,
            static_dir: root.join("dist"),
        }
    }
}

/// Everything the dev server needs, resolved once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct DevConfig {
    pub server: ServerConfig,
    pub aliases: AliasTable,
    pub proxy: ProxyTable,
}

impl DevConfig {
    pub fn new(root: &Path, port: u16) -> Result<Self, DevError> {
        Ok(Self {
            server: ServerConfig::new(root, port),
            aliases: AliasTable::new(root),
            proxy: ProxyTable::default_rules()?,
        })
    }

    /// Reads `PORT` exactly once; nothing else consults the environment.
    pub fn from_env(root: &Path) -> Result<Self, DevError> {
        Self::new(root, port_from_env())
    }
}
