mod config;
mod error;
mod health;
mod server;

pub use config::DevConfig;
pub use error::DevError;
pub use server::DevServer;
