mod app;
mod cli;
mod commands;
mod dev;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
