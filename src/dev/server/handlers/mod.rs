pub mod assets;
pub mod dispatch;
pub mod proxy;
pub mod upgrade;
