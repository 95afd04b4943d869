pub mod config;
pub mod protocol;
pub mod server;

pub use config::*;
pub use server::RiskServer;
