use std::io;

use loanrisk_mcp::{DaemonConfig, RiskServer, Transport};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    init_tracing();

    let config =
        DaemonConfig::from_env().map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;
    let server = RiskServer::from_env()?;
    match config.transport {
        Transport::Stdio => server.serve_stdio(),
        Transport::Http => server.serve_http(&config.http_addr),
    }
}

/// Logs go to stderr; stdout is the protocol channel.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOANRISK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
