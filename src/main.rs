//! Live notepad server
//!
//! Run with: live-notepad [BIND_ADDR]
//!
//! Examples:
//!   live-notepad                    # binds to 0.0.0.0:8080
//!   live-notepad localhost          # binds to 127.0.0.1:8080
//!   live-notepad 127.0.0.1:9000     # binds to 127.0.0.1:9000
//!
//! Then open http://localhost:8080/ in several browser tabs.

use std::net::SocketAddr;

use live_notepad::server::config::DEFAULT_PORT;
use live_notepad::{NotepadServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:8080
/// - "localhost:9000" -> 127.0.0.1:9000
/// - "127.0.0.1" -> 127.0.0.1:8080
/// - "0.0.0.0:80" -> 0.0.0.0:80
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: live-notepad [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:{})", DEFAULT_PORT);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = ServerConfig::default();
    if let Some(addr_str) = args.get(1) {
        match parse_bind_addr(addr_str) {
            Ok(addr) => config = config.bind(addr),
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("live_notepad=debug".parse()?),
        )
        .init();

    let server = NotepadServer::new(config);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let stats = server.broadcaster().stats().await;
    tracing::info!(
        updates = stats.updates_published,
        sessions = stats.total_joins,
        "Server stopped"
    );

    Ok(())
}
