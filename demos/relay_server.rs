//! Frame relay server demo
//!
//! Run with: cargo run --example relay_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example relay_server                  # binds to 0.0.0.0:9000
//!   cargo run --example relay_server localhost        # binds to 127.0.0.1:9000
//!   cargo run --example relay_server 127.0.0.1:9001   # binds to 127.0.0.1:9001
//!
//! Feed it with the synthetic_publisher example and watch with the viewer
//! example.

use std::net::SocketAddr;

use framecast::{RelayServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts "localhost", "IP", "IP:PORT", or "localhost:PORT".
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 9000;

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
    eprintln!("Usage: relay_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:9000)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:9000".parse()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framecast=debug".parse()?),
        )
        .init();

    let config = ServerConfig::default().bind(bind_addr);

    println!("Starting frame relay server on {}", bind_addr);
    println!();
    println!("=== Publish frames ===");
    println!("cargo run --example synthetic_publisher {}", bind_addr);
    println!();
    println!("=== Watch frames ===");
    println!("cargo run --example viewer {}", bind_addr);
    println!("cargo run --example viewer {} --sample", bind_addr);
    println!();

    let server = RelayServer::new(config);
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    let stats = server.stats().snapshot();
    println!(
        "Published {} frames, delivered {}, dropped {}",
        stats.frames_published, stats.frames_delivered, stats.frames_dropped
    );

    Ok(())
}
