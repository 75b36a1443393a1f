//! Frame viewer demo
//!
//! Run with: cargo run --example viewer [SERVER_ADDR] [--sample]
//!
//! Connects to a relay server as a streamed consumer (default) or a
//! pull-style sampling consumer (--sample), and prints the received frame
//! counters and rates once per second.

use std::time::Instant;

use framecast::client::{ClientConfig, RelayViewer, ViewMode};

fn print_usage() {
    eprintln!("Usage: viewer [SERVER_ADDR] [--sample]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --sample    Poll the latest frame instead of streaming");
}

fn frame_counter(payload: &[u8]) -> Option<u64> {
    let head = payload.get(..8)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(head);
    Some(u64::from_be_bytes(buf))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mode = if args.iter().any(|a| a == "--sample") {
        ViewMode::Sample
    } else {
        ViewMode::Stream
    };
    let addr = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "127.0.0.1:9000".into());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Viewing {} in {:?} mode (ctrl-c to stop)", addr, mode);

    let mut viewer = RelayViewer::connect(ClientConfig::new(addr), mode).await?;

    let mut window_start = Instant::now();
    let mut window_frames = 0u64;
    let mut window_bytes = 0u64;

    loop {
        let frame = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            frame = viewer.next_frame() => frame?,
        };

        let Some(payload) = frame else {
            println!("Server closed the connection");
            break;
        };

        window_frames += 1;
        window_bytes += payload.len() as u64;

        let elapsed = window_start.elapsed();
        if elapsed.as_secs_f64() >= 1.0 {
            let fps = window_frames as f64 / elapsed.as_secs_f64();
            let kbps = window_bytes as f64 / elapsed.as_secs_f64() / 1024.0;
            match frame_counter(&payload) {
                Some(counter) => {
                    println!("frame #{}  recv: {:.1}/s  net: {:.1} KB/s", counter, fps, kbps)
                }
                None => println!("recv: {:.1}/s  net: {:.1} KB/s", fps, kbps),
            }
            window_start = Instant::now();
            window_frames = 0;
            window_bytes = 0;
        }
    }

    println!("Received {} frames total", viewer.frames_received());
    Ok(())
}
