//! Synthetic frame publisher demo
//!
//! Run with: cargo run --example synthetic_publisher [SERVER_ADDR] [FPS] [FRAME_BYTES]
//!
//! Publishes synthetic frames at a fixed rate. Each frame carries an
//! 8-byte big-endian counter followed by filler bytes, so viewers can
//! print which frames they actually saw.

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use framecast::client::{ClientConfig, RelayPublisher};

fn print_usage() {
    eprintln!("Usage: synthetic_publisher [SERVER_ADDR] [FPS] [FRAME_BYTES]");
    eprintln!();
    eprintln!("Defaults: 127.0.0.1:9000, 30 fps, 65536 bytes per frame");
}

fn synthetic_frame(counter: u64, size: usize) -> Bytes {
    let mut buf = BytesMut::with_capacity(size.max(8));
    buf.put_u64(counter);
    buf.resize(size.max(8), 0xAB);
    buf.freeze()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let addr = args.get(1).cloned().unwrap_or_else(|| "127.0.0.1:9000".into());
    let fps: u32 = args.get(2).map(|a| a.parse()).transpose()?.unwrap_or(30);
    let frame_bytes: usize = args.get(3).map(|a| a.parse()).transpose()?.unwrap_or(64 * 1024);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!(
        "Publishing {} byte frames to {} at {} fps (ctrl-c to stop)",
        frame_bytes, addr, fps
    );

    let mut publisher = RelayPublisher::connect(ClientConfig::new(addr)).await?;
    let mut ticker = tokio::time::interval(Duration::from_secs(1) / fps);
    let mut counter = 0u64;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                counter += 1;
                publisher.send_frame(synthetic_frame(counter, frame_bytes)).await?;
                if counter % u64::from(fps) == 0 {
                    println!("sent {} frames", counter);
                }
            }
        }
    }

    println!("\nSent {} frames total", publisher.frames_sent());
    publisher.disconnect().await?;
    Ok(())
}
