use std::f64::consts::TAU;
use std::time::Duration;

use clap::{Parser, Subcommand};
use client::{Annotator, ClientError, Encoding, MarkerSet, Pose, WsTransport};
use tracing::info;

/// Height of the simulated controller above the floor, in metres.
const STROKE_HEIGHT: f64 = 1.5;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to render marker: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "arpaint", about = "Shared AR paint relay client")]
struct Cli {
    #[arg(long, env = "ARPAINT_URL", default_value = "ws://127.0.0.1:3000/ws")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every marker painted by other participants as a JSON line.
    Listen {
        #[arg(long, help = "Exit after this many markers")]
        count: Option<usize>,
    },
    /// Paint a circular stroke and report local/remote marker counts.
    Paint {
        #[arg(long, default_value_t = 60)]
        ticks: usize,

        #[arg(long, default_value_t = 16)]
        interval_ms: u64,

        #[arg(long, default_value_t = 0.5)]
        radius: f64,

        #[arg(long, default_value_t = false, help = "Send protobuf binary frames")]
        binary: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Listen { count } => run_listen(&cli.url, count).await,
        Command::Paint { ticks, interval_ms, radius, binary } => {
            let encoding = if binary { Encoding::Binary } else { Encoding::Text };
            run_paint(&cli.url, encoding, ticks, Duration::from_millis(interval_ms), radius).await
        }
    }
}

async fn run_listen(url: &str, count: Option<usize>) -> Result<(), CliError> {
    let (transport, mut markers) = WsTransport::connect(url, Encoding::Text).await?;

    let mut received = 0usize;
    while count.is_none_or(|limit| received < limit) {
        let Some(marker) = markers.recv().await else {
            break;
        };
        println!("{}", serde_json::to_string(&marker)?);
        received += 1;
    }

    info!(received, "listen finished");
    transport.shutdown().await;
    Ok(())
}

async fn run_paint(
    url: &str,
    encoding: Encoding,
    ticks: usize,
    interval: Duration,
    radius: f64,
) -> Result<(), CliError> {
    let (transport, mut remote) = WsTransport::connect(url, encoding).await?;
    let mut annotator = Annotator::new(MarkerSet::new(), transport);

    let mut local = 0usize;
    let mut remote_count = 0usize;

    annotator.select_start();
    for i in 0..ticks {
        annotator.scene_mut().set_pose(stroke_pose(i, ticks, radius));
        if annotator.tick().is_some() {
            local += 1;
        }
        remote_count += annotator.drain_remote(&mut remote);
        tokio::time::sleep(interval).await;
    }
    annotator.select_end();

    tokio::time::sleep(interval).await;
    remote_count += annotator.drain_remote(&mut remote);

    let (scene, transport) = annotator.into_parts();
    transport.shutdown().await;

    let summary = serde_json::json!({
        "local": local,
        "remote": remote_count,
        "rendered": scene.len(),
    });
    println!("{summary}");
    Ok(())
}

/// Controller pose for step `i` of a `ticks`-step circle around the origin,
/// facing along the direction of travel.
#[allow(clippy::cast_precision_loss)]
fn stroke_pose(i: usize, ticks: usize, radius: f64) -> Pose {
    let angle = TAU * i as f64 / ticks.max(1) as f64;
    let position = [radius * angle.cos(), STROKE_HEIGHT, -radius * angle.sin()];
    Pose::from_yaw(position, angle)
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
