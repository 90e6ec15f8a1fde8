use anyhow::Context;
use broadcast::bridge::{BroadcastBridge, BroadcastSink};
use broadcast::model::BroadcastModel;
use clap::Parser;
use generator::scenario::{build_station_payloads, ScenarioConfig};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use stormcore::engine;
use stormcore::telemetry::MetricsRecorder;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::ServerConfig;
use workflow::runner::Runner;

mod broadcast;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Lightning strike correlation server")]
struct Args {
    /// Run one synthetic strike burst offline and emit a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a server config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Correlation window in seconds
    #[arg(long, default_value_t = 0.4)]
    time_window: f64,
    /// Evaluation delay after the last arrival, 0 evaluates immediately
    #[arg(long, default_value_t = 0.0)]
    debounce: f64,
    /// Keep the HTTP bridge alive for incoming real-time payloads
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let server_config = if let Some(path) = args.config {
        ServerConfig::load(path)?
    } else {
        ServerConfig::from_args(args.time_window, args.debounce)
    };

    if args.offline {
        let runner = Runner::new(server_config.clone());
        let scenario = ScenarioConfig::default();
        let feed = build_station_payloads(&scenario, &server_config.stations)?;
        let summary = runner.execute(&feed)?;

        println!(
            "Offline run -> reports {}, fused {}, parse failures {}",
            summary.reports_buffered,
            summary.metrics.events_fused,
            summary.metrics.parse_failures
        );
        for record in &summary.records {
            println!(
                "strike lat {:.4} lon {:.4} spread {:.1}ms",
                record.combined_coords.lat,
                record.combined_coords.lon,
                record.time_difference_ms
            );
        }

        let log_path = PathBuf::from("tools/data/strikes.jsonl");
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        for record in &summary.records {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{}", line)?;
        }
    }

    if args.serve {
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating server runtime")?;
        runtime.block_on(async {
            let state = Arc::new(RwLock::new(BroadcastModel::default()));
            let sink = Arc::new(BroadcastSink::new(state.clone()));
            let metrics = Arc::new(MetricsRecorder::new());
            let (handle, join) =
                engine::spawn(server_config.to_engine_config(), sink, metrics)
                    .context("starting correlation engine")?;

            let bridge = BroadcastBridge::new(state, handle.clone());
            bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");

            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            handle.shutdown().await;
            join.await.context("joining engine task")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
