//! # Tidewater Server
//!
//! Headless sea-level server.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info tidewater_server --config config/tidewater.toml --ticks 2000
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use tidewater::{ServerConfig, TickLoop, TidewaterServer};
use tracing::{error, info};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line arguments (simple parsing, no external deps)
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = PathBuf::from("config/tidewater.toml");
    let mut run_ticks: Option<u64> = None;
    let mut fast = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if let Some(path) = args.get(i + 1) {
                    config_path = PathBuf::from(path);
                    i += 1;
                }
            }
            "--ticks" | "-t" => {
                if let Some(ticks) = args.get(i + 1) {
                    run_ticks = ticks.parse().ok();
                    i += 1;
                }
            }
            "--fast" => fast = true,
            "--help" | "-h" => {
                println!("Usage: tidewater_server [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>   Config file (default: config/tidewater.toml)");
                println!("  -t, --ticks <NUM>     Stop after NUM ticks (overrides run_ticks)");
                println!("      --fast            Do not pace ticks to the tick rate");
                println!("  -h, --help            Show this help");
                return ExitCode::SUCCESS;
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = match ServerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %config_path.display(), error = %e, "cannot start");
            return ExitCode::FAILURE;
        }
    };
    if let Some(ticks) = run_ticks {
        config.run_ticks = ticks;
    }

    let tick_rate = config.tick_rate;
    let mut server = match TidewaterServer::from_config(config) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "cannot start");
            return ExitCode::FAILURE;
        }
    };

    info!(
        config = %config_path.display(),
        tick_rate,
        worlds = server.registry().len(),
        "tidewater server running"
    );

    let mut tick_loop = TickLoop::new(tick_rate);
    let start = Instant::now();
    let stats_interval = u64::from(tick_rate.max(1)) * 60;

    while !server.finished() {
        if !fast {
            tick_loop.pace();
        }
        tick_loop.measure(|| server.tick());

        if server.tick_count() % stats_interval == 0 {
            let stats = tick_loop.stats();
            info!(
                ticks = server.tick_count(),
                uptime_s = start.elapsed().as_secs_f64(),
                mean_tick_ms = stats.mean.as_secs_f64() * 1e3,
                worst_tick_ms = stats.worst.as_secs_f64() * 1e3,
                overruns = stats.overruns,
                "server status"
            );
        }
    }

    server.shutdown();
    ExitCode::SUCCESS
}
