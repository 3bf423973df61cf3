//! mr60bha2-monitor - log vital signs from an MR60BHA2 sensor
//!
//! Usage:
//!   mr60bha2-monitor [--config <path>]
//!   mr60bha2-monitor <path>
//!
//! Without a config file the built-in defaults are used (/dev/serial0 at
//! 115200 baud). `RUST_LOG` overrides the configured log level.
//!
//! Exit: Ctrl+C or SIGTERM.

use mr60bha2_io::{AppConfig, Mr60bha2};
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default config location
const DEFAULT_CONFIG_PATH: &str = "/etc/mr60bha2.toml";

/// How often framing statistics are logged
const STATS_INTERVAL: Duration = Duration::from_secs(30);

/// Parse config path from command line arguments.
///
/// Supports `--config <path>`, `-c <path>` and a single positional path.
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

fn load_config() -> mr60bha2_io::Result<AppConfig> {
    match parse_config_path() {
        Some(path) => AppConfig::from_file(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => AppConfig::from_file(DEFAULT_CONFIG_PATH),
        None => Ok(AppConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("mr60bha2-monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })?;

    let mut sensor = Mr60bha2::open(&config.sensor)?;
    let mut last_stats = Instant::now();

    while running.load(Ordering::Relaxed) {
        if sensor.poll()? {
            if let Some(bpm) = sensor.get_heart_rate() {
                log::info!("Heart rate: {:.1} BPM", bpm);
            }
            if let Some(bpm) = sensor.get_breath_rate() {
                log::info!("Breath rate: {:.1} BPM", bpm);
            }
            if let Some(distance) = sensor.get_distance() {
                if distance.detected {
                    log::info!("Distance: {:.2} m", distance.range_m);
                } else {
                    log::info!("Distance: no subject detected");
                }
            }
            if let Some(phases) = sensor.get_phases() {
                log::debug!(
                    "Phases: total={:.2}, breath={:.2}, heart={:.2}",
                    phases.total,
                    phases.breath,
                    phases.heart
                );
            }
            if let Some(text) = sensor.get_debug_text() {
                log::debug!("Sensor debug [0x{:04X}]: {}", text.code, text.to_string_lossy());
            }
        }

        if last_stats.elapsed() >= STATS_INTERVAL {
            let stats = sensor.stats();
            log::info!(
                "Stats: {} frames, {} framing errors, {} unknown, {} bytes discarded",
                stats.sync.frames,
                stats.sync.framing_errors(),
                stats.unknown_frames,
                stats.sync.discarded_bytes
            );
            last_stats = Instant::now();
        }
    }

    sensor.close()?;
    log::info!("mr60bha2-monitor stopped");
    Ok(())
}
