//! alert_log - print the pothole alert log
//!
//! The daemon's "open logs" surface: reads the cumulative CSV and prints one
//! line per alert episode.

use anyhow::Result;
use clap::Parser;

use pothole_sentinel::EventLog;

#[derive(Parser, Debug)]
#[command(name = "alert_log", about = "Print recorded pothole alerts")]
struct Args {
    /// Log file path
    #[arg(long, default_value = "alerts/logs/pothole_log.csv", env = "SENTINEL_LOG_PATH")]
    log_path: String,

    /// Show only the most recent N records
    #[arg(long)]
    tail: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let log = EventLog::new(&args.log_path);

    if !log.path().exists() {
        eprintln!("log file not found: {}", log.path().display());
        std::process::exit(1);
    }

    let records = match log.read_all() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("failed to open log file: {e:#}");
            std::process::exit(1);
        }
    };

    let skip = match args.tail {
        Some(tail) => records.len().saturating_sub(tail),
        None => 0,
    };

    println!("{} alert episode(s) recorded", records.len());
    for record in &records[skip..] {
        println!(
            "{} {} | {} ({}, {}) | severity={} count={}",
            record.date,
            record.time,
            record.city,
            record.latitude,
            record.longitude,
            record.severity,
            record.count
        );
    }
    Ok(())
}
