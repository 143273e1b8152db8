//! AIS2IH multi-sensor collector
//!
//! Acquires acceleration samples from up to four AIS2IH accelerometers,
//! one per I2C bus, writing one time-stamped CSV file per sensor.
//!
//! Usage:
//!   ais2ih-collector <SENSORS> [SAMPLES] --output acc_data

use ais2ih_daq::{
    collect, AcquisitionConfig, Ais2ihError, PipelineOutcome, DEFAULT_SAMPLE_COUNT,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "ais2ih-collector")]
#[command(about = "Collect AIS2IH acceleration data from up to four I2C buses", long_about = None)]
struct Args {
    /// Number of sensors to read (1-4); sensor i is expected on /dev/i2c-i
    sensors: usize,

    /// Samples to collect per sensor (at least one second's worth)
    #[arg(default_value_t = DEFAULT_SAMPLE_COUNT)]
    samples: usize,

    /// Output directory for the per-sensor CSV files
    #[arg(short, long, default_value = "acc_data")]
    output: PathBuf,

    /// Print the configuration read-back for each sensor
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.sensors < 1 || args.sensors > 4 {
        eprintln!("Error: sensor number must be between 1 and 4");
        return ExitCode::FAILURE;
    }

    if let Err(e) = std::fs::create_dir_all(&args.output) {
        eprintln!(
            "Error: failed to create output directory '{}': {e}",
            args.output.display()
        );
        return ExitCode::FAILURE;
    }

    let config = AcquisitionConfig::new(args.sensors, args.samples, args.output, args.verbose);

    println!("AIS2IH Data Collector");
    println!("=====================");
    println!(
        "Each sensor will collect {} samples in {:.2} seconds.",
        config.samples_per_sensor,
        config.duration_secs()
    );

    let reports = collect(&config);

    let mut completed = 0usize;
    let mut storage_failure = false;
    for report in &reports {
        match &report.outcome {
            PipelineOutcome::Completed { .. } => completed += 1,
            PipelineOutcome::Aborted {
                error: Ais2ihError::Storage(_),
            } => storage_failure = true,
            _ => {}
        }
    }

    println!("All data was saved at '{}'", config.output_dir.display());

    // A sensor fault is confined to its pipeline; the run only counts as
    // failed when nothing was recorded or an output file could not be kept.
    if completed == 0 || storage_failure {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
