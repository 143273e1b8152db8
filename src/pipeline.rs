//! Per-sensor acquisition pipelines and the joining coordinator
//!
//! Each requested sensor index gets its own OS thread running the full
//! configure-then-acquire sequence against its own bus handle and output
//! file. Pipelines share nothing mutable; the coordinator's only job is to
//! launch them and wait for every one to reach a terminal state.

use crate::ais2ih::{Ais2ih, SAMPLE_RATE_HZ};
use crate::bus::{I2cBus, LinuxI2cBus};
use crate::csv_format::CsvWriter;
use crate::error::{Ais2ihError, Result};
use chrono::Local;
use std::path::PathBuf;
use std::thread;

/// Samples collected per sensor when no count is given (ten seconds' worth)
pub const DEFAULT_SAMPLE_COUNT: usize = SAMPLE_RATE_HZ * 10;

/// Immutable per-run settings, fixed before any pipeline thread starts.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Sensors to read; sensor `i` lives on bus `i`
    pub sensor_count: usize,
    /// Records each pipeline must write before completing
    pub samples_per_sensor: usize,
    /// Directory receiving the per-sensor CSV files
    pub output_dir: PathBuf,
    /// Print the configuration read-back for each sensor
    pub verbose: bool,
}

impl AcquisitionConfig {
    /// Build a run configuration. A sample count below one second's worth
    /// at the device rate is raised to that minimum.
    pub fn new(sensor_count: usize, samples: usize, output_dir: PathBuf, verbose: bool) -> Self {
        Self {
            sensor_count,
            samples_per_sensor: samples.max(SAMPLE_RATE_HZ),
            output_dir,
            verbose,
        }
    }

    /// Acquisition length in seconds at the configured device rate
    pub fn duration_secs(&self) -> f64 {
        self.samples_per_sensor as f64 / SAMPLE_RATE_HZ as f64
    }
}

/// Terminal state of one sensor's pipeline.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Reached the sample target with every record written and flushed
    Completed { samples: usize, path: PathBuf },
    /// The bus handle could not be opened; nothing was attempted
    Skipped { error: Ais2ihError },
    /// Configuration or acquisition failed partway through
    Aborted { error: Ais2ihError },
}

/// One sensor's terminal state as reported to the caller.
#[derive(Debug)]
pub struct PipelineReport {
    pub sensor_index: usize,
    pub outcome: PipelineOutcome,
}

/// Launch one pipeline per sensor over the Linux I2C adapters and wait for
/// all of them.
pub fn collect(config: &AcquisitionConfig) -> Vec<PipelineReport> {
    collect_with(config, LinuxI2cBus::open)
}

/// Launch one pipeline per sensor index over buses supplied by `open_bus`
/// and block until every launched pipeline reaches a terminal state.
///
/// Handles are opened before any thread spawns; an unavailable bus records
/// its sensor as skipped without costing the others anything. Reports come
/// back ordered by sensor index.
pub fn collect_with<B, F>(config: &AcquisitionConfig, mut open_bus: F) -> Vec<PipelineReport>
where
    B: I2cBus + Send + 'static,
    F: FnMut(usize) -> Result<B>,
{
    let start_stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

    let mut reports = Vec::with_capacity(config.sensor_count);
    let mut workers = Vec::with_capacity(config.sensor_count);
    for index in 0..config.sensor_count {
        match open_bus(index) {
            Ok(bus) => {
                let sensor = Ais2ih::new(bus);
                let stamp = start_stamp.clone();
                let config = config.clone();
                workers.push((
                    index,
                    thread::spawn(move || run_pipeline(sensor, index, &stamp, &config)),
                ));
            }
            Err(error) => {
                eprintln!("{error}; skipping");
                reports.push(PipelineReport {
                    sensor_index: index,
                    outcome: PipelineOutcome::Skipped { error },
                });
            }
        }
    }

    for (index, worker) in workers {
        let outcome = match worker.join() {
            Ok(outcome) => outcome,
            Err(_) => PipelineOutcome::Aborted {
                error: Ais2ihError::Bus(format!("sensor {index} worker panicked")),
            },
        };
        reports.push(PipelineReport {
            sensor_index: index,
            outcome,
        });
    }

    reports.sort_by_key(|r| r.sensor_index);
    reports
}

/// Run one sensor from configuration through acquisition to a terminal
/// state. The driver (and with it the bus handle) and the output sink are
/// both released when this returns, whatever the outcome.
fn run_pipeline<B: I2cBus>(
    mut sensor: Ais2ih<B>,
    index: usize,
    start_stamp: &str,
    config: &AcquisitionConfig,
) -> PipelineOutcome {
    if let Err(error) = sensor.configure() {
        eprintln!("Sensor {index} aborted: {error}");
        return PipelineOutcome::Aborted { error };
    }

    if config.verbose {
        match sensor.config_snapshot() {
            Ok(snap) => println!(
                "Sensor {index}: WHO_AM_I=0x{:02X} CTRL1=0x{:02X} CTRL2=0x{:02X} FIFO_CTRL=0x{:02X} CTRL6=0x{:02X}",
                snap.who_am_i, snap.ctrl1, snap.ctrl2, snap.fifo_ctrl, snap.ctrl6
            ),
            // read-back is informational only; never gates acquisition
            Err(error) => eprintln!("Sensor {index}: config read-back failed: {error}"),
        }
    }

    let mut writer = match CsvWriter::create(&config.output_dir, start_stamp, index) {
        Ok(writer) => writer,
        Err(error) => {
            eprintln!("Sensor {index} aborted: {error}");
            return PipelineOutcome::Aborted { error };
        }
    };

    match acquire(&mut sensor, &mut writer, config.samples_per_sensor) {
        Ok(samples) => {
            if let Err(error) = writer.flush() {
                eprintln!("Sensor {index} aborted: {error}");
                return PipelineOutcome::Aborted { error };
            }
            println!("Sensor {index} completed! ({samples} samples)");
            PipelineOutcome::Completed {
                samples,
                path: writer.path().to_path_buf(),
            }
        }
        Err(error) => {
            // keep whatever partial data made it out of the loop
            let _ = writer.flush();
            eprintln!("Sensor {index} aborted: {error}");
            PipelineOutcome::Aborted { error }
        }
    }
}

/// Poll for ready samples and append them until `target` records are
/// written.
///
/// The device produces samples faster than the bus drains them, so the
/// re-poll is immediate with no delay; only STATUS bit 0 triggers a read,
/// and every ready signal consumes exactly one full 6-byte block.
fn acquire<B: I2cBus>(
    sensor: &mut Ais2ih<B>,
    writer: &mut CsvWriter,
    target: usize,
) -> Result<usize> {
    let mut remaining = target;
    while remaining > 0 {
        if !sensor.data_ready()? {
            continue;
        }
        let sample = sensor.read_sample()?;
        writer.append(&sample)?;
        remaining -= 1;
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ais2ih::REG_CTRL1;
    use crate::bus::mock::MockBus;
    use std::fs;
    use std::path::Path;

    fn encode(x: i16, y: i16, z: i16) -> [u8; 6] {
        let [xl, xh] = (x << 2).to_le_bytes();
        let [yl, yh] = (y << 2).to_le_bytes();
        let [zl, zh] = (z << 2).to_le_bytes();
        [xl, xh, yl, yh, zl, zh]
    }

    fn test_config(dir: &Path, sensors: usize, samples: usize) -> AcquisitionConfig {
        AcquisitionConfig {
            sensor_count: sensors,
            samples_per_sensor: samples,
            output_dir: dir.to_path_buf(),
            verbose: false,
        }
    }

    fn completed(report: &PipelineReport) -> (usize, PathBuf) {
        match &report.outcome {
            PipelineOutcome::Completed { samples, path } => (*samples, path.clone()),
            other => panic!(
                "sensor {}: expected completion, got {other:?}",
                report.sensor_index
            ),
        }
    }

    #[test]
    fn sample_count_below_one_second_is_coerced_up() {
        let config = AcquisitionConfig::new(1, 800, PathBuf::from("out"), false);
        assert_eq!(config.samples_per_sensor, SAMPLE_RATE_HZ);

        let config = AcquisitionConfig::new(1, SAMPLE_RATE_HZ, PathBuf::from("out"), false);
        assert_eq!(config.samples_per_sensor, SAMPLE_RATE_HZ);

        let config = AcquisitionConfig::new(1, 16000, PathBuf::from("out"), false);
        assert_eq!(config.samples_per_sensor, 16000);
    }

    #[test]
    fn completed_pipeline_writes_exactly_the_target_record_count() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), 1, 25);

        let reports = collect_with(&config, |_| {
            let mut bus = MockBus::new();
            bus.default_block = encode(1, -2, 3);
            Ok(bus)
        });

        assert_eq!(reports.len(), 1);
        let (samples, path) = completed(&reports[0]);
        assert_eq!(samples, 25);

        let contents = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 25);
        for line in lines {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), 3);
            for field in fields {
                field.parse::<i16>().unwrap();
            }
        }
    }

    #[test]
    fn concurrent_pipelines_write_disjoint_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), 2, 10);

        let reports = collect_with(&config, |index| {
            let mut bus = MockBus::new();
            bus.default_block = if index == 0 {
                encode(1, 2, 3)
            } else {
                encode(-1, -2, -3)
            };
            Ok(bus)
        });

        assert_eq!(reports.len(), 2);
        let (_, path0) = completed(&reports[0]);
        let (_, path1) = completed(&reports[1]);
        assert_ne!(path0, path1);

        let contents0 = fs::read_to_string(&path0).unwrap();
        let contents1 = fs::read_to_string(&path1).unwrap();
        assert!(contents0.lines().all(|l| l == "1,2,3"));
        assert!(contents1.lines().all(|l| l == "-1,-2,-3"));
        assert_eq!(contents0.lines().count(), 10);
        assert_eq!(contents1.lines().count(), 10);
    }

    #[test]
    fn configuration_failure_aborts_only_that_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), 2, 10);

        let reports = collect_with(&config, |index| {
            let mut bus = MockBus::new();
            if index == 1 {
                bus.fail_write_to = Some(REG_CTRL1);
            }
            Ok(bus)
        });

        assert_eq!(reports.len(), 2);
        let (samples, _) = completed(&reports[0]);
        assert_eq!(samples, 10);
        assert!(matches!(
            reports[1].outcome,
            PipelineOutcome::Aborted {
                error: Ais2ihError::Configuration { register: "CTRL1", .. },
            }
        ));
    }

    #[test]
    fn unavailable_bus_skips_that_sensor_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), 4, 10);

        let reports = collect_with(&config, |index| {
            if index == 2 {
                return Err(Ais2ihError::BusUnavailable {
                    index,
                    reason: "no such device".into(),
                });
            }
            Ok(MockBus::new())
        });

        assert_eq!(reports.len(), 4);
        for report in &reports {
            match report.sensor_index {
                2 => assert!(matches!(
                    report.outcome,
                    PipelineOutcome::Skipped {
                        error: Ais2ihError::BusUnavailable { index: 2, .. },
                    }
                )),
                _ => {
                    let (samples, _) = completed(report);
                    assert_eq!(samples, 10);
                }
            }
        }
    }

    #[test]
    fn acquisition_reads_only_when_status_bit_zero_is_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut bus = MockBus::new();
        bus.status_script.extend([0x02, 0x00, 0xFE, 0x01]);
        bus.default_block = encode(5, 6, 7);
        let mut sensor = Ais2ih::new(bus);
        let mut writer = CsvWriter::create(dir.path(), "20240101_120000", 0).unwrap();

        let written = acquire(&mut sensor, &mut writer, 1).unwrap();
        writer.flush().unwrap();

        assert_eq!(written, 1);
        // three not-ready polls passed without touching the output block
        assert_eq!(sensor.release().block_reads, 1);
        let contents = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(contents, "5,6,7\n");
    }

    #[test]
    fn acquisition_failure_keeps_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), 1, 10);

        let reports = collect_with(&config, |_| {
            let mut bus = MockBus::new();
            bus.default_block = encode(1, 1, 1);
            bus.fail_block_reads_after = Some(3);
            Ok(bus)
        });

        assert!(matches!(
            reports[0].outcome,
            PipelineOutcome::Aborted {
                error: Ais2ihError::Transfer { .. },
            }
        ));

        // the partial file survives with the records written before the fault
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let path = entries[0].as_ref().unwrap().path();
        let contents = fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }
}
