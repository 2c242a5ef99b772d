use crate::core::race::Race;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// TelemetryRecord is one row of the per-frame trace.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub t: f64,
    pub x: f64,
    pub z: f64,
    pub heading: f64,
    pub speed: f64,
    pub boost: f64,
    pub lap: u32,
    pub last_checkpoint: Option<usize>,
}

impl TelemetryRecord {
    pub fn from_race(race: &Race) -> TelemetryRecord {
        TelemetryRecord {
            t: race.cur_racetime,
            x: race.vehicle.position.x,
            z: race.vehicle.position.z,
            heading: race.vehicle.heading,
            speed: race.vehicle.speed,
            boost: race.vehicle.boost_charge,
            lap: race.get_display_lap(),
            last_checkpoint: race.checkpoints.last_checkpoint(),
        }
    }
}

/// TelemetryWriter writes telemetry records as CSV.
pub struct TelemetryWriter<W: Write> {
    csv_writer: csv::Writer<W>,
}

impl TelemetryWriter<File> {
    pub fn create(path: &Path) -> anyhow::Result<TelemetryWriter<File>> {
        let csv_writer = csv::Writer::from_path(path).context(format!(
            "Failed to create telemetry file {}!",
            path.display()
        ))?;
        Ok(TelemetryWriter { csv_writer })
    }
}

impl<W: Write> TelemetryWriter<W> {
    pub fn from_writer(writer: W) -> TelemetryWriter<W> {
        TelemetryWriter {
            csv_writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn write(&mut self, record: &TelemetryRecord) -> anyhow::Result<()> {
        self.csv_writer
            .serialize(record)
            .context("Failed to write telemetry record!")
    }

    pub fn into_inner(self) -> anyhow::Result<W> {
        self.csv_writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("Failed to flush telemetry: {}", err.error()))
    }
}
