pub mod race_result;
pub mod telemetry;
