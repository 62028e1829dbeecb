//! Loading of the function trace.
//!
//! The trace is a CSV file with one row per function. Two columns are used: `AvgServiceTimeMillisec`, the average
//! execution time in milliseconds, and `Invocations30Days`, the number of invocations over a 30-day window.
//! Other columns are ignored.
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;

use crate::error::LoadError;
use crate::function::{FunctionSpec, FunctionTable};

/// Length of the window the invocation counts are collected over, in seconds.
pub const TRACE_WINDOW: f64 = 30. * 24. * 60. * 60.;

#[derive(Debug, Deserialize)]
struct TraceRecord {
    #[serde(rename = "AvgServiceTimeMillisec")]
    avg_service_time_ms: f64,
    #[serde(rename = "Invocations30Days")]
    invocations: f64,
}

impl From<TraceRecord> for FunctionSpec {
    fn from(record: TraceRecord) -> Self {
        FunctionSpec::new(record.avg_service_time_ms / 1000., record.invocations / TRACE_WINDOW)
    }
}

/// Reads the trace from any reader, function ids follow row order.
pub fn read_trace<R: Read>(reader: R) -> Result<FunctionTable, LoadError> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut specs = Vec::new();
    for record in reader.deserialize() {
        let record: TraceRecord = record?;
        specs.push(FunctionSpec::from(record));
    }
    if specs.is_empty() {
        return Err(LoadError::EmptyTrace);
    }
    Ok(FunctionTable::new(specs)?)
}

pub fn load_trace(path: &Path) -> Result<FunctionTable, LoadError> {
    let file = std::fs::File::open(path)?;
    read_trace(file)
}
