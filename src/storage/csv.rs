//! CSV report: one header row and one data row per run.

use std::io::Write;

use crate::BenchResult;
use crate::core::ResultRecord;

/// CSV column headers in deterministic order.
pub const CSV_HEADERS: &[&str] = &[
    "backend",
    "curve",
    "algorithm",
    "nbConstraints",
    "nbInternal",
    "nbSecret",
    "nbPublic",
    "nbCoefficients",
    "ram(MiB)",
    "time(ms)",
    "throughput(constraints/s)",
    "throughputPerCore(constraints/s)",
    "nbPhysicalCores",
    "nbThreadsPerCore",
    "nbLogicalCores",
    "cacheLine",
    "l1d",
    "l1i",
    "l2",
    "l3",
    "freq",
    "adx",
    "cpu",
    "amd64_adx",
    "count",
    "proofSize(bytes)",
];

/// Writes a `ResultRecord` as CSV.
#[derive(Debug, Clone, Default)]
pub struct CsvReportWriter;

impl CsvReportWriter {
    pub fn new() -> Self {
        CsvReportWriter
    }

    /// Write the header and `record` to `writer`, then flush.
    ///
    /// # Errors
    /// Returns an error if CSV writing or flushing fails.
    pub fn write<W: Write>(&self, record: &ResultRecord, writer: W) -> BenchResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(CSV_HEADERS)?;
        csv_writer.write_record(Self::record_to_row(record))?;
        csv_writer.flush()?;
        Ok(())
    }

    /// Convert a ResultRecord to a row of CSV values.
    pub fn record_to_row(record: &ResultRecord) -> Vec<String> {
        let host = &record.host;
        vec![
            record.backend.clone(),
            record.curve.to_string(),
            record.algorithm.to_string(),
            record.constraints.to_string(),
            record.internal_variables.to_string(),
            record.secret_variables.to_string(),
            record.public_variables.to_string(),
            record.coefficients.to_string(),
            record.ram_mib.to_string(),
            record.elapsed_ms().to_string(),
            record.throughput.to_string(),
            record.throughput_per_core.to_string(),
            host.physical_cores.to_string(),
            host.threads_per_core.to_string(),
            host.logical_cores.to_string(),
            host.cache_line.to_string(),
            host.l1d.to_string(),
            host.l1i.to_string(),
            host.l2.to_string(),
            host.l3.to_string(),
            host.freq_mhz.to_string(),
            host.adx.to_string(),
            host.brand.clone(),
            record.amd64_adx.to_string(),
            record.count.to_string(),
            record.proof_size_bytes.to_string(),
        ]
    }
}
