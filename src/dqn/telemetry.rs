//! Scalar telemetry emission.
//!
//! The trainer reports named scalar samples (reward, rounds, loss, epsilon,
//! Q-values) tagged by total decision step. Sinks are pluggable: the JSON
//! lines sink appends one record per sample for offline plotting, and the
//! null sink discards everything.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Receiver for named scalar samples.
pub trait TelemetrySink {
    /// Record one sample tagged by total decision step.
    fn record(&mut self, step: u64, tag: &str, value: f64);

    /// Push buffered samples to their destination.
    fn flush(&mut self) {}
}

/// Discards every sample.
#[derive(Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&mut self, _step: u64, _tag: &str, _value: f64) {}
}

/// Appends samples to a JSON-lines file, one record per line.
pub struct JsonlSink {
    out: BufWriter<File>,
}

impl JsonlSink {
    /// Create or truncate the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self { out: BufWriter::new(File::create(path)?) })
    }
}

impl TelemetrySink for JsonlSink {
    fn record(&mut self, step: u64, tag: &str, value: f64) {
        let line = serde_json::json!({ "step": step, "tag": tag, "value": value });
        if let Err(e) = writeln!(self.out, "{}", line) {
            log::warn!("telemetry write failed: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            log::warn!("telemetry flush failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonl_sink_writes_records() {
        let dir = std::env::temp_dir().join("poker-dqn-test-telemetry");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("samples.jsonl");

        {
            let mut sink = JsonlSink::create(&path).unwrap();
            sink.record(50, "loss/error", 0.25);
            sink.record(100, "perf/epsilon", 0.9);
            sink.flush();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["step"], 50);
        assert_eq!(first["tag"], "loss/error");
        assert_eq!(first["value"], 0.25);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_null_sink_accepts_anything() {
        let mut sink = NullSink;
        sink.record(1, "anything", f64::NAN);
        sink.flush();
    }
}
