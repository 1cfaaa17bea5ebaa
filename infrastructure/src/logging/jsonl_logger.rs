//! JSONL file writer for model invocation events.
//!
//! Each [`InvocationEvent`] becomes one JSON line carrying `type` and
//! `timestamp` next to the payload fields. The file is opened for append
//! so that successive server runs share one log.

use cofounder_application::ports::invocation_logger::{InvocationEvent, InvocationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on `Drop`.
pub struct JsonlInvocationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlInvocationLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened; callers fall back to no logging.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create invocation log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open invocation log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_record(event: InvocationEvent) -> Value {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let mut record = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".into(), other);
            map
        }
    };
    record.insert("type".into(), Value::String(event.event_type.to_string()));
    record.insert("timestamp".into(), Value::String(timestamp));
    Value::Object(record)
}

impl InvocationLogger for JsonlInvocationLogger {
    fn log(&self, event: InvocationEvent) {
        let Ok(line) = serde_json::to_string(&to_record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlInvocationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("invocations.jsonl");
        let logger = JsonlInvocationLogger::open(&path).unwrap();

        logger.log(InvocationEvent::new(
            "model_invocation",
            json!({ "role": "critic", "model": "gpt-4o", "outcome": "ok", "latency_ms": 12 }),
        ));
        logger.log(InvocationEvent::new(
            "model_invocation",
            json!({ "role": "synthesizer", "outcome": "service_error", "error": "Timeout" }),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line["type"], "model_invocation");
            assert!(line["timestamp"].is_string());
        }
        assert_eq!(lines[0]["role"], "critic");
        assert_eq!(lines[0]["latency_ms"], 12);
        assert_eq!(lines[1]["outcome"], "service_error");
    }

    #[test]
    fn test_appends_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invocations.jsonl");

        for role in ["critic", "evaluator"] {
            let logger = JsonlInvocationLogger::open(&path).unwrap();
            logger.log(InvocationEvent::new("model_invocation", json!({ "role": role })));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["role"], "evaluator");
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invocations.jsonl");
        let logger = JsonlInvocationLogger::open(&path).unwrap();
        logger.log(InvocationEvent::new("note", json!("just a string")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], "just a string");
    }
}
