use std::fs;
use std::path::{Path, PathBuf};

use evtail_types::LogEntry;

use crate::{LogStore, StoreError, is_local_machine};

/// Event log exported as JSON lines
///
/// The local machine's logs live at `<root>/<log>.jsonl`, a remote
/// machine's at `<root>/<machine>/<log>.jsonl`. One serialized
/// [`LogEntry`] per line. The file is re-read on every query, so entries
/// appended by the writer between queries are picked up.
#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    log: String,
    machine: String,
    path: PathBuf,

    /// Host recorded for entries that do not carry one
    default_host: String,
}

impl JsonLinesStore {
    /// Open a log, failing if it does not exist
    pub fn open(root: &Path, log: &str, machine: &str) -> Result<Self, StoreError> {
        if log.is_empty() || log.contains(['/', '\\']) || log.starts_with('.') {
            return Err(StoreError::unavailable(log, machine, "invalid log name"));
        }
        if machine.contains(['/', '\\']) || machine == ".." {
            return Err(StoreError::unavailable(log, machine, "invalid machine name"));
        }

        let (path, default_host) = if is_local_machine(machine) {
            (root.join(format!("{log}.jsonl")), local_host_name())
        } else {
            (
                root.join(machine).join(format!("{log}.jsonl")),
                machine.to_string(),
            )
        };

        let metadata = fs::metadata(&path).map_err(|e| StoreError::from_io(log, machine, e))?;
        if !metadata.is_file() {
            return Err(StoreError::unavailable(log, machine, "not a log file"));
        }

        tracing::debug!(path = %path.display(), "opened log store");

        Ok(Self {
            log: log.to_string(),
            machine: machine.to_string(),
            path,
            default_host,
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_line(&self, line_number: u64, line: &str) -> Option<LogEntry> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        match serde_json::from_str::<LogEntry>(trimmed) {
            Ok(mut entry) => {
                entry.record_id = line_number;
                if entry.host.is_empty() {
                    entry.host = self.default_host.clone();
                }
                Some(entry)
            }
            Err(e) => {
                tracing::warn!(
                    log = %self.log,
                    line = line_number + 1,
                    error = %e,
                    "skipping malformed log record"
                );
                None
            }
        }
    }
}

impl LogStore for JsonLinesStore {
    fn entries(&self) -> Result<Vec<LogEntry>, StoreError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::from_io(&self.log, &self.machine, e))?;

        Ok(content
            .lines()
            .enumerate()
            .filter_map(|(i, line)| self.parse_line(i as u64, line))
            .collect())
    }
}

/// Best-effort name of this host
fn local_host_name() -> String {
    ["COMPUTERNAME", "HOSTNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtail_types::Severity;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_log_is_unavailable() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let err = JsonLinesStore::open(root, "Application", ".").unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[test]
    fn test_rejects_path_like_log_names() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let err = JsonLinesStore::open(root, "../etc/passwd", ".").unwrap_err();
        assert!(err.to_string().contains("invalid log name"));
    }

    #[test]
    fn test_reads_local_log_and_skips_malformed_lines() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("Application.jsonl"),
            concat!(
                r#"{"timestamp":"2024-01-15T10:30:00Z","source":"A","severity":"Error","host":"web1","message":"boom"}"#,
                "\n",
                "not json\n",
                "\n",
                r#"{"timestamp":"2024-01-15T10:30:01Z","source":"B","severity":"Warning"}"#,
                "\n",
            ),
        )
        .unwrap();

        let store = JsonLinesStore::open(root, "Application", ".").unwrap();
        let entries = store.entries().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].host, "web1");
        assert_eq!(entries[0].message, "boom");
        assert_eq!(entries[0].record_id, 0);
        assert_eq!(entries[1].severity, Severity::Warning);
        assert_eq!(entries[1].record_id, 3);
        assert!(!entries[1].host.is_empty());
    }

    #[test]
    fn test_remote_machine_layout_defaults_host() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("db01")).unwrap();
        fs::write(
            root.join("db01").join("System.jsonl"),
            r#"{"timestamp":"2024-01-15T10:30:00Z","source":"Kernel","severity":"Information"}"#,
        )
        .unwrap();

        let store = JsonLinesStore::open(root, "System", "db01").unwrap();
        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host, "db01");
    }

    #[test]
    fn test_log_removed_after_open_is_unavailable() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let path = root.join("Application.jsonl");
        fs::write(&path, "").unwrap();

        let store = JsonLinesStore::open(root, "Application", ".").unwrap();
        assert!(store.entries().unwrap().is_empty());

        fs::remove_file(&path).unwrap();
        assert!(matches!(
            store.entries().unwrap_err(),
            StoreError::Unavailable { .. }
        ));
    }
}
