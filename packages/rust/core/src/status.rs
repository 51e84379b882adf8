//! Process-wide request counter and uptime telemetry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Counts inbound requests and remembers when the process started.
///
/// Created once at startup and shared (behind an `Arc`) with every request
/// handler. The counter is never reset.
#[derive(Debug)]
pub struct StatusReporter {
    requests: AtomicU64,
    started: Instant,
    version: String,
}

/// A point-in-time view of the reporter, as served on `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: String,
    pub uptime: String,
    pub version: String,
    pub requests: u64,
    /// RFC 3339 timestamp of the snapshot.
    pub time: String,
}

impl StatusReporter {
    /// Start the clock now. `version` is reported verbatim.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            requests: AtomicU64::new(0),
            started: Instant::now(),
            version: version.into(),
        }
    }

    /// Record one inbound request.
    pub fn increment(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests recorded so far.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> StatusReport {
        StatusReport {
            status: "running".into(),
            uptime: format_uptime(self.uptime()),
            version: self.version.clone(),
            requests: self.requests(),
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Render whole seconds as `1h2m3s`, dropping leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::ZERO), "0s");
        assert_eq!(format_uptime(Duration::from_millis(45_900)), "45s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m5s");
        assert_eq!(format_uptime(Duration::from_secs(3603)), "1h0m3s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "25h1m1s");
    }

    #[test]
    fn snapshot_reports_running_state() {
        let reporter = StatusReporter::new("v0.1.0");
        reporter.increment();
        reporter.increment();

        let report = reporter.snapshot();
        assert_eq!(report.status, "running");
        assert_eq!(report.version, "v0.1.0");
        assert_eq!(report.requests, 2);
        assert!(chrono::DateTime::parse_from_rfc3339(&report.time).is_ok());
        assert!(report.uptime.ends_with('s'));
    }

    #[test]
    fn snapshot_serializes_expected_keys() {
        let json = serde_json::to_value(StatusReporter::new("v0.1.0").snapshot()).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["requests", "status", "time", "uptime", "version"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let reporter = Arc::new(StatusReporter::new("v0.1.0"));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let reporter = reporter.clone();
                tokio::spawn(async move {
                    for _ in 0..250 {
                        reporter.increment();
                        let _ = reporter.snapshot();
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(reporter.requests(), 4000);
    }
}
