use log::info;
use std::time::{Duration, Instant};

/// Minimum time between two progress lines.
const REPORT_INTERVAL: Duration = Duration::from_millis(500);

/// Logs download progress of a single file.
pub struct ProgressTracker {
    name: String,
    current: u64,
    total: Option<u64>,
    started: Instant,
    last_report: Instant,
    completed: bool,
}

impl ProgressTracker {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            name: name.into(),
            current: 0,
            total: None,
            started: now,
            last_report: now,
            completed: false,
        }
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = Some(total);
    }

    pub fn update(&mut self, current: u64) {
        self.current = current;

        if self.last_report.elapsed() >= REPORT_INTERVAL {
            info!("{}", self.status_line());
            self.last_report = Instant::now();
        }
    }

    pub fn complete(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        info!(
            "{}: complete, {} in {:.1}s",
            self.name,
            format_bytes(self.current),
            self.started.elapsed().as_secs_f64()
        );
    }

    fn status_line(&self) -> String {
        match self.total {
            Some(total) if total > 0 => {
                let percentage = (self.current as f64 / total as f64 * 100.0).round() as u8;
                format!(
                    "{}: {}% ({}/{})",
                    self.name,
                    percentage,
                    format_bytes(self.current),
                    format_bytes(total)
                )
            }
            _ => format!("{}: {}", self.name, format_bytes(self.current)),
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
