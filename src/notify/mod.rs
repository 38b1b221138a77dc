//! User-facing notifications.
//!
//! Everything the user is meant to see (resolver fallback misses, download
//! progress, completion and error messages) goes through the [`Notifier`]
//! trait so commands stay testable without a terminal attached.

use log::{error, info};
use std::io::Write;

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);

    /// Download progress tick: percentage (0-100, or None when the total
    /// size is unknown) and current throughput in bytes per second.
    fn progress(&self, percent: Option<u8>, bytes_per_sec: f64);
}

/// Notifier that writes to stderr and mirrors messages to the log.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        info!("{}", message);
        eprintln!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
        eprintln!("error: {}", message);
    }

    fn progress(&self, percent: Option<u8>, bytes_per_sec: f64) {
        let mut stderr = std::io::stderr();
        let throughput = format_throughput(bytes_per_sec);
        match percent {
            Some(pct) => {
                let _ = write!(stderr, "\rDownloading... {:>3}% ({})", pct, throughput);
            }
            None => {
                let _ = write!(stderr, "\rDownloading... ({})", throughput);
            }
        }
        let _ = stderr.flush();
    }
}

fn format_throughput(bytes_per_sec: f64) -> String {
    if bytes_per_sec >= 1024.0 * 1024.0 {
        format!("{:.2} MB/s", bytes_per_sec / (1024.0 * 1024.0))
    } else if bytes_per_sec >= 1024.0 {
        format!("{:.1} KB/s", bytes_per_sec / 1024.0)
    } else {
        format!("{:.0} B/s", bytes_per_sec)
    }
}
