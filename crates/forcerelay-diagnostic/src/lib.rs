//! Append-only, rate-limited trace sink.
//!
//! The sink exists for field diagnosis of host/proxy interaction: one line
//! per event, prefixed with milliseconds since sink creation and the owning
//! process identity. It is best-effort end to end; a sink that cannot open
//! its file drops lines without telling anyone, because a diagnostic path
//! must never change what the host observes.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Environment variable gating the sink (`0`/`n`/`f` prefixes disable it).
pub const ENV_LOG: &str = "FFB_LOG";

/// Environment variable setting the minimum interval between lines, in
/// milliseconds.
pub const ENV_LOG_EVERY_MS: &str = "FFB_LOG_EVERY_MS";

/// The fixed trace file location.
pub fn default_trace_path() -> PathBuf {
    std::env::temp_dir().join("forcerelay-trace.log")
}

/// Sink configuration, read once per process.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Whether any line is ever written.
    pub enabled: bool,
    /// Minimum interval between written lines; lines arriving inside the
    /// window are dropped, not queued.
    pub min_interval: Option<Duration>,
    /// Append target.
    pub path: PathBuf,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval: None,
            path: default_trace_path(),
        }
    }
}

impl TraceConfig {
    /// Read `FFB_LOG` and `FFB_LOG_EVERY_MS`. Logging is on unless the host
    /// explicitly opts out; an interval of zero means no rate limit.
    pub fn from_env() -> Self {
        let enabled = !std::env::var(ENV_LOG)
            .map(|v| matches!(v.as_bytes().first(), Some(b'0' | b'n' | b'N' | b'f' | b'F')))
            .unwrap_or(false);
        let min_interval = std::env::var(ENV_LOG_EVERY_MS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);
        Self {
            enabled,
            min_interval,
            ..Self::default()
        }
    }

    /// A configuration that writes nothing, for embedding in tests.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Redirect the sink to an explicit path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the minimum interval between lines.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }
}

/// The trace sink. Writes and the rate-limit timestamp share one mutex.
pub struct TraceSink {
    config: TraceConfig,
    start: Instant,
    pid: u32,
    image: String,
    last_write: Mutex<Option<Duration>>,
}

impl TraceSink {
    /// Create a sink with an explicit configuration.
    pub fn new(config: TraceConfig) -> Self {
        let image = std::env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self {
            config,
            start: Instant::now(),
            pid: std::process::id(),
            image,
            last_write: Mutex::new(None),
        }
    }

    /// Create a sink configured from the environment.
    pub fn from_env() -> Self {
        Self::new(TraceConfig::from_env())
    }

    /// A sink that writes nothing.
    pub fn disabled() -> Self {
        Self::new(TraceConfig::disabled())
    }

    /// Whether this sink can ever write.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Append one line, best-effort.
    pub fn log(&self, message: &str) {
        if !self.config.enabled {
            return;
        }
        tracing::trace!(target: "forcerelay", "{message}");
        let Ok(mut last_write) = self.last_write.lock() else {
            return;
        };
        let elapsed = self.start.elapsed();
        if let (Some(interval), Some(last)) = (self.config.min_interval, *last_write) {
            if elapsed.saturating_sub(last) < interval {
                return;
            }
        }
        let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.path)
        else {
            return;
        };
        *last_write = Some(elapsed);
        let _ = writeln!(
            file,
            "[{} ms][{}:{}] {}",
            elapsed.as_millis(),
            self.pid,
            self.image,
            message
        );
    }

    /// Append one formatted line. Formatting is skipped entirely when the
    /// sink is disabled, so hot paths can trace without paying for it.
    pub fn log_fmt(&self, args: fmt::Arguments<'_>) {
        if !self.config.enabled {
            return;
        }
        self.log(&args.to_string());
    }
}
