use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::drain::drain_once;
use crate::format::{intern, ArgKind, FormatterHandle, IntoLogArg, LogArg};
use crate::level::{AtomicLevel, LogLevel};
use crate::queue::{thread_queue_for, ThreadQueueManager};

const DEFAULT_CAPACITY: usize = 1024;
const DEFAULT_SLOT_PAYLOAD: usize = 1024;
const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration surface for [`Logger`]. There is no CLI, no environment
/// variable, and no config file: every knob is set here.
pub struct LoggerBuilder {
    path: Option<PathBuf>,
    level: LogLevel,
    capacity: usize,
    slot_payload: usize,
    drain_interval: Duration,
    background_drain: bool,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            path: None,
            level: LogLevel::Info,
            capacity: DEFAULT_CAPACITY,
            slot_payload: DEFAULT_SLOT_PAYLOAD,
            drain_interval: DEFAULT_DRAIN_INTERVAL,
            background_drain: true,
        }
    }
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The append-only sink file. Required.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Initial threshold; messages below this level are never enqueued.
    /// Defaults to `INFO`.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Per-thread ring buffer slot count. Must be a power of two; the buffer
    /// holds `capacity - 1` outstanding messages. Defaults to 1024.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Payload bytes per slot, capping encoded argument size. Defaults to
    /// 1024.
    pub fn with_slot_size(mut self, slot_payload: usize) -> Self {
        self.slot_payload = slot_payload;
        self
    }

    /// Pacing between drain passes in background mode. Defaults to 100ms.
    pub fn with_drain_interval(mut self, interval: Duration) -> Self {
        self.drain_interval = interval;
        self
    }

    /// When `false`, no background drain thread is spawned; the host must
    /// call [`Logger::drain_once`] itself. Defaults to `true`.
    pub fn with_background_drain(mut self, background_drain: bool) -> Self {
        self.background_drain = background_drain;
        self
    }

    /// Opens the sink in append/create mode and, unless
    /// `with_background_drain(false)` was set, spawns the background drain
    /// thread.
    pub fn build(self) -> io::Result<Logger> {
        let path = self.path.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "LoggerBuilder: missing sink path")
        })?;
        if self.capacity == 0 || !self.capacity.is_power_of_two() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("LoggerBuilder: capacity must be a power of two, got {}", self.capacity),
            ));
        }

        let manager = Arc::new(ThreadQueueManager::new());
        let keep_running = Arc::new(AtomicBool::new(true));

        let (drain_thread, sync_sink) = if self.background_drain {
            let sink = open_sink(&path)?;
            let handle = spawn_drain_thread(
                Arc::clone(&manager),
                sink,
                self.drain_interval,
                Arc::clone(&keep_running),
            )?;
            (Some(handle), None)
        } else {
            (None, Some(open_sink(&path)?))
        };

        Ok(Logger {
            manager,
            level: AtomicLevel::new(self.level),
            capacity: self.capacity,
            slot_payload: self.slot_payload,
            keep_running,
            drain_thread,
            sync_sink,
        })
    }
}

fn open_sink(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn spawn_drain_thread(
    manager: Arc<ThreadQueueManager>,
    mut sink: File,
    interval: Duration,
    keep_running: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>> {
    Ok(thread::Builder::new()
        .name("fluxlog-drain".to_string())
        .spawn(move || {
            while keep_running.load(Ordering::Acquire) {
                drain_once(&manager, &mut sink);
                thread::sleep(interval);
            }
            // Final pass after shutdown is observed, so a message enqueued
            // just before `stop()` still has a chance to reach the sink.
            drain_once(&manager, &mut sink);
        })
        .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("failed to spawn drain thread: {err}")))?)
}

/// The logging facade: owns one output sink and a [`ThreadQueueManager`],
/// and holds the current [`LogLevel`] threshold.
///
/// Construct via [`LoggerBuilder`]. Multiple `Logger`s may coexist; each has
/// its own manager, so a given producer thread's `ThreadQueue` belongs to
/// exactly one `Logger`.
pub struct Logger {
    manager: Arc<ThreadQueueManager>,
    level: AtomicLevel,
    capacity: usize,
    slot_payload: usize,
    keep_running: Arc<AtomicBool>,
    drain_thread: Option<JoinHandle<()>>,
    /// Present only in synchronous mode (`with_background_drain(false)`),
    /// where the caller drives `drain_once` itself.
    sync_sink: Option<File>,
}

impl Logger {
    /// A stable per-`Logger` identifier, used to key a producer thread's
    /// per-`Logger` queue map.
    fn id(&self) -> usize {
        Arc::as_ptr(&self.manager) as usize
    }

    /// Updates the threshold. Ordering with a concurrent `log` call is
    /// best-effort; filtering is advisory.
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level);
    }

    pub fn level(&self) -> LogLevel {
        self.level.load()
    }

    /// Logs one message if `level >= threshold`, otherwise does nothing.
    ///
    /// `call_site` identifies the enclosing function (conventionally
    /// `concat!(module_path!(), "::", line!())` via the logging macros);
    /// `template` is the user's `{}`-templated format string; `args` are the
    /// values to splice in, in order.
    ///
    /// A payload that would overflow the slot's fixed capacity is a
    /// programmer error: the message is dropped and a one-shot diagnostic is
    /// emitted through the `log` crate rather than panicking or blocking.
    pub fn log(&self, call_site: &str, level: LogLevel, template: &str, args: &[LogArg]) {
        if level < self.level() {
            return;
        }

        let arg_kinds: Vec<ArgKind> = args.iter().map(LogArg::kind).collect();
        let formatter: FormatterHandle = intern(call_site, template, &arg_kinds);

        let queue = thread_queue_for(self.id(), &self.manager, self.capacity, self.slot_payload);
        let published = queue.enqueue(level, formatter, |buf| formatter.encode(args, buf));
        if !published {
            let capacity = queue.slot_payload_capacity();
            log::warn!(
                "fluxlog: dropped message at {call_site} — encoded arguments exceed the {capacity}-byte slot payload"
            );
        }
    }

    /// Executes one drain pass immediately, on the calling thread. Intended
    /// for synchronous-mode loggers built with
    /// `with_background_drain(false)`; calling it on a background-mode
    /// logger is harmless but redundant, since the drain thread already
    /// does this on its own schedule.
    pub fn drain_once(&mut self) {
        if let Some(sink) = self.sync_sink.as_mut() {
            drain_once(&self.manager, sink);
        }
    }

    /// Stops the background drain thread (if any), performing one final
    /// drain pass, and flushes the sink. Called automatically on `Drop`.
    pub fn stop(&mut self) {
        self.keep_running.store(false, Ordering::Release);
        if let Some(handle) = self.drain_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Convenience helpers mirroring [`IntoLogArg`] so macros can build an
/// argument slice from mixed native types without the caller constructing
/// [`LogArg`] values by hand.
pub fn to_log_arg<'a>(value: impl IntoLogArg<'a>) -> LogArg<'a> {
    value.into_log_arg()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("fluxlog-logger-test-{name}-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    fn contents(path: &Path) -> String {
        let mut s = String::new();
        File::open(path).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn missing_path_is_rejected() {
        let err = LoggerBuilder::new().build().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn non_power_of_two_capacity_is_rejected() {
        let path = temp_path("bad-capacity");
        let err = LoggerBuilder::new()
            .with_path(&path)
            .with_capacity(100)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn synchronous_mode_drains_only_when_asked() {
        let path = temp_path("sync-mode");
        let mut logger = LoggerBuilder::new()
            .with_path(&path)
            .with_background_drain(false)
            .build()
            .unwrap();

        logger.log("logger::tests", LogLevel::Info, "hello {}", &[LogArg::I64(1)]);
        assert_eq!(contents(&path), "", "no background thread should have drained yet");

        logger.drain_once();
        assert!(contents(&path).ends_with("logger::tests:hello 1\n"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn log_below_threshold_is_a_no_op() {
        let path = temp_path("below-threshold");
        let mut logger = LoggerBuilder::new()
            .with_path(&path)
            .with_level(LogLevel::Error)
            .with_background_drain(false)
            .build()
            .unwrap();

        logger.log("logger::tests", LogLevel::Debug, "invisible", &[]);
        logger.drain_once();
        assert_eq!(contents(&path), "");

        let _ = std::fs::remove_file(&path);
    }
}
