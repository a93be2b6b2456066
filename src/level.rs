use std::sync::atomic::{AtomicU8, Ordering};

/// Severity of a log message, ordered `DEBUG < INFO < ERROR < FATAL`.
///
/// Producers only enqueue a message if its level is `>=` the logger's
/// current threshold.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Error = 2,
    Fatal = 3,
}

impl LogLevel {
    /// Readable name used both in the rendered output line and by `from_name`.
    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Maps a level name to a `LogLevel`. Unknown names conservatively map to
    /// `FATAL` so that a typo never silently filters a message out.
    pub fn from_name(name: &str) -> LogLevel {
        match name {
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "ERROR" => LogLevel::Error,
            _ => LogLevel::Fatal,
        }
    }

    fn from_u8(value: u8) -> LogLevel {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Error,
            _ => LogLevel::Fatal,
        }
    }
}

/// An atomically-updatable `LogLevel`, used as the logger's threshold.
///
/// Ordering with a concurrent `log` call is best-effort: filtering is
/// advisory, not a linearization point.
pub(crate) struct AtomicLevel {
    bits: AtomicU8,
}

impl AtomicLevel {
    pub(crate) fn new(level: LogLevel) -> Self {
        Self {
            bits: AtomicU8::new(level as u8),
        }
    }

    pub(crate) fn load(&self) -> LogLevel {
        LogLevel::from_u8(self.bits.load(Ordering::Relaxed))
    }

    pub(crate) fn store(&self, level: LogLevel) {
        self.bits.store(level as u8, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn name_round_trip() {
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Error, LogLevel::Fatal] {
            assert_eq!(LogLevel::from_name(level.name()), level);
        }
    }

    #[test]
    fn unknown_name_maps_to_fatal() {
        assert_eq!(LogLevel::from_name("WHATEVER"), LogLevel::Fatal);
    }

    #[test]
    fn atomic_level_store_load() {
        let level = AtomicLevel::new(LogLevel::Info);
        assert_eq!(level.load(), LogLevel::Info);
        level.store(LogLevel::Debug);
        assert_eq!(level.load(), LogLevel::Debug);
    }
}
