//! A low-latency asynchronous logging core.
//!
//! Producers never touch the sink directly: each thread gets its own
//! single-producer/single-consumer ring buffer ([`ring`]) on first use, log
//! calls encode their arguments into a fixed-size slot through a
//! process-wide [`format`] registry, and a background thread ([`drain`])
//! periodically walks every registered queue ([`queue`]), rendering and
//! appending lines to an append-only file sink.
//!
//! The public entry point is [`Logger`], built with [`LoggerBuilder`].

mod drain;
mod format;
mod level;
mod logger;
mod queue;
mod ring;

pub use format::{ArgKind, IntoLogArg, LogArg};
pub use level::LogLevel;
pub use logger::{Logger, LoggerBuilder};

#[doc(hidden)]
pub use logger::to_log_arg as __to_log_arg;

/// Builds a `&[LogArg]` from a call site, forwarding to `Logger::log`. Not
/// meant to be called directly; see [`flux_debug!`], [`flux_info!`],
/// [`flux_error!`], [`flux_fatal!`].
#[macro_export]
macro_rules! flux_log {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        let call_site = concat!(module_path!(), ":", line!());
        let args: &[$crate::LogArg] = &[$($crate::__to_log_arg($arg)),*];
        $logger.log(call_site, $level, $template, args);
    }};
}

/// Logs a `DEBUG`-level message through `$logger`.
#[macro_export]
macro_rules! flux_debug {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::flux_log!($logger, $crate::LogLevel::Debug, $template $(, $arg)*)
    };
}

/// Logs an `INFO`-level message through `$logger`.
#[macro_export]
macro_rules! flux_info {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::flux_log!($logger, $crate::LogLevel::Info, $template $(, $arg)*)
    };
}

/// Logs an `ERROR`-level message through `$logger`.
#[macro_export]
macro_rules! flux_error {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::flux_log!($logger, $crate::LogLevel::Error, $template $(, $arg)*)
    };
}

/// Logs a `FATAL`-level message through `$logger`.
#[macro_export]
macro_rules! flux_fatal {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::flux_log!($logger, $crate::LogLevel::Fatal, $template $(, $arg)*)
    };
}
