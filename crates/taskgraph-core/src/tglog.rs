//! Environment-configured debug output, in the house style of a
//! dependency-free `printk`-alike rather than the `log`/`tracing`
//! ecosystem: this crate runs inside a caller's process and should stay
//! silent unless the caller explicitly asks for diagnostics.
//!
//! Automatically includes worker id, task id, and an optional timestamp.
//!
//! # Environment Variables
//!
//! - `TASKGRAPH_FLUSH_EPRINT=1` - flush stderr after each print
//! - `TASKGRAPH_LOG_LEVEL=<level>` - off/error/warn/info/debug/trace or 0-5
//! - `TASKGRAPH_KPRINT_TIME=1` - include a nanosecond timestamp
//!
//! # Output Format
//!
//! Without timestamp: `[LEVEL] [w<worker>:t<task>] message`
//! With timestamp:    `[LEVEL] [<ns>] [w<worker>:t<task>] message`
//!
//! Examples:
//! - `[DEBUG] [w0:t5] dispatching task`
//! - `[INFO]  [w2:t--] worker idle`
//!
//! # Usage
//!
//! ```ignore
//! use taskgraph_core::{taskgraph_debug, taskgraph_info, taskgraph_warn, taskgraph_error};
//!
//! taskgraph_debug!("dispatching task {}", task_id);
//! taskgraph_info!("pass complete");
//! ```

use crate::env::env_get_bool;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Instant;

/// Log levels, ordered least to most verbose.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }
}

static FLUSH_ENABLED: AtomicBool = AtomicBool::new(false);
static TIME_ENABLED: AtomicBool = AtomicBool::new(false);
// Off by default: a library should not write to its caller's stderr
// unless asked to.
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Off as u8);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Read configuration from the environment. Called automatically on
/// first log, but can be called explicitly for deterministic setup.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    START_TIME.get_or_init(Instant::now);

    FLUSH_ENABLED.store(env_get_bool("TASKGRAPH_FLUSH_EPRINT", false), Ordering::Relaxed);
    TIME_ENABLED.store(env_get_bool("TASKGRAPH_KPRINT_TIME", false), Ordering::Relaxed);

    if let Ok(val) = std::env::var("TASKGRAPH_LOG_LEVEL") {
        let level = match val.to_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "1" => LogLevel::Error,
            "warn" | "2" => LogLevel::Warn,
            "info" | "3" => LogLevel::Info,
            "debug" | "4" => LogLevel::Debug,
            "trace" | "5" => LogLevel::Trace,
            _ => LogLevel::Off,
        };
        LOG_LEVEL.store(level as u8, Ordering::Relaxed);
    }
}

#[inline]
pub fn flush_enabled() -> bool {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    FLUSH_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn time_enabled() -> bool {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    TIME_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn log_level() -> LogLevel {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn set_flush_enabled(enabled: bool) {
    FLUSH_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn set_time_enabled(enabled: bool) {
    TIME_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level as u8 <= log_level() as u8
}

#[inline]
pub fn elapsed_ns() -> u64 {
    let start = START_TIME.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}

thread_local! {
    static WORKER_ID: std::cell::Cell<Option<u32>> = const { std::cell::Cell::new(None) };
    static TASK_ID: std::cell::Cell<Option<u64>> = const { std::cell::Cell::new(None) };
}

/// Set the current worker id for this thread. Called by the pool when
/// a worker thread starts.
pub fn set_worker_id(id: u32) {
    WORKER_ID.with(|w| w.set(Some(id)));
}

pub fn clear_worker_id() {
    WORKER_ID.with(|w| w.set(None));
}

/// Set the task id currently executing on this thread. Called by the
/// executor immediately before invoking a task's work, cleared
/// immediately after.
pub fn set_task_id(id: u64) {
    TASK_ID.with(|t| t.set(Some(id)));
}

pub fn clear_task_id() {
    TASK_ID.with(|t| t.set(None));
}

#[inline]
pub fn get_worker_id() -> Option<u32> {
    WORKER_ID.with(|w| w.get())
}

#[inline]
pub fn get_task_id() -> Option<u64> {
    TASK_ID.with(|t| t.get())
}

fn format_context() -> String {
    let worker = match get_worker_id() {
        Some(id) => format!("w{}", id),
        None => "w--".to_string(),
    };
    let task = match get_task_id() {
        Some(id) => format!("t{}", id),
        None => "t--".to_string(),
    };
    format!("[{}:{}]", worker, task)
}

#[doc(hidden)]
pub fn _klog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }

    let stderr = std::io::stderr();
    let mut handle = stderr.lock();

    let _ = write!(handle, "{} ", level.prefix());

    if time_enabled() {
        let _ = write!(handle, "[{}] ", elapsed_ns());
    }

    let _ = write!(handle, "{} ", format_context());

    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");

    if flush_enabled() {
        let _ = handle.flush();
    }
}

/// Error level log with context.
#[macro_export]
macro_rules! taskgraph_error {
    ($($arg:tt)*) => {{
        $crate::tglog::_klog_impl($crate::tglog::LogLevel::Error, format_args!($($arg)*));
    }};
}

/// Warning level log with context.
#[macro_export]
macro_rules! taskgraph_warn {
    ($($arg:tt)*) => {{
        $crate::tglog::_klog_impl($crate::tglog::LogLevel::Warn, format_args!($($arg)*));
    }};
}

/// Info level log with context.
#[macro_export]
macro_rules! taskgraph_info {
    ($($arg:tt)*) => {{
        $crate::tglog::_klog_impl($crate::tglog::LogLevel::Info, format_args!($($arg)*));
    }};
}

/// Debug level log with context.
#[macro_export]
macro_rules! taskgraph_debug {
    ($($arg:tt)*) => {{
        $crate::tglog::_klog_impl($crate::tglog::LogLevel::Debug, format_args!($($arg)*));
    }};
}

/// Trace level log with context.
#[macro_export]
macro_rules! taskgraph_trace {
    ($($arg:tt)*) => {{
        $crate::tglog::_klog_impl($crate::tglog::LogLevel::Trace, format_args!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_order() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn level_from_u8() {
        assert_eq!(LogLevel::from_u8(0), LogLevel::Off);
        assert_eq!(LogLevel::from_u8(1), LogLevel::Error);
        assert_eq!(LogLevel::from_u8(4), LogLevel::Debug);
        assert_eq!(LogLevel::from_u8(99), LogLevel::Trace);
    }

    #[test]
    fn worker_and_task_context_round_trip() {
        assert_eq!(get_worker_id(), None);
        assert_eq!(get_task_id(), None);

        set_worker_id(5);
        assert_eq!(get_worker_id(), Some(5));

        set_task_id(42);
        assert_eq!(get_task_id(), Some(42));

        clear_worker_id();
        clear_task_id();
        assert_eq!(get_worker_id(), None);
        assert_eq!(get_task_id(), None);
    }

    #[test]
    fn elapsed_ns_advances() {
        let t1 = elapsed_ns();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let t2 = elapsed_ns();
        assert!(t2 > t1);
    }

    #[test]
    fn macros_compile_and_stay_silent_by_default() {
        set_log_level(LogLevel::Off);
        taskgraph_error!("error {}", "msg");
        taskgraph_warn!("warn");
        taskgraph_info!("info");
        taskgraph_debug!("debug");
        taskgraph_trace!("trace");
    }
}
