use std::fmt;

/// The destination of a crash report.
///
/// Each call is one complete, independent line of text without a trailing
/// newline. Implementations must not panic or block on anything that might be
/// in the crashed state, as they are invoked from within the exception filter.
pub trait ReportSink: Send + Sync {
    fn line(&self, args: fmt::Arguments<'_>);
}

/// Forwards every report line to the [`log`] facade.
pub struct LogSink {
    level: log::Level,
}

impl LogSink {
    /// The target every report line is logged under
    pub const TARGET: &'static str = "crash_log";

    #[inline]
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(log::Level::Error)
    }
}

impl ReportSink for LogSink {
    fn line(&self, args: fmt::Arguments<'_>) {
        log::log!(target: Self::TARGET, self.level, "{args}");
    }
}

/// Collects report lines in memory, mostly useful for testing or for handing
/// the report to something other than a logger once it is complete.
#[derive(Default)]
pub struct MemorySink {
    lines: parking_lot::Mutex<Vec<String>>,
}

impl MemorySink {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all of the lines written so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

impl ReportSink for MemorySink {
    fn line(&self, args: fmt::Arguments<'_>) {
        self.lines.lock().push(args.to_string());
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &S {
    #[inline]
    fn line(&self, args: fmt::Arguments<'_>) {
        (**self).line(args);
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    #[inline]
    fn line(&self, args: fmt::Arguments<'_>) {
        (**self).line(args);
    }
}
