//! Writes a human readable report when the process crashes.
//!
//! On 32-bit Windows, [`install`] registers a process wide
//! [unhandled exception filter](https://learn.microsoft.com/en-us/windows/win32/api/errhandlingapi/nf-errhandlingapi-setunhandledexceptionfilter).
//! When an exception reaches it, the filter writes a single report to a
//! [`ReportSink`] containing
//!
//! - the instruction pointer, annotated with the [`Label`] it falls into
//! - the general purpose registers
//! - the first [`STACK_WORDS`] words of the stack, each annotated with the
//!   label it points into, if any
//! - the module the instruction pointer is located in
//! - the address ranges of every loaded module
//!
//! The report is produced at most once per process. Every exception, whether
//! it produced a report or not, is then passed on to the filter that was
//! registered before ours, so other crash handlers in the process still get
//! their chance.
//!
//! The filter runs in a process that is by definition in a bad state, so all
//! of the reporting is best effort. Failures to query the OS degrade the
//! affected part of the report, and panics are contained, the filter never
//! raises a second exception of its own.
//!
//! The reporting itself is platform independent, see [`CrashReport`] and
//! [`ModuleSource`], so that it can be driven from something other than an
//! actual crash.

#![allow(unsafe_code)]

mod chain;
mod config;
mod error;
mod labels;
mod modules;
mod report;
mod sink;

pub use chain::{Disposition, HandlerChain, InstallCell, InstallStatus};
pub use config::Config;
pub use crash_log_context::{CrashContext, Registers, StackWindow, STACK_WORDS};
pub use error::{Error, ModuleError};
pub use labels::{Label, LabelKind, LabelTable};
pub use modules::{
    ModuleHandle, ModuleInfo, ModuleList, ModuleRecord, ModuleSource, MODULE_CAPACITY,
};
pub use report::CrashReport;
pub use sink::{LogSink, MemorySink, ReportSink};

#[cfg(feature = "debug-print")]
#[macro_export]
macro_rules! debug_print {
    ($s:literal) => {
        let cstr = concat!($s, "\n");
        $crate::write_stderr(cstr);
    };
}

#[cfg(not(feature = "debug-print"))]
#[macro_export]
macro_rules! debug_print {
    ($s:literal) => {};
}

/// Writes the specified string directly to stderr.
///
/// This is safe to be called from within a compromised context.
#[inline]
pub fn write_stderr(s: &'static str) {
    unsafe {
        #[cfg(target_os = "windows")]
        libc::write(2, s.as_ptr().cast(), s.len() as u32);

        #[cfg(not(target_os = "windows"))]
        libc::write(2, s.as_ptr().cast(), s.len());
    }
}

cfg_if::cfg_if! {
    if #[cfg(all(target_os = "windows", target_arch = "x86"))] {
        mod windows;

        pub use windows::ProcessModules;
        use windows::install as register;
    } else {
        fn register(
            _labels: LabelTable<'static>,
            _sink: Box<dyn ReportSink>,
        ) -> Result<InstallStatus, Error> {
            Err(Error::UnsupportedTarget)
        }
    }
}

/// Installs the crash log as the process' unhandled exception filter.
///
/// Nothing is registered if `config` does not enable crash logging. The
/// filter is installed at most once per process and is never removed, a
/// second call leaves the existing installation untouched and returns
/// [`InstallStatus::AlreadyRegistered`]. Any filter that was registered before
/// is kept and invoked after ours on every exception.
///
/// The `labels` are used to annotate addresses in the report, and every line
/// of the report is written to `sink`.
pub fn install(
    config: &Config,
    labels: LabelTable<'static>,
    sink: Box<dyn ReportSink>,
) -> Result<InstallStatus, Error> {
    if !config.enabled {
        log::debug!("crash logging is disabled, not installing the exception filter");
        return Ok(InstallStatus::Disabled);
    }

    register(labels, sink)
}
