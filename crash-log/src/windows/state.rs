#![allow(non_camel_case_types)]

use crate::{
    chain::{Disposition, HandlerChain, InstallCell, InstallStatus},
    labels::LabelTable,
    report::CrashReport,
    sink::ReportSink,
    CrashContext, Error,
};
use crash_log_context::EXCEPTION_POINTERS;

type TOP_LEVEL_EXCEPTION_FILTER =
    unsafe extern "system" fn(exceptioninfo: *const EXCEPTION_POINTERS) -> i32;
type LPTOP_LEVEL_EXCEPTION_FILTER = Option<TOP_LEVEL_EXCEPTION_FILTER>;

extern "system" {
    fn SetUnhandledExceptionFilter(
        filter: LPTOP_LEVEL_EXCEPTION_FILTER,
    ) -> LPTOP_LEVEL_EXCEPTION_FILTER;
}

/// A registered filter, compared by address
#[derive(Copy, Clone)]
struct Filter(TOP_LEVEL_EXCEPTION_FILTER);

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.0 as usize == other.0 as usize
    }
}

struct Installation {
    chain: HandlerChain<Filter>,
    labels: LabelTable<'static>,
    sink: Box<dyn ReportSink>,
}

/// Only ever set once, after our filter has been registered. The exception
/// path only reads it, so it never waits on a lock.
static INSTALLATION: InstallCell<Installation> = InstallCell::new();

pub(crate) fn install(
    labels: LabelTable<'static>,
    sink: Box<dyn ReportSink>,
) -> Result<InstallStatus, Error> {
    let status = INSTALLATION.install_with(|| {
        // An exception delivered before the installation is published is
        // passed straight through, see `handle_exception`
        // SAFETY: syscall
        let previous = unsafe { SetUnhandledExceptionFilter(Some(handle_exception)) }.map(Filter);
        let (chain, status) = HandlerChain::register(previous, &Filter(handle_exception));

        match status {
            InstallStatus::AlreadyRegistered => {
                log::warn!("our unhandled exception filter was already registered, not chaining to it");
            }
            _ => {
                log::info!(
                    "Applied our unhandled exception filter; if it's not clobbered, then we'll be ready to catch crashes."
                );
            }
        }

        (
            Installation {
                chain,
                labels,
                sink,
            },
            status,
        )
    });

    Ok(status)
}

/// Called on the faulting thread when an exception is not handled by anything
/// else in the process.
unsafe extern "system" fn handle_exception(except_info: *const EXCEPTION_POINTERS) -> i32 {
    let Some(installed) = INSTALLATION.get() else {
        return Disposition::ContinueSearch as i32;
    };

    let disposition = installed.chain.on_exception(
        || {
            crate::debug_print!("unhandled exception caught, writing crash report");

            // SAFETY: the OS hands filters either null or valid pointers
            match unsafe { CrashContext::from_exception_pointers(except_info) } {
                Some(context) => {
                    CrashReport::new(&context, installed.labels)
                        .write(&super::ProcessModules, &installed.sink);
                }
                None => installed
                    .sink
                    .line(format_args!("Unhandled exception caught, but no thread context was supplied.")),
            }
        },
        |previous| {
            // The previous filter's verdict is ignored, ours is what the OS sees
            // SAFETY: the filter was registered in this process and is still
            // mapped, as filters are never unregistered
            unsafe { (previous.0)(except_info) };
        },
    );

    disposition as i32
}
