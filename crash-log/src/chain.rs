use std::sync::{
    atomic::{AtomicBool, Ordering},
    OnceLock,
};

/// What the OS should do with the exception once the filter returns
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum Disposition {
    /// The handler is not entered, and the OS continues searching for an
    /// exception handler, ultimately terminating the process.
    ContinueSearch = 0,
    /// The exception is considered handled.
    ExecuteHandler = 1,
}

/// The outcome of registering the filter with the OS
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InstallStatus {
    /// Crash logging was not enabled, nothing was registered
    Disabled,
    /// The filter was registered, and a previously registered filter will be
    /// invoked after ours
    Chained,
    /// The filter was registered, and there was no previous filter
    Standalone,
    /// Our filter was already registered, either by an earlier install in
    /// this process or as the filter the OS handed back, so nothing new was
    /// captured to chain to
    AlreadyRegistered,
}

/// Process wide state of an installed filter.
///
/// The previous filter is captured once, at registration, and never changes
/// afterwards. The fired flag starts out false and is set permanently by the
/// first exception, so at most one report is ever produced. Concurrent
/// exceptions on multiple threads race on a single atomic swap, and exactly
/// one of them wins.
pub struct HandlerChain<F> {
    previous: Option<F>,
    fired: AtomicBool,
}

impl<F: PartialEq> HandlerChain<F> {
    /// Creates the chain from the filter the OS returned when `ours` was
    /// registered.
    ///
    /// If the OS handed back `ours`, the filter was registered twice and
    /// chaining to it would recurse forever, so no previous filter is kept.
    pub fn register(previous: Option<F>, ours: &F) -> (Self, InstallStatus) {
        let (previous, status) = match previous {
            Some(prev) if prev == *ours => (None, InstallStatus::AlreadyRegistered),
            Some(prev) => (Some(prev), InstallStatus::Chained),
            None => (None, InstallStatus::Standalone),
        };

        (
            Self {
                previous,
                fired: AtomicBool::new(false),
            },
            status,
        )
    }
}

impl<F> HandlerChain<F> {
    /// The filter that is invoked after ours, if any
    #[inline]
    pub fn previous(&self) -> Option<&F> {
        self.previous.as_ref()
    }

    /// True once the first exception has been handled
    #[inline]
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Handles a single unhandled exception.
    ///
    /// The first call runs `report`, any panic it raises is swallowed. Every
    /// call, including ones that skipped the report, then invokes `forward`
    /// with the previous filter if there is one, ignoring whatever it decides.
    ///
    /// Returns [`Disposition::ContinueSearch`] for the reporting call so that
    /// the OS' normal crash handling still runs, and
    /// [`Disposition::ExecuteHandler`] for the ignored repeats.
    pub fn on_exception<R, P>(&self, report: R, forward: P) -> Disposition
    where
        R: FnOnce(),
        P: FnOnce(&F),
    {
        let first = !self.fired.swap(true, Ordering::AcqRel);

        if first {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(report));
        } else {
            crate::debug_print!("ignoring repeated unhandled exception");
        }

        if let Some(previous) = &self.previous {
            forward(previous);
        }

        if first {
            Disposition::ContinueSearch
        } else {
            Disposition::ExecuteHandler
        }
    }
}

/// Holds the process wide installation, which moves from uninstalled to
/// installed exactly once and is never removed.
///
/// Installing is serialized and happens during setup, reading the installed
/// value never takes a lock.
pub struct InstallCell<T> {
    installed: OnceLock<T>,
    lock: parking_lot::Mutex<()>,
}

impl<T> InstallCell<T> {
    pub const fn new() -> Self {
        Self {
            installed: OnceLock::new(),
            lock: parking_lot::const_mutex(()),
        }
    }

    /// The installed value, `None` until the first install has completed
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.installed.get()
    }

    /// Runs `install` and publishes the value it produced, unless a value was
    /// already installed.
    ///
    /// A repeated install is not an error, the existing installation, and the
    /// previous filter it captured, are kept untouched and `install` is never
    /// run.
    pub fn install_with<I>(&self, install: I) -> InstallStatus
    where
        I: FnOnce() -> (T, InstallStatus),
    {
        let _lock = self.lock.lock();

        if self.installed.get().is_some() {
            log::warn!("our unhandled exception filter is already installed, keeping the existing chain");
            return InstallStatus::AlreadyRegistered;
        }

        let (value, status) = install();
        // Can't already be set, the lock is held
        let _ = self.installed.set(value);
        status
    }
}

impl<T> Default for InstallCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
