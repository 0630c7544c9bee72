/// An error that can occur when installing the crash log filter
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Unhandled exception filters and 32-bit register state are only
    /// available on 32-bit x86 Windows
    #[error("crash logging is not supported on this target")]
    UnsupportedTarget,
}

/// A failed query against the loaded modules of the process. The code is the
/// raw OS error, if one was available.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModuleError {
    #[error("unable to enumerate the loaded modules (os error {0})")]
    Enumerate(i32),
    #[error("unable to retrieve module information (os error {0})")]
    Info(i32),
    #[error("unable to retrieve the module file path (os error {0})")]
    FilePath(i32),
}
