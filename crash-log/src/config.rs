/// Settings supplied by the host when the crash log is installed.
///
/// These are read exactly once, by [`crate::install`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Whether the unhandled exception filter should be installed at all.
    /// Disabled unless the host opts in.
    pub enabled: bool,
}

impl Config {
    #[inline]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}
