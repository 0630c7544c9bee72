use crate::ModuleError;

/// The maximum number of modules that are examined, any beyond this are
/// reported as an overflow and otherwise ignored.
pub const MODULE_CAPACITY: usize = 140;

/// Opaque identifier of a loaded module. On Windows this is the `HMODULE`,
/// which happens to be the module's base address.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModuleHandle(pub usize);

/// Where a module is mapped in the address space
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModuleInfo {
    pub base: u32,
    pub image_size: u32,
}

impl ModuleInfo {
    /// The first address past the end of the image
    #[inline]
    pub fn end(&self) -> u32 {
        self.base.wrapping_add(self.image_size)
    }

    /// Checks if the address lies within `[base, base + image_size)`
    #[inline]
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.base && u64::from(addr) < u64::from(self.base) + u64::from(self.image_size)
    }
}

/// Everything known about a single loaded module
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleRecord {
    pub handle: ModuleHandle,
    pub info: ModuleInfo,
    pub path: String,
}

/// Queries the OS for the modules loaded in the current process.
///
/// Every method may fail independently, and none of them are retried.
pub trait ModuleSource {
    /// Fills `handles` with as many module handles as fit, returning the total
    /// number of modules loaded in the process, which may be larger than the
    /// length of `handles`.
    fn enumerate(&self, handles: &mut [ModuleHandle]) -> Result<usize, ModuleError>;
    /// Retrieves the base address and size of the module
    fn info(&self, module: ModuleHandle) -> Result<ModuleInfo, ModuleError>;
    /// Retrieves the full path of the module's file on disk
    fn file_path(&self, module: ModuleHandle) -> Result<String, ModuleError>;
}

impl<S: ModuleSource + ?Sized> ModuleSource for &S {
    #[inline]
    fn enumerate(&self, handles: &mut [ModuleHandle]) -> Result<usize, ModuleError> {
        (**self).enumerate(handles)
    }

    #[inline]
    fn info(&self, module: ModuleHandle) -> Result<ModuleInfo, ModuleError> {
        (**self).info(module)
    }

    #[inline]
    fn file_path(&self, module: ModuleHandle) -> Result<String, ModuleError> {
        (**self).file_path(module)
    }
}

/// The handles of the loaded modules, in whatever order the OS returned them.
///
/// At most [`MODULE_CAPACITY`] handles are kept. The list is taken fresh on
/// every crash.
pub struct ModuleList {
    handles: [ModuleHandle; MODULE_CAPACITY],
    count: usize,
    overflow: bool,
}

impl ModuleList {
    /// Enumerates the modules currently loaded in the process
    pub fn enumerate<S: ModuleSource + ?Sized>(source: &S) -> Result<Self, ModuleError> {
        let mut handles = [ModuleHandle::default(); MODULE_CAPACITY];
        let total = source.enumerate(&mut handles)?;

        Ok(Self {
            handles,
            count: total.min(MODULE_CAPACITY),
            overflow: total > MODULE_CAPACITY,
        })
    }

    /// The handles that were retrieved, never more than [`MODULE_CAPACITY`]
    #[inline]
    pub fn handles(&self) -> &[ModuleHandle] {
        &self.handles[..self.count]
    }

    /// True if more modules are loaded than could be listed
    #[inline]
    pub fn overflow(&self) -> bool {
        self.overflow
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Finds the module whose image contains `addr`.
    ///
    /// Modules are checked in list order and the first one containing the
    /// address whose path can also be retrieved is returned. If the address
    /// is in a module past the capacity of the list it won't be found.
    pub fn find_containing<S: ModuleSource + ?Sized>(
        &self,
        source: &S,
        addr: u32,
    ) -> Option<ModuleRecord> {
        self.handles().iter().find_map(|&handle| {
            let info = source.info(handle).ok()?;
            if !info.contains(addr) {
                return None;
            }

            let path = source.file_path(handle).ok()?;
            Some(ModuleRecord { handle, info, path })
        })
    }
}
