use crate::{
    modules::{ModuleHandle, ModuleInfo, ModuleSource, MODULE_CAPACITY},
    ModuleError,
};
use windows_sys::Win32::{
    Foundation::{HMODULE, MAX_PATH},
    System::{
        ProcessStatus::{EnumProcessModules, GetModuleFileNameExW, GetModuleInformation, MODULEINFO},
        Threading::GetCurrentProcess,
    },
};

#[inline]
fn last_error() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or_default()
}

/// The modules loaded in the current process, as reported by PSAPI
#[derive(Copy, Clone, Default)]
pub struct ProcessModules;

impl ModuleSource for ProcessModules {
    fn enumerate(&self, handles: &mut [ModuleHandle]) -> Result<usize, ModuleError> {
        let mut modules: [HMODULE; MODULE_CAPACITY] = [0; MODULE_CAPACITY];
        let capacity = handles.len().min(MODULE_CAPACITY);
        let mut needed = 0u32;

        // SAFETY: syscall, the size passed never exceeds the buffer
        let ok = unsafe {
            EnumProcessModules(
                GetCurrentProcess(),
                modules.as_mut_ptr(),
                (capacity * std::mem::size_of::<HMODULE>()) as u32,
                &mut needed,
            )
        };

        if ok == 0 {
            return Err(ModuleError::Enumerate(last_error()));
        }

        let total = needed as usize / std::mem::size_of::<HMODULE>();
        for (dst, src) in handles.iter_mut().zip(&modules[..total.min(capacity)]) {
            *dst = ModuleHandle(*src as usize);
        }

        Ok(total)
    }

    fn info(&self, module: ModuleHandle) -> Result<ModuleInfo, ModuleError> {
        let mut info = MODULEINFO {
            lpBaseOfDll: std::ptr::null_mut(),
            SizeOfImage: 0,
            EntryPoint: std::ptr::null_mut(),
        };

        // SAFETY: syscall
        let ok = unsafe {
            GetModuleInformation(
                GetCurrentProcess(),
                module.0 as HMODULE,
                &mut info,
                std::mem::size_of::<MODULEINFO>() as u32,
            )
        };

        if ok == 0 {
            return Err(ModuleError::Info(last_error()));
        }

        Ok(ModuleInfo {
            base: info.lpBaseOfDll as usize as u32,
            image_size: info.SizeOfImage,
        })
    }

    fn file_path(&self, module: ModuleHandle) -> Result<String, ModuleError> {
        let mut path = [0u16; MAX_PATH as usize];

        // SAFETY: syscall, the length passed is the length of the buffer
        let len = unsafe {
            GetModuleFileNameExW(
                GetCurrentProcess(),
                module.0 as HMODULE,
                path.as_mut_ptr(),
                path.len() as u32,
            )
        };

        if len == 0 {
            return Err(ModuleError::FilePath(last_error()));
        }

        Ok(String::from_utf16_lossy(&path[..len as usize]))
    }
}
