use super::{CrashContext, Registers, StackWindow, STACK_WORDS};

pub use windows_sys::Win32::System::Diagnostics::Debug::{CONTEXT, EXCEPTION_POINTERS};

use windows_sys::Win32::System::{Diagnostics::Debug::ReadProcessMemory, Threading::GetCurrentProcess};

impl Registers {
    /// Copies the registers out of a thread `CONTEXT`
    #[inline]
    pub fn from_context(ctx: &CONTEXT) -> Self {
        Self {
            eip: ctx.Eip,
            eax: ctx.Eax,
            ebx: ctx.Ebx,
            ecx: ctx.Ecx,
            edx: ctx.Edx,
            edi: ctx.Edi,
            esi: ctx.Esi,
            ebp: ctx.Ebp,
            esp: ctx.Esp,
        }
    }
}

impl StackWindow {
    /// Reads up to [`STACK_WORDS`] words starting at `esp` from the current
    /// process.
    ///
    /// Each word is read with `ReadProcessMemory` rather than a plain
    /// dereference, so a stack pointer into unmapped or guard memory can't
    /// raise a second exception. Reading stops at the first word that can't
    /// be read, `None` is returned if not even the first one could be.
    pub fn read(esp: u32) -> Option<Self> {
        let mut words = [0u32; STACK_WORDS];
        let mut len = 0;

        for (i, word) in words.iter_mut().enumerate() {
            let addr = (esp as usize).wrapping_add(i * std::mem::size_of::<u32>());
            let mut read = 0usize;

            // SAFETY: syscall, the destination is a single local word
            let ok = unsafe {
                ReadProcessMemory(
                    GetCurrentProcess(),
                    addr as *const core::ffi::c_void,
                    (word as *mut u32).cast(),
                    std::mem::size_of::<u32>(),
                    &mut read,
                )
            };

            if ok == 0 || read != std::mem::size_of::<u32>() {
                break;
            }

            len += 1;
        }

        (len > 0).then(|| Self::partial(words, len))
    }
}

impl CrashContext {
    /// Builds a snapshot from the pointers handed to an unhandled exception
    /// filter, returning `None` if the OS did not supply a thread context.
    ///
    /// # Safety
    ///
    /// `ptrs` must either be null or point to a valid `EXCEPTION_POINTERS`,
    /// as is the case for the argument of a top level exception filter.
    pub unsafe fn from_exception_pointers(ptrs: *const EXCEPTION_POINTERS) -> Option<Self> {
        if ptrs.is_null() {
            return None;
        }

        let ctx = (*ptrs).ContextRecord;
        if ctx.is_null() {
            return None;
        }

        let registers = Registers::from_context(&*ctx);
        Some(Self::new(registers, StackWindow::read(registers.esp)))
    }
}
