//! Snapshot of the faulting thread's 32-bit register state and the top of its
//! stack, as handed to a crash report.
//!
//! The snapshot is taken once, when the exception is delivered, and is never
//! mutated afterwards. Only the registers a human reader needs to make sense
//! of a crash are kept; segment, debug and floating point state is dropped.

// crate-specific exceptions:
#![allow(unsafe_code)]

/// The number of consecutive machine words read from the stack pointer.
pub const STACK_WORDS: usize = 40;

/// General purpose and control registers of a 32-bit x86 thread.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    /// Instruction pointer
    pub eip: u32,
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    /// Stack pointer
    pub esp: u32,
}

impl Registers {
    /// The general purpose registers paired with their lowercase names, in
    /// the order they are reported.
    #[inline]
    pub fn general_purpose(&self) -> [(&'static str, u32); 7] {
        [
            ("eax", self.eax),
            ("ebx", self.ebx),
            ("ecx", self.ecx),
            ("edx", self.edx),
            ("edi", self.edi),
            ("esi", self.esi),
            ("ebp", self.ebp),
        ]
    }
}

/// A read-only copy of up to [`STACK_WORDS`] words starting at the stack
/// pointer.
///
/// The words are untyped; some may be return addresses or object pointers,
/// most are just data. If the stack ends in unreadable memory before
/// [`STACK_WORDS`] words, only the readable prefix is kept.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StackWindow {
    words: [u32; STACK_WORDS],
    len: usize,
}

impl StackWindow {
    /// A window where every word was readable
    #[inline]
    pub fn new(words: [u32; STACK_WORDS]) -> Self {
        Self {
            words,
            len: STACK_WORDS,
        }
    }

    /// A window where only the first `len` words were readable
    #[inline]
    pub fn partial(words: [u32; STACK_WORDS], len: usize) -> Self {
        Self {
            words,
            len: len.min(STACK_WORDS),
        }
    }

    /// Retrieves the word at `index` slots above the stack pointer
    #[inline]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.words[..self.len].get(index).copied()
    }

    /// The number of words that were read
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if fewer than [`STACK_WORDS`] words could be read
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.len < STACK_WORDS
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words[..self.len].iter().copied()
    }
}

/// Contextual crash information for the faulting thread.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CrashContext {
    /// The register state at the moment of the fault
    pub registers: Registers,
    /// The words at the top of the stack, `None` if the stack pointer did not
    /// point at readable memory
    pub stack: Option<StackWindow>,
}

impl CrashContext {
    #[inline]
    pub fn new(registers: Registers, stack: Option<StackWindow>) -> Self {
        Self { registers, stack }
    }
}

cfg_if::cfg_if! {
    if #[cfg(all(target_os = "windows", target_arch = "x86"))] {
        mod windows;
        pub use windows::*;
    }
}
