//! Formatting of the crash report itself.
//!
//! The layout of the report is relied upon by people (and the occasional
//! script) reading crash logs, so the wording and field order of each line
//! should be treated as stable.

use crate::{
    labels::{LabelKind, LabelTable},
    modules::{ModuleList, ModuleSource},
    sink::ReportSink,
    CrashContext,
};

macro_rules! out {
    ($sink:expr) => {
        $sink.line(format_args!(""))
    };
    ($sink:expr, $($arg:tt)+) => {
        $sink.line(format_args!($($arg)+))
    };
}

const BLAME_NOTE: &[&str] = &[
    "Please note that this does not automatically mean that that module is responsible.",
    "It may have been supplied bad data or program state as the result of an issue in",
    "the base game or a different DLL.",
];

const UNIDENTIFIED_NOTE: &[&str] = &[
    "This can occur if the crashing instruction is located in the vanilla address space,",
    "but it can also occur if there are too many DLLs for us to list, and if the crash",
    "occurred in one of their address spaces. Please note that even if the crash occurred",
    "in vanilla code, that does not necessarily mean that it is a vanilla problem. The",
    "vanilla code may have been supplied bad data or program state as the result of an",
    "issue in a loaded DLL.",
];

/// A crash report for a single unhandled exception
pub struct CrashReport<'r> {
    context: &'r CrashContext,
    labels: LabelTable<'r>,
}

impl<'r> CrashReport<'r> {
    #[inline]
    pub fn new(context: &'r CrashContext, labels: LabelTable<'r>) -> Self {
        Self { context, labels }
    }

    /// Writes the complete report.
    ///
    /// Every section is best effort, a failure to retrieve some piece of
    /// information degrades that part of the report but never stops the
    /// report from reaching its final line.
    pub fn write<M, S>(&self, modules: &M, sink: &S)
    where
        M: ModuleSource + ?Sized,
        S: ReportSink + ?Sized,
    {
        out!(sink);
        out!(sink);
        out!(sink, "Unhandled exception (i.e. crash) caught!");
        self.write_instruction_pointer(sink);
        out!(sink);
        self.write_registers(sink);
        out!(sink);
        self.write_stack(sink);
        out!(sink);
        self.write_modules(modules, sink);
        out!(sink);
        out!(sink, "ALL DATA PRINTED.");
    }

    /// Writes the instruction pointer, annotated with its label if it has one
    pub fn write_instruction_pointer<S: ReportSink + ?Sized>(&self, sink: &S) {
        let eip = self.context.registers.eip;

        match self.labels.resolve(eip) {
            Some(label) if label.kind != LabelKind::Subroutine => {
                out!(
                    sink,
                    "Instruction pointer (EIP): {eip:08X} (not-a-subroutine:{})",
                    label.name
                );
            }
            Some(label) => {
                out!(
                    sink,
                    "Instruction pointer (EIP): {eip:08X} ({}+{:02X})",
                    label.name,
                    label.offset_of(eip)
                );
            }
            None => out!(sink, "Instruction pointer (EIP): {eip:08X}"),
        }
    }

    /// Writes the table of general purpose registers
    pub fn write_registers<S: ReportSink + ?Sized>(&self, sink: &S) {
        out!(sink, "REG | VALUE");
        for (name, value) in self.context.registers.general_purpose() {
            out!(sink, "{name} | {value:08X}");
        }
    }

    /// Writes every word of the stack window, annotating the ones that look
    /// like they point into a known label.
    ///
    /// This is a heuristic, stale values that happen to look like addresses
    /// will be annotated just the same as actual return addresses.
    pub fn write_stack<S: ReportSink + ?Sized>(&self, sink: &S) {
        out!(sink, "STACK (esp == {:08X}):", self.context.registers.esp);

        let Some(stack) = &self.context.stack else {
            out!(sink, "STACK UNREADABLE.");
            return;
        };

        for word in stack.iter() {
            match self.labels.resolve(word) {
                Some(label) if label.kind == LabelKind::VTable => {
                    out!(sink, "0x{word:08X} | VTBL:{}", label.name);
                }
                Some(label) => out!(sink, "0x{word:08X} | {}", label.name),
                None => out!(sink, "0x{word:08X} |"),
            }
        }

        if stack.is_truncated() {
            let end = self
                .context
                .registers
                .esp
                .wrapping_add((stack.len() * std::mem::size_of::<u32>()) as u32);
            out!(sink, "STACK UNREADABLE PAST 0x{end:08X}.");
        }
    }

    /// Writes the module the crash most likely occurred in, followed by the
    /// address ranges of all of the loaded modules
    pub fn write_modules<M, S>(&self, modules: &M, sink: &S)
    where
        M: ModuleSource + ?Sized,
        S: ReportSink + ?Sized,
    {
        let list = match ModuleList::enumerate(modules) {
            Ok(list) => list,
            Err(err) => {
                log::debug!(target: crate::LogSink::TARGET, "{err}");
                out!(sink, "UNABLE TO EXAMINE LOADED DLLs.");
                return;
            }
        };

        let identified = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.write_faulting_module(&list, modules, sink);
        }));

        if identified.is_err() {
            out!(sink, "   FAILED TO PRINT.");
        }

        out!(sink);
        out!(sink, "LISTING MODULE BASES (UNORDERED)...");

        let listed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            write_module_listing(&list, modules, sink);
        }));

        if listed.is_err() {
            out!(sink, "   FAILED TO PRINT.");
        }
    }

    /// Writes the module whose image contains the instruction pointer, or an
    /// explanation of why it couldn't be determined
    pub fn write_faulting_module<M, S>(&self, list: &ModuleList, modules: &M, sink: &S)
    where
        M: ModuleSource + ?Sized,
        S: ReportSink + ?Sized,
    {
        let eip = self.context.registers.eip;

        if let Some(module) = list.find_containing(modules, eip) {
            out!(
                sink,
                "GAME CRASHED AT INSTRUCTION Base+0x{:08X} IN MODULE: {}",
                eip - module.info.base,
                module.path
            );
            for line in BLAME_NOTE {
                out!(sink, "{line}");
            }
        } else {
            out!(sink, "UNABLE TO IDENTIFY MODULE CONTAINING THE CRASH ADDRESS.");
            for line in UNIDENTIFIED_NOTE {
                out!(sink, "{line}");
            }
        }
    }
}

/// Writes the address range and path of every listed module. A module whose
/// path can't be retrieved is skipped, one whose image information can't be
/// retrieved is listed with an unknown end address.
fn write_module_listing<M, S>(list: &ModuleList, modules: &M, sink: &S)
where
    M: ModuleSource + ?Sized,
    S: ReportSink + ?Sized,
{
    for &handle in list.handles() {
        let Ok(path) = modules.file_path(handle) else {
            continue;
        };

        match modules.info(handle) {
            Ok(info) => out!(sink, " - 0x{:08X} - 0x{:08X}: {path}", handle.0, info.end()),
            Err(_) => out!(sink, " - 0x{:08X} - 0x????????: {path}", handle.0),
        }
    }

    if list.overflow() {
        out!(sink, "TOO MANY MODULES TO LIST!");
    }
    out!(sink, "END OF LIST.");
}
