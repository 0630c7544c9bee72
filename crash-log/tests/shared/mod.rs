#![allow(dead_code)]

use crash_log::{
    CrashContext, Label, LabelKind, LabelTable, ModuleError, ModuleHandle, ModuleInfo,
    ModuleSource, Registers, StackWindow, STACK_WORDS,
};

pub static LABELS: [Label<'static>; 4] = [
    Label::new(0x0040_1000, 0x80, "Actor::Update", LabelKind::Subroutine),
    Label::new(0x0040_1100, 0x40, "PlayerCharacter::Move", LabelKind::Subroutine),
    Label::new(0x0108_0000, 0x24, "Actor", LabelKind::VTable),
    Label::new(0x0120_0000, 0x10, "g_dataHandler", LabelKind::Other),
];

#[inline]
pub fn labels() -> LabelTable<'static> {
    LabelTable::new(&LABELS)
}

pub fn registers(eip: u32) -> Registers {
    Registers {
        eip,
        eax: 0x0000_0001,
        ebx: 0x0108_0000,
        ecx: 0x0BAD_F00D,
        edx: 0,
        edi: 0x7FFE_0000,
        esi: 0x0012_FF00,
        ebp: 0x0019_FA10,
        esp: 0x0019_F9F0,
    }
}

pub fn stack() -> StackWindow {
    let mut words = [0u32; STACK_WORDS];
    words[0] = 0x0108_0004;
    words[1] = 0x0040_1104;
    words[2] = 0xDEAD_BEEF;
    words[3] = 0x0120_0008;
    StackWindow::new(words)
}

pub fn context(eip: u32) -> CrashContext {
    CrashContext::new(registers(eip), Some(stack()))
}

pub struct FakeModule {
    pub handle: ModuleHandle,
    pub info: Option<ModuleInfo>,
    pub path: Option<String>,
}

pub fn module(base: u32, image_size: u32, path: &str) -> FakeModule {
    FakeModule {
        handle: ModuleHandle(base as usize),
        info: Some(ModuleInfo { base, image_size }),
        path: Some(path.to_owned()),
    }
}

/// An in-memory stand in for the loaded modules of a process
#[derive(Default)]
pub struct FakeModules {
    pub modules: Vec<FakeModule>,
    pub enumerate_fails: bool,
    /// Retrieving the path of this module panics
    pub panic_on: Option<ModuleHandle>,
}

impl FakeModules {
    pub fn new(modules: Vec<FakeModule>) -> Self {
        Self {
            modules,
            ..Default::default()
        }
    }

    fn find(&self, handle: ModuleHandle) -> Option<&FakeModule> {
        self.modules.iter().find(|m| m.handle == handle)
    }
}

impl ModuleSource for FakeModules {
    fn enumerate(&self, handles: &mut [ModuleHandle]) -> Result<usize, ModuleError> {
        if self.enumerate_fails {
            return Err(ModuleError::Enumerate(5));
        }

        for (dst, module) in handles.iter_mut().zip(&self.modules) {
            *dst = module.handle;
        }

        Ok(self.modules.len())
    }

    fn info(&self, module: ModuleHandle) -> Result<ModuleInfo, ModuleError> {
        self.find(module)
            .and_then(|m| m.info)
            .ok_or(ModuleError::Info(6))
    }

    fn file_path(&self, module: ModuleHandle) -> Result<String, ModuleError> {
        if self.panic_on == Some(module) {
            panic!("the module list was modified while we were reading it");
        }

        self.find(module)
            .and_then(|m| m.path.clone())
            .ok_or(ModuleError::FilePath(126))
    }
}

/// The modules of a typical modded game
pub fn game_modules() -> FakeModules {
    FakeModules::new(vec![
        module(0x0040_0000, 0x0100_0000, r"C:\Games\Game\Game.exe"),
        module(0x1000_0000, 0x0005_0000, r"C:\Games\Game\Data\Plugins\BugFixes.dll"),
        module(0x7700_0000, 0x0018_0000, r"C:\Windows\SYSTEM32\ntdll.dll"),
    ])
}
