//! Flags da ABI
//!
//! Valores visíveis ao userspace: modos de `open`, bases de `lseek`,
//! operações de `sigprocmask`.

use bitflags::bitflags;

bitflags! {
    /// Modo passado em `open`. Os dois bits baixos codificam o acesso;
    /// `RDONLY` é zero por convenção.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const WRONLY = 1 << 0;
        const RDWR = 1 << 1;
        const CREATE = 1 << 2;
        const DIR = 1 << 3;
        const TRUNC = 1 << 4;
    }
}

pub const O_RDONLY: u32 = 0;

impl OpenFlags {
    /// O handle permite leitura?
    pub fn readable(&self) -> bool {
        !self.contains(OpenFlags::WRONLY) || self.contains(OpenFlags::RDWR)
    }

    /// O handle permite escrita?
    pub fn writable(&self) -> bool {
        self.intersects(OpenFlags::WRONLY | OpenFlags::RDWR)
    }
}

// === lseek ===

pub const SEEK_SET: u32 = 0;
pub const SEEK_CUR: u32 = 1;
pub const SEEK_END: u32 = 2;

// === sigprocmask ===

pub const SIG_BLOCK: u32 = 0;
pub const SIG_UNBLOCK: u32 = 1;
pub const SIG_SETMASK: u32 = 2;
