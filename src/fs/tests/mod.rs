//! Testes do sistema de arquivos.
//!
//! Tudo roda sobre um disco em memória recém-formatado.
//!
//! # Como Executar
//! ```bash
//! cargo test --lib fs::tests
//! ```

#![cfg(test)]

pub mod path;

use crate::fs::inode::FsState;
use crate::fs::layout::mkfs;
use crate::hal::mock::MockDisk;

pub const TEST_BLOCKS: u32 = 1024;

/// Disco formatado + cache montada, prontos para uso.
pub fn fresh_fs() -> (MockDisk, FsState) {
    let mut disk = MockDisk::new(TEST_BLOCKS as usize);
    mkfs(&mut disk, TEST_BLOCKS);
    let fs = FsState::boot(&mut disk);
    (disk, fs)
}
