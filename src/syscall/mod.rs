//! Interface de syscalls.
//!
//! O número vem em EAX, argumentos em EBX..EDI, retorno em EAX. Erros
//! voltam como o negativo do código. Syscalls que bloqueiam devolvem
//! `Ok(None)`: o EAX salvo será preenchido quando a continuação
//! completar.

use alloc::string::String;
use alloc::vec::Vec;

use crate::sys::error::{SysError, SysResult};
use crate::sys::types::PcbId;
use crate::Kernel;

pub mod dispatch;
pub mod fs;
pub mod memory;
pub mod process;
pub mod sync;

mod tests;

/// Retorno interno dos handlers: `Ok(Some(v))` escreve EAX, `Ok(None)`
/// deixa o EAX por conta de quem retomar (ou de `exec`).
pub(crate) type SysRet = SysResult<Option<isize>>;

/// Maior string aceita do userspace (caminhos, argumentos).
const MAX_USER_STR: usize = 256;
/// Máximo de argumentos de `exec`.
const MAX_ARGV: usize = 32;

impl Kernel {
    pub(crate) fn user_read(&self, id: PcbId, va: u32, buf: &mut [u8]) -> SysResult<()> {
        self.vm.read(self.space_of(id), va, buf)
    }

    pub(crate) fn user_write(&mut self, id: PcbId, va: u32, buf: &[u8]) -> SysResult<()> {
        let space = self.space_of(id);
        self.vm.write(space, va, buf)
    }

    pub(crate) fn user_u32(&self, id: PcbId, va: u32) -> SysResult<u32> {
        let mut buf = [0u8; 4];
        self.user_read(id, va, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Lê uma string C terminada em NUL do espaço do usuário.
    pub(crate) fn user_cstr(&self, id: PcbId, va: u32) -> SysResult<String> {
        let mut bytes = Vec::new();
        for i in 0..MAX_USER_STR {
            let mut b = [0u8; 1];
            self.user_read(id, va + i as u32, &mut b)?;
            if b[0] == 0 {
                return String::from_utf8(bytes).map_err(|_| SysError::InvalidArgument);
            }
            bytes.push(b[0]);
        }
        Err(SysError::InvalidArgument)
    }

    /// Lê um vetor de ponteiros para strings, terminado em ponteiro nulo.
    pub(crate) fn user_argv(&self, id: PcbId, va: u32) -> SysResult<Vec<String>> {
        let mut argv = Vec::new();
        if va == 0 {
            return Ok(argv);
        }
        for i in 0..MAX_ARGV {
            let ptr = self.user_u32(id, va + (i as u32) * 4)?;
            if ptr == 0 {
                return Ok(argv);
            }
            argv.push(self.user_cstr(id, ptr)?);
        }
        Err(SysError::InvalidArgument)
    }
}
