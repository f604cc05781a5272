//! Camada de Abstração de Hardware
//!
//! O núcleo nunca toca hardware diretamente; tudo que depende da máquina
//! entra por um destes traits. O alvo real instala implementações sobre
//! ATA, paginação x86 e o PIT; os testes instalam os mocks deste módulo.

use crate::sys::context::Context;
use crate::sys::error::SysResult;
use crate::sys::types::Space;

#[cfg(test)]
pub mod mock;

/// Dispositivo de blocos de 512 bytes.
///
/// `off` é o deslocamento em bytes dentro do bloco; `off + buf.len()` nunca
/// ultrapassa o bloco.
pub trait BlockDevice {
    fn bread(&mut self, buf: &mut [u8], blkno: u32, off: usize);
    fn bwrite(&mut self, buf: &[u8], blkno: u32, off: usize);
}

/// Espaços de endereçamento e acesso à memória de usuário.
///
/// `read`/`write` copiam entre o kernel e um espaço de usuário arbitrário,
/// falhando com `BadAddress` se a faixa não estiver mapeada.
pub trait VirtMem {
    fn space_alloc(&mut self) -> SysResult<Space>;
    fn space_teardown(&mut self, space: Space);
    fn space_clone(&mut self, src: Space) -> SysResult<Space>;
    fn map(&mut self, space: Space, va: u32, len: u32) -> SysResult<()>;
    fn unmap(&mut self, space: Space, va: u32, len: u32);
    fn is_mapped(&self, space: Space, va: u32) -> bool;
    fn read(&self, space: Space, va: u32, buf: &mut [u8]) -> SysResult<()>;
    fn write(&mut self, space: Space, va: u32, buf: &[u8]) -> SysResult<()>;
}

/// Carregador de executáveis.
///
/// Mapeia a imagem e a pilha inicial no espaço dado e preenche `ctx` com
/// ponto de entrada e topo de pilha. O espaço já vem vazio.
pub trait Loader {
    fn load(
        &mut self,
        vm: &mut dyn VirtMem,
        space: Space,
        path: &str,
        argv: &[&str],
        ctx: &mut Context,
    ) -> SysResult<()>;
}

/// Fonte de ticks do timer (monotônica).
pub trait TickSource {
    fn ticks(&self) -> u64;
}

/// Operações de um dispositivo de caractere (console, serial).
pub trait DevOps {
    fn read(&mut self, buf: &mut [u8]) -> SysResult<usize>;
    fn write(&mut self, buf: &[u8]) -> SysResult<usize>;
}
