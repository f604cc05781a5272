//! Syscalls de memória.
//!
//! O modelo é mínimo: `brk` só cresce, arredondado a páginas; `mmap`
//! entrega uma página por vez numa janela fixa. Memória de usuário nunca
//! volta para o sistema antes do processo morrer, exceto por `munmap`.

use crate::sched::config::{PAGE_SIZE, USR_MEM, VIR_MEM};
use crate::sys::error::SysError;
use crate::syscall::SysRet;
use crate::Kernel;

/// Fim da janela de mmap.
const VIR_MEM_END: u32 = VIR_MEM + 1024 * PAGE_SIZE;

fn page_up(addr: u32) -> u32 {
    (addr + PAGE_SIZE - 1) & !(PAGE_SIZE - 1)
}

impl Kernel {
    /// Move o fim do heap para `addr` (arredondado para cima). Encolher é
    /// aceito e ignorado. Sempre devolve 0.
    pub(crate) fn sys_brk(&mut self, addr: u32) -> SysRet {
        if addr < USR_MEM {
            return Err(SysError::InvalidArgument);
        }
        let leader = self.leader_of(self.curr);
        let new = page_up(addr);
        let old = self.procs.get(leader).brk;
        if old == 0 {
            self.procs.get_mut(leader).brk = new;
            return Ok(Some(0));
        }
        if new > old {
            let space = self.space_of(self.curr);
            self.vm.map(space, old, new - old)?;
            self.procs.get_mut(leader).brk = new;
            crate::ktrace!("(MM) brk estendido para=", new as u64);
        }
        Ok(Some(0))
    }

    /// Mapeia a primeira página livre da janela e devolve seu endereço.
    pub(crate) fn sys_mmap(&mut self) -> SysRet {
        let space = self.space_of(self.curr);
        let mut va = VIR_MEM;
        while va < VIR_MEM_END {
            if !self.vm.is_mapped(space, va) {
                self.vm.map(space, va, PAGE_SIZE)?;
                return Ok(Some(va as isize));
            }
            va += PAGE_SIZE;
        }
        Err(SysError::OutOfMemory)
    }

    /// Desfaz o mapeamento de uma página da janela de mmap.
    pub(crate) fn sys_munmap(&mut self, va: u32) -> SysRet {
        if va % PAGE_SIZE != 0 || !(VIR_MEM..VIR_MEM_END).contains(&va) {
            return Err(SysError::InvalidArgument);
        }
        let space = self.space_of(self.curr);
        if !self.vm.is_mapped(space, va) {
            return Err(SysError::InvalidArgument);
        }
        self.vm.unmap(space, va, PAGE_SIZE);
        Ok(Some(0))
    }
}
