//! Syscalls de semáforos de usuário e variáveis de condição.
//!
//! Variáveis de condição são semáforos de usuário com valor inicial 0 e
//! disciplina própria: o sinal só faz V se houver alguém dormindo, então
//! acordar nunca "sobra" para o próximo wait.

use crate::sched::pending::PendingOp;
use crate::sys::error::SysError;
use crate::sys::types::{SemId, UsemId};
use crate::syscall::SysRet;
use crate::Kernel;

impl Kernel {
    /// Descritor local -> entrada global + semáforo da arena.
    fn usem_resolve(&self, slot: usize) -> Result<(UsemId, SemId), SysError> {
        let leader = self.leader_of(self.curr);
        let usems = &self.procs.get(leader).usems;
        if slot >= usems.len() {
            return Err(SysError::BadHandle);
        }
        let usem = usems[slot].ok_or(SysError::BadHandle)?;
        Ok((usem, self.usems.sem_of(usem)?))
    }

    fn usem_install(&mut self, value: i32) -> SysRet {
        let leader = self.leader_of(self.curr);
        let slot = self
            .procs
            .get(leader)
            .usems
            .iter()
            .position(|s| s.is_none())
            .ok_or(SysError::ResourceExhausted)?;
        let usem = self.usems.alloc(&mut self.sems, value)?;
        self.procs.get_mut(leader).usems[slot] = Some(usem);
        Ok(Some(slot as isize))
    }

    pub(crate) fn sys_sem_open(&mut self, value: i32) -> SysRet {
        self.usem_install(value)
    }

    /// P: decrementa; com valor negativo a tarefa dorme na fila.
    pub(crate) fn sys_sem_p(&mut self, slot: usize) -> SysRet {
        let (_, sem) = self.usem_resolve(slot)?;
        if self.sem_p(sem) {
            return Ok(Some(0));
        }
        self.procs.get_mut(self.curr).pending = Some(PendingOp::SemDone);
        Ok(None)
    }

    /// V: incrementa e acorda o primeiro da fila, se houver.
    pub(crate) fn sys_sem_v(&mut self, slot: usize) -> SysRet {
        let (_, sem) = self.usem_resolve(slot)?;
        self.sem_v(sem);
        Ok(Some(0))
    }

    pub(crate) fn sys_sem_close(&mut self, slot: usize) -> SysRet {
        let (usem, _) = self.usem_resolve(slot)?;
        let leader = self.leader_of(self.curr);
        self.procs.get_mut(leader).usems[slot] = None;
        self.usems.close(usem, &mut self.sems);
        Ok(Some(0))
    }

    pub(crate) fn sys_cv_open(&mut self) -> SysRet {
        self.usem_install(0)
    }

    /// Solta o mutex e dorme na condição, como uma operação só vista do
    /// usuário. O mutex é readquirido pelo userspace depois do retorno.
    pub(crate) fn sys_cv_wait(&mut self, cv_slot: usize, mutex_slot: usize) -> SysRet {
        let (_, cv) = self.usem_resolve(cv_slot)?;
        let (_, mutex) = self.usem_resolve(mutex_slot)?;
        self.sem_v(mutex);
        if self.sem_p(cv) {
            // sinal pendente de antes; não dorme
            return Ok(Some(0));
        }
        self.procs.get_mut(self.curr).pending = Some(PendingOp::SemDone);
        Ok(None)
    }

    /// Acorda um dorminhoco, se houver. Sem ninguém esperando o sinal
    /// evapora.
    pub(crate) fn sys_cv_sig(&mut self, cv_slot: usize) -> SysRet {
        let (_, cv) = self.usem_resolve(cv_slot)?;
        if self.sems.value(cv) < 0 {
            self.sem_v(cv);
        }
        Ok(Some(0))
    }

    /// Acorda todo mundo que espera na condição.
    pub(crate) fn sys_cv_sigall(&mut self, cv_slot: usize) -> SysRet {
        let (_, cv) = self.usem_resolve(cv_slot)?;
        while self.sems.value(cv) < 0 {
            self.sem_v(cv);
        }
        Ok(Some(0))
    }
}
