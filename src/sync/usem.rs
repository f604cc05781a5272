//! Semáforos de usuário.
//!
//! Tabela global de semáforos visíveis ao userspace, com contagem de
//! referências. Cada processo enxerga descritores locais (índices na sua
//! própria tabela) que apontam para entradas daqui; `fork` duplica as
//! referências. Variáveis de condição usam as mesmas entradas.

use crate::sched::config::USER_SEM_NUM;
use crate::sync::sem::SemTable;
use crate::sys::error::{SysError, SysResult};
use crate::sys::types::{SemId, UsemId};

#[derive(Clone, Copy)]
struct Usem {
    refs: u32,
    sem: SemId,
}

pub struct UsemTable {
    slots: [Option<Usem>; USER_SEM_NUM],
}

impl UsemTable {
    pub fn new() -> Self {
        Self {
            slots: [None; USER_SEM_NUM],
        }
    }

    /// Cria uma entrada nova com refs=1 sobre um semáforo recém-alocado.
    pub fn alloc(&mut self, sems: &mut SemTable, value: i32) -> SysResult<UsemId> {
        let id = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(SysError::ResourceExhausted)?;
        let sem = sems.alloc(value)?;
        self.slots[id] = Some(Usem { refs: 1, sem });
        Ok(id)
    }

    /// Incrementa a contagem de referências (fork).
    pub fn dup(&mut self, id: UsemId) {
        match self.slots[id].as_mut() {
            Some(u) => u.refs += 1,
            None => panic!("usem inexistente"),
        }
    }

    /// Solta uma referência. Com a última, devolve o semáforo à arena;
    /// se ainda houver fila, o slot fica retido em vez de sumir sob os
    /// bloqueados.
    pub fn close(&mut self, id: UsemId, sems: &mut SemTable) {
        let usem = match self.slots[id].as_mut() {
            Some(u) => u,
            None => panic!("usem inexistente"),
        };
        usem.refs -= 1;
        if usem.refs == 0 {
            if sems.has_waiters(usem.sem) {
                crate::kwarn!("(SEM) usem liberado com fila, slot retido id=", id as u64);
                return;
            }
            sems.free(usem.sem);
            self.slots[id] = None;
        }
    }

    /// Semáforo subjacente da entrada.
    pub fn sem_of(&self, id: UsemId) -> SysResult<SemId> {
        self.slots[id].map(|u| u.sem).ok_or(SysError::BadHandle)
    }

    /// A entrada está viva?
    pub fn is_open(&self, id: UsemId) -> bool {
        id < USER_SEM_NUM && self.slots[id].is_some()
    }
}
