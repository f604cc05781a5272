//! Arena central de semáforos contadores.
//!
//! Cada semáforo guarda um valor e a fila de PCBs bloqueados. Quando o
//! valor é negativo, seu módulo é exatamente o tamanho da fila. A arena
//! nunca encolhe; slots liberados são reutilizados.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::sched::config::KSEM_NUM;
use crate::sys::error::{SysError, SysResult};
use crate::sys::types::{PcbId, SemId};

pub struct Sem {
    pub value: i32,
    waiters: VecDeque<PcbId>,
}

pub struct SemTable {
    slots: Vec<Option<Sem>>,
}

impl SemTable {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Aloca um semáforo com o valor inicial dado.
    pub fn alloc(&mut self, value: i32) -> SysResult<SemId> {
        let sem = Sem {
            value,
            waiters: VecDeque::new(),
        };
        if let Some(id) = self.slots.iter().position(|s| s.is_none()) {
            self.slots[id] = Some(sem);
            return Ok(id);
        }
        if self.slots.len() >= KSEM_NUM {
            crate::kerror!("(SEM) Arena esgotada, cap=", KSEM_NUM as u64);
            return Err(SysError::ResourceExhausted);
        }
        self.slots.push(Some(sem));
        Ok(self.slots.len() - 1)
    }

    /// Libera o slot. A fila deve estar vazia.
    pub fn free(&mut self, id: SemId) {
        if let Some(sem) = &self.slots[id] {
            debug_assert!(sem.waiters.is_empty());
        }
        self.slots[id] = None;
    }

    fn get_mut(&mut self, id: SemId) -> &mut Sem {
        match self.slots[id].as_mut() {
            Some(sem) => sem,
            None => panic!("semaforo inexistente"),
        }
    }

    pub fn value(&self, id: SemId) -> i32 {
        match self.slots[id].as_ref() {
            Some(sem) => sem.value,
            None => panic!("semaforo inexistente"),
        }
    }

    /// Restaura o semáforo a um valor conhecido. A fila deve estar vazia.
    pub fn reset(&mut self, id: SemId, value: i32) {
        let sem = self.get_mut(id);
        debug_assert!(sem.waiters.is_empty());
        sem.value = value;
    }

    /// Operação P. Retorna `true` se o chamador adquiriu na hora; `false`
    /// se entrou na fila e deve bloquear.
    pub fn acquire(&mut self, id: SemId, pid: PcbId) -> bool {
        let sem = self.get_mut(id);
        sem.value -= 1;
        if sem.value < 0 {
            sem.waiters.push_back(pid);
            false
        } else {
            true
        }
    }

    /// Operação V. Retorna o PCB desbloqueado, se havia fila.
    pub fn release(&mut self, id: SemId) -> Option<PcbId> {
        let sem = self.get_mut(id);
        sem.value += 1;
        if sem.value <= 0 {
            sem.waiters.pop_front()
        } else {
            None
        }
    }

    /// Há alguém na fila?
    pub fn has_waiters(&self, id: SemId) -> bool {
        match self.slots[id].as_ref() {
            Some(sem) => !sem.waiters.is_empty(),
            None => false,
        }
    }

    /// Remove um PCB de todas as filas, corrigindo os valores. Usado ao
    /// destruir threads à força.
    pub fn purge(&mut self, pid: PcbId) {
        for slot in self.slots.iter_mut() {
            if let Some(sem) = slot {
                let before = sem.waiters.len();
                sem.waiters.retain(|&p| p != pid);
                sem.value += (before - sem.waiters.len()) as i32;
            }
        }
    }
}
