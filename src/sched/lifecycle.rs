//! Nascimento e morte de processos e threads.
//!
//! Recursos de processo (arquivos, semáforos de usuário, cwd) moram no
//! PCB do líder; threads só carregam contexto e pilha. A morte de um
//! processo passa sempre por `makezombie`: fecha recursos, reparenta
//! filhos para a raiz do kernel e acorda quem espera.

use crate::sched::proc::ProcState;
use crate::sched::signal::KILLED_EXIT_CODE;
use crate::sys::types::{PcbId, Pid, SemId};
use crate::Kernel;

impl Kernel {
    /// Líder do grupo de `id`.
    pub(crate) fn leader_of(&self, id: PcbId) -> PcbId {
        self.procs.get(id).group_leader
    }

    /// V num semáforo, acordando o primeiro da fila.
    pub(crate) fn sem_v(&mut self, sem: SemId) {
        if let Some(woken) = self.sems.release(sem) {
            let pcb = self.procs.get_mut(woken);
            debug_assert_eq!(pcb.state, ProcState::Blocked);
            pcb.state = ProcState::Ready;
        }
    }

    /// P num semáforo pela tarefa atual. Se não conseguir, a tarefa
    /// bloqueia e o chamador já deve ter registrado a continuação.
    pub(crate) fn sem_p(&mut self, sem: SemId) -> bool {
        let acquired = self.sems.acquire(sem, self.curr);
        if !acquired {
            self.procs.get_mut(self.curr).state = ProcState::Blocked;
        }
        acquired
    }

    /// Fecha tudo que o processo do líder segura: descritores, semáforos
    /// de usuário e o diretório corrente.
    pub(crate) fn close_proc_resources(&mut self, leader: PcbId) {
        for fd in 0..self.procs.get(leader).files.len() {
            if let Some(file) = self.procs.get(leader).files[fd] {
                self.procs.get_mut(leader).files[fd] = None;
                self.file_close(file);
            }
        }
        for slot in 0..self.procs.get(leader).usems.len() {
            if let Some(usem) = self.procs.get(leader).usems[slot] {
                self.procs.get_mut(leader).usems[slot] = None;
                self.usems.close(usem, &mut self.sems);
            }
        }
        if let Some(cwd) = self.procs.get_mut(leader).cwd.take() {
            self.fs.iclose(&mut *self.disk, cwd);
        }
    }

    /// Transforma o líder em zumbi com o código dado. Os filhos vivos
    /// passam para a raiz do kernel; os V de zumbis pendentes vão junto.
    pub(crate) fn makezombie(&mut self, leader: PcbId, code: i32) {
        debug_assert_ne!(leader, 0);
        // um líder morto à força pode estar dormindo em algum semáforo
        self.sems.purge(leader);
        self.close_proc_resources(leader);

        let orphans: alloc::vec::Vec<PcbId> = self
            .procs
            .iter_live()
            .filter(|&c| c != leader && self.procs.get(c).parent == Some(leader))
            .collect();
        for child in orphans {
            self.procs.get_mut(child).parent = Some(0);
            self.procs.get_mut(0).child_num += 1;
            if self.procs.get(child).state == ProcState::Zombie {
                let zsem = self.procs.get(0).zombie_sem;
                self.sem_v(zsem);
            }
        }

        let pcb = self.procs.get_mut(leader);
        pcb.state = ProcState::Zombie;
        pcb.exit_code = code;
        pcb.pending = None;
        let join_sem = pcb.join_sem;
        let parent = pcb.parent;
        crate::kdebug!("(PROC) zumbi pid=", self.procs.get(leader).pid as u64);

        self.sem_v(join_sem);
        if let Some(parent) = parent {
            let zsem = self.procs.get(parent).zombie_sem;
            self.sem_v(zsem);
        }
    }

    /// Marca uma thread não-líder como zumbi. Detached: sai do grupo e é
    /// adotada pela raiz, que a recolhe; joinable: fica no grupo à espera
    /// do `join`.
    pub(crate) fn thread_exit(&mut self, id: PcbId, code: i32) {
        let leader = self.leader_of(id);
        debug_assert_ne!(id, leader);
        let detached = self.procs.get(id).detached;
        if detached {
            self.procs.get_mut(leader).threads.retain(|&t| t != id);
            self.procs.get_mut(id).parent = Some(0);
            self.procs.get_mut(0).child_num += 1;
        }
        let pcb = self.procs.get_mut(id);
        pcb.state = ProcState::Zombie;
        pcb.exit_code = code;
        pcb.pending = None;
        let join_sem = pcb.join_sem;
        self.sem_v(join_sem);
        if detached {
            let zsem = self.procs.get(0).zombie_sem;
            self.sem_v(zsem);
        }
    }

    /// Remove uma thread da tabela à força: sai das filas de semáforo,
    /// do grupo e devolve o slot.
    pub(crate) fn thread_free(&mut self, id: PcbId) {
        debug_assert_ne!(id, 0);
        let leader = self.leader_of(id);
        self.sems.purge(id);
        self.procs.get_mut(leader).threads.retain(|&t| t != id);
        self.procs.release(id);
    }

    /// Todas as threads do grupo menos o líder já morreram?
    pub(crate) fn group_drained(&self, leader: PcbId) -> bool {
        self.procs
            .get(leader)
            .threads
            .iter()
            .all(|&t| t == leader || self.procs.get(t).state == ProcState::Zombie)
    }

    /// Destrói as threads restantes do grupo e mata o líder. Usado por
    /// `exit_group`, SIGKILL e exceções.
    pub(crate) fn force_exit_group(&mut self, member: PcbId, code: i32) {
        let leader = self.leader_of(member);
        let others: alloc::vec::Vec<PcbId> = self
            .procs
            .get(leader)
            .threads
            .iter()
            .copied()
            .filter(|&t| t != leader)
            .collect();
        for thread in others {
            self.thread_free(thread);
        }
        self.makezombie(leader, code);
    }

    /// Mata o processo por SIGKILL.
    pub(crate) fn kill_process(&mut self, member: PcbId) {
        self.force_exit_group(member, KILLED_EXIT_CODE);
    }

    /// Recolhe um zumbi: devolve `(tgid, código)` e libera o slot. O
    /// espaço de endereçamento morre aqui, com o grupo já vazio.
    pub(crate) fn free_zombie(&mut self, zombie: PcbId) -> (Pid, i32) {
        let (tgid, code, parent, space, is_leader) = {
            let pcb = self.procs.get(zombie);
            (
                pcb.tgid,
                pcb.exit_code,
                pcb.parent,
                pcb.space,
                pcb.group_leader == zombie,
            )
        };
        if is_leader {
            if let Some(space) = space {
                self.vm.space_teardown(space);
            }
        }
        if let Some(parent) = parent {
            self.procs.get_mut(parent).child_num -= 1;
        }
        self.thread_free(zombie);
        (tgid, code)
    }
}
