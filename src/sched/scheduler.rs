//! Escalonador round-robin e retomada de syscalls bloqueadas.
//!
//! A varredura parte do slot seguinte ao atual e dá a volta na tabela.
//! Um candidato Ready só vence se `try_resume` conseguir deixá-lo pronto
//! para voltar ao usuário: sinais da fila são entregues e a continuação
//! pendente é completada, com o resultado escrito no EAX salvo. Se
//! ninguém vence, a raiz do kernel assume; ela nunca bloqueia.

use alloc::vec;

use crate::sched::pending::{Completion, PendingOp};
use crate::sched::proc::ProcState;
use crate::sched::signal::SigAction;
use crate::sys::context::Context;
use crate::sys::error::SysError;
use crate::sys::types::{PcbId, PipeId, SemId, Space};
use crate::Kernel;

impl Kernel {
    /// Troca de tarefa: salva o contexto vivo no PCB de saída e restaura
    /// o do vencedor em `*ctx`.
    pub(crate) fn schedule(&mut self, ctx: &mut Context) {
        let outgoing = self.curr;
        {
            let pcb = self.procs.get_mut(outgoing);
            match pcb.state {
                ProcState::Running => {
                    pcb.state = ProcState::Ready;
                    pcb.ctx = *ctx;
                }
                ProcState::Ready | ProcState::Blocked => pcb.ctx = *ctx,
                // zumbi ou slot devolvido: o contexto morre junto
                _ => {}
            }
        }

        let mut winner = 0;
        let total = crate::sched::config::PCB_NUM;
        for step in 1..=total {
            let cand = (outgoing + step) % total;
            if cand == 0 {
                continue;
            }
            if self.procs.get(cand).state != ProcState::Ready {
                continue;
            }
            if self.try_resume(cand) {
                winner = cand;
                break;
            }
        }

        let pcb = self.procs.get_mut(winner);
        debug_assert!(matches!(
            pcb.state,
            ProcState::Ready | ProcState::Running
        ));
        pcb.state = ProcState::Running;
        self.curr = winner;
        *ctx = self.procs.get(winner).ctx;
        crate::ktrace!("(SCHED) rodando pid=", self.procs.get(winner).pid as u64);
    }

    /// Tenta deixar um candidato Ready pronto para voltar ao usuário.
    /// Entrega no máximo um sinal da fila e completa a continuação
    /// pendente, se houver.
    pub(crate) fn try_resume(&mut self, cand: PcbId) -> bool {
        if cand == self.leader_of(cand) {
            self.deliver_one_signal(cand);
            if self.procs.get(cand).state != ProcState::Ready {
                return false;
            }
        }
        let Some(op) = self.procs.get(cand).pending else {
            return true;
        };
        match self.complete_pending(cand, op) {
            Completion::Resume(val) => {
                let pcb = self.procs.get_mut(cand);
                pcb.pending = None;
                if let Some(v) = val {
                    pcb.ctx.eax = v as u32;
                }
                true
            }
            Completion::Blocked | Completion::NotYet | Completion::Gone => false,
        }
    }

    /// Tira da fila o primeiro sinal não mascarado e aplica a disposição.
    /// Sinais enfileirados com disposição Default são descartados; os
    /// efeitos fortes (KILL, STOP, CONT) já agiram na hora do `kill`.
    fn deliver_one_signal(&mut self, leader: PcbId) {
        let pos = {
            let pcb = self.procs.get(leader);
            pcb.sig_queue
                .iter()
                .position(|&s| pcb.sig_blocked & (1 << s) == 0)
        };
        let Some(pos) = pos else { return };
        let Some(sig) = self.procs.get_mut(leader).sig_queue.remove(pos) else {
            return;
        };
        match self.procs.get(leader).sig_actions[sig as usize] {
            SigAction::Default | SigAction::Ignore => {
                crate::ktrace!("(SIG) descartado sig=", sig as u64);
            }
            SigAction::Handler(handler) => handler(self, leader, sig),
        }
    }

    /// Completa uma continuação pendente de `cand`.
    fn complete_pending(&mut self, cand: PcbId, op: PendingOp) -> Completion {
        match op {
            PendingOp::SemDone => Completion::Resume(Some(0)),

            PendingOp::Wait { status_va } => {
                let waiter = self.leader_of(cand);
                let Some(zombie) = self.procs.findzombie(waiter) else {
                    return Completion::Resume(Some(
                        SysError::NotFound.as_isize(),
                    ));
                };
                let (tgid, code) = self.free_zombie(zombie);
                if status_va != 0 {
                    let space = self.space_of(cand);
                    if self.vm.write(space, status_va, &code.to_le_bytes()).is_err() {
                        return Completion::Resume(Some(SysError::BadAddress.as_isize()));
                    }
                }
                Completion::Resume(Some(tgid as isize))
            }

            PendingOp::Join { tid, ret_va } => {
                debug_assert_eq!(self.procs.get(tid).state, ProcState::Zombie);
                let code = self.procs.get(tid).exit_code;
                self.thread_free(tid);
                if ret_va != 0 {
                    let space = self.space_of(cand);
                    if self.vm.write(space, ret_va, &code.to_le_bytes()).is_err() {
                        return Completion::Resume(Some(SysError::BadAddress.as_isize()));
                    }
                }
                Completion::Resume(Some(0))
            }

            PendingOp::PipeRead { pipe, buf_va, len } => {
                self.pipe_read_drive(cand, pipe, buf_va, len)
            }

            PendingOp::PipeWrite {
                pipe,
                buf_va,
                len,
                done,
            } => self.pipe_write_drive(cand, pipe, buf_va, len, done),

            PendingOp::Sleep { until } => {
                if self.clock.ticks() >= until {
                    Completion::Resume(Some(0))
                } else {
                    Completion::NotYet
                }
            }

            PendingOp::ExitDrain { code } => {
                if !self.group_drained(cand) {
                    return Completion::NotYet;
                }
                let siblings: alloc::vec::Vec<PcbId> = self
                    .procs
                    .get(cand)
                    .threads
                    .iter()
                    .copied()
                    .filter(|&t| t != cand)
                    .collect();
                for thread in siblings {
                    self.thread_free(thread);
                }
                self.makezombie(cand, code);
                Completion::Gone
            }
        }
    }

    /// Espaço de endereçamento do processo de `id`.
    pub(crate) fn space_of(&self, id: PcbId) -> Space {
        let leader = self.leader_of(id);
        match self.procs.get(leader).space {
            Some(space) => space,
            None => panic!("processo sem espaco"),
        }
    }

    /// P num semáforo por uma tarefa específica (retomadas).
    pub(crate) fn sem_p_as(&mut self, id: PcbId, sem: SemId) -> bool {
        let acquired = self.sems.acquire(sem, id);
        if !acquired {
            self.procs.get_mut(id).state = ProcState::Blocked;
        }
        acquired
    }

    /// Acorda uma ponta do pipe se houver alguém dormindo na condição.
    pub(crate) fn pipe_nudge(&mut self, pipe: PipeId) {
        let cond = self.pipes.get(pipe).cond;
        if self.sems.value(cond) < 0 {
            self.sem_v(cond);
        }
    }

    /// Acorda todo mundo dormindo na condição do pipe (fechamento).
    pub(crate) fn pipe_wake_all(&mut self, cond: SemId) {
        while self.sems.value(cond) < 0 {
            self.sem_v(cond);
        }
    }

    /// Leitura de pipe, da primeira tentativa até as retomadas.
    pub(crate) fn pipe_read_drive(
        &mut self,
        id: PcbId,
        pipe: PipeId,
        buf_va: u32,
        len: usize,
    ) -> Completion {
        use crate::ipc::pipe::PipeIo;
        let mut buf = vec![0u8; len];
        match self.pipes.read_step(pipe, &mut buf) {
            PipeIo::Xfer(n) => {
                let space = self.space_of(id);
                if self.vm.write(space, buf_va, &buf[..n]).is_err() {
                    return Completion::Resume(Some(SysError::BadAddress.as_isize()));
                }
                // abriu espaço no buffer; escritores podem continuar
                self.pipe_nudge(pipe);
                Completion::Resume(Some(n as isize))
            }
            PipeIo::Eof => Completion::Resume(Some(0)),
            PipeIo::WouldBlock => {
                let cond = self.pipes.get(pipe).cond;
                self.procs.get_mut(id).pending =
                    Some(PendingOp::PipeRead { pipe, buf_va, len });
                let acquired = self.sem_p_as(id, cond);
                debug_assert!(!acquired);
                Completion::Blocked
            }
        }
    }

    /// Escrita de pipe, retomável. `done` bytes já foram aceitos.
    pub(crate) fn pipe_write_drive(
        &mut self,
        id: PcbId,
        pipe: PipeId,
        buf_va: u32,
        len: usize,
        mut done: usize,
    ) -> Completion {
        use crate::ipc::pipe::PipeIo;
        while done < len {
            let space = self.space_of(id);
            let mut chunk = vec![0u8; len - done];
            if self
                .vm
                .read(space, buf_va + done as u32, &mut chunk)
                .is_err()
            {
                return Completion::Resume(Some(SysError::BadAddress.as_isize()));
            }
            match self.pipes.write_step(pipe, &chunk) {
                PipeIo::Xfer(n) => {
                    done += n;
                    self.pipe_nudge(pipe);
                }
                PipeIo::Eof => {
                    // leitores sumiram; devolve o que entrou
                    return Completion::Resume(Some(done as isize));
                }
                PipeIo::WouldBlock => {
                    let cond = self.pipes.get(pipe).cond;
                    self.procs.get_mut(id).pending = Some(PendingOp::PipeWrite {
                        pipe,
                        buf_va,
                        len,
                        done,
                    });
                    let acquired = self.sem_p_as(id, cond);
                    debug_assert!(!acquired);
                    return Completion::Blocked;
                }
            }
        }
        Completion::Resume(Some(len as isize))
    }
}
