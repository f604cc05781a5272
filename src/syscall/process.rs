//! Syscalls de processos, threads e sinais.

use alloc::string::String;
use alloc::vec::Vec;

use crate::sched::config::SIGNAL_NUM;
use crate::sched::pending::PendingOp;
use crate::sched::proc::ProcState;
use crate::sched::signal::{SigAction, SIGCONT, SIGKILL, SIGSTOP};
use crate::sys::context::Context;
use crate::sys::error::SysError;
use crate::sys::flags::{SIG_BLOCK, SIG_SETMASK, SIG_UNBLOCK};
use crate::sys::types::{USER_CODE_SEL, USER_DATA_SEL, USER_EFLAGS};
use crate::syscall::SysRet;
use crate::Kernel;

impl Kernel {
    pub(crate) fn sys_getpid(&mut self) -> SysRet {
        let leader = self.leader_of(self.curr);
        Ok(Some(self.procs.get(leader).tgid as isize))
    }

    pub(crate) fn sys_gettid(&mut self) -> SysRet {
        Ok(Some(self.procs.get(self.curr).pid as isize))
    }

    pub(crate) fn sys_yield(&mut self) -> SysRet {
        self.procs.get_mut(self.curr).state = ProcState::Ready;
        Ok(Some(0))
    }

    /// Dorme pelo menos `ticks` ticks, cooperativamente: a tarefa fica
    /// Ready com a continuação e só volta quando o relógio passar do
    /// prazo.
    pub(crate) fn sys_sleep(&mut self, ticks: u32) -> SysRet {
        if ticks == 0 {
            return self.sys_yield();
        }
        let until = self.clock.ticks() + ticks as u64;
        let pcb = self.procs.get_mut(self.curr);
        pcb.pending = Some(PendingOp::Sleep { until });
        pcb.state = ProcState::Ready;
        Ok(None)
    }

    /// Duplica o processo atual. O filho volta da syscall com EAX 0; o
    /// pai recebe o pid do filho.
    pub(crate) fn sys_fork(&mut self, ctx: &Context) -> SysRet {
        let parent = self.leader_of(self.curr);
        let child = self.procs.alloc(&mut self.sems)?;
        let space = match self.vm.space_clone(self.space_of(self.curr)) {
            Ok(s) => s,
            Err(e) => {
                self.procs.release(child);
                return Err(e);
            }
        };

        let cwd = match self.procs.get(parent).cwd {
            Some(cwd) => Some(self.fs.idup(cwd)),
            None => None,
        };
        let (files, usems, sig_actions, sig_blocked, brk) = {
            let p = self.procs.get(parent);
            (p.files, p.usems, p.sig_actions, p.sig_blocked, p.brk)
        };
        for fid in files.iter().flatten() {
            self.files.dup(*fid);
        }
        for usem in usems.iter().flatten() {
            self.usems.dup(*usem);
        }

        let mut child_ctx = *ctx;
        child_ctx.eax = 0;
        {
            let pcb = self.procs.get_mut(child);
            pcb.space = Some(space);
            pcb.brk = brk;
            pcb.ctx = child_ctx;
            pcb.parent = Some(parent);
            pcb.cwd = cwd;
            pcb.files = files;
            pcb.usems = usems;
            pcb.sig_actions = sig_actions;
            pcb.sig_blocked = sig_blocked;
            pcb.state = ProcState::Ready;
        }
        self.procs.get_mut(parent).child_num += 1;
        let child_pid = self.procs.get(child).tgid;
        crate::kdebug!("(PROC) fork filho pid=", child_pid as u64);
        Ok(Some(child_pid as isize))
    }

    /// Substitui a imagem do processo. Só o líder pode chamar; em caso de
    /// sucesso o contexto vivo já sai apontando para a imagem nova e o
    /// EAX não é tocado.
    pub(crate) fn sys_exec(&mut self, ctx: &mut Context, path_va: u32, argv_va: u32) -> SysRet {
        let leader = self.leader_of(self.curr);
        if self.curr != leader {
            return Err(SysError::InvalidArgument);
        }
        let path = self.user_cstr(self.curr, path_va)?;
        let argv: Vec<String> = self.user_argv(self.curr, argv_va)?;

        // a imagem nova nasce antes de desmontar a velha; falha de load
        // deixa o processo intacto
        let new_space = self.vm.space_alloc()?;
        let mut new_ctx = Context::default();
        let argv_refs: Vec<&str> = argv.iter().map(|s| s.as_str()).collect();
        if let Err(e) = self
            .loader
            .load(&mut *self.vm, new_space, &path, &argv_refs, &mut new_ctx)
        {
            self.vm.space_teardown(new_space);
            return Err(e);
        }

        let siblings: Vec<usize> = self
            .procs
            .get(leader)
            .threads
            .iter()
            .copied()
            .filter(|&t| t != leader)
            .collect();
        for thread in siblings {
            self.thread_free(thread);
        }
        if let Some(old) = self.procs.get(leader).space {
            self.vm.space_teardown(old);
        }
        {
            let pcb = self.procs.get_mut(leader);
            pcb.space = Some(new_space);
            pcb.brk = 0;
            pcb.pending = None;
        }
        *ctx = new_ctx;
        crate::kinfo!("(PROC) exec pid=", self.procs.get(leader).tgid as u64);
        Ok(None)
    }

    /// Termina a thread atual. Líder com threads vivas entra em dreno e
    /// só vira zumbi quando o grupo esvaziar.
    pub(crate) fn sys_exit(&mut self, code: i32) -> SysRet {
        let curr = self.curr;
        let leader = self.leader_of(curr);
        if curr != leader {
            self.thread_exit(curr, code);
            return Ok(None);
        }
        if self.group_drained(leader) {
            let zombies: Vec<usize> = self
                .procs
                .get(leader)
                .threads
                .iter()
                .copied()
                .filter(|&t| t != leader)
                .collect();
            for thread in zombies {
                self.thread_free(thread);
            }
            self.makezombie(leader, code);
        } else {
            let pcb = self.procs.get_mut(leader);
            pcb.pending = Some(PendingOp::ExitDrain { code });
            pcb.state = ProcState::Ready;
        }
        Ok(None)
    }

    /// Termina o grupo inteiro de uma vez.
    pub(crate) fn sys_exit_group(&mut self, code: i32) -> SysRet {
        self.force_exit_group(self.curr, code);
        Ok(None)
    }

    /// Espera um filho qualquer virar zumbi. Devolve o pid do filho; o
    /// código de saída vai para `status_va` se não for nulo.
    pub(crate) fn sys_wait(&mut self, status_va: u32) -> SysRet {
        let leader = self.leader_of(self.curr);
        if self.procs.get(leader).child_num == 0 {
            return Err(SysError::NotFound);
        }
        let zsem = self.procs.get(leader).zombie_sem;
        if !self.sem_p(zsem) {
            self.procs.get_mut(self.curr).pending = Some(PendingOp::Wait { status_va });
            return Ok(None);
        }
        let zombie = self.procs.findzombie(leader).ok_or(SysError::Unknown)?;
        let (tgid, code) = self.free_zombie(zombie);
        if status_va != 0 {
            self.user_write(self.curr, status_va, &code.to_le_bytes())?;
        }
        Ok(Some(tgid as isize))
    }

    /// Cria uma thread no grupo atual. A pilha recebe `[retorno, arg]` e
    /// a thread nasce em `entry`.
    pub(crate) fn sys_clone(&mut self, entry: u32, stack_top: u32, arg: u32) -> SysRet {
        let leader = self.leader_of(self.curr);
        let child = self.procs.alloc(&mut self.sems)?;

        // convenção de chamada: arg acima do endereço de retorno
        let sp = stack_top - 8;
        if let Err(e) = self.user_write(self.curr, sp + 4, &arg.to_le_bytes()) {
            self.procs.release(child);
            return Err(e);
        }
        // endereço de retorno nulo: a thread termina via exit, não via ret
        if let Err(e) = self.user_write(self.curr, sp, &0u32.to_le_bytes()) {
            self.procs.release(child);
            return Err(e);
        }

        let tgid = self.procs.get(leader).tgid;
        {
            let pcb = self.procs.get_mut(child);
            pcb.tgid = tgid;
            pcb.group_leader = leader;
            pcb.threads = Vec::new();
            pcb.parent = None;
            pcb.ctx = Context {
                eip: entry,
                esp: sp,
                cs: USER_CODE_SEL,
                ds: USER_DATA_SEL,
                ss: USER_DATA_SEL,
                eflags: USER_EFLAGS,
                ..Context::default()
            };
            pcb.state = ProcState::Ready;
        }
        self.procs.get_mut(leader).threads.push(child);
        let tid = self.procs.get(child).pid;
        crate::kdebug!("(PROC) clone tid=", tid as u64);
        Ok(Some(tid as isize))
    }

    /// Espera uma thread do próprio grupo terminar e recolhe seu slot.
    pub(crate) fn sys_join(&mut self, tid: u32, ret_va: u32) -> SysRet {
        let target = self.procs.pid2pcb(tid).ok_or(SysError::NotFound)?;
        let leader = self.leader_of(self.curr);
        if target == self.curr
            || target == leader
            || self.leader_of(target) != leader
            || !self.procs.get(target).joinable
            || self.procs.get(target).detached
        {
            return Err(SysError::InvalidArgument);
        }
        // um join por thread
        self.procs.get_mut(target).joinable = false;
        let jsem = self.procs.get(target).join_sem;
        if !self.sem_p(jsem) {
            self.procs.get_mut(self.curr).pending = Some(PendingOp::Join {
                tid: target,
                ret_va,
            });
            return Ok(None);
        }
        debug_assert_eq!(self.procs.get(target).state, ProcState::Zombie);
        let code = self.procs.get(target).exit_code;
        self.thread_free(target);
        if ret_va != 0 {
            self.user_write(self.curr, ret_va, &code.to_le_bytes())?;
        }
        Ok(Some(0))
    }

    /// Marca uma thread como detached: ninguém vai dar join; ao terminar
    /// ela é adotada e recolhida pela raiz do kernel.
    pub(crate) fn sys_detach(&mut self, tid: u32) -> SysRet {
        let target = self.procs.pid2pcb(tid).ok_or(SysError::NotFound)?;
        let leader = self.leader_of(self.curr);
        if target == leader || self.leader_of(target) != leader {
            return Err(SysError::InvalidArgument);
        }
        if !self.procs.get(target).joinable {
            return Err(SysError::InvalidArgument);
        }
        if self.procs.get(target).state == ProcState::Zombie {
            // já terminou: vai direto para a raiz recolher
            self.procs.get_mut(leader).threads.retain(|&t| t != target);
            self.procs.get_mut(target).parent = Some(0);
            self.procs.get_mut(target).detached = true;
            self.procs.get_mut(0).child_num += 1;
            let zsem = self.procs.get(0).zombie_sem;
            self.sem_v(zsem);
            return Ok(Some(0));
        }
        self.procs.get_mut(target).detached = true;
        Ok(Some(0))
    }

    /// Envia um sinal ao processo de `pid`. KILL, STOP e CONT agem na
    /// hora; os demais entram na fila (sem repetição) e são resolvidos
    /// quando o processo volta a rodar.
    pub(crate) fn sys_kill(&mut self, pid: u32, sig: u32) -> SysRet {
        if sig == 0 || sig as usize >= SIGNAL_NUM {
            return Err(SysError::InvalidArgument);
        }
        let target = self.procs.pid2pcb(pid).ok_or(SysError::NotFound)?;
        let leader = self.leader_of(target);
        if leader == 0 || self.procs.get(leader).state == ProcState::Zombie {
            return Err(SysError::NotFound);
        }

        match sig {
            SIGKILL => {
                let killing_self = self.leader_of(self.curr) == leader;
                self.kill_process(leader);
                if killing_self {
                    return Ok(None);
                }
                Ok(Some(0))
            }
            SIGSTOP => {
                let members: Vec<usize> = self.procs.get(leader).threads.clone();
                for member in members {
                    let pcb = self.procs.get_mut(member);
                    // quem dorme em semáforo segue lá; só paramos os prontos
                    if matches!(pcb.state, ProcState::Ready | ProcState::Running) {
                        pcb.state = ProcState::Blocked;
                        pcb.stopped = true;
                    }
                }
                Ok(Some(0))
            }
            SIGCONT => {
                let members: Vec<usize> = self.procs.get(leader).threads.clone();
                for member in members {
                    let pcb = self.procs.get_mut(member);
                    if pcb.stopped {
                        pcb.stopped = false;
                        pcb.state = ProcState::Ready;
                    }
                }
                Ok(Some(0))
            }
            _ => {
                let pcb = self.procs.get_mut(leader);
                if !pcb.sig_queue.contains(&sig) {
                    pcb.sig_queue.push_back(sig);
                }
                Ok(Some(0))
            }
        }
    }

    /// Ajusta a disposição de um sinal: 0 volta ao padrão, 1 ignora.
    /// KILL, STOP e CONT não são configuráveis.
    pub(crate) fn sys_sigaction(&mut self, sig: u32, act: u32) -> SysRet {
        if sig == 0 || sig as usize >= SIGNAL_NUM {
            return Err(SysError::InvalidArgument);
        }
        if matches!(sig, SIGKILL | SIGSTOP | SIGCONT) {
            return Err(SysError::InvalidArgument);
        }
        let action = match act {
            0 => SigAction::Default,
            1 => SigAction::Ignore,
            _ => return Err(SysError::InvalidArgument),
        };
        let leader = self.leader_of(self.curr);
        self.procs.get_mut(leader).sig_actions[sig as usize] = action;
        Ok(Some(0))
    }

    /// Altera a máscara de sinais do processo; devolve a máscara antiga.
    pub(crate) fn sys_sigprocmask(&mut self, how: u32, mask: u32) -> SysRet {
        let leader = self.leader_of(self.curr);
        let pcb = self.procs.get_mut(leader);
        let old = pcb.sig_blocked;
        pcb.sig_blocked = match how {
            SIG_BLOCK => old | mask,
            SIG_UNBLOCK => old & !mask,
            SIG_SETMASK => mask,
            _ => return Err(SysError::InvalidArgument),
        };
        // KILL, STOP e CONT nem passam pela fila; a máscara não os toca
        Ok(Some(old as isize))
    }
}
