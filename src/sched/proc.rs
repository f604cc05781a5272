//! Tabela de PCBs.
//!
//! O slot 0 é a raiz do kernel: pid 0, nunca bloqueia, nunca morre, e
//! adota órfãos. Os demais slots são reciclados; `pid` é global e nunca
//! se repete, `tgid` identifica o processo (pid do líder do grupo).

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use crate::sched::config::{MAX_UFILE, MAX_USEM, PCB_NUM, SIGNAL_NUM};
use crate::sched::pending::PendingOp;
use crate::sched::signal::SigAction;
use crate::sync::sem::SemTable;
use crate::sys::context::Context;
use crate::sys::error::{SysError, SysResult};
use crate::sys::types::{FileId, InodeIdx, PcbId, Pid, SemId, Space, UsemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    Unused,
    Uninit,
    Running,
    Ready,
    Blocked,
    Zombie,
}

pub struct Pcb {
    pub pid: Pid,
    pub tgid: Pid,
    pub state: ProcState,
    pub ctx: Context,
    pub space: Option<Space>,
    pub brk: u32,

    pub parent: Option<PcbId>,
    pub child_num: u32,
    pub exit_code: i32,

    // grupo de threads; `threads` só é significativo no líder e inclui ele
    pub group_leader: PcbId,
    pub threads: Vec<PcbId>,
    pub joinable: bool,
    pub detached: bool,

    // alocados uma vez no boot, zerados a cada reuso do slot
    pub join_sem: SemId,
    pub zombie_sem: SemId,

    pub usems: [Option<UsemId>; MAX_USEM],
    pub files: [Option<FileId>; MAX_UFILE],
    pub cwd: Option<InodeIdx>,

    pub pending: Option<PendingOp>,
    pub sig_queue: VecDeque<u32>,
    pub sig_blocked: u32,
    pub sig_actions: [SigAction; SIGNAL_NUM],
    pub stopped: bool,
}

impl Pcb {
    fn fresh(join_sem: SemId, zombie_sem: SemId) -> Self {
        Self {
            pid: 0,
            tgid: 0,
            state: ProcState::Unused,
            ctx: Context::default(),
            space: None,
            brk: 0,
            parent: None,
            child_num: 0,
            exit_code: 0,
            group_leader: 0,
            threads: Vec::new(),
            joinable: true,
            detached: false,
            join_sem,
            zombie_sem,
            usems: [None; MAX_USEM],
            files: [None; MAX_UFILE],
            cwd: None,
            pending: None,
            sig_queue: VecDeque::new(),
            sig_blocked: 0,
            sig_actions: [SigAction::Default; SIGNAL_NUM],
            stopped: false,
        }
    }
}

pub struct PcbTable {
    pcbs: Vec<Pcb>,
    next_pid: Pid,
}

impl PcbTable {
    /// Cria a tabela com a raiz do kernel viva no slot 0.
    pub fn new(sems: &mut SemTable) -> Self {
        let mut pcbs = Vec::with_capacity(PCB_NUM);
        for _ in 0..PCB_NUM {
            let join = match sems.alloc(0) {
                Ok(s) => s,
                Err(_) => panic!("arena de semaforos pequena demais"),
            };
            let zombie = match sems.alloc(0) {
                Ok(s) => s,
                Err(_) => panic!("arena de semaforos pequena demais"),
            };
            pcbs.push(Pcb::fresh(join, zombie));
        }
        let root = &mut pcbs[0];
        root.state = ProcState::Running;
        root.threads = vec![0];
        Self { pcbs, next_pid: 1 }
    }

    pub fn get(&self, id: PcbId) -> &Pcb {
        &self.pcbs[id]
    }

    pub fn get_mut(&mut self, id: PcbId) -> &mut Pcb {
        &mut self.pcbs[id]
    }

    /// Reserva um slot e zera seu estado. Não aloca espaço de
    /// endereçamento; quem chama decide se cria ou compartilha.
    pub fn alloc(&mut self, sems: &mut SemTable) -> SysResult<PcbId> {
        let id = self.pcbs[1..]
            .iter()
            .position(|p| p.state == ProcState::Unused)
            .map(|i| i + 1)
            .ok_or(SysError::ResourceExhausted)?;
        let pid = self.next_pid;
        self.next_pid += 1;
        let (join, zombie) = {
            let pcb = &self.pcbs[id];
            (pcb.join_sem, pcb.zombie_sem)
        };
        sems.reset(join, 0);
        sems.reset(zombie, 0);
        let mut fresh = Pcb::fresh(join, zombie);
        fresh.pid = pid;
        fresh.tgid = pid;
        fresh.state = ProcState::Uninit;
        fresh.group_leader = id;
        fresh.threads = vec![id];
        self.pcbs[id] = fresh;
        crate::kdebug!("(PROC) slot alocado pid=", pid as u64);
        Ok(id)
    }

    /// Devolve o slot à tabela.
    pub fn release(&mut self, id: PcbId) {
        debug_assert!(id != 0);
        let (join, zombie) = {
            let pcb = &self.pcbs[id];
            (pcb.join_sem, pcb.zombie_sem)
        };
        self.pcbs[id] = Pcb::fresh(join, zombie);
    }

    /// Slot do PCB com este pid, se vivo.
    pub fn pid2pcb(&self, pid: Pid) -> Option<PcbId> {
        self.pcbs
            .iter()
            .position(|p| p.state != ProcState::Unused && p.pid == pid)
    }

    /// Algum filho zumbi deste pai?
    pub fn findzombie(&self, parent: PcbId) -> Option<PcbId> {
        self.pcbs.iter().position(|p| {
            p.state == ProcState::Zombie && p.parent == Some(parent)
        })
    }

    pub fn iter_live(&self) -> impl Iterator<Item = PcbId> + '_ {
        (0..PCB_NUM).filter(|&i| self.pcbs[i].state != ProcState::Unused)
    }
}
