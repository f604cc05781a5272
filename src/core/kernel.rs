//! Instância central do kernel.
//!
//! Todo o estado vive aqui: tabelas de processos, arquivos, pipes,
//! semáforos, a cache de inodes e os handles de hardware. A camada de
//! traps chama `on_trap` com o contexto salvo; tudo que acontece entre a
//! entrada e a saída de um trap roda até o fim, sem preempção interna.

use alloc::boxed::Box;

use crate::file::dev::DevRegistry;
use crate::file::file::FileTable;
use crate::fs::inode::FsState;
use crate::fs::layout::InodeType;
use crate::hal::{BlockDevice, DevOps, Loader, TickSource, VirtMem};
use crate::ipc::pipe::PipeTable;
use crate::sched::proc::{PcbTable, ProcState};
use crate::sync::sem::SemTable;
use crate::sync::usem::UsemTable;
use crate::sys::context::Context;
use crate::sys::error::SysResult;
use crate::sys::types::{DevId, PcbId, Pid};

/// Motivo de entrada no kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    /// `int` de syscall; número em EAX, argumentos em EBX..EDI.
    Syscall,
    /// Tick do timer; força o escalonador.
    Timer,
    /// Exceção de CPU com o vetor dado; mata o processo atual.
    Exception(u32),
}

pub struct Kernel {
    pub(crate) disk: Box<dyn BlockDevice>,
    pub(crate) vm: Box<dyn VirtMem>,
    pub(crate) loader: Box<dyn Loader>,
    pub(crate) clock: Box<dyn TickSource>,
    pub(crate) devs: DevRegistry,

    pub(crate) sems: SemTable,
    pub(crate) usems: UsemTable,
    pub(crate) fs: FsState,
    pub(crate) files: FileTable,
    pub(crate) pipes: PipeTable,
    pub(crate) procs: PcbTable,

    /// Slot do PCB em execução.
    pub(crate) curr: PcbId,
}

impl Kernel {
    /// Monta o volume, cria as tabelas e instala a raiz do kernel como
    /// tarefa atual.
    pub fn new(
        mut disk: Box<dyn BlockDevice>,
        vm: Box<dyn VirtMem>,
        loader: Box<dyn Loader>,
        clock: Box<dyn TickSource>,
    ) -> Self {
        let mut sems = SemTable::new();
        let fs = FsState::boot(&mut *disk);
        let procs = PcbTable::new(&mut sems);
        let mut kernel = Self {
            disk,
            vm,
            loader,
            clock,
            devs: DevRegistry::new(),
            sems,
            usems: UsemTable::new(),
            fs,
            files: FileTable::new(),
            pipes: PipeTable::new(),
            procs,
            curr: 0,
        };
        let cwd = kernel.fs.idup(kernel.fs.root);
        kernel.procs.get_mut(0).cwd = Some(cwd);
        crate::kinfo!("(KRN) Kernel pronto");
        kernel
    }

    pub fn current(&self) -> PcbId {
        self.curr
    }

    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    /// Registra um dispositivo de caractere e devolve seu número.
    pub fn register_device(&mut self, ops: Box<dyn DevOps>) -> DevId {
        self.devs.register(ops)
    }

    /// Cria um nó de dispositivo no caminho dado.
    pub fn adddev(&mut self, path: &str, dev: DevId) -> SysResult<()> {
        let root = self.fs.root;
        let (parent, name) = self.fs.iopen_parent(&mut *self.disk, root, path)?;
        let created = self
            .fs
            .icreate(&mut *self.disk, parent, name, InodeType::Dev, dev);
        self.fs.iclose(&mut *self.disk, parent);
        let idx = created?;
        self.fs.iclose(&mut *self.disk, idx);
        crate::kinfo!("(KRN) dispositivo registrado num=", dev as u64);
        Ok(())
    }

    /// Cria o primeiro processo de usuário a partir de um executável.
    pub fn spawn_init(&mut self, path: &str) -> SysResult<PcbId> {
        let id = self.procs.alloc(&mut self.sems)?;
        let space = match self.vm.space_alloc() {
            Ok(s) => s,
            Err(e) => {
                self.procs.release(id);
                return Err(e);
            }
        };
        let mut ctx = Context::default();
        if let Err(e) = self
            .loader
            .load(&mut *self.vm, space, path, &[path], &mut ctx)
        {
            self.vm.space_teardown(space);
            self.procs.release(id);
            return Err(e);
        }
        let cwd = self.fs.idup(self.fs.root);
        {
            let pcb = self.procs.get_mut(id);
            pcb.space = Some(space);
            pcb.ctx = ctx;
            pcb.cwd = Some(cwd);
            pcb.parent = Some(0);
            pcb.state = ProcState::Ready;
        }
        self.procs.get_mut(0).child_num += 1;
        crate::kinfo!("(KRN) init criado pid=", self.procs.get(id).pid as u64);
        Ok(id)
    }

    /// Ponto de entrada de todos os traps.
    pub fn on_trap(&mut self, ctx: &mut Context, trap: Trap) {
        match trap {
            Trap::Syscall => {
                if let Some(ret) = self.do_syscall(ctx) {
                    ctx.eax = ret as u32;
                }
                if self.procs.get(self.curr).state != ProcState::Running {
                    self.schedule(ctx);
                }
            }
            Trap::Timer => self.schedule(ctx),
            Trap::Exception(vector) => {
                if self.curr == 0 {
                    panic!("excecao na raiz do kernel");
                }
                crate::kerror!("(KRN) excecao fatal vetor=", vector as u64);
                self.force_exit_group(self.curr, 128 + vector as i32);
                self.schedule(ctx);
            }
        }
    }

    /// Recolhe um filho zumbi da raiz do kernel, sem bloquear. A raiz usa
    /// isto no seu laço principal em vez de `wait`.
    pub fn reap_kernel_child(&mut self) -> Option<(Pid, i32)> {
        let zombie = self.procs.findzombie(0)?;
        let zsem = self.procs.get(0).zombie_sem;
        let got = self.sems.acquire(zsem, 0);
        debug_assert!(got);
        Some(self.free_zombie(zombie))
    }
}
