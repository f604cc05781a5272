//! Testes de integração da camada de syscalls.
//!
//! Cada teste sobe um kernel completo sobre os mocks da HAL e dirige as
//! tarefas pelo mesmo caminho do hardware: `on_trap` com um contexto
//! vivo. O contexto do rig acompanha a tarefa em execução; depois de uma
//! syscall que bloqueia, ele passa a ser o da tarefa que o escalonador
//! escolheu.
//!
//! # Como Executar
//! ```bash
//! cargo test --lib syscall::tests
//! ```

#![cfg(test)]

pub mod memory;

use alloc::boxed::Box;

use crate::core::kernel::Trap;
use crate::fs::layout::mkfs;
use crate::hal::mock::{MockClock, MockDisk, MockLoader, MockVm, MOCK_IMG_BASE};
use crate::sys::context::Context;
use crate::sys::numbers::*;
use crate::sys::types::{PcbId, Space};
use crate::Kernel;

pub const TEST_BLOCKS: u32 = 2048;
pub const INIT_PATH: &str = "/init";

/// Janela de rascunho dentro da imagem mapeada pelo MockLoader.
pub const SCRATCH: u32 = MOCK_IMG_BASE + 0x8000;

pub struct Rig {
    pub kernel: Kernel,
    pub vm: MockVm,
    pub clock: MockClock,
    pub loader: MockLoader,
    pub ctx: Context,
}

impl Rig {
    /// Kernel montado com o init já em execução.
    pub fn boot() -> Self {
        let mut disk = MockDisk::new(TEST_BLOCKS as usize);
        mkfs(&mut disk, TEST_BLOCKS);
        let vm = MockVm::new();
        let clock = MockClock::new();
        let loader = MockLoader::new();
        let mut kernel = Kernel::new(
            Box::new(disk),
            Box::new(vm.clone()),
            Box::new(loader.clone()),
            Box::new(clock.clone()),
        );
        kernel.spawn_init(INIT_PATH).unwrap();
        let mut ctx = Context::default();
        // o primeiro tick tira a raiz da CPU e entrega ao init
        kernel.on_trap(&mut ctx, Trap::Timer);
        assert_ne!(kernel.current(), 0);
        Self {
            kernel,
            vm,
            clock,
            loader,
            ctx,
        }
    }

    /// Executa uma syscall como a tarefa atual. O valor devolvido é o EAX
    /// do contexto vivo depois do trap; se a chamada bloqueou, é o da
    /// tarefa que assumiu a CPU.
    pub fn syscall(&mut self, num: u32, args: [u32; 3]) -> isize {
        self.ctx.eax = num;
        self.ctx.ebx = args[0];
        self.ctx.ecx = args[1];
        self.ctx.edx = args[2];
        self.kernel.on_trap(&mut self.ctx, Trap::Syscall);
        self.ctx.eax as i32 as isize
    }

    /// Avança o relógio e entrega um tick de timer.
    pub fn tick(&mut self, n: u64) {
        self.clock.advance(n);
        self.kernel.on_trap(&mut self.ctx, Trap::Timer);
    }

    pub fn cur(&self) -> PcbId {
        self.kernel.current()
    }

    /// Espaço de endereçamento da tarefa atual.
    pub fn space(&self) -> Space {
        self.kernel.space_of(self.kernel.current())
    }

    /// Coloca uma string C na janela de rascunho e devolve o endereço.
    pub fn cstr(&mut self, va: u32, s: &str) -> u32 {
        self.vm.poke_cstr(self.space(), va, s);
        va
    }

    /// Atalho: open com o caminho copiado para o rascunho.
    pub fn open(&mut self, path: &str, flags: u32) -> isize {
        let va = self.cstr(SCRATCH, path);
        self.syscall(SYS_OPEN, [va, flags, 0])
    }

    /// Escreve bytes no espaço da tarefa atual.
    pub fn put(&mut self, va: u32, bytes: &[u8]) {
        self.vm.poke(self.space(), va, bytes);
    }

    /// Lê bytes do espaço da tarefa atual.
    pub fn take(&mut self, va: u32, len: usize) -> alloc::vec::Vec<u8> {
        self.vm.peek(self.space(), va, len)
    }
}
