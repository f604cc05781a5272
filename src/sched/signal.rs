//! Sinais.
//!
//! Três sinais têm efeito síncrono no próprio `kill`: KILL, STOP e CONT.
//! Os demais entram numa fila por processo (sem duplicatas) e são
//! entregues um por vez quando a tarefa volta a ser escolhida,
//! respeitando a máscara de bloqueio.

pub const SIGKILL: u32 = 9;
pub const SIGCONT: u32 = 18;
pub const SIGSTOP: u32 = 19;

/// Código de saída de um processo morto por KILL.
pub const KILLED_EXIT_CODE: i32 = 137;

/// Disposição de um sinal enfileirado. No trap só entram `Default` e
/// `Ignore`; handlers de função são reservados a código do kernel.
#[derive(Clone, Copy, Default)]
pub enum SigAction {
    #[default]
    Default,
    Ignore,
    Handler(fn(&mut crate::Kernel, crate::sys::types::PcbId, u32)),
}
