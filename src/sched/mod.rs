//! Escalonamento, processos e threads.
//!
//! Submódulos:
//! - `config`: limites globais do sistema.
//! - `proc`: tabela de PCBs.
//! - `lifecycle`: criação e morte de processos e threads.
//! - `pending`: continuações de syscalls bloqueantes.
//! - `scheduler`: round-robin com retomada de continuações.
//! - `signal`: disposições e constantes de sinais.

pub mod config;
pub mod lifecycle;
pub mod pending;
pub mod proc;
pub mod scheduler;
pub mod signal;

pub use pending::{Completion, PendingOp};
pub use proc::{Pcb, PcbTable, ProcState};

mod tests;
