//! Continuações de syscalls bloqueantes.
//!
//! O kernel roda até o fim de cada trap; quando uma syscall precisa
//! dormir, o que falta fazer fica registrado no PCB como `PendingOp`.
//! Quando o escalonador volta a considerar a tarefa, a operação é
//! retomada e o resultado escrito no contexto salvo.

use crate::sys::types::{PcbId, PipeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    /// Dormiu num semáforo; ao acordar devolve 0.
    SemDone,
    /// `wait` por um filho zumbi; status vai para `status_va` se != 0.
    Wait { status_va: u32 },
    /// `join` numa thread; valor de saída vai para `ret_va` se != 0.
    Join { tid: PcbId, ret_va: u32 },
    /// Leitura de pipe vazia, dormindo na condição.
    PipeRead { pipe: PipeId, buf_va: u32, len: usize },
    /// Escrita de pipe cheia; `done` bytes já entraram.
    PipeWrite {
        pipe: PipeId,
        buf_va: u32,
        len: usize,
        done: usize,
    },
    /// `sleep` cooperativo até o tick dado.
    Sleep { until: u64 },
    /// Líder saindo: espera as outras threads do grupo terminarem.
    ExitDrain { code: i32 },
}

/// Resultado de retomar uma `PendingOp`.
pub enum Completion {
    /// Pronto para rodar; `Some(v)` vai para o EAX salvo.
    Resume(Option<isize>),
    /// Voltou a dormir num semáforo.
    Blocked,
    /// Ainda não é a hora (sleep, dreno de threads); segue Ready.
    NotYet,
    /// O PCB deixou de existir durante a retomada.
    Gone,
}
