//! Pipes e FIFOs.
//!
//! Um pipe é um buffer circular de 512 bytes com duas pontas. Cada ponta
//! guarda um estado, não um contador de descritores: `dup` e `fork`
//! compartilham o mesmo handle (contado na tabela de arquivos), mas
//! aberturas independentes da mesma ponta de um FIFO criam handles
//! distintos, e o primeiro desses handles a fechar derruba a ponta para
//! todos. Num FIFO a ponta oposta pode nunca ter sido aberta; leitores
//! esperam por ela em vez de ver EOF. O slot volta para a tabela quando
//! nenhuma ponta está aberta.
//!
//! Cada pipe carrega dois semáforos: um mutex (que neste kernel nunca
//! chega a bloquear) e uma condição usada pelo sinal de "tem espaço/tem
//! dado". A condição segue a disciplina de sinal por valor negativo: só
//! recebe V quando há alguém de fato dormindo nela.

use crate::sched::config::{PIPE_BUF, PIPE_NUM};
use crate::sync::sem::SemTable;
use crate::sys::error::{SysError, SysResult};
use crate::sys::types::{Ino, PipeId, SemId};

/// Resultado de um passo de leitura/escrita no buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeIo {
    /// Transferiu `n` bytes.
    Xfer(usize),
    /// Nada a fazer agora; o chamador dorme na condição.
    WouldBlock,
    /// A outra ponta fechou; leitura vê EOF, escrita devolve o parcial.
    Eof,
}

/// Ciclo de vida de uma ponta do pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndState {
    /// Nenhum descritor abriu esta ponta ainda (só acontece em FIFOs).
    Unopened,
    Open,
    /// Já esteve aberta e o último descritor fechou.
    Closed,
}

pub struct Pipe {
    buf: [u8; PIPE_BUF],
    used: usize,
    rpos: usize,
    pub read_end: EndState,
    pub write_end: EndState,
    pub mutex: SemId,
    pub cond: SemId,
    /// Inode do FIFO dono deste pipe, se houver.
    pub key: Option<Ino>,
}

pub struct PipeTable {
    slots: [Option<Pipe>; PIPE_NUM],
}

impl PipeTable {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Aloca um pipe. Pipes anônimos nascem com as duas pontas abertas;
    /// FIFOs abrem só a(s) ponta(s) do primeiro descritor.
    pub fn alloc(
        &mut self,
        sems: &mut SemTable,
        key: Option<Ino>,
        readable: bool,
        writable: bool,
    ) -> SysResult<PipeId> {
        let id = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(SysError::ResourceExhausted)?;
        let mutex = sems.alloc(1)?;
        let cond = match sems.alloc(0) {
            Ok(c) => c,
            Err(e) => {
                sems.free(mutex);
                return Err(e);
            }
        };
        let end = |open: bool| {
            if open {
                EndState::Open
            } else {
                EndState::Unopened
            }
        };
        self.slots[id] = Some(Pipe {
            buf: [0u8; PIPE_BUF],
            used: 0,
            rpos: 0,
            read_end: end(readable),
            write_end: end(writable),
            mutex,
            cond,
            key,
        });
        crate::kdebug!("(IPC) pipe alocado id=", id as u64);
        Ok(id)
    }

    pub fn get(&self, id: PipeId) -> &Pipe {
        match self.slots[id].as_ref() {
            Some(pipe) => pipe,
            None => panic!("pipe inexistente"),
        }
    }

    pub fn get_mut(&mut self, id: PipeId) -> &mut Pipe {
        match self.slots[id].as_mut() {
            Some(pipe) => pipe,
            None => panic!("pipe inexistente"),
        }
    }

    pub fn is_open(&self, id: PipeId) -> bool {
        id < PIPE_NUM && self.slots[id].is_some()
    }

    /// Um passo de leitura: drena o que houver no buffer.
    pub fn read_step(&mut self, id: PipeId, out: &mut [u8]) -> PipeIo {
        let pipe = self.get_mut(id);
        if pipe.used > 0 {
            let n = out.len().min(pipe.used);
            for byte in out.iter_mut().take(n) {
                *byte = pipe.buf[pipe.rpos];
                pipe.rpos = (pipe.rpos + 1) % PIPE_BUF;
                pipe.used -= 1;
            }
            PipeIo::Xfer(n)
        } else if pipe.write_end == EndState::Closed {
            PipeIo::Eof
        } else {
            // escritor ainda não chegou (FIFO) ou ainda não escreveu
            PipeIo::WouldBlock
        }
    }

    /// Um passo de escrita: enche o que couber no buffer. Escrever num
    /// FIFO cuja ponta de leitura nunca abriu enche o buffer normalmente.
    pub fn write_step(&mut self, id: PipeId, data: &[u8]) -> PipeIo {
        let pipe = self.get_mut(id);
        if pipe.read_end == EndState::Closed {
            return PipeIo::Eof;
        }
        if pipe.used == PIPE_BUF {
            return PipeIo::WouldBlock;
        }
        let n = data.len().min(PIPE_BUF - pipe.used);
        for byte in data.iter().take(n) {
            let wpos = (pipe.rpos + pipe.used) % PIPE_BUF;
            pipe.buf[wpos] = *byte;
            pipe.used += 1;
        }
        PipeIo::Xfer(n)
    }

    /// Fecha uma ponta. Devolve `true` se o slot foi liberado (nenhuma
    /// ponta segue aberta); os semáforos voltam para a arena. Num FIFO a
    /// ponta oposta pode nunca ter aberto; o slot é liberado mesmo assim.
    pub fn close_end(&mut self, sems: &mut SemTable, id: PipeId, write_end: bool) -> bool {
        let pipe = self.get_mut(id);
        if write_end {
            pipe.write_end = EndState::Closed;
        } else {
            pipe.read_end = EndState::Closed;
        }
        if pipe.read_end == EndState::Open || pipe.write_end == EndState::Open {
            return false;
        }
        let (mutex, cond) = (pipe.mutex, pipe.cond);
        sems.free(mutex);
        sems.free(cond);
        self.slots[id] = None;
        crate::kdebug!("(IPC) pipe liberado id=", id as u64);
        true
    }

    /// Procura o pipe ligado a um inode de FIFO.
    pub fn fifo_lookup(&self, ino: Ino) -> Option<PipeId> {
        self.slots.iter().position(|s| {
            s.as_ref()
                .is_some_and(|p| p.key == Some(ino))
        })
    }

    /// Desliga o pipe do inode. Chamado quando o inode do FIFO morre; o
    /// número pode ser realocado e não deve mais casar com este pipe.
    pub fn rmfifo(&mut self, ino: Ino) {
        for slot in self.slots.iter_mut() {
            if let Some(pipe) = slot {
                if pipe.key == Some(ino) {
                    pipe.key = None;
                }
            }
        }
    }
}
