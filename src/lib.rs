//! Brasa Kernel Library.
//!
//! Ponto central de exportação dos módulos do kernel.
//! O núcleo compila freestanding (`no_std` + `alloc`); os testes unitários
//! rodam no host com a biblioteca padrão.

#![cfg_attr(not(test), no_std)]

// Habilitar alocação dinâmica (necessário para Vec/Box/VecDeque)
extern crate alloc;

// --- Módulos de Baixo Nível (Colaboradores Externos) ---
pub mod hal; // Traits: disco de blocos, VM, loader, relógio, devices

// --- Módulos Centrais (Lógica do Kernel) ---
pub mod core; // Estrutura Kernel, logging, trap de entrada
pub mod mm; // Heap do kernel (builds freestanding)
pub mod sync; // Semáforos (kernel e usuário)
pub mod sys; // Definições de Sistema (tipos, erros, flags, números)

// --- Subsistemas ---
pub mod file; // Tabela de arquivos abertos e dispatch por tipo
pub mod fs; // Inodes, bitmap de blocos, resolução de caminhos
pub mod ipc; // Pipes e FIFOs
pub mod sched; // PCBs, threads, sinais e escalonador
pub mod syscall; // Interface com userspace

// Re-exportar os pontos de entrada mais usados pelo embedder
pub use crate::core::kernel::{Kernel, Trap};
pub use crate::sys::context::Context;
