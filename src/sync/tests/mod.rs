//! Testes das primitivas de sincronização.
//!
//! # Como Executar
//! ```bash
//! cargo test --lib sync::tests
//! ```

#![cfg(test)]
