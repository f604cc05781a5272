//! Primitivas de sincronização.
//!
//! Toda espera no kernel passa pela arena central de semáforos: semáforos
//! de usuário, `wait`, `join` e pipes são construídos sobre ela.

pub mod sem;
pub mod usem;

pub use sem::{Sem, SemTable};
pub use usem::UsemTable;

mod tests;
