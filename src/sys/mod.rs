//! Definições de sistema: tipos básicos, erros, flags e números de syscall.

pub mod context;
pub mod error;
pub mod flags;
pub mod numbers;
pub mod types;

pub use context::Context;
pub use error::{SysError, SysResult};
