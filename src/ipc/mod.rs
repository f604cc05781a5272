//! Comunicação entre processos.

pub mod pipe;

pub use pipe::{Pipe, PipeIo, PipeTable};

mod tests;
