//! Handles de arquivo e dispositivos de caractere.

pub mod dev;
pub mod file;

pub use dev::DevRegistry;
pub use file::{File, FileBack, FileTable};
