//! Sistema de arquivos em disco.
//!
//! Submódulos:
//! - `layout`: formato em disco (superbloco, dinodes, dirents) e `mkfs`.
//! - `alloc`: bitmap de blocos e alocação de inodes.
//! - `inode`: cache de inodes com remoção adiada.
//! - `path`: resolução de caminhos, diretórios, links.

pub mod alloc;
pub mod inode;
pub mod layout;
pub mod path;

pub use inode::{FsState, Inode};
pub use layout::{mkfs, Dirent, InodeType, SuperBlock};

mod tests;
